//! モックテレメトリ生成
//!
//! もっともらしい範囲の値を乱数で生成する。シードを固定すれば再現可能。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::aqi::pm25_to_aqi;
use super::{
    AtmosphericComposition, CompositionReading, LiveTelemetry, TelemetrySource, TrendPoint,
    MAP_HEIGHT, MAP_WIDTH, TREND_NOW_INDEX,
};
use crate::ai::types::{AirQuality, WeatherData};

const CONDITIONS: [&str; 5] = ["Clear", "Partly Cloudy", "Overcast", "Light Breeze", "Hazy"];

/// 乱数ベースのテレメトリ供給元
pub struct MockTelemetry {
    rng: StdRng,
}

impl MockTelemetry {
    /// OS の乱数源でシードする
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// 固定シードで初期化する（再現可能な出力が必要な場合）
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for MockTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

/// 小数第 1 位に丸める
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl TelemetrySource for MockTelemetry {
    fn weather(&mut self) -> WeatherData {
        let condition = CONDITIONS[self.rng.random_range(0..CONDITIONS.len())];
        WeatherData {
            temperature_f: f64::from(self.rng.random_range(55..=80_i32)),
            condition: condition.to_string(),
            humidity_pct: f64::from(self.rng.random_range(30..=80_i32)),
            wind_speed_mph: f64::from(self.rng.random_range(0..=15_i32)),
        }
    }

    fn air_quality(&mut self, location: &str) -> AirQuality {
        AirQuality {
            location: location.to_string(),
            ozone_ppb: round1(self.rng.random_range(20.0..60.0)),
            no2_ppb: round1(self.rng.random_range(5.0..40.0)),
            pm25_ug_m3: round1(self.rng.random_range(3.0..35.0)),
        }
    }

    fn atmosphere(&mut self) -> AtmosphericComposition {
        AtmosphericComposition {
            readings: vec![
                CompositionReading {
                    label: "Ozone Column",
                    value: round1(self.rng.random_range(280.0..340.0)),
                    unit: "DU",
                },
                CompositionReading {
                    label: "Nitrogen Dioxide Column",
                    value: round1(self.rng.random_range(1.0..8.0)),
                    unit: "×10¹⁵ molec/cm²",
                },
                CompositionReading {
                    label: "Formaldehyde Column",
                    value: round1(self.rng.random_range(4.0..16.0)),
                    unit: "×10¹⁵ molec/cm²",
                },
                CompositionReading {
                    label: "Aerosol Index",
                    value: round1(self.rng.random_range(0.0..2.5)),
                    unit: "UVAI",
                },
            ],
        }
    }

    fn aqi_trend(&mut self) -> Vec<TrendPoint> {
        // 緩やかなランダムウォーク。現在（TREND_NOW_INDEX）は実測と予測の両方を持ち、線が途切れない。
        let mut level = f64::from(self.rng.random_range(25..=60_i32));
        (0..24)
            .map(|hour| {
                level = (level + self.rng.random_range(-8.0..8.0)).clamp(5.0, 180.0);
                let value = level.round() as u32;
                TrendPoint {
                    time: format!("{hour:02}:00"),
                    aqi: (hour <= TREND_NOW_INDEX).then_some(value),
                    prediction: (hour >= TREND_NOW_INDEX).then_some(value),
                }
            })
            .collect()
    }

    fn live_at(&self, x: f64, y: f64) -> anyhow::Result<LiveTelemetry> {
        if !(0.0..=MAP_WIDTH).contains(&x) || !(0.0..=MAP_HEIGHT).contains(&y) {
            anyhow::bail!(
                "coordinates ({x}, {y}) are outside the map (0..={MAP_WIDTH}, 0..={MAP_HEIGHT})"
            );
        }

        // 座標から決定的にシードを作り、同じ地点では常に同じ値を返す
        let seed = ((x.round() as u64) << 32) | (y.round() as u64);
        let mut rng = StdRng::seed_from_u64(seed);

        // 地図中央付近ほど汚染が強い（都市部を想定）
        let dx = (x - MAP_WIDTH / 2.0) / (MAP_WIDTH / 2.0);
        let dy = (y - MAP_HEIGHT / 2.0) / (MAP_HEIGHT / 2.0);
        let urban = (1.0 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);

        let pm25 = round1(3.0 + urban * 45.0 + rng.random_range(0.0..8.0));
        let telemetry = LiveTelemetry {
            x,
            y,
            aqi: pm25_to_aqi(pm25),
            o2: ((20.95 - urban * 0.05 + rng.random_range(-0.02..0.02)) * 100.0).round() / 100.0,
            co: round1(100.0 + urban * 400.0 + rng.random_range(0.0..50.0)),
            so2: (rng.random_range(0.5..5.0) * (0.5 + urban) * 100.0).round() / 100.0,
            no2: round1(2.0 + urban * 30.0 + rng.random_range(0.0..5.0)),
            pm25,
        };

        debug!(x, y, aqi = telemetry.aqi, "Generated live telemetry for map point");
        Ok(telemetry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_generators_are_reproducible() {
        let mut a = MockTelemetry::seeded(42);
        let mut b = MockTelemetry::seeded(42);
        assert_eq!(a.weather(), b.weather());
        assert_eq!(a.air_quality("Oakland"), b.air_quality("Oakland"));
        assert_eq!(a.aqi_trend(), b.aqi_trend());
    }

    #[test]
    fn readings_stay_in_plausible_ranges() {
        let mut source = MockTelemetry::seeded(7);
        for _ in 0..50 {
            let weather = source.weather();
            assert!((55.0..=80.0).contains(&weather.temperature_f));
            assert!((30.0..=80.0).contains(&weather.humidity_pct));
            assert!((0.0..=15.0).contains(&weather.wind_speed_mph));
            assert!(CONDITIONS.contains(&weather.condition.as_str()));

            let aqi = source.air_quality("Golden Gate Park");
            assert_eq!(aqi.location, "Golden Gate Park");
            assert!((20.0..=60.0).contains(&aqi.ozone_ppb));
            assert!((5.0..=40.0).contains(&aqi.no2_ppb));
            assert!((3.0..=35.0).contains(&aqi.pm25_ug_m3));
        }
    }

    #[test]
    fn trend_splits_actual_and_prediction_at_now() {
        let trend = MockTelemetry::seeded(1).aqi_trend();
        assert_eq!(trend.len(), 24);
        assert_eq!(trend[0].time, "00:00");
        assert_eq!(trend[23].time, "23:00");

        let now = &trend[TREND_NOW_INDEX];
        assert!(now.aqi.is_some() && now.prediction.is_some());
        assert_eq!(now.aqi, now.prediction);
        assert!(trend[..TREND_NOW_INDEX].iter().all(|p| p.prediction.is_none()));
        assert!(trend[TREND_NOW_INDEX + 1..].iter().all(|p| p.aqi.is_none()));
    }

    #[test]
    fn atmosphere_has_four_readings() {
        let atmosphere = MockTelemetry::seeded(3).atmosphere();
        assert_eq!(atmosphere.readings.len(), 4);
        assert_eq!(atmosphere.readings[0].unit, "DU");
    }

    #[test]
    fn live_telemetry_is_deterministic_per_point() {
        let a = MockTelemetry::seeded(1).live_at(420.0, 250.0).unwrap();
        let b = MockTelemetry::seeded(99).live_at(420.0, 250.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.aqi, pm25_to_aqi(a.pm25));
    }

    #[test]
    fn city_center_is_more_polluted_than_corner() {
        let source = MockTelemetry::seeded(0);
        let center = source.live_at(500.0, 300.0).unwrap();
        let corner = source.live_at(0.0, 0.0).unwrap();
        assert!(center.pm25 > corner.pm25);
    }

    #[test]
    fn live_telemetry_rejects_points_outside_map() {
        let source = MockTelemetry::seeded(0);
        assert!(source.live_at(-1.0, 10.0).is_err());
        assert!(source.live_at(10.0, 601.0).is_err());
    }
}
