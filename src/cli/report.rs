//! ダッシュボードの描画
//!
//! すべて文字列を返すだけの関数で、端末への出力は呼び出し元が行う。

use std::fmt::Write;

use super::color::{bold_cyan, bold_white, by_score, cyan, dim, green, red, white, yellow};
use crate::ai::types::{AirQuality, AnalysisResponse, PollutantEffect, Recommendation, WeatherData};
use crate::alerts::AlertRule;
use crate::telemetry::aqi::{pm25_to_aqi, AqiCategory};
use crate::telemetry::{AtmosphericComposition, LiveTelemetry, TrendPoint, TREND_NOW_INDEX};

const GAUGE_CELLS: usize = 10;
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

fn section(title: &str) -> String {
    bold_cyan(&format!("── {title} "))
}

/// ヘッダー行。未ログイン時は "Guest"。
pub fn header(name: Option<&str>) -> String {
    let name = name.filter(|n| !n.trim().is_empty()).unwrap_or("Guest");
    bold_white(&format!("Welcome, Commander {name}! 👋"))
}

/// AQFA ゲージの塗りつぶしセル数（0〜10）
fn gauge_fill(score: f64) -> usize {
    if !score.is_finite() {
        return 0;
    }
    score.round().clamp(0.0, GAUGE_CELLS as f64) as usize
}

/// 10 セルの AQFA ゲージ。スコア帯に応じて色分けする。
pub fn gauge(score: f64) -> String {
    let filled = gauge_fill(score);
    let bar = format!(
        "{}{}",
        by_score(score, &"■".repeat(filled)),
        dim(&"□".repeat(GAUGE_CELLS - filled))
    );
    format!("{bar}  {} {}", by_score(score, &format!("{score:.1}")), white("AQFA"))
}

pub fn summary(response: &AnalysisResponse) -> String {
    format!(
        "{}\n{}",
        section("Aether's Analysis"),
        by_score(response.aqfa_score, &response.summary)
    )
}

/// 推奨アクティビティ枠の一覧
pub fn directives(recommendations: &[Recommendation]) -> String {
    let mut out = section("Activity Directives");
    if recommendations.is_empty() {
        let _ = write!(out, "\n  {}", dim("No directives for this window."));
        return out;
    }
    for rec in recommendations {
        let _ = write!(
            out,
            "\n  {:<10} {:<20} {:<24} {}",
            white(&rec.activity),
            yellow(&rec.time),
            cyan(&rec.location),
            by_score(rec.score, &format!("{:.1}", rec.score))
        );
    }
    out
}

/// 現地の気象と大気質のカード
pub fn local_telemetry(weather: &WeatherData, air_quality: &AirQuality) -> String {
    let aqi = pm25_to_aqi(air_quality.pm25_ug_m3);
    let category = AqiCategory::from_aqi(aqi);
    let mut out = section(&format!("Local Telemetry · {}", air_quality.location));
    let _ = write!(
        out,
        "\n  {} {}°F, {}   {} {}%   {} {} mph",
        dim("Weather"),
        white(&weather.temperature_f.to_string()),
        white(&weather.condition),
        dim("Humidity"),
        white(&weather.humidity_pct.to_string()),
        dim("Wind"),
        white(&weather.wind_speed_mph.to_string()),
    );
    let _ = write!(
        out,
        "\n  {} {} ppb   {} {} ppb   {} {} µg/m³",
        dim("O3"),
        white(&air_quality.ozone_ppb.to_string()),
        dim("NO2"),
        white(&air_quality.no2_ppb.to_string()),
        dim("PM2.5"),
        white(&air_quality.pm25_ug_m3.to_string()),
    );
    let _ = write!(
        out,
        "\n  {} {} {}",
        dim("AQI"),
        aqi_colored(aqi),
        dim(&format!("({})", category.label()))
    );
    out
}

fn aqi_colored(aqi: u32) -> String {
    let text = aqi.to_string();
    match AqiCategory::from_aqi(aqi) {
        AqiCategory::Good => green(&text),
        AqiCategory::Moderate => yellow(&text),
        _ => red(&text),
    }
}

/// 衛星観測相当の大気組成
pub fn atmosphere(composition: &AtmosphericComposition) -> String {
    let mut out = section("Atmospheric Composition");
    for reading in &composition.readings {
        let _ = write!(
            out,
            "\n  {:<26} {} {}",
            white(reading.label),
            cyan(&reading.value.to_string()),
            dim(reading.unit)
        );
    }
    out
}

/// 汚染物質ごとの影響評価
pub fn pollutants(effects: &[PollutantEffect]) -> String {
    let mut out = section("Pollutant Analysis");
    if effects.is_empty() {
        let _ = write!(out, "\n  {}", dim("No pollutant breakdown available."));
        return out;
    }
    for effect in effects {
        let level = match effect.level.to_lowercase().as_str() {
            "low" => green(&effect.level),
            "moderate" => yellow(&effect.level),
            _ => red(&effect.level),
        };
        let _ = write!(
            out,
            "\n  {:<8} {:<10} {}",
            white(&effect.pollutant),
            level,
            dim(&effect.effect)
        );
    }
    out
}

/// 24 時間トレンドのスパークライン（装飾なし）。
/// 各点は実測値、なければ予測値を使う。値のない点は空白。
pub fn sparkline(points: &[TrendPoint]) -> String {
    let values: Vec<Option<u32>> = points.iter().map(|p| p.aqi.or(p.prediction)).collect();
    let present: Vec<u32> = values.iter().flatten().copied().collect();
    let (Some(&min), Some(&max)) = (present.iter().min(), present.iter().max()) else {
        return " ".repeat(points.len());
    };

    values
        .iter()
        .map(|value| match value {
            None => ' ',
            Some(_) if max == min => SPARK_LEVELS[SPARK_LEVELS.len() / 2 - 1],
            Some(v) => {
                let ratio = f64::from(v - min) / f64::from(max - min);
                SPARK_LEVELS[(ratio * (SPARK_LEVELS.len() - 1) as f64).round() as usize]
            }
        })
        .collect()
}

/// "now" の位置を示すマーカー行
pub fn now_marker() -> String {
    format!("{}^ now", " ".repeat(TREND_NOW_INDEX))
}

/// 24 時間 AQI トレンド。現在までを実測色、以降を予測色で表示する。
pub fn trend(points: &[TrendPoint]) -> String {
    let line: Vec<char> = sparkline(points).chars().collect();
    let split = (TREND_NOW_INDEX + 1).min(line.len());
    let actual: String = line[..split].iter().collect();
    let predicted: String = line[split..].iter().collect();

    let current = points
        .get(TREND_NOW_INDEX)
        .and_then(|p| p.aqi.or(p.prediction));
    let peak = points.iter().filter_map(|p| p.prediction).max();

    let mut out = section("24h AQI Trend");
    let _ = write!(out, "\n  {}{}", cyan(&actual), yellow(&predicted));
    let _ = write!(out, "\n  {}", dim(&now_marker()));
    if let Some(current) = current {
        let _ = write!(out, "\n  {} {}", dim("Now"), aqi_colored(current));
    }
    if let Some(peak) = peak {
        let _ = write!(out, "   {} {}", dim("Forecast peak"), aqi_colored(peak));
    }
    out
}

/// 地図上の地点のライブテレメトリ
pub fn live_panel(telemetry: &LiveTelemetry) -> String {
    let category = AqiCategory::from_aqi(telemetry.aqi);
    let mut out = section(&format!(
        "Live Telemetry · ({}, {})",
        telemetry.x, telemetry.y
    ));
    let _ = write!(
        out,
        "\n  {} {} {}",
        dim("Region AQI"),
        aqi_colored(telemetry.aqi),
        dim(&format!("({})", category.label()))
    );
    let rows = [
        ("O2", telemetry.o2, "%"),
        ("CO", telemetry.co, "ppb"),
        ("SO2", telemetry.so2, "ppb"),
        ("NO2", telemetry.no2, "ppb"),
        ("PM2.5", telemetry.pm25, "µg/m³"),
    ];
    for (label, value, unit) in rows {
        let _ = write!(
            out,
            "\n  {:<6} {} {}",
            white(label),
            cyan(&value.to_string()),
            dim(unit)
        );
    }
    out
}

/// アラートルールの一覧。発火中のルールには印を付ける。
pub fn alerts(rules: &[AlertRule], firing: &[u32]) -> String {
    let mut out = section("Alerts");
    for rule in rules {
        let state = if rule.enabled {
            green("[on] ")
        } else {
            dim("[off]")
        };
        let mark = if firing.contains(&rule.id) {
            red(" ● firing")
        } else {
            String::new()
        };
        let _ = write!(
            out,
            "\n  {} {} {}{}\n        {}",
            white(&format!("{:>2}", rule.id)),
            state,
            bold_white(&rule.title),
            mark,
            dim(&rule.description)
        );
    }
    out
}

/// 分析結果全体（ゲージ・サマリー・推奨・汚染物質）
pub fn analysis(response: &AnalysisResponse) -> String {
    [
        gauge(response.aqfa_score),
        summary(response),
        directives(&response.recommendations),
        pollutants(&response.pollutant_breakdown),
    ]
    .join("\n\n")
}
