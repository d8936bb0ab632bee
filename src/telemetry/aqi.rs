//! US EPA 大気質指数（AQI）の計算とカテゴリ分け

/// PM2.5（µg/m³, 24 時間平均）の EPA ブレークポイント。
/// (濃度下限, 濃度上限, AQI 下限, AQI 上限)
const PM25_BREAKPOINTS: [(f64, f64, u32, u32); 7] = [
    (0.0, 9.0, 0, 50),
    (9.1, 35.4, 51, 100),
    (35.5, 55.4, 101, 150),
    (55.5, 125.4, 151, 200),
    (125.5, 225.4, 201, 300),
    (225.5, 325.4, 301, 400),
    (325.5, 500.4, 401, 500),
];

/// PM2.5 濃度を AQI に換算する。
///
/// 濃度は小数第 1 位で切り捨ててから線形補間する。範囲外は 500 で頭打ち。
pub fn pm25_to_aqi(concentration: f64) -> u32 {
    if !concentration.is_finite() || concentration <= 0.0 {
        return 0;
    }
    let c = (concentration * 10.0).floor() / 10.0;

    for (c_lo, c_hi, i_lo, i_hi) in PM25_BREAKPOINTS {
        if c <= c_hi {
            // ブレークポイント間の隙間（例: 9.05）は上側の区間に含める
            let c = c.max(c_lo);
            let aqi = (f64::from(i_hi - i_lo) / (c_hi - c_lo)) * (c - c_lo) + f64::from(i_lo);
            return aqi.round() as u32;
        }
    }
    500
}

/// AQI のカテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn from_aqi(aqi: u32) -> Self {
        match aqi {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthyForSensitiveGroups,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_concentration_is_zero() {
        assert_eq!(pm25_to_aqi(0.0), 0);
        assert_eq!(pm25_to_aqi(-3.0), 0);
        assert_eq!(pm25_to_aqi(f64::NAN), 0);
    }

    #[test]
    fn breakpoint_edges_map_to_band_edges() {
        assert_eq!(pm25_to_aqi(9.0), 50);
        assert_eq!(pm25_to_aqi(9.1), 51);
        assert_eq!(pm25_to_aqi(35.4), 100);
        assert_eq!(pm25_to_aqi(35.5), 101);
        assert_eq!(pm25_to_aqi(55.4), 150);
        assert_eq!(pm25_to_aqi(125.4), 200);
    }

    #[test]
    fn interpolates_within_band() {
        // 8.0 µg/m³ → 50/9 * 8 ≒ 44.4
        assert_eq!(pm25_to_aqi(8.0), 44);
        // 切り捨て: 9.08 は 9.0 として扱う
        assert_eq!(pm25_to_aqi(9.08), 50);
    }

    #[test]
    fn extreme_concentration_is_capped() {
        assert_eq!(pm25_to_aqi(900.0), 500);
    }

    #[test]
    fn categories_follow_band_edges() {
        assert_eq!(AqiCategory::from_aqi(0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(50), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(51), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_aqi(150), AqiCategory::UnhealthyForSensitiveGroups);
        assert_eq!(AqiCategory::from_aqi(200), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::from_aqi(300), AqiCategory::VeryUnhealthy);
        assert_eq!(AqiCategory::from_aqi(301), AqiCategory::Hazardous);
        assert_eq!(AqiCategory::Hazardous.label(), "Hazardous");
    }
}
