//! AQFA 分析の公開型定義
//!
//! 分析リクエスト（アクティビティ + 気象 + 大気質）と、
//! 生成サービスが返す分析結果の構造を定義する。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 屋外アクティビティの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum Activity {
    Running,
    Cycling,
    Hiking,
}

impl Activity {
    pub const ALL: [Activity; 3] = [Activity::Running, Activity::Cycling, Activity::Hiking];

    /// 表示名（"Running" 等）
    pub fn name(self) -> &'static str {
        match self {
            Activity::Running => "Running",
            Activity::Cycling => "Cycling",
            Activity::Hiking => "Hiking",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activity {
    type Err = anyhow::Error;

    /// 大文字小文字を区別せず、表示名と短縮形（run / cycle / bike / hike）を受け付ける。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "running" | "run" => Ok(Activity::Running),
            "cycling" | "cycle" | "bike" => Ok(Activity::Cycling),
            "hiking" | "hike" => Ok(Activity::Hiking),
            other => anyhow::bail!("unknown activity: {other} (expected running, cycling or hiking)"),
        }
    }
}

/// 気象データ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    /// 気温（°F）
    pub temperature_f: f64,
    pub condition: String,
    /// 湿度（%）
    pub humidity_pct: f64,
    /// 風速（mph）
    pub wind_speed_mph: f64,
}

/// 大気質データ。ガスは ppb、PM2.5 は µg/m³。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    pub location: String,
    pub ozone_ppb: f64,
    pub no2_ppb: f64,
    pub pm25_ug_m3: f64,
}

/// 1 回の評価に対応する分析リクエスト。
///
/// 構築後は変更できない。プロンプト文面はこの値だけで決まる。
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    activity: Activity,
    weather: WeatherData,
    air_quality: AirQuality,
}

impl AnalysisRequest {
    pub fn new(activity: Activity, weather: WeatherData, air_quality: AirQuality) -> Self {
        Self {
            activity,
            weather,
            air_quality,
        }
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn weather(&self) -> &WeatherData {
        &self.weather
    }

    pub fn air_quality(&self) -> &AirQuality {
        &self.air_quality
    }
}

/// 推奨アクティビティ枠
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub activity: String,
    /// 推奨時間帯（例: "6:00 AM - 8:00 AM"）。自由形式。
    pub time: String,
    pub location: String,
    pub score: f64,
}

/// 汚染物質ごとの影響評価
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutantEffect {
    pub pollutant: String,
    pub level: String,
    pub effect: String,
}

/// AQFA 分析結果。生成サービスの JSON とフォールバックの両方がこの形を取る。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    /// 1〜10 の AQFA スコア
    pub aqfa_score: f64,
    pub summary: String,
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub pollutant_breakdown: Vec<PollutantEffect>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_parses_names_and_aliases() {
        assert_eq!("Running".parse::<Activity>().unwrap(), Activity::Running);
        assert_eq!("run".parse::<Activity>().unwrap(), Activity::Running);
        assert_eq!("BIKE".parse::<Activity>().unwrap(), Activity::Cycling);
        assert_eq!(" hike ".parse::<Activity>().unwrap(), Activity::Hiking);
    }

    #[test]
    fn activity_rejects_unknown_name() {
        let err = "swimming".parse::<Activity>().unwrap_err();
        assert!(err.to_string().contains("swimming"));
    }

    #[test]
    fn activity_display_matches_name() {
        for activity in Activity::ALL {
            assert_eq!(activity.to_string(), activity.name());
        }
    }

    #[test]
    fn response_serializes_in_camel_case() {
        let response = AnalysisResponse {
            aqfa_score: 9.0,
            summary: "Great day".to_string(),
            recommendations: vec![],
            pollutant_breakdown: vec![],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["aqfaScore"], 9.0);
        assert!(json["pollutantBreakdown"].is_array());
    }

    #[test]
    fn response_tolerates_missing_pollutant_breakdown() {
        let json = r#"{"aqfaScore": 6, "summary": "ok", "recommendations": []}"#;
        let response: AnalysisResponse = serde_json::from_str(json).unwrap();
        assert!(response.pollutant_breakdown.is_empty());
    }
}
