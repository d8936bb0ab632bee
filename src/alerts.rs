//! アラートルール
//!
//! 大気質や AQFA スコアに対するしきい値ルールを管理し、現在の値で発火するルールを判定する。

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::ai::types::AirQuality;
use crate::telemetry::aqi::pm25_to_aqi;

/// アラートの発火条件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "threshold", rename_all = "snake_case")]
pub enum AlertCondition {
    /// PM2.5 から算出した AQI がしきい値を超える
    AqiAbove(u32),
    /// オゾン濃度（ppb）がしきい値を超える
    OzoneAbove(f64),
    /// PM2.5（µg/m³）がしきい値を超える
    Pm25Above(f64),
    /// AQFA スコアがしきい値以上（好条件の通知）
    AqfaAtLeast(f64),
}

impl AlertCondition {
    fn holds(&self, air_quality: &AirQuality, aqfa_score: Option<f64>) -> bool {
        match *self {
            AlertCondition::AqiAbove(limit) => pm25_to_aqi(air_quality.pm25_ug_m3) > limit,
            AlertCondition::OzoneAbove(limit) => air_quality.ozone_ppb > limit,
            AlertCondition::Pm25Above(limit) => air_quality.pm25_ug_m3 > limit,
            AlertCondition::AqfaAtLeast(min) => aqfa_score.is_some_and(|score| score >= min),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub enabled: bool,
    pub condition: AlertCondition,
}

/// 初期状態のアラートルール
pub fn default_rules() -> Vec<AlertRule> {
    vec![
        AlertRule {
            id: 1,
            title: "High AQI Warning".to_string(),
            description: "Notify when the regional AQI rises above 100.".to_string(),
            enabled: true,
            condition: AlertCondition::AqiAbove(100),
        },
        AlertRule {
            id: 2,
            title: "Ozone Spike".to_string(),
            description: "Notify when ground-level ozone exceeds 50 ppb.".to_string(),
            enabled: true,
            condition: AlertCondition::OzoneAbove(50.0),
        },
        AlertRule {
            id: 3,
            title: "PM2.5 Advisory".to_string(),
            description: "Notify when fine particulates exceed 25 µg/m³.".to_string(),
            enabled: true,
            condition: AlertCondition::Pm25Above(25.0),
        },
        AlertRule {
            id: 4,
            title: "Optimal Activity Window".to_string(),
            description: "Notify when the AQFA score for your activity reaches 8 or higher."
                .to_string(),
            enabled: false,
            condition: AlertCondition::AqfaAtLeast(8.0),
        },
    ]
}

/// 指定 ID のルールの有効/無効を切り替え、切り替え後の状態を返す。
pub fn toggle(rules: &mut [AlertRule], id: u32) -> Result<bool> {
    let rule = rules
        .iter_mut()
        .find(|rule| rule.id == id)
        .ok_or_else(|| anyhow::anyhow!("no alert rule with id {id}"))?;
    rule.enabled = !rule.enabled;
    Ok(rule.enabled)
}

/// 有効なルールのうち、現在の値で条件を満たすものを返す。
pub fn evaluate_rules<'a>(
    rules: &'a [AlertRule],
    air_quality: &AirQuality,
    aqfa_score: Option<f64>,
) -> Vec<&'a AlertRule> {
    rules
        .iter()
        .filter(|rule| rule.enabled && rule.condition.holds(air_quality, aqfa_score))
        .collect()
}
