//! テレメトリ（気象・大気質・大気組成）の供給元
//!
//! 分析パイプラインへの入力を提供する。現状はモックのみだが、
//! センサーや外部 API に差し替えられるよう `TelemetrySource` トレイトで抽象化する。

pub mod aqi;
mod mock;

use serde::Serialize;

use crate::ai::types::{AirQuality, WeatherData};

pub use mock::MockTelemetry;

/// 地図の幅（座標系の x 範囲）
pub const MAP_WIDTH: f64 = 1000.0;
/// 地図の高さ（座標系の y 範囲）
pub const MAP_HEIGHT: f64 = 600.0;

/// 24 時間トレンドのうち「現在」を示すインデックス
pub const TREND_NOW_INDEX: usize = 18;

/// 衛星観測による大気組成の 1 項目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionReading {
    pub label: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

/// 大気組成（衛星データ相当）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtmosphericComposition {
    pub readings: Vec<CompositionReading>,
}

/// 24 時間 AQI トレンドの 1 点。現在までは実測値、現在以降は予測値を持つ。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// "HH:00" 形式の時刻
    pub time: String,
    pub aqi: Option<u32>,
    pub prediction: Option<u32>,
}

/// 地図上の任意地点のライブテレメトリ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveTelemetry {
    pub x: f64,
    pub y: f64,
    pub aqi: u32,
    /// 酸素濃度（%）
    pub o2: f64,
    /// 一酸化炭素（ppb）
    pub co: f64,
    /// 二酸化硫黄（ppb）
    pub so2: f64,
    /// 二酸化窒素（ppb）
    pub no2: f64,
    /// PM2.5（µg/m³）
    pub pm25: f64,
}

/// テレメトリの供給元
pub trait TelemetrySource {
    fn weather(&mut self) -> WeatherData;

    /// 指定地点の大気質を返す
    fn air_quality(&mut self, location: &str) -> AirQuality;

    fn atmosphere(&mut self) -> AtmosphericComposition;

    fn aqi_trend(&mut self) -> Vec<TrendPoint>;

    /// 地図座標 (x, y) の地点のテレメトリ。座標ごとに決定的な値を返す。
    fn live_at(&self, x: f64, y: f64) -> anyhow::Result<LiveTelemetry>;
}
