//! プロンプトと定数

use super::types::AnalysisRequest;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// 一貫性を優先した低めのサンプリング温度
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

pub const SYSTEM_PROMPT: &str = r#"You are Aether, an expert environmental health scientist and athletic performance coach.
You assess how current weather and air pollution affect strenuous outdoor exercise.
Always answer with a single JSON object that matches the provided schema. Do not add prose outside the JSON."#;

/// 分析リクエストからユーザープロンプトを組み立てる。
///
/// 入力だけで決まる純粋関数で、同じリクエストからは常にバイト単位で同じ文字列を返す。
pub fn build_prompt(request: &AnalysisRequest) -> String {
    let activity = request.activity().name().to_lowercase();
    let weather = request.weather();
    let aqi = request.air_quality();

    format!(
        "As an expert environmental health scientist and athletic performance coach named 'Aether', \
analyze the following data for a person planning to go {activity} in {location}.

Current Weather:
- Temperature: {temperature}°F
- Condition: {condition}
- Humidity: {humidity}%
- Wind: {wind} mph

Air Quality Data (in ppb for gases, µg/m³ for PM2.5):
- Ozone (O3): {ozone}
- Nitrogen Dioxide (NO2): {no2}
- Particulate Matter (PM2.5): {pm25}

Based on this data, provide a highly accurate and personalized 'Air Quality for Activity' (AQFA) analysis.
Your response must be in the required JSON format.
- The recommendations should be creative, specific to the location, and scientifically grounded.
- The AQFA score must heavily consider the physiological impact of these specific pollutants on strenuous activities like {activity}.
- The summary should be professional and actionable.",
        location = aqi.location,
        temperature = weather.temperature_f,
        condition = weather.condition,
        humidity = weather.humidity_pct,
        wind = weather.wind_speed_mph,
        ozone = aqi.ozone_ppb,
        no2 = aqi.no2_ppb,
        pm25 = aqi.pm25_ug_m3,
    )
}
