//! AQFA 分析パイプライン
//!
//! プロンプト構築 → スキーマ付き生成呼び出し → 検証 → フォールバック。
//! `evaluate` は決して失敗せず、常に構造的に正しい `AnalysisResponse` を返す。

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::client::{GenerationRequest, GenerationService};
use super::error::AnalysisError;
use super::prompts::build_prompt;
use super::schema::response_schema;
use super::types::{AnalysisRequest, AnalysisResponse, PollutantEffect, Recommendation};
use crate::config::AiConfig;

pub struct AnalysisPipeline {
    service: Arc<dyn GenerationService>,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl AnalysisPipeline {
    pub fn new(service: Arc<dyn GenerationService>, config: &AiConfig) -> Self {
        Self {
            service,
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// リクエストを評価する。どの段階で失敗してもフォールバック応答を返す。
    pub async fn evaluate(&self, request: &AnalysisRequest) -> AnalysisResponse {
        match self.try_evaluate(request).await {
            Ok(response) => {
                info!(
                    activity = %request.activity(),
                    location = %request.air_quality().location,
                    aqfa_score = response.aqfa_score,
                    recommendations = response.recommendations.len(),
                    "AQFA analysis completed"
                );
                response
            }
            Err(e) => {
                warn!(
                    error = %e,
                    kind = e.kind(),
                    service = self.service.name(),
                    activity = %request.activity(),
                    "AQFA analysis failed, using fallback response"
                );
                fallback_response()
            }
        }
    }

    /// `evaluate` と同じ手順を実行し、失敗理由をそのまま返す。
    pub async fn try_evaluate(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResponse, AnalysisError> {
        let generation = GenerationRequest {
            model: self.model.clone(),
            prompt: build_prompt(request),
            response_schema: response_schema(),
            temperature: self.temperature,
        };

        debug!(
            model = %generation.model,
            service = self.service.name(),
            timeout_secs = self.timeout.as_secs(),
            "Invoking generation service"
        );

        let raw = tokio::time::timeout(self.timeout, self.service.generate(&generation))
            .await
            .map_err(|_| AnalysisError::Timeout(self.timeout.as_secs()))??;

        parse_response(&raw)
    }
}

/// 生の応答テキストを検証し、型付きの分析結果に変換する。
///
/// 検証するのは `aqfaScore`（数値）、`summary`（空でない文字列）、
/// `recommendations`（配列）の 3 つ。入れ子の要素は型付きデシリアライズで確認する。
///
/// 型付きデシリアライズは未知のトップレベルキーを捨てる。入力がそのまま
/// 返るのはスキーマどおりのキーだけを持つペイロードに限られる。
pub fn parse_response(raw: &str) -> Result<AnalysisResponse, AnalysisError> {
    let text = strip_code_fence(raw.trim());

    let value: Value =
        serde_json::from_str(text).map_err(|e| AnalysisError::Parse(e.to_string()))?;

    validate_shape(&value)?;

    serde_json::from_value(value).map_err(|e| AnalysisError::SchemaViolation(e.to_string()))
}

/// 必須 3 フィールドの存在と型を確認する
pub fn validate_shape(value: &Value) -> Result<(), AnalysisError> {
    let object = value
        .as_object()
        .ok_or_else(|| AnalysisError::SchemaViolation("top-level value is not an object".into()))?;

    match object.get("aqfaScore") {
        Some(score) if score.is_number() => {}
        Some(_) => return Err(AnalysisError::SchemaViolation("aqfaScore is not a number".into())),
        None => return Err(AnalysisError::SchemaViolation("aqfaScore is missing".into())),
    }

    match object.get("summary").and_then(Value::as_str) {
        Some(summary) if !summary.trim().is_empty() => {}
        _ => {
            return Err(AnalysisError::SchemaViolation(
                "summary is missing or empty".into(),
            ))
        }
    }

    if !object.get("recommendations").is_some_and(Value::is_array) {
        return Err(AnalysisError::SchemaViolation(
            "recommendations is not an array".into(),
        ));
    }

    Ok(())
}

/// ```json ... ``` で囲まれた応答から中身を取り出す。囲みがなければそのまま返す。
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // 言語タグ（"json" 等）の行を読み飛ばす
    match body.split_once('\n') {
        Some((tag, inner)) if !tag.trim().starts_with('{') => inner.trim(),
        _ => body.trim(),
    }
}

/// 生成サービスが使えないときの固定応答。入力に依存しない。
pub fn fallback_response() -> AnalysisResponse {
    AnalysisResponse {
        aqfa_score: 7.5,
        summary: "Demo mode: Air quality conditions are favorable for outdoor activities."
            .to_string(),
        recommendations: vec![
            Recommendation {
                activity: "Running".to_string(),
                time: "6:00 AM - 8:00 AM".to_string(),
                location: "Golden Gate Park".to_string(),
                score: 8.2,
            },
            Recommendation {
                activity: "Cycling".to_string(),
                time: "5:00 PM - 7:00 PM".to_string(),
                location: "Embarcadero Trail".to_string(),
                score: 7.8,
            },
        ],
        pollutant_breakdown: vec![
            PollutantEffect {
                pollutant: "Ozone".to_string(),
                level: "Low".to_string(),
                effect: "Minimal impact on respiratory function.".to_string(),
            },
            PollutantEffect {
                pollutant: "PM2.5".to_string(),
                level: "Moderate".to_string(),
                effect: "Slight reduction in lung capacity during intense exercise.".to_string(),
            },
            PollutantEffect {
                pollutant: "NO2".to_string(),
                level: "Low".to_string(),
                effect: "No significant impact on performance.".to_string(),
            },
        ],
    }
}
