//! 生成サービスクライアント — AQFA Oracle
//!
//! プロンプトとスキーマを外部の大規模言語モデル API に送り、生の応答テキストを返す。
//! 応答の検証は行わない（`pipeline` の責務）。

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use serde_json::Value;
use tracing::{debug, info};

use super::error::AnalysisError;
use super::prompts::SYSTEM_PROMPT;
use super::schema::response_format;
use crate::config::AiConfig;

/// 生成サービスへの 1 回分のリクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub response_schema: Value,
    pub temperature: f32,
}

/// 外部生成サービスの RPC 境界。
///
/// 成功時は JSON であることが期待される生テキストを返す。
/// 通信・認証・クォータのエラーは `AnalysisError` で通知する。
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AnalysisError>;

    /// ログ表示用の名前
    fn name(&self) -> &str;
}

/// OpenAI 互換のチャット補完 API を使う生成サービス
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
}

impl OpenAiGenerator {
    /// 明示的に渡された API キーと `[ai]` 設定からクライアントを構築する。
    pub fn new(config: &AiConfig, api_key: &str) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(ref base_url) = config.base_url {
            info!(base_url = %base_url, "Using custom generation endpoint");
            openai_config = openai_config.with_api_base(base_url);
        }
        // 429 でも再送しない。evaluate 1 回につき送信は 1 回だけ。
        let single_attempt = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();
        Self {
            client: Client::with_config(openai_config).with_backoff(single_attempt),
        }
    }

    fn build_request(request: &GenerationRequest) -> CreateChatCompletionRequest {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(SYSTEM_PROMPT.to_string()),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(request.prompt.clone()),
                name: None,
            }),
        ];

        CreateChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: Some(request.temperature),
            response_format: Some(response_format(&request.response_schema)),
            ..Default::default()
        }
    }

    /// async-openai のエラーをパイプラインのエラー分類に変換する
    fn classify_error(error: OpenAIError) -> AnalysisError {
        match error {
            OpenAIError::Reqwest(e) => AnalysisError::Transport(e.to_string()),
            OpenAIError::ApiError(api) => {
                let code = api.code.clone().unwrap_or_default();
                let message = api.message.clone();
                let lowered = message.to_lowercase();
                if code == "invalid_api_key"
                    || lowered.contains("api key")
                    || lowered.contains("unauthorized")
                    || lowered.contains("authentication")
                {
                    AnalysisError::Auth(message)
                } else if code.is_empty() {
                    AnalysisError::Service(message)
                } else {
                    AnalysisError::Service(format!("{code}: {message}"))
                }
            }
            OpenAIError::JSONDeserialize(e) => {
                AnalysisError::Service(format!("failed to decode response envelope: {e}"))
            }
            other => AnalysisError::Service(other.to_string()),
        }
    }
}

#[async_trait]
impl GenerationService for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AnalysisError> {
        let chat_request = Self::build_request(request);

        debug!(
            model = %request.model,
            temperature = request.temperature,
            prompt_length = request.prompt.len(),
            "Sending generation request"
        );

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(Self::classify_error)?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AnalysisError::Parse(format!(
                "model '{}' returned no content",
                request.model
            )));
        }

        debug!(
            content_length = content.len(),
            choices = response.choices.len(),
            "Generation response received"
        );

        Ok(content)
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}

/// 認証情報がない場合の生成サービス。常に認証エラーを返し、
/// パイプラインをフォールバック経路へ誘導する。
pub struct UnconfiguredGenerator;

#[async_trait]
impl GenerationService for UnconfiguredGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, AnalysisError> {
        Err(AnalysisError::Auth("no API key configured".to_string()))
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::schema::response_schema;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_openai::error::ApiError;
    use async_openai::types::ResponseFormat;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use crate::ai::pipeline::AnalysisPipeline;
    use crate::ai::types::{Activity, AirQuality, AnalysisRequest, WeatherData};

    fn sample_request() -> GenerationRequest {
        GenerationRequest {
            model: "gpt-4o-mini".to_string(),
            prompt: "analyze".to_string(),
            response_schema: response_schema(),
            temperature: 0.5,
        }
    }

    fn api_error(message: &str, code: Option<&str>) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: message.to_string(),
            r#type: None,
            param: None,
            code: code.map(str::to_string),
        })
    }

    #[test]
    fn build_request_carries_model_temperature_and_schema() {
        let chat = OpenAiGenerator::build_request(&sample_request());
        assert_eq!(chat.model, "gpt-4o-mini");
        assert_eq!(chat.temperature, Some(0.5));
        assert_eq!(chat.messages.len(), 2);
        assert!(matches!(
            chat.response_format,
            Some(ResponseFormat::JsonSchema { .. })
        ));
    }

    #[test]
    fn invalid_key_is_classified_as_auth() {
        let err = OpenAiGenerator::classify_error(api_error(
            "Incorrect API key provided",
            Some("invalid_api_key"),
        ));
        assert_eq!(err.kind(), "auth");
    }

    #[test]
    fn quota_error_is_classified_as_service() {
        let err = OpenAiGenerator::classify_error(api_error(
            "You exceeded your current quota",
            Some("insufficient_quota"),
        ));
        assert_eq!(err.kind(), "service");
        assert!(err.to_string().contains("insufficient_quota"));
    }

    #[test]
    fn envelope_decode_failure_is_service_error() {
        let decode = serde_json::from_str::<Value>("not json").unwrap_err();
        let err = OpenAiGenerator::classify_error(OpenAIError::JSONDeserialize(decode));
        assert_eq!(err.kind(), "service");
    }

    #[tokio::test]
    async fn unconfigured_generator_fails_with_auth() {
        let err = UnconfiguredGenerator
            .generate(&sample_request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "auth");
    }

    const RATE_LIMITED: &str = r#"{"error":{"message":"Rate limit reached for requests","type":"requests","param":null,"code":"rate_limit_exceeded"}}"#;

    /// 同じ応答を返し続けるローカルエンドポイントを起動する。
    /// 戻り値はベース URL と受信したリクエスト数。
    async fn serve_fixed(status: &'static str, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    read_request(&mut socket).await;
                    counter.fetch_add(1, Ordering::SeqCst);
                    let response = format!(
                        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{addr}/v1"), hits)
    }

    /// ヘッダーと Content-Length 分の本文を読み切る
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return;
            }
        }
    }

    fn generator_for(base_url: String) -> OpenAiGenerator {
        let config = AiConfig {
            base_url: Some(base_url),
            ..AiConfig::default()
        };
        OpenAiGenerator::new(&config, "sk-test")
    }

    fn park_request() -> AnalysisRequest {
        AnalysisRequest::new(
            Activity::Cycling,
            WeatherData {
                temperature_f: 71.0,
                condition: "Sunny".to_string(),
                humidity_pct: 35.0,
                wind_speed_mph: 8.0,
            },
            AirQuality {
                location: "Presidio".to_string(),
                ozone_ppb: 42.0,
                no2_ppb: 12.0,
                pm25_ug_m3: 9.5,
            },
        )
    }

    #[tokio::test]
    async fn message_content_is_returned_verbatim() {
        let (url, hits) = serve_fixed(
            "200 OK",
            r#"{"id":"chatcmpl-1","object":"chat.completion","created":0,"model":"gpt-4o-mini","choices":[{"index":0,"message":{"role":"assistant","content":"{\"aqfaScore\":7}"},"finish_reason":"stop"}]}"#,
        )
        .await;
        let content = generator_for(url).generate(&sample_request()).await.unwrap();
        assert_eq!(content, r#"{"aqfaScore":7}"#);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn null_content_is_parse_error() {
        let (url, _hits) = serve_fixed(
            "200 OK",
            r#"{"id":"chatcmpl-1","object":"chat.completion","created":0,"model":"gpt-4o-mini","choices":[{"index":0,"message":{"role":"assistant","content":null},"finish_reason":"stop"}]}"#,
        )
        .await;
        let err = generator_for(url).generate(&sample_request()).await.unwrap_err();
        assert_eq!(err.kind(), "parse");
        assert!(err.to_string().contains("returned no content"));
    }

    #[tokio::test]
    async fn rejected_key_reply_is_auth_error() {
        let (url, _hits) = serve_fixed(
            "401 Unauthorized",
            r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","param":null,"code":"invalid_api_key"}}"#,
        )
        .await;
        let err = generator_for(url).generate(&sample_request()).await.unwrap_err();
        assert_eq!(err.kind(), "auth");
    }

    #[tokio::test]
    async fn rate_limit_reply_fails_after_one_request() {
        let (url, hits) = serve_fixed("429 Too Many Requests", RATE_LIMITED).await;
        let err = generator_for(url).generate(&sample_request()).await.unwrap_err();
        assert_eq!(err.kind(), "service");
        assert!(err.to_string().contains("rate_limit_exceeded"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_quota_reply_is_service_error() {
        let (url, hits) = serve_fixed(
            "429 Too Many Requests",
            r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","param":null,"code":"insufficient_quota"}}"#,
        )
        .await;
        let err = generator_for(url).generate(&sample_request()).await.unwrap_err();
        assert_eq!(err.kind(), "service");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rate_limited_evaluation_is_not_reported_as_timeout() {
        let (url, hits) = serve_fixed("429 Too Many Requests", RATE_LIMITED).await;
        let config = AiConfig {
            base_url: Some(url),
            timeout_secs: 4,
            ..AiConfig::default()
        };
        let pipeline = AnalysisPipeline::new(
            Arc::new(OpenAiGenerator::new(&config, "sk-test")),
            &config,
        );

        let err = pipeline.try_evaluate(&park_request()).await.unwrap_err();
        assert_eq!(err.kind(), "service");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
