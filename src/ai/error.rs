//! 分析パイプラインのエラー分類
//!
//! どのエラーも `AnalysisPipeline::evaluate` の境界で捕捉され、
//! フォールバック応答に置き換えられる。呼び出し元には伝播しない。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// 生成サービスへの接続・通信の失敗
    #[error("transport error: {0}")]
    Transport(String),

    /// 設定されたタイムアウト内に応答がなかった
    #[error("generation timed out after {0} seconds")]
    Timeout(u64),

    /// 認証情報が未設定、または無効
    #[error("authentication error: {0}")]
    Auth(String),

    /// クォータ超過などサービス側が返したエラー
    #[error("generation service error: {0}")]
    Service(String),

    /// 応答テキストが JSON として解釈できない
    #[error("response is not valid JSON: {0}")]
    Parse(String),

    /// JSON だが必須フィールドの欠落・型不一致がある
    #[error("response does not match the schema: {0}")]
    SchemaViolation(String),
}

impl AnalysisError {
    /// 構造化ログ用の安定したラベル
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Transport(_) => "transport",
            AnalysisError::Timeout(_) => "timeout",
            AnalysisError::Auth(_) => "auth",
            AnalysisError::Service(_) => "service",
            AnalysisError::Parse(_) => "parse",
            AnalysisError::SchemaViolation(_) => "schema_violation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels_are_distinct() {
        let errors = [
            AnalysisError::Transport("x".into()),
            AnalysisError::Timeout(30),
            AnalysisError::Auth("x".into()),
            AnalysisError::Service("x".into()),
            AnalysisError::Parse("x".into()),
            AnalysisError::SchemaViolation("x".into()),
        ];
        let mut kinds: Vec<_> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn display_includes_detail() {
        let err = AnalysisError::SchemaViolation("aqfaScore is missing".into());
        assert!(err.to_string().contains("aqfaScore is missing"));
        assert_eq!(AnalysisError::Timeout(5).to_string(), "generation timed out after 5 seconds");
    }
}
