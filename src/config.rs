//! 設定ファイル管理
//!
//! `~/.config/aetherfit/config.toml` から TOML 形式の設定を読み込む。
//! ファイルが存在しない場合はテンプレートを生成し、デフォルト値を使用する。
//!
//! # 設定ファイル例
//!
//! ```toml
//! [ai]
//! model = "gpt-4o-mini"
//! temperature = 0.5
//! timeout_secs = 30
//! base_url = "https://generativelanguage.googleapis.com/v1beta/openai"
//!
//! [dashboard]
//! debounce_ms = 0
//! default_location = "San Francisco"
//! ```
//!
//! API キーは設定ファイルには書かず、起動時に環境変数から渡す。

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::ai::prompts::{DEFAULT_MODEL, DEFAULT_TEMPERATURE};

/// AetherFit の設定全体
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AetherfitConfig {
    /// 生成サービス関連設定
    pub ai: AiConfig,
    /// ダッシュボード関連設定
    pub dashboard: DashboardConfig,
}

/// 生成サービス関連の設定
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    /// 使用するモデル名
    pub model: String,
    /// サンプリング温度（0.0〜2.0）
    pub temperature: f32,
    /// 1 回の生成呼び出しのタイムアウト（秒）
    pub timeout_secs: u64,
    /// OpenAI 互換エンドポイントのベース URL。未指定なら OpenAI を使う。
    pub base_url: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: 30,
            base_url: None,
        }
    }
}

/// ダッシュボード関連の設定
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// 分析を開始するまでの待ち時間（ミリ秒）。
    /// 対話ループは分析ごとに完了を待つため、既定は 0（即時開始）。
    pub debounce_ms: u64,
    /// ログインしていない場合に使う地点名
    pub default_location: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 0,
            default_location: "San Francisco".to_string(),
        }
    }
}

impl AetherfitConfig {
    /// 設定ファイルを読み込む。
    ///
    /// `~/.config/aetherfit/config.toml` が存在すればパースし、
    /// 存在しなければテンプレートを生成してデフォルト値を返す。
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            Self::create_default_config(&path);
            return Self::default();
        }
        Self::load_from(&path)
    }

    /// 指定パスから設定を読み込む。読み込み・パースに失敗した場合は警告を出してデフォルト値を返す。
    pub fn load_from(path: &Path) -> Self {
        debug!(path = %path.display(), "Loading config file");

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read config file");
                eprintln!("aetherfit: warning: failed to read config file: {e}");
                return Self::default();
            }
        };

        match toml::from_str::<AetherfitConfig>(&content) {
            Ok(config) => {
                let config = config.sanitized();
                info!(
                    path = %path.display(),
                    model = %config.ai.model,
                    temperature = config.ai.temperature,
                    timeout_secs = config.ai.timeout_secs,
                    custom_endpoint = config.ai.base_url.is_some(),
                    debounce_ms = config.dashboard.debounce_ms,
                    "Config loaded successfully"
                );
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse config file");
                eprintln!("aetherfit: warning: failed to parse config file: {e}");
                Self::default()
            }
        }
    }

    /// 範囲外の値をデフォルトに戻す。
    fn sanitized(mut self) -> Self {
        let defaults = AiConfig::default();
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            warn!(
                temperature = self.ai.temperature,
                "Temperature must be between 0.0 and 2.0, using default"
            );
            self.ai.temperature = defaults.temperature;
        }
        if self.ai.timeout_secs == 0 {
            warn!("timeout_secs must be positive, using default");
            self.ai.timeout_secs = defaults.timeout_secs;
        }
        if self.ai.model.trim().is_empty() {
            warn!("Empty model name in config, using default");
            self.ai.model = defaults.model;
        }
        if self
            .ai
            .base_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            self.ai.base_url = None;
        }
        self
    }

    /// 設定ファイルのパスを返す。
    ///
    /// `$HOME` が取得できない場合は `./.config/aetherfit/config.toml` にフォールバックする。
    pub fn config_path() -> PathBuf {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".config/aetherfit/config.toml")
    }

    /// 設定ファイルが存在しない場合にテンプレートから生成する。
    ///
    /// 生成に失敗した場合は警告を表示するが、起動は継続する。
    fn create_default_config(path: &Path) {
        const TEMPLATE: &str = r#"# AetherFit configuration
#
# The API key is read from AETHERFIT_API_KEY (or OPENAI_API_KEY), not from this file.

[ai]
# model = "gpt-4o-mini"
# temperature = 0.5
# timeout_secs = 30
# base_url = "https://generativelanguage.googleapis.com/v1beta/openai"

[dashboard]
# debounce_ms = 0
# default_location = "San Francisco"
"#;

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "Failed to create config directory");
                eprintln!("aetherfit: warning: failed to create config directory: {e}");
                return;
            }
        }

        match std::fs::write(path, TEMPLATE) {
            Ok(()) => {
                info!(path = %path.display(), "Created default config file");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to create default config file");
                eprintln!("aetherfit: warning: failed to create config file: {e}");
            }
        }
    }
}
