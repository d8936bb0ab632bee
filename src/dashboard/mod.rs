//! Dashboard モジュール — 対話ループとダッシュボード状態管理
//!
//! `Dashboard` 構造体に状態を集約し、エディタ構築、コマンド解析、
//! 入力ハンドリング、分析の世代管理をサブモジュールに分離する。

pub mod command;
pub mod coordinator;
mod editor;
mod input;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reedline::{Reedline, Signal};
use tracing::{info, warn};

use crate::ai::pipeline::AnalysisPipeline;
use crate::ai::types::{Activity, AirQuality};
use crate::alerts::{default_rules, AlertRule};
use crate::cli::prompt::{AetherPrompt, PromptState};
use crate::config::DashboardConfig;
use crate::storage::{SessionStore, UserProfile};
use crate::telemetry::TelemetrySource;

use coordinator::AnalysisCoordinator;

const HISTORY_FILE: &str = "history.txt";

/// ダッシュボードの状態を管理する構造体。
pub struct Dashboard {
    editor: Reedline,
    prompt: AetherPrompt,
    prompt_state: Arc<RwLock<PromptState>>,
    coordinator: AnalysisCoordinator,
    telemetry: Box<dyn TelemetrySource>,
    store: Option<SessionStore>,
    profile: Option<UserProfile>,
    rules: Vec<AlertRule>,
    activity: Activity,
    location: String,
    /// 直近の分析で使った大気質（アラート評価用）
    last_air_quality: Option<AirQuality>,
    last_score: Option<f64>,
}

impl Dashboard {
    /// 新しい Dashboard を作成する。
    ///
    /// ログイン中のユーザーがいれば、その地点と主なアクティビティを初期値に使う。
    pub fn new(
        pipeline: Arc<AnalysisPipeline>,
        telemetry: Box<dyn TelemetrySource>,
        store: Option<SessionStore>,
        config: &DashboardConfig,
    ) -> Self {
        let profile = store.as_ref().and_then(|s| match s.current() {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "Failed to read session, continuing as guest");
                None
            }
        });

        let rules = store
            .as_ref()
            .map(|s| {
                s.load_alert_rules().unwrap_or_else(|e| {
                    warn!(error = %e, "Failed to load alert rules, using defaults");
                    default_rules()
                })
            })
            .unwrap_or_else(default_rules);

        let activity = profile
            .as_ref()
            .map(|p| p.primary_activity)
            .unwrap_or(Activity::Running);
        let location = profile
            .as_ref()
            .map(|p| p.location.clone())
            .unwrap_or_else(|| config.default_location.clone());

        let prompt_state = Arc::new(RwLock::new(PromptState {
            activity,
            location: location.clone(),
            last_score: None,
        }));

        let history_path = store.as_ref().map(|s| s.dir().join(HISTORY_FILE));

        Self {
            editor: editor::build_editor(history_path),
            prompt: AetherPrompt::new(Arc::clone(&prompt_state)),
            prompt_state,
            coordinator: AnalysisCoordinator::new(
                pipeline,
                Duration::from_millis(config.debounce_ms),
            ),
            telemetry,
            store,
            profile,
            rules,
            activity,
            location,
            last_air_quality: None,
            last_score: None,
        }
    }

    /// REPL ループを実行する。
    ///
    /// 起動時に現在のアクティビティを一度分析し、その後はコマンドを処理する。
    /// Ctrl-D または `exit` / `quit` で終了する。
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let name = self.profile.as_ref().map(|p| p.name.clone());
        crate::cli::banner::print_welcome(name.as_deref());
        println!("{}\n", crate::cli::report::header(name.as_deref()));

        self.analyze(self.activity).await;

        loop {
            match self.editor.read_line(&self.prompt) {
                Ok(Signal::Success(line)) => {
                    if !self.handle_input(&line).await {
                        break;
                    }
                }
                Ok(Signal::CtrlC) => {
                    println!();
                }
                Ok(Signal::CtrlD) => {
                    info!("Ctrl-D received, leaving dashboard");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "REPL error, leaving dashboard");
                    crate::cli::banner::print_goodbye();
                    return Err(e.into());
                }
            }
        }

        crate::cli::banner::print_goodbye();
        Ok(())
    }

    /// プロンプト表示用の共有状態を更新する。
    fn sync_prompt(&self) {
        if let Ok(mut state) = self.prompt_state.write() {
            state.activity = self.activity;
            state.location = self.location.clone();
            state.last_score = self.last_score;
        }
    }
}

/// 有効かつ発火中のアラートルールの ID
fn firing_ids(rules: &[AlertRule], air_quality: Option<&AirQuality>, score: Option<f64>) -> Vec<u32> {
    match air_quality {
        Some(air) => crate::alerts::evaluate_rules(rules, air, score)
            .iter()
            .map(|rule| rule.id)
            .collect(),
        None => Vec::new(),
    }
}
