use std::borrow::Cow;
use std::sync::{Arc, RwLock};

use chrono::Local;
use reedline::{Color, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};

use super::color::{by_score, cyan, green, white, yellow};
use crate::ai::types::Activity;

/// プロンプトに表示するダッシュボードの状態。メインループから共有される。
#[derive(Debug, Clone, PartialEq)]
pub struct PromptState {
    pub activity: Activity,
    pub location: String,
    /// 最後に公開された AQFA スコア
    pub last_score: Option<f64>,
}

/// AetherFit ダッシュボードのカスタムプロンプト。
///
/// ```text
/// aether · Running @ Golden Gate Park [7.5]
/// ❯
/// ```
pub struct AetherPrompt {
    state: Arc<RwLock<PromptState>>,
}

impl AetherPrompt {
    pub fn new(state: Arc<RwLock<PromptState>>) -> Self {
        Self { state }
    }
}

/// プロンプト左側の文字列を組み立てる。
pub fn render_status(state: &PromptState) -> String {
    let score = match state.last_score {
        Some(score) => format!(" [{}]", by_score(score, &format!("{score:.1}"))),
        None => String::new(),
    };
    format!(
        "{} · {} @ {}{score}\n",
        cyan("aether"),
        yellow(state.activity.name()),
        white(&state.location)
    )
}

impl Prompt for AetherPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        match self.state.read() {
            Ok(state) => Cow::Owned(render_status(&state)),
            Err(_) => Cow::Owned(format!("{}\n", cyan("aether"))),
        }
    }

    fn get_prompt_color(&self) -> Color {
        Color::White
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        let now = Local::now().format("%H:%M:%S").to_string();
        Cow::Owned(white(&now))
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Owned(green("\u{276f} "))
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed(" :: ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "(failed) ",
        };
        Cow::Owned(format!("{prefix}(search: '{}') ", history_search.term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(last_score: Option<f64>) -> PromptState {
        PromptState {
            activity: Activity::Cycling,
            location: "Embarcadero".to_string(),
            last_score,
        }
    }

    #[test]
    fn status_shows_activity_and_location() {
        let rendered = render_status(&state(None));
        assert!(rendered.contains("Cycling"));
        assert!(rendered.contains("Embarcadero"));
        assert!(!rendered.contains(" ["));
        assert!(rendered.ends_with('\n'));
    }

    #[test]
    fn status_shows_last_score() {
        let rendered = render_status(&state(Some(8.25)));
        assert!(rendered.contains("8.2") || rendered.contains("8.3"));
        assert!(rendered.contains(" ["));
    }

    #[test]
    fn prompt_reflects_shared_state_updates() {
        let shared = Arc::new(RwLock::new(state(None)));
        let prompt = AetherPrompt::new(Arc::clone(&shared));
        shared.write().unwrap().activity = Activity::Hiking;
        assert!(prompt.render_prompt_left().contains("Hiking"));
    }
}
