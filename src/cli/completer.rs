//! コマンド補完 — Tab キーでダッシュボードのコマンド名とアクティビティ名を補完
//!
//! - 先頭トークン: コマンド名（エイリアスを含む）
//! - `activity` の引数: running / cycling / hiking

use reedline::{Completer, Span, Suggestion};

use crate::ai::types::Activity;
use crate::dashboard::command::command_names;

pub struct DashboardCompleter {
    /// コマンド名（ソート済み）
    commands: Vec<String>,
}

impl DashboardCompleter {
    pub fn new() -> Self {
        Self {
            commands: command_names(),
        }
    }

    fn suggestion(value: String, span: Span) -> Suggestion {
        Suggestion {
            value,
            description: None,
            style: None,
            extra: None,
            span,
            append_whitespace: true,
            match_indices: None,
        }
    }

    /// コマンド名補完（先頭トークン）
    fn complete_command(&self, partial: &str, span: Span) -> Vec<Suggestion> {
        self.commands
            .iter()
            .filter(|cmd| cmd.starts_with(partial))
            .map(|cmd| Self::suggestion(cmd.clone(), span))
            .collect()
    }

    /// アクティビティ名補完（`activity` の引数）
    fn complete_activity(&self, partial: &str, span: Span) -> Vec<Suggestion> {
        let partial = partial.to_lowercase();
        Activity::ALL
            .iter()
            .map(|a| a.name().to_lowercase())
            .filter(|name| name.starts_with(&partial))
            .map(|name| Self::suggestion(name, span))
            .collect()
    }

    /// カーソルより前の文字列から、補完対象トークンの開始位置を返す。
    fn token_start(line: &str, pos: usize) -> usize {
        let before = &line[..pos];
        before.rfind(' ').map(|i| i + 1).unwrap_or(0)
    }
}

impl Default for DashboardCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for DashboardCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let pos = pos.min(line.len());
        let start = Self::token_start(line, pos);
        let partial = &line[start..pos];
        let span = Span::new(start, pos);

        let preceding: Vec<&str> = line[..start].split_whitespace().collect();
        match preceding.as_slice() {
            [] => self.complete_command(partial, span),
            ["activity"] => self.complete_activity(partial, span),
            _ => Vec::new(),
        }
    }
}
