//! reedline エディタの構築
//!
//! ハイライター、補完、キーバインディング、履歴、オートサジェストを設定した
//! reedline エディタを構築する。

use std::path::PathBuf;

use nu_ansi_term::{Color, Style};
use reedline::{
    default_emacs_keybindings, ColumnarMenu, DefaultHinter, Emacs, FileBackedHistory, KeyCode,
    KeyModifiers, MenuBuilder, Reedline, ReedlineEvent, ReedlineMenu,
};
use tracing::warn;

use crate::cli::completer::DashboardCompleter;
use crate::cli::highlighter::CommandHighlighter;

const HISTORY_CAPACITY: usize = 500;

/// エディタを構築する。
///
/// `history_path` が指定されていればコマンド履歴をファイルに保存する。
/// 履歴ファイルを開けない場合は履歴なしで続行する。
pub fn build_editor(history_path: Option<PathBuf>) -> Reedline {
    let completer = Box::new(DashboardCompleter::new());
    let completion_menu = Box::new(ColumnarMenu::default().with_name("completion_menu"));

    let hinter = Box::new(
        DefaultHinter::default()
            .with_style(Style::new().fg(Color::DarkGray))
            .with_min_chars(2),
    );

    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );

    let mut editor = Reedline::create()
        .with_hinter(hinter)
        .with_highlighter(Box::new(CommandHighlighter::new()))
        .with_completer(completer)
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    if let Some(path) = history_path {
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => editor = editor.with_history(Box::new(history)),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to open command history"),
        }
    }

    editor
}
