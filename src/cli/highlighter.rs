use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

use crate::dashboard::command::command_names;

/// ダッシュボード入力用のハイライター
///
/// - 既知のコマンド名（先頭単語）: Cyan + Bold
/// - 未知のコマンド名: Red + Bold
/// - 数値引数: Yellow
/// - その他の引数: White
pub struct CommandHighlighter {
    commands: Vec<String>,
}

impl CommandHighlighter {
    pub fn new() -> Self {
        Self {
            commands: command_names(),
        }
    }
}

impl Default for CommandHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for CommandHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();
        let mut current_word = String::new();
        let mut is_command = true;

        for c in line.chars() {
            if c.is_whitespace() {
                if !current_word.is_empty() {
                    self.style_word(&mut styled, &current_word, &mut is_command);
                    current_word.clear();
                }
                styled.push((Style::default(), c.to_string()));
            } else {
                current_word.push(c);
            }
        }

        if !current_word.is_empty() {
            self.style_word(&mut styled, &current_word, &mut is_command);
        }

        styled
    }
}

impl CommandHighlighter {
    fn style_word(&self, styled: &mut StyledText, word: &str, is_command: &mut bool) {
        let style = if *is_command {
            *is_command = false;
            if self.commands.iter().any(|c| c == word) {
                Style::new().fg(Color::Cyan).bold()
            } else {
                Style::new().fg(Color::Red).bold()
            }
        } else if word.parse::<f64>().is_ok() {
            Style::new().fg(Color::Yellow)
        } else {
            Style::new().fg(Color::LightGray)
        };

        styled.push((style, word.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlight_segments(input: &str) -> Vec<(Style, String)> {
        CommandHighlighter::new().highlight(input, 0).buffer
    }

    fn cmd_style() -> Style {
        Style::new().fg(Color::Cyan).bold()
    }
    fn unknown_style() -> Style {
        Style::new().fg(Color::Red).bold()
    }
    fn number_style() -> Style {
        Style::new().fg(Color::Yellow)
    }
    fn arg_style() -> Style {
        Style::new().fg(Color::LightGray)
    }
    fn ws() -> Style {
        Style::default()
    }

    #[test]
    fn known_command() {
        assert_eq!(highlight_segments("refresh"), vec![(cmd_style(), "refresh".into())]);
    }

    #[test]
    fn unknown_command_is_red() {
        assert_eq!(highlight_segments("launch"), vec![(unknown_style(), "launch".into())]);
    }

    #[test]
    fn map_coordinates_are_numbers() {
        assert_eq!(
            highlight_segments("map 420 250"),
            vec![
                (cmd_style(), "map".into()),
                (ws(), " ".into()),
                (number_style(), "420".into()),
                (ws(), " ".into()),
                (number_style(), "250".into()),
            ]
        );
    }

    #[test]
    fn activity_name_is_plain_argument() {
        assert_eq!(
            highlight_segments("activity hiking"),
            vec![
                (cmd_style(), "activity".into()),
                (ws(), " ".into()),
                (arg_style(), "hiking".into()),
            ]
        );
    }

    #[test]
    fn empty_input() {
        assert!(highlight_segments("").is_empty());
    }
}
