use nu_ansi_term::{Color, Style};

fn styled(color: Color, text: &str, is_bold: bool) -> String {
    let style = if is_bold {
        color.bold()
    } else {
        Style::new().fg(color)
    };
    style.paint(text).to_string()
}

pub fn red(text: &str) -> String {
    styled(Color::LightRed, text, false)
}

pub fn green(text: &str) -> String {
    styled(Color::LightGreen, text, false)
}

pub fn yellow(text: &str) -> String {
    styled(Color::Yellow, text, false)
}

pub fn cyan(text: &str) -> String {
    styled(Color::Cyan, text, false)
}

pub fn white(text: &str) -> String {
    styled(Color::LightGray, text, false)
}

pub fn dim(text: &str) -> String {
    Style::new().dimmed().paint(text).to_string()
}

pub fn bold_cyan(text: &str) -> String {
    styled(Color::Cyan, text, true)
}

pub fn bold_white(text: &str) -> String {
    styled(Color::LightGray, text, true)
}

/// AQFA スコア（1〜10）の帯に応じた色で塗る。
/// 8 以上は緑、5 以上は黄、それ未満は赤。
pub fn by_score(score: f64, text: &str) -> String {
    match score_band(score) {
        ScoreBand::Good => styled(Color::LightGreen, text, true),
        ScoreBand::Fair => styled(Color::Yellow, text, true),
        ScoreBand::Poor => styled(Color::LightRed, text, true),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
}

pub fn score_band(score: f64) -> ScoreBand {
    if score >= 8.0 {
        ScoreBand::Good
    } else if score >= 5.0 {
        ScoreBand::Fair
    } else {
        ScoreBand::Poor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_bands_split_at_five_and_eight() {
        assert_eq!(score_band(9.0), ScoreBand::Good);
        assert_eq!(score_band(8.0), ScoreBand::Good);
        assert_eq!(score_band(7.9), ScoreBand::Fair);
        assert_eq!(score_band(5.0), ScoreBand::Fair);
        assert_eq!(score_band(4.9), ScoreBand::Poor);
        assert_eq!(score_band(f64::NAN), ScoreBand::Poor);
    }

    #[test]
    fn colored_text_keeps_content() {
        assert!(by_score(7.5, "7.5").contains("7.5"));
        assert!(red("x").contains('x'));
    }
}
