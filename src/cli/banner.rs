use chrono::{Local, Timelike};
use rand::Rng;

use super::aether::aether_talk;
use super::color::{bold_cyan, cyan, white, yellow};

/// 時間帯に応じた挨拶を返す。
///  - 5〜11時:  "Good morning"
///  - 12〜17時: "Good afternoon"
///  - 18〜4時:  "Good evening"
fn time_greeting() -> &'static str {
    greeting_for_hour(Local::now().hour())
}

fn greeting_for_hour(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

/// ダッシュボード起動時の Welcome バナーを表示する。
pub fn print_welcome(commander: Option<&str>) {
    let version = env!("CARGO_PKG_VERSION");
    let greeting = time_greeting();

    let art_lines: &[&str] = &[
        r#"    _       _   _               ___ _ _   "#,
        r#"   /_\  ___| |_| |_  ___ _ _  | __(_) |_ "#,
        r#"  / _ \/ -_)  _| ' \/ -_) '_| | _|| |  _|"#,
        r#" /_/ \_\___|\__|_||_\___|_|   |_| |_|\__|"#,
    ];

    let separator = "==========================================";
    let version_line = format!(
        "  {}  ::  {} {}",
        bold_cyan("AETHERFIT"),
        white("Air Quality for Activity"),
        yellow(&format!("v{version}"))
    );

    println!();
    for line in art_lines {
        println!("{}", white(line));
    }
    println!("{}", cyan(separator));
    println!("{version_line}");
    println!("{}", cyan(separator));
    println!();
    let name = commander.unwrap_or("Commander");
    aether_talk(&format!(
        "{greeting}, {name}. Atmospheric sensors are online. Type `help` for commands."
    ));
    println!();
}

/// 終了時の Farewell メッセージを表示する。
pub fn print_goodbye() {
    let greeting = time_greeting();

    let messages: &[&str] = &[
        "Breathe easy out there, Commander.",
        &format!("Sensors going quiet. {greeting}."),
        "Aether signing off. Mind the ozone.",
        "Until the next window opens, Commander.",
    ];

    let idx = rand::rng().random_range(0..messages.len());

    println!();
    aether_talk(messages[idx]);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_follows_hour_of_day() {
        assert_eq!(greeting_for_hour(5), "Good morning");
        assert_eq!(greeting_for_hour(11), "Good morning");
        assert_eq!(greeting_for_hour(12), "Good afternoon");
        assert_eq!(greeting_for_hour(17), "Good afternoon");
        assert_eq!(greeting_for_hour(18), "Good evening");
        assert_eq!(greeting_for_hour(0), "Good evening");
    }

    #[test]
    fn time_greeting_returns_valid_string() {
        let g = time_greeting();
        assert!(
            g == "Good morning" || g == "Good afternoon" || g == "Good evening",
            "unexpected greeting: {g}"
        );
    }
}
