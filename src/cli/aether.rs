use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::color::{red, white, yellow};

/// Aether が発話するときに使う共通関数。
/// 先頭に 🛰 絵文字を付与し、白色テキストで表示する。
pub fn aether_talk(message: &str) {
    println!("🛰  {}", white(message));
}

/// 注意喚起（アラート発火など）を黄色で表示する。
pub fn aether_warn(message: &str) {
    println!("⚠️  {}", yellow(message));
}

/// 操作エラーを赤色で表示する。
pub fn aether_error(message: &str) {
    println!("✖  {}", red(message));
}

/// 分析待ちの間に表示するスピナーを生成・開始する。
/// 呼び出し元で `finish_and_clear()` を呼んでスピナーを停止すること。
pub fn aether_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("🛰  {spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
