//! ログ初期化モジュール
//!
//! `tracing` + `tracing-subscriber` を使用して、ログを外部ファイルに出力する。
//! 端末はダッシュボードの描画に使うため、ログは標準出力には出さない。
//! ログファイルは `var/logs/` ディレクトリにローカル時刻基準で日次ローテーションされる。

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_PREFIX: &str = "aetherfit.log";
const LOG_ENV: &str = "AETHERFIT_LOG";

/// ログ行のタイムスタンプをローカル時刻（オフセット付き）で出力するタイマー
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

/// ローカル日付で日次ローテーションするファイルアペンダー。
///
/// 書き込み時に日付を確認し、変わっていれば新しいファイルを開く。
struct DailyAppender {
    dir: PathBuf,
    current_date: NaiveDate,
    file: File,
}

impl DailyAppender {
    fn new(dir: PathBuf) -> std::io::Result<Self> {
        let today = Local::now().date_naive();
        let file = Self::open_log_file(&dir, today)?;
        Ok(Self {
            dir,
            current_date: today,
            file,
        })
    }

    fn open_log_file(dir: &Path, date: NaiveDate) -> std::io::Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(log_file_name(date)))
    }
}

impl Write for DailyAppender {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let today = Local::now().date_naive();
        if today != self.current_date {
            self.file = Self::open_log_file(&self.dir, today)?;
            self.current_date = today;
        }
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

/// `aetherfit.log.YYYY-MM-DD`
fn log_file_name(date: NaiveDate) -> String {
    format!("{LOG_PREFIX}.{}", date.format("%Y-%m-%d"))
}

/// ログの出力先ディレクトリ。
/// 開発時は `CARGO_MANIFEST_DIR`、それ以外はカレントディレクトリ配下の `var/logs/`。
fn log_dir() -> PathBuf {
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        return PathBuf::from(manifest_dir).join("var").join("logs");
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("var")
        .join("logs")
}

/// ログシステムを初期化する。
///
/// - ログレベルは `AETHERFIT_LOG` 環境変数で制御（デフォルト: `info`）
/// - 出力先は `var/logs/aetherfit.log.YYYY-MM-DD`
///
/// 返される `WorkerGuard` は `main()` で保持し続ける必要がある（ドロップするとログ出力が停止する）。
/// 失敗した場合、呼び出し元はログなしで続行してよい。
pub fn init_logging() -> Result<WorkerGuard> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let appender = DailyAppender::new(dir.clone())
        .with_context(|| format!("failed to create log file in {}", dir.display()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(env_filter)
        .with_writer(non_blocking)
        .with_timer(LocalTimer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_file(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}
