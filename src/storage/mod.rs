//! セッションとアラート設定の永続化
//!
//! ログイン中ユーザーのプロフィールと、アラートルールの有効/無効状態を
//! データディレクトリ内の JSON ファイルとして保存する。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai::types::Activity;
use crate::alerts::{default_rules, AlertRule};

const SESSION_FILE: &str = "session.json";
const ALERTS_FILE: &str = "alerts.json";

/// ログイン中ユーザーのプロフィール
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub location: String,
    pub primary_activity: Activity,
}

impl UserProfile {
    /// 入力値を検証する
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("name must not be empty");
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            anyhow::bail!("invalid email address: {}", self.email);
        }
        if self.location.trim().is_empty() {
            anyhow::bail!("location must not be empty");
        }
        Ok(())
    }
}

/// セッションとアラート設定のストア。
/// 分析パイプラインからは読み取り専用で、ライフサイクルは CLI が管理する。
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// プラットフォーム標準のデータディレクトリでストアを開く。
    pub fn open() -> Result<Self> {
        Self::open_at(Self::data_dir()?)
    }

    /// 指定されたディレクトリでストアを開く（テスト用にも使用）。
    pub fn open_at(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data directory: {}", dir.display()))?;
        debug!(path = %dir.display(), "Session store opened");
        Ok(Self { dir })
    }

    /// データディレクトリのパスを返す。
    /// `directories` クレートを使用してプラットフォームに応じたパスを決定する。
    pub fn data_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "aetherfit")
            .context("failed to determine data directory")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 現在ログイン中のユーザー。未ログインなら `None`。
    pub fn current(&self) -> Result<Option<UserProfile>> {
        read_json(&self.dir.join(SESSION_FILE))
    }

    /// プロフィールを検証して保存し、ログイン状態にする。
    pub fn sign_in(&self, profile: &UserProfile) -> Result<()> {
        profile.validate()?;
        write_json(&self.dir.join(SESSION_FILE), profile)?;
        info!(email = %profile.email, location = %profile.location, "User signed in");
        Ok(())
    }

    /// ログアウトする。ログインしていなければ何もしない。
    pub fn sign_out(&self) -> Result<bool> {
        let path = self.dir.join(SESSION_FILE);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)
            .with_context(|| format!("failed to remove session file: {}", path.display()))?;
        info!("User signed out");
        Ok(true)
    }

    /// 保存済みのアラートルール。未保存ならデフォルトのルールを返す。
    pub fn load_alert_rules(&self) -> Result<Vec<AlertRule>> {
        Ok(read_json(&self.dir.join(ALERTS_FILE))?.unwrap_or_else(default_rules))
    }

    pub fn save_alert_rules(&self, rules: &[AlertRule]) -> Result<()> {
        write_json(&self.dir.join(ALERTS_FILE), &rules)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(value))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value).context("failed to serialize data")?;
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
