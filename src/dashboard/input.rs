//! 入力ハンドリング
//!
//! コマンドを解析し、分析・アラート・地図などの処理に振り分ける。
//!
//! 分析は完了を待ってから次の行を読むため、対話中に世代が追い越されることはない。
//! ここでのコーディネーターの役割は Ctrl-C による取り消し経路になる。

use tracing::{debug, info, warn};

use super::command::{help_entries, parse, DashboardCommand};
use super::{firing_ids, Dashboard};
use crate::ai::types::{Activity, AnalysisRequest};
use crate::alerts::toggle;
use crate::cli::aether::{aether_error, aether_spinner, aether_talk, aether_warn};
use crate::cli::color::{cyan, dim};
use crate::cli::report;

impl Dashboard {
    /// ユーザー入力を処理する。
    ///
    /// 戻り値: `true` = ループ続行、`false` = ダッシュボード終了
    pub(super) async fn handle_input(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return true;
        }

        debug!(input = %line, "User input received");

        let command = match parse(line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}\n");
                return true;
            }
        };

        if let Some(activity) = command.activity() {
            self.analyze(activity).await;
            return true;
        }

        match command {
            DashboardCommand::Refresh => self.analyze(self.activity).await,
            DashboardCommand::Alerts => self.show_alerts(),
            DashboardCommand::Toggle { id } => self.toggle_alert(id),
            DashboardCommand::Map { x, y } => self.show_map(x, y),
            DashboardCommand::Whoami => self.show_whoami(),
            DashboardCommand::Help => show_help(),
            DashboardCommand::Exit => {
                info!("Exit command received");
                return false;
            }
            DashboardCommand::Run
            | DashboardCommand::Cycle
            | DashboardCommand::Hike
            | DashboardCommand::Activity { .. } => {}
        }
        println!();
        true
    }

    /// テレメトリを取得して分析を投入し、結果を待って表示する。
    ///
    /// 待機中に Ctrl-C が押された場合は分析を取り消す。
    pub(super) async fn analyze(&mut self, activity: Activity) {
        self.activity = activity;
        self.sync_prompt();

        let weather = self.telemetry.weather();
        let air_quality = self.telemetry.air_quality(&self.location);
        let atmosphere = self.telemetry.atmosphere();
        let trend = self.telemetry.aqi_trend();

        println!("{}\n", report::local_telemetry(&weather, &air_quality));
        println!("{}\n", report::atmosphere(&atmosphere));
        println!("{}\n", report::trend(&trend));

        let request = AnalysisRequest::new(activity, weather, air_quality.clone());
        let generation = self.coordinator.submit(request);

        let spinner = aether_spinner(&format!(
            "Analyzing {} conditions in {}...",
            activity.name().to_lowercase(),
            self.location
        ));
        let outcome = tokio::select! {
            snapshot = self.coordinator.wait_for(generation) => snapshot,
            _ = tokio::signal::ctrl_c() => {
                self.coordinator.cancel();
                None
            }
        };
        spinner.finish_and_clear();

        let Some(snapshot) = outcome else {
            info!(generation, "Analysis cancelled before completion");
            aether_talk("Analysis cancelled.");
            println!();
            return;
        };

        println!("{}\n", report::analysis(&snapshot.response));
        println!(
            "{}\n",
            dim(&format!(
                "Analysis #{} completed at {}",
                snapshot.generation,
                snapshot.completed_at.format("%H:%M:%S")
            ))
        );

        self.last_air_quality = Some(air_quality);
        self.last_score = Some(snapshot.response.aqfa_score);
        self.sync_prompt();

        for id in firing_ids(&self.rules, self.last_air_quality.as_ref(), self.last_score) {
            if let Some(rule) = self.rules.iter().find(|r| r.id == id) {
                aether_warn(&format!("{}: {}", rule.title, rule.description));
            }
        }
    }

    fn show_alerts(&self) {
        let firing = firing_ids(&self.rules, self.last_air_quality.as_ref(), self.last_score);
        println!("{}", report::alerts(&self.rules, &firing));
    }

    fn toggle_alert(&mut self, id: u32) {
        match toggle(&mut self.rules, id) {
            Ok(enabled) => {
                let state = if enabled { "enabled" } else { "disabled" };
                aether_talk(&format!("Alert #{id} {state}."));
                if let Some(ref store) = self.store {
                    if let Err(e) = store.save_alert_rules(&self.rules) {
                        warn!(error = %e, "Failed to save alert rules");
                        aether_error(&format!("failed to save alert rules: {e}"));
                    }
                }
            }
            Err(e) => aether_error(&e.to_string()),
        }
    }

    fn show_map(&self, x: f64, y: f64) {
        match self.telemetry.live_at(x, y) {
            Ok(telemetry) => println!("{}", report::live_panel(&telemetry)),
            Err(e) => aether_error(&e.to_string()),
        }
    }

    fn show_whoami(&self) {
        match self.profile {
            Some(ref profile) => {
                println!("{}", report::header(Some(&profile.name)));
                println!(
                    "  {} · {} · {}",
                    cyan(&profile.email),
                    profile.location,
                    profile.primary_activity
                );
            }
            None => aether_talk("Not signed in. Use `aetherfit login` to create a profile."),
        }
    }
}

fn show_help() {
    let entries = help_entries();
    let width = entries.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
    for (usage, about) in entries {
        println!("  {} {}", cyan(&format!("{usage:<width$}")), dim(&about));
    }
}
