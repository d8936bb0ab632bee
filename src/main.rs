mod ai;
mod alerts;
mod cli;
mod config;
mod dashboard;
mod logging;
mod storage;
mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use ai::{
    Activity, AnalysisPipeline, AnalysisRequest, GenerationService, OpenAiGenerator,
    UnconfiguredGenerator,
};
use cli::aether::{aether_spinner, aether_talk, aether_warn};
use cli::report;
use config::{AetherfitConfig, AiConfig};
use dashboard::Dashboard;
use storage::{SessionStore, UserProfile};
use telemetry::{MockTelemetry, TelemetrySource};

/// API キーを探す環境変数（優先順）
const API_KEY_VARS: [&str; 2] = ["AETHERFIT_API_KEY", "OPENAI_API_KEY"];

/// テンプレートのまま残されたキー。未設定として扱う。
const PLACEHOLDER_KEYS: [&str; 2] = ["demo-key", "your_openai_api_key"];

#[derive(Parser, Debug)]
#[command(
    name = "aetherfit",
    version,
    about = "Air Quality for Activity (AQFA) advisor for your terminal"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive dashboard (default)
    Dashboard,
    /// Run one AQFA analysis and print the report
    Analyze {
        /// Activity to analyze (defaults to the signed-in profile's activity)
        #[arg(long, value_enum)]
        activity: Option<Activity>,
        /// Location name (defaults to the profile or config location)
        #[arg(long)]
        location: Option<String>,
        /// Seed for reproducible telemetry
        #[arg(long)]
        seed: Option<u64>,
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sign in by saving a commander profile
    Login {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        location: String,
        #[arg(long, value_enum)]
        activity: Option<Activity>,
    },
    /// Sign out and remove the saved profile
    Logout,
    /// Show the signed-in commander
    Whoami,
    /// List alert rules, or toggle one by id
    Alerts {
        #[arg(long)]
        toggle: Option<u32>,
    },
    /// Show live telemetry for a map point (x: 0-1000, y: 0-600)
    Map {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
}

#[tokio::main]
async fn main() {
    // .env ファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // ログシステムの初期化（_guard は main 終了まで保持する必要がある）
    let _guard = match logging::init_logging() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("aetherfit: warning: logging disabled: {e:#}");
            None
        }
    };
    info!(version = env!("CARGO_PKG_VERSION"), "aetherfit started");

    if let Err(e) = run(cli).await {
        warn!(error = %format!("{e:#}"), "aetherfit exited with error");
        eprintln!("aetherfit: error: {e:#}");
        std::process::exit(1);
    }

    info!("aetherfit shutting down");
}

async fn run(cli: Cli) -> Result<()> {
    let config = AetherfitConfig::load();

    match cli.command.unwrap_or(Command::Dashboard) {
        Command::Dashboard => {
            let store = open_store();
            let pipeline = Arc::new(build_pipeline(&config.ai));
            let mut dashboard = Dashboard::new(
                pipeline,
                Box::new(MockTelemetry::new()),
                store,
                &config.dashboard,
            );
            dashboard.run().await
        }
        Command::Analyze {
            activity,
            location,
            seed,
            json,
        } => {
            let profile = open_store().and_then(|s| s.current().ok().flatten());
            let activity = activity
                .or(profile.as_ref().map(|p| p.primary_activity))
                .unwrap_or(Activity::Running);
            let location = location
                .or(profile.map(|p| p.location))
                .unwrap_or_else(|| config.dashboard.default_location.clone());
            let mut telemetry = match seed {
                Some(seed) => MockTelemetry::seeded(seed),
                None => MockTelemetry::new(),
            };
            analyze_once(&config.ai, &mut telemetry, activity, &location, json).await
        }
        Command::Login {
            name,
            email,
            location,
            activity,
        } => {
            let store = SessionStore::open()?;
            let profile = UserProfile {
                name,
                email,
                location,
                primary_activity: activity.unwrap_or(Activity::Running),
            };
            store.sign_in(&profile)?;
            println!("{}", report::header(Some(&profile.name)));
            aether_talk(&format!(
                "Profile saved. Tracking {} in {}.",
                profile.primary_activity.name().to_lowercase(),
                profile.location
            ));
            Ok(())
        }
        Command::Logout => {
            let store = SessionStore::open()?;
            if store.sign_out()? {
                aether_talk("Signed out. Until next time, Commander.");
            } else {
                aether_talk("No commander is signed in.");
            }
            Ok(())
        }
        Command::Whoami => {
            let store = SessionStore::open()?;
            match store.current()? {
                Some(profile) => {
                    println!("{}", report::header(Some(&profile.name)));
                    println!(
                        "  {} · {} · {}",
                        profile.email, profile.location, profile.primary_activity
                    );
                }
                None => aether_talk("Not signed in. Use `aetherfit login` to create a profile."),
            }
            Ok(())
        }
        Command::Alerts { toggle } => {
            let store = SessionStore::open()?;
            let mut rules = store.load_alert_rules()?;
            if let Some(id) = toggle {
                let enabled = alerts::toggle(&mut rules, id)?;
                store.save_alert_rules(&rules)?;
                let state = if enabled { "enabled" } else { "disabled" };
                aether_talk(&format!("Alert #{id} {state}."));
            }
            println!("{}", report::alerts(&rules, &[]));
            Ok(())
        }
        Command::Map { x, y } => {
            let telemetry = MockTelemetry::new().live_at(x, y)?;
            println!("{}", report::live_panel(&telemetry));
            Ok(())
        }
    }
}

/// 1 回だけ分析を実行して結果を表示する。
async fn analyze_once(
    config: &AiConfig,
    telemetry: &mut dyn TelemetrySource,
    activity: Activity,
    location: &str,
    json: bool,
) -> Result<()> {
    let pipeline = build_pipeline(config);
    info!(model = pipeline.model(), activity = %activity, location, json, "One-shot analysis requested");
    let weather = telemetry.weather();
    let air_quality = telemetry.air_quality(location);
    let request = AnalysisRequest::new(activity, weather, air_quality);

    if json {
        let response = pipeline.evaluate(&request).await;
        let output =
            serde_json::to_string_pretty(&response).context("failed to serialize analysis")?;
        println!("{output}");
        return Ok(());
    }

    println!(
        "{}\n",
        report::local_telemetry(request.weather(), request.air_quality())
    );
    let spinner = aether_spinner(&format!(
        "Analyzing {} conditions in {location}...",
        activity.name().to_lowercase()
    ));
    let response = pipeline.evaluate(&request).await;
    spinner.finish_and_clear();
    println!("{}", report::analysis(&response));

    let rules = open_store()
        .and_then(|s| s.load_alert_rules().ok())
        .unwrap_or_else(alerts::default_rules);
    for rule in alerts::evaluate_rules(&rules, request.air_quality(), Some(response.aqfa_score)) {
        aether_warn(&format!("{}: {}", rule.title, rule.description));
    }
    Ok(())
}

/// セッションストアを開く。失敗してもゲストとして続行できるよう `None` を返す。
fn open_store() -> Option<SessionStore> {
    match SessionStore::open() {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "Failed to open session store");
            None
        }
    }
}

/// 設定と API キーから分析パイプラインを構築する。
fn build_pipeline(config: &AiConfig) -> AnalysisPipeline {
    AnalysisPipeline::new(build_service(config, resolve_api_key()), config)
}

/// API キーの有無に応じて生成サービスを選ぶ。
/// キーがなければ常に認証エラーを返すサービスを使い、フォールバック応答で動作を続ける。
fn build_service(config: &AiConfig, api_key: Option<String>) -> Arc<dyn GenerationService> {
    match api_key {
        Some(key) => {
            info!(model = %config.model, "Generation service configured");
            Arc::new(OpenAiGenerator::new(config, &key))
        }
        None => {
            warn!("No API key found; analyses will use the demo fallback response");
            Arc::new(UnconfiguredGenerator)
        }
    }
}

/// 環境変数から API キーを解決する。
/// 空文字やプレースホルダーの値は未設定として扱う。
fn resolve_api_key() -> Option<String> {
    API_KEY_VARS.iter().find_map(|var| {
        std::env::var(var)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| is_usable_key(value))
    })
}

fn is_usable_key(value: &str) -> bool {
    !value.is_empty() && !PLACEHOLDER_KEYS.contains(&value)
}
