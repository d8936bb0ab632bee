//! ダッシュボードのコマンド解析
//!
//! 1 行の入力を clap の `try_parse_from` でサブコマンドとして解析する。

use clap::{CommandFactory, Parser, Subcommand};

use crate::ai::types::Activity;

#[derive(Parser, Debug)]
#[command(
    name = "aetherfit",
    no_binary_name = true,
    disable_help_subcommand = true,
    disable_help_flag = true
)]
struct CommandLine {
    #[command(subcommand)]
    command: DashboardCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum DashboardCommand {
    /// Analyze conditions for running
    Run,
    /// Analyze conditions for cycling
    #[command(alias = "bike")]
    Cycle,
    /// Analyze conditions for hiking
    Hike,
    /// Select an activity by name and analyze it
    Activity {
        #[arg(value_parser = parse_activity)]
        activity: Activity,
    },
    /// Re-sample telemetry and analyze the current activity again
    Refresh,
    /// List alert rules and the ones currently firing
    Alerts,
    /// Enable or disable an alert rule
    Toggle { id: u32 },
    /// Show live telemetry for a point on the map (x: 0-1000, y: 0-600)
    Map {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Show the signed-in commander
    Whoami,
    /// Show this help
    Help,
    /// Leave the dashboard
    #[command(alias = "quit")]
    Exit,
}

impl DashboardCommand {
    /// アクティビティを選択するコマンドなら、そのアクティビティを返す。
    pub fn activity(&self) -> Option<Activity> {
        match self {
            DashboardCommand::Run => Some(Activity::Running),
            DashboardCommand::Cycle => Some(Activity::Cycling),
            DashboardCommand::Hike => Some(Activity::Hiking),
            DashboardCommand::Activity { activity } => Some(*activity),
            _ => None,
        }
    }
}

fn parse_activity(value: &str) -> Result<Activity, String> {
    value.parse::<Activity>().map_err(|e| e.to_string())
}

/// 入力行をコマンドに変換する。失敗時は clap の整形済みエラーメッセージを返す。
pub fn parse(line: &str) -> Result<DashboardCommand, String> {
    CommandLine::try_parse_from(line.split_whitespace())
        .map(|parsed| parsed.command)
        .map_err(|e| e.to_string().trim_end().to_string())
}

/// 補完・ハイライト用のコマンド名一覧（エイリアスを含む、ソート済み）
pub fn command_names() -> Vec<String> {
    let command = CommandLine::command();
    let mut names: Vec<String> = command
        .get_subcommands()
        .flat_map(|sub| std::iter::once(sub.get_name()).chain(sub.get_all_aliases()))
        .map(str::to_string)
        .collect();
    names.sort();
    names
}

/// ヘルプ表示用の `(使い方, 説明)` の一覧
pub fn help_entries() -> Vec<(String, String)> {
    CommandLine::command()
        .get_subcommands()
        .map(|sub| {
            let args: Vec<String> = sub
                .get_positionals()
                .map(|arg| format!("<{}>", arg.get_id()))
                .collect();
            let usage = if args.is_empty() {
                sub.get_name().to_string()
            } else {
                format!("{} {}", sub.get_name(), args.join(" "))
            };
            let about = sub.get_about().map(|a| a.to_string()).unwrap_or_default();
            (usage, about)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcuts_select_activities() {
        assert_eq!(parse("run").unwrap().activity(), Some(Activity::Running));
        assert_eq!(parse("cycle").unwrap().activity(), Some(Activity::Cycling));
        assert_eq!(parse("bike").unwrap().activity(), Some(Activity::Cycling));
        assert_eq!(parse("hike").unwrap().activity(), Some(Activity::Hiking));
    }

    #[test]
    fn activity_accepts_names_case_insensitively() {
        assert_eq!(
            parse("activity Hiking").unwrap(),
            DashboardCommand::Activity {
                activity: Activity::Hiking
            }
        );
        assert_eq!(
            parse("activity run").unwrap().activity(),
            Some(Activity::Running)
        );
        assert!(parse("activity swimming").is_err());
        assert!(parse("activity").is_err());
    }

    #[test]
    fn arguments_are_typed() {
        assert_eq!(parse("toggle 3").unwrap(), DashboardCommand::Toggle { id: 3 });
        assert!(parse("toggle three").is_err());
        assert_eq!(
            parse("map 420 250.5").unwrap(),
            DashboardCommand::Map { x: 420.0, y: 250.5 }
        );
        assert_eq!(
            parse("map -5 10").unwrap(),
            DashboardCommand::Map { x: -5.0, y: 10.0 }
        );
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("refresh").unwrap(), DashboardCommand::Refresh);
        assert_eq!(parse("alerts").unwrap(), DashboardCommand::Alerts);
        assert_eq!(parse("whoami").unwrap(), DashboardCommand::Whoami);
        assert_eq!(parse("help").unwrap(), DashboardCommand::Help);
        assert_eq!(parse("  exit  ").unwrap(), DashboardCommand::Exit);
        assert_eq!(parse("quit").unwrap(), DashboardCommand::Exit);
        assert_eq!(parse("refresh").unwrap().activity(), None);
    }

    #[test]
    fn unknown_command_is_error() {
        let err = parse("launch").unwrap_err();
        assert!(err.contains("launch"));
    }

    #[test]
    fn command_names_include_aliases() {
        let names = command_names();
        for name in ["run", "bike", "quit", "map", "toggle", "whoami"] {
            assert!(names.iter().any(|n| n == name), "missing {name}");
        }
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn help_lists_every_command_with_arguments() {
        let entries = help_entries();
        assert!(entries.iter().any(|(usage, _)| usage == "map <x> <y>"));
        assert!(entries.iter().any(|(usage, _)| usage == "toggle <id>"));
        assert!(entries.iter().all(|(_, about)| !about.is_empty()));
    }
}
