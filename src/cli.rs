//! CLI definitions for drillbot.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// drillbot CLI.
#[derive(Parser)]
#[command(name = "drillbot")]
#[command(about = "Drill-practice automation over an observed browser page")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Attach to the browser and open the control console (default)
    Run {
        /// Attach to the first page whose URL contains this string
        #[arg(long, env = "DRILLBOT_URL_CONTAINS")]
        url_contains: Option<String>,

        /// Chrome remote debugging endpoint
        #[arg(long, env = "DRILLBOT_ENDPOINT")]
        endpoint: Option<String>,
    },

    /// Show persisted flags and remaining privileged uses
    Status,

    /// Usage quota administration
    Quota {
        #[command(subcommand)]
        action: QuotaAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum QuotaAction {
    /// Reset the privileged-use counter to zero
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["drillbot"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
    }

    #[test]
    fn test_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "drillbot",
            "run",
            "--url-contains",
            "play.example.com",
            "--endpoint",
            "http://127.0.0.1:9333",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Run {
                url_contains,
                endpoint,
            }) => {
                assert_eq!(url_contains.as_deref(), Some("play.example.com"));
                assert_eq!(endpoint.as_deref(), Some("http://127.0.0.1:9333"));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_quota_reset_with_global_config() {
        let cli = Cli::try_parse_from(["drillbot", "quota", "reset", "--config", "x.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Quota {
                action: QuotaAction::Reset
            })
        ));
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }
}
