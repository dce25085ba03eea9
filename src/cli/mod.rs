//! CLI interface for tape-flow
//!
//! Provides subcommands for:
//! - `replay`: Replay a captured feed and summarise it
//! - `config`: Show configuration

mod replay;

pub use replay::ReplayArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tape-flow")]
#[command(about = "Trade print classification and order-flow aggregation for equity market data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a captured feed file
    Replay(ReplayArgs),
    /// Show configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay() {
        let cli = Cli::parse_from([
            "tape-flow",
            "replay",
            "--file",
            "session.jsonl",
            "--symbol",
            "SPY",
            "--window",
            "30",
            "--capture",
        ]);

        match cli.command {
            Commands::Replay(args) => {
                assert_eq!(args.file.to_str(), Some("session.jsonl"));
                assert_eq!(args.symbol.as_deref(), Some("SPY"));
                assert_eq!(args.window, 30);
                assert_eq!(args.delay_ms, 0);
                assert!(args.capture);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.config, "config.toml");
    }

    #[test]
    fn test_replay_defaults() {
        let cli = Cli::parse_from(["tape-flow", "-c", "custom.toml", "replay", "-f", "a.jsonl"]);
        let Commands::Replay(args) = cli.command else {
            panic!("expected replay");
        };
        assert_eq!(args.window, 60);
        assert!(!args.capture);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_parse_config() {
        let cli = Cli::parse_from(["tape-flow", "config"]);
        assert!(matches!(cli.command, Commands::Config));
    }
}
