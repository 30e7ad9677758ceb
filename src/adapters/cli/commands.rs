//! CLI Command Definitions
//!
//! Argument structures for every codox-signals command.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Codox Signals - multi-timeframe signal and market regime engine
#[derive(Parser, Debug)]
#[command(
    name = "codox-signals",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Multi-timeframe trading signals, consensus and market regime engine",
    long_about = "Codox Signals computes technical indicators over OHLCV series, emits \
                  per-timeframe signals with confidence and risk parameters, reduces them \
                  into a consensus call and classifies the global market regime."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the scheduled analysis loop
    Run(RunCmd),

    /// Analyse one symbol and print its signals and sentiment as JSON
    Analyze(AnalyzeCmd),

    /// Classify the market regime and print it as JSON
    Regime(RegimeCmd),
}

impl Command {
    /// Configuration file the command reads
    pub fn config_path(&self) -> &PathBuf {
        match self {
            Command::Run(cmd) => &cmd.config,
            Command::Analyze(cmd) => &cmd.config,
            Command::Regime(cmd) => &cmd.config,
        }
    }
}

/// Start the analysis loop
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/signals.toml")]
    pub config: PathBuf,

    /// Override poll interval in seconds
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Override data directory
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

/// One-shot symbol analysis
#[derive(Parser, Debug)]
pub struct AnalyzeCmd {
    /// Symbol to analyse (e.g., SOL)
    #[arg(value_name = "SYMBOL")]
    pub symbol: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/signals.toml")]
    pub config: PathBuf,

    /// Override data directory
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Skip sentiment aggregation
    #[arg(long)]
    pub no_sentiment: bool,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pub pretty: bool,
}

/// One-shot regime classification
#[derive(Parser, Debug)]
pub struct RegimeCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/signals.toml")]
    pub config: PathBuf,

    /// Override the reference symbol
    #[arg(long, value_name = "SYMBOL")]
    pub reference: Option<String>,

    /// Override data directory
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pub pretty: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let app = CliApp::try_parse_from(["codox-signals", "analyze", "SOL", "--pretty", "-v"]).unwrap();
        assert!(app.verbose);
        match app.command {
            Command::Analyze(cmd) => {
                assert_eq!(cmd.symbol, "SOL");
                assert!(cmd.pretty);
                assert!(!cmd.no_sentiment);
                assert_eq!(cmd.config, PathBuf::from("config/signals.toml"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_run_overrides() {
        let app = CliApp::try_parse_from([
            "codox-signals", "--debug", "run", "--config", "custom.toml", "--interval", "30",
        ])
        .unwrap();
        assert!(app.debug);
        assert_eq!(app.command.config_path(), &PathBuf::from("custom.toml"));
        match app.command {
            Command::Run(cmd) => assert_eq!(cmd.interval, Some(30)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_analyze_requires_symbol() {
        assert!(CliApp::try_parse_from(["codox-signals", "analyze"]).is_err());
    }
}
