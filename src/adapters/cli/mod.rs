//! CLI Adapter
//!
//! Command-line interface for the codox-signals engine.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{AnalyzeCmd, CliApp, Command, RegimeCmd, RunCmd};

/// Parse the CLI application from process arguments
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}
