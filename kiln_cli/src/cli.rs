//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "Kiln ramp controller")]
pub struct Cli {
    /// Path to config TOML; built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Firing profile (.json, .toml or .csv); overrides [profile] in the config
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Emit JSON: log lines, progress samples and errors
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins when set
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one firing of the loaded profile
    Fire {
        /// Wait for a press and release of the start button before firing
        #[arg(long, action = ArgAction::SetTrue)]
        wait_button: bool,
    },
    /// Print the phases of the loaded profile
    Show,
    /// Read the thermocouple once and report
    SelfCheck,
}
