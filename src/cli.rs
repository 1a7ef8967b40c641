use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::cmd::Commands;

/// Small, file-backed task manager.
/// Storage defaults to ~/.tareas/tasks.csv or a path passed via --db.
#[derive(Parser, Debug)]
#[command(name = "tareas", version, about = "CSV-backed task manager")]
pub struct Cli {
    /// Path to the CSV task file.
    #[arg(long, global = true, env = "TAREAS_DB")]
    pub db: Option<PathBuf>,

    /// Pause before each reload, in milliseconds.
    #[arg(long, global = true, env = "TAREAS_REFRESH_DELAY_MS", default_value_t = 0)]
    pub refresh_delay_ms: u64,

    /// More log output on stderr (-v, -vv). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}
