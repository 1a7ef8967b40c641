//! Runtime configuration resolved from the command line and environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;
use crate::store::DEFAULT_FILE_NAME;

/// Directory under `$HOME` holding the task file.
pub const DATA_DIR_NAME: &str = ".tareas";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The CSV file backing the store.
    pub db_path: PathBuf,
    /// Pause applied by every refresh.
    pub refresh_delay: Duration,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        let home = std::env::var("HOME").ok();
        Config {
            db_path: cli
                .db
                .clone()
                .unwrap_or_else(|| default_db_path(home.as_deref())),
            refresh_delay: Duration::from_millis(cli.refresh_delay_ms),
        }
    }
}

/// `$HOME/.tareas/tasks.csv`, or `./.tareas/tasks.csv` without a home.
pub fn default_db_path(home: Option<&str>) -> PathBuf {
    let base = home.filter(|h| !h.is_empty()).map(Path::new).unwrap_or(Path::new("."));
    base.join(DATA_DIR_NAME).join(DEFAULT_FILE_NAME)
}
