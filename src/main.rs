//! `tareas` command-line front end.
//!
//! ```bash
//! # Add a task for today
//! tareas add "Buy milk" --desc 2L --category Compras
//!
//! # Pending tasks only
//! tareas list --pending
//!
//! # Complete / delete by id or by name
//! tareas complete "Buy milk"
//! tareas delete 3f1c...
//! ```
//!
//! Data is stored in `~/.tareas/tasks.csv` unless `--db` or `TAREAS_DB` says otherwise.

use clap::Parser;

use tareas::cli::Cli;
use tareas::cmd::{cmd_completions, execute, Commands};
use tareas::config::Config;
use tareas::{logging, TaskService, TaskStore};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Completions don't need a task file.
    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return;
    }

    let config = Config::from_cli(&cli);
    let store = match TaskStore::open(&config.db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to open task file {}: {e}", config.db_path.display());
            std::process::exit(1);
        }
    };
    let service = TaskService::new(store).with_refresh_delay(config.refresh_delay);

    if let Err(e) = execute(&service, cli.command).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
