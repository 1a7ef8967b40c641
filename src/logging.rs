//! Diagnostics via `tracing`.
//!
//! Status messages meant for the user are printed by the commands; this is
//! only the developer-facing log on stderr.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter for a `-v` count when `RUST_LOG` is unset.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "tareas=info,warn",
        _ => "tareas=debug,info",
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over the verbosity flag. Output: stderr, compact format.
///
/// ```bash
/// RUST_LOG=tareas=trace tareas list
/// ```
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
