// src/log.rs
use std::{fs::OpenOptions, path::Path, sync::Mutex};

use tracing_subscriber::{EnvFilter, fmt::time::uptime};

use crate::file::ensure_parent;

/// Default filter for a verbosity count (`-v` repeats).
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "listing_collect=info",
        1 => "listing_collect=debug",
        _ => "listing_collect=trace",
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `verbosity`.
/// With `log_file`, lines are appended there instead of stderr.
/// Calling this again after a subscriber is set is a no-op.
pub fn init(verbosity: u8, log_file: Option<&Path>) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(uptime())
        .with_target(false);

    match log_file {
        Some(path) => {
            ensure_parent(path)?;
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
    Ok(())
}
