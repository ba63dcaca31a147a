/// Diagnostic logging through the `log` facade.
///
/// The terminal UI owns stdout and stderr, so records are appended to a log file.
/// The level comes from `RUST_LOG` and defaults to `info`.
use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};

pub fn init(log_path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("Logger already initialised")?;

    log::info!("Trackview starting up, logging to {}", log_path.display());
    Ok(())
}
