//! Log output.
//!
//! The terminal belongs to the UI, so logs only go to a file, and only when
//! `MOVIES_HOME_LOG` names one.  `RUST_LOG` filters as usual (default `info`).

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log file path.
pub const LOG_PATH_VAR: &str = "MOVIES_HOME_LOG";

/// Install the global subscriber if a log file is configured.
///
/// Returns the path logs are written to, if any.
pub fn init() -> Result<Option<String>> {
    let Ok(path) = std::env::var(LOG_PATH_VAR) else {
        return Ok(None);
    };
    init_file(Path::new(&path))?;
    Ok(Some(path))
}

fn init_file(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;
    Ok(())
}
