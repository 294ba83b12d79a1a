use std::path::Path;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

// Raw mode owns the terminal, so logs only go anywhere if a file was asked for.
pub fn init(log_file: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();

    tracing::info!(path = %path.display(), "logging started");
    Ok(())
}
