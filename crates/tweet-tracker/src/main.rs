mod bootstrap;
mod commands;
mod render;

use anyhow::Result;
use tracker_core::settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Tweet Tracker v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!(
        backend = %settings.backend_url,
        timezone = %settings.timezone,
        time_format = %settings.time_format,
        "settings resolved"
    );

    commands::run(&settings).await
}
