mod app;

use anyhow::{Context, Result};
use chrono::Local;
use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use rotation_core::{
    config::{self, AppConfig},
    export::ScheduleExporter,
    registry::StationRegistry,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    let registry = StationRegistry::from_config(&config)?;
    let exporter = ScheduleExporter::from_config(&config);
    info!(
        lines = registry.lines().count(),
        output = %exporter.root().display(),
        "Configuration loaded"
    );

    let mut app = app::RotationApp::new(registry, exporter, Local::now().date_naive());
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("rotation.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The terminal UI owns stdout, so logs only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
