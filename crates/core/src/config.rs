//! Application configuration loaded from disk and the environment.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use chrono::format::{Item, StrftimeItems};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::registry::{DEFAULT_STATIONS_PER_LINE, MAX_STATIONS_PER_LINE};

/// Directory under the user's config directory holding `config.toml`.
pub const CONFIG_DIR: &str = "station-rotation";
/// Prefix for environment overrides, e.g. `ROTATION_OUTPUT_DIR`.
pub const ENV_PREFIX: &str = "ROTATION";

const DEFAULT_CONFIG: &str = r#"# Station rotation settings.

# Heading printed at the top of the schedule.
title = "Station Rotation"

# Number of stations on every line (at most 64).
stations_per_line = 20

# Where printable schedules are written. Defaults to ~/Documents/station-rotation.
# output_dir = "/path/to/schedules"

# chrono format used for the printed date.
# date_format = "%m/%d/%Y"

# Also write a JSON copy of each schedule.
# export_json = false

# Per-line station counts. Keep this table last; keys below it belong to it.
[line_sizes]
# C = 24
"#;

/// Runtime settings for the rotation form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Heading printed above the schedule.
    pub title: String,
    /// Station count for lines without an override.
    pub stations_per_line: u32,
    /// Per-line station counts keyed by line identifier.
    pub line_sizes: BTreeMap<String, u32>,
    /// Directory receiving exported schedules.
    pub output_dir: Option<PathBuf>,
    /// chrono format string for the printed date.
    pub date_format: String,
    /// Write a JSON copy next to the printable page.
    pub export_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Station Rotation".to_string(),
            stations_per_line: DEFAULT_STATIONS_PER_LINE,
            line_sizes: BTreeMap::new(),
            output_dir: None,
            date_format: "%m/%d/%Y".to_string(),
            export_json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from `path` (optional) plus environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot produce a printable schedule.
    pub fn validate(&self) -> Result<()> {
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(anyhow!("invalid date_format `{}`", self.date_format));
        }
        if self.stations_per_line > MAX_STATIONS_PER_LINE {
            return Err(anyhow!(
                "stations_per_line {} exceeds the maximum of {MAX_STATIONS_PER_LINE}",
                self.stations_per_line
            ));
        }
        if let Some((line, count)) = self
            .line_sizes
            .iter()
            .find(|(_, count)| **count > MAX_STATIONS_PER_LINE)
        {
            return Err(anyhow!(
                "line_sizes.{line} = {count} exceeds the maximum of {MAX_STATIONS_PER_LINE}"
            ));
        }
        Ok(())
    }

    /// Directory receiving exported schedules.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(default_output_dir)
    }
}

/// Path of the user configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("config.toml")
}

/// Default export location under the user's documents directory.
pub fn default_output_dir() -> PathBuf {
    dirs::document_dir()
        .map(|dir| dir.join(CONFIG_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Write the commented default configuration unless a file already exists.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(config_path())
}

/// Write the commented default configuration to `path` unless it exists.
pub fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}
