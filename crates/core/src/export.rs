//! Writing printable schedules to disk.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    config::AppConfig,
    print::{self, PrintOptions},
    rotation::Schedule,
};

/// Files produced by a single export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
    /// Printable HTML page.
    pub html_path: PathBuf,
    /// JSON copy of the schedule, when enabled.
    pub json_path: Option<PathBuf>,
}

/// Writes schedules into an output directory, one file set per day.
pub struct ScheduleExporter {
    root: PathBuf,
    options: PrintOptions,
    write_json: bool,
}

impl ScheduleExporter {
    /// Create an exporter rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, options: PrintOptions) -> Self {
        Self {
            root: root.into(),
            options,
            write_json: false,
        }
    }

    /// Exporter configured from the application settings.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.output_dir(), PrintOptions::from_config(config))
            .with_json(config.export_json)
    }

    /// Toggle the JSON sidecar.
    pub fn with_json(mut self, enabled: bool) -> Self {
        self.write_json = enabled;
        self
    }

    /// Directory receiving exported files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Print settings used for rendering.
    pub fn options(&self) -> &PrintOptions {
        &self.options
    }

    /// Render and write `schedule`, replacing any export from the same day.
    pub fn export(&self, schedule: &Schedule) -> Result<ExportEntry> {
        schedule.ensure_printable()?;
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;

        let stem = print::file_stem(schedule.date);
        let html_path = self.root.join(format!("{stem}.html"));
        let html = print::render_html(schedule, &self.options);
        fs::write(&html_path, html)
            .with_context(|| format!("failed to write {}", html_path.display()))?;

        let json_path = if self.write_json {
            let path = self.root.join(format!("{stem}.json"));
            let serialised =
                serde_json::to_vec_pretty(schedule).context("failed to serialise schedule")?;
            fs::write(&path, serialised)
                .with_context(|| format!("failed to write {}", path.display()))?;
            Some(path)
        } else {
            None
        };

        info!(path = %html_path.display(), json = json_path.is_some(), "Exported schedule");
        Ok(ExportEntry {
            html_path,
            json_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{
        error::RotationError,
        models::{Line, Station},
        registry::StationRegistry,
        rotation::generate_schedule,
        selection::SelectionState,
    };

    fn sample_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 5).expect("valid date")
    }

    #[test]
    fn writes_html_and_json() -> Result<()> {
        let dir = tempdir()?;
        let exporter =
            ScheduleExporter::new(dir.path().join("out"), PrintOptions::default()).with_json(true);
        let registry = StationRegistry::from_sizes([(Line::B, 4), (Line::C, 3)]);
        let mut selection = SelectionState::new();
        selection.set_accommodations(&registry, [Station::new(Line::C, 3)])?;
        let schedule = generate_schedule(&registry, &selection, sample_date())?;

        let entry = exporter.export(&schedule)?;
        assert_eq!(
            entry.html_path,
            dir.path().join("out").join("station_rotation_11-05-2024.html")
        );
        let html = fs::read_to_string(&entry.html_path)?;
        assert!(html.contains("Date: 11/05/2024"));
        assert!(html.contains(r#"<div class="pair">1-2</div>"#));

        let json_path = entry.json_path.expect("json sidecar");
        let restored: Schedule = serde_json::from_slice(&fs::read(json_path)?)?;
        assert_eq!(restored, schedule);
        Ok(())
    }

    #[test]
    fn same_day_export_overwrites() -> Result<()> {
        let dir = tempdir()?;
        let exporter = ScheduleExporter::new(dir.path(), PrintOptions::default());
        let registry = StationRegistry::from_sizes([(Line::N, 4)]);
        let mut selection = SelectionState::new();

        let first = exporter.export(&generate_schedule(&registry, &selection, sample_date())?)?;
        selection.toggle_exclusion(&registry, Station::new(Line::N, 1))?;
        let second = exporter.export(&generate_schedule(&registry, &selection, sample_date())?)?;

        assert_eq!(first.html_path, second.html_path);
        assert!(second.json_path.is_none());
        let html = fs::read_to_string(&second.html_path)?;
        assert!(html.contains(r#"<div class="pair">2-3</div>"#));
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn refuses_empty_schedule() -> Result<()> {
        let dir = tempdir()?;
        let exporter = ScheduleExporter::new(dir.path().join("out"), PrintOptions::default());
        let registry = StationRegistry::from_sizes([(Line::B, 1)]);
        let mut selection = SelectionState::new();
        selection.toggle_exclusion(&registry, Station::new(Line::B, 1))?;
        let schedule = generate_schedule(&registry, &selection, sample_date())?;

        let err = exporter.export(&schedule).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RotationError>(),
            Some(&RotationError::EmptySchedule)
        );
        assert!(!dir.path().join("out").exists());
        Ok(())
    }
}
