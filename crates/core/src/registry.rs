//! Static mapping from line to its ordered station list.

use std::collections::BTreeMap;

use crate::{
    config::AppConfig,
    error::RotationError,
    models::{Line, Station},
};

/// Stations per line in the standard plant layout.
pub const DEFAULT_STATIONS_PER_LINE: u32 = 20;
/// Largest station count a configured line may hold.
pub const MAX_STATIONS_PER_LINE: u32 = 64;

/// Immutable registry of the stations belonging to each line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationRegistry {
    lines: BTreeMap<Line, Vec<Station>>,
}

impl StationRegistry {
    /// Every line holds stations `1..=20`.
    pub fn standard() -> Self {
        Self::from_sizes(
            Line::ALL
                .iter()
                .map(|line| (*line, DEFAULT_STATIONS_PER_LINE)),
        )
    }

    /// Build a registry holding only the listed lines with `count` stations each.
    pub fn from_sizes(sizes: impl IntoIterator<Item = (Line, u32)>) -> Self {
        let lines = sizes
            .into_iter()
            .map(|(line, count)| {
                let stations = (1..=count).map(|number| Station::new(line, number)).collect();
                (line, stations)
            })
            .collect();
        Self { lines }
    }

    /// Build the registry described by the configuration.
    ///
    /// Fails with [`RotationError::UnknownLine`] when an override names a line
    /// that does not exist.
    pub fn from_config(config: &AppConfig) -> Result<Self, RotationError> {
        let mut sizes: BTreeMap<Line, u32> = Line::ALL
            .iter()
            .map(|line| (*line, config.stations_per_line))
            .collect();
        for (key, count) in &config.line_sizes {
            let line: Line = key.parse()?;
            sizes.insert(line, *count);
        }
        Ok(Self::from_sizes(sizes))
    }

    /// Ordered stations of `line`.
    pub fn stations_for(&self, line: Line) -> Result<&[Station], RotationError> {
        self.lines
            .get(&line)
            .map(Vec::as_slice)
            .ok_or_else(|| RotationError::UnknownLine(line.to_string()))
    }

    /// Ordered stations of the line named by `id` (e.g. `"C"`).
    pub fn stations_for_id(&self, id: &str) -> Result<&[Station], RotationError> {
        let line: Line = id.parse()?;
        self.stations_for(line)
    }

    /// Whether `station` is registered on its line.
    pub fn contains(&self, station: &Station) -> bool {
        self.lines
            .get(&station.line)
            .map(|stations| stations.binary_search(station).is_ok())
            .unwrap_or(false)
    }

    /// Lines held by this registry, in display order.
    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        self.lines.keys().copied()
    }
}

impl Default for StationRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
