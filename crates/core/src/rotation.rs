//! Rotation pairing over a line's remaining stations.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::RotationError,
    models::{Line, RotationPair, Station},
    registry::StationRegistry,
    selection::SelectionState,
};

/// Generated pairs and accommodation markers for one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRotation {
    /// Line the rotation was generated for.
    pub line: Line,
    /// Rotation pairs in line order.
    pub pairs: Vec<RotationPair>,
    /// Accommodation stations in line order; only populated for line C.
    pub accommodations: Vec<Station>,
}

impl LineRotation {
    /// Whether the line has nothing to print.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.accommodations.is_empty()
    }

    /// Every station that takes part in a pair.
    pub fn paired_stations(&self) -> Vec<Station> {
        self.pairs.iter().flat_map(RotationPair::stations).collect()
    }
}

/// Rotation pairs for every line on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Day the schedule applies to.
    pub date: NaiveDate,
    /// One entry per registry line in display order.
    pub lines: Vec<LineRotation>,
}

impl Schedule {
    /// Rotation of `line`, if the registry holds it.
    pub fn line(&self, line: Line) -> Option<&LineRotation> {
        self.lines.iter().find(|rotation| rotation.line == line)
    }

    /// Whether no line produced anything to print.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(LineRotation::is_empty)
    }

    /// Fail with [`RotationError::EmptySchedule`] when there is nothing to print.
    pub fn ensure_printable(&self) -> Result<(), RotationError> {
        if self.is_empty() {
            return Err(RotationError::EmptySchedule);
        }
        Ok(())
    }
}

/// Pair the operational stations of `line`.
///
/// Stations listed in `exclusions` or `accommodations` are dropped and the rest
/// are paired two at a time in line order; an odd leftover becomes a
/// [`RotationPair::Single`]. A station present in both sets counts as an
/// accommodation.
pub fn generate(
    registry: &StationRegistry,
    line: Line,
    exclusions: &BTreeSet<Station>,
    accommodations: &BTreeSet<Station>,
) -> Result<LineRotation, RotationError> {
    let stations = registry.stations_for(line)?;

    if !accommodations.is_empty() && !line.supports_accommodations() {
        return Err(RotationError::invalid(
            line,
            "accommodations are only tracked on line C",
        ));
    }
    if let Some(station) = exclusions
        .iter()
        .chain(accommodations.iter())
        .find(|station| station.line != line || !registry.contains(station))
    {
        return Err(RotationError::invalid(
            line,
            format!("station {station} is not part of line {line}"),
        ));
    }

    let mut remaining = Vec::with_capacity(stations.len());
    let mut accommodated = Vec::new();
    for station in stations {
        if accommodations.contains(station) {
            accommodated.push(*station);
        } else if !exclusions.contains(station) {
            remaining.push(*station);
        }
    }

    let chunks = remaining.chunks_exact(2);
    let leftover = chunks.remainder().first().copied();
    let pairs = chunks
        .map(|chunk| RotationPair::Pair {
            first: chunk[0],
            second: chunk[1],
        })
        .chain(leftover.map(|station| RotationPair::Single { station }))
        .collect::<Vec<_>>();

    debug!(
        line = %line,
        pairs = pairs.len(),
        excluded = exclusions.len(),
        accommodated = accommodated.len(),
        "Generated line rotation"
    );

    Ok(LineRotation {
        line,
        pairs,
        accommodations: accommodated,
    })
}

/// Run one pairing pass per registry line.
pub fn generate_schedule(
    registry: &StationRegistry,
    selection: &SelectionState,
    date: NaiveDate,
) -> Result<Schedule, RotationError> {
    let lines = registry
        .lines()
        .map(|line| {
            generate(
                registry,
                line,
                selection.exclusions(line),
                &selection.accommodations_for(line),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Schedule { date, lines })
}
