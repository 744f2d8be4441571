//! Per-line station selections gathered by the form.

use std::collections::BTreeSet;

use crate::{
    error::RotationError,
    models::{Line, Station},
    registry::StationRegistry,
};

/// Non-operational stations per line plus the line C accommodation stations.
///
/// Created empty for each form session and handed to the generator explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    exclusions: [BTreeSet<Station>; Line::COUNT],
    accommodations: BTreeSet<Station>,
}

impl SelectionState {
    /// Empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the non-operational stations of `line`.
    ///
    /// Nothing changes when any station fails validation.
    pub fn set_exclusions(
        &mut self,
        registry: &StationRegistry,
        line: Line,
        stations: impl IntoIterator<Item = Station>,
    ) -> Result<(), RotationError> {
        let mut next = BTreeSet::new();
        for station in stations {
            validate_member(registry, line, &station)?;
            if self.accommodations.contains(&station) {
                return Err(RotationError::invalid(
                    line,
                    format!("station {station} is marked for accommodation"),
                ));
            }
            next.insert(station);
        }
        self.exclusions[line.index()] = next;
        Ok(())
    }

    /// Replace the accommodation stations of line C.
    ///
    /// Accommodated stations are removed from line C's non-operational set.
    pub fn set_accommodations(
        &mut self,
        registry: &StationRegistry,
        stations: impl IntoIterator<Item = Station>,
    ) -> Result<(), RotationError> {
        let mut next = BTreeSet::new();
        for station in stations {
            if !station.line.supports_accommodations() {
                return Err(RotationError::invalid(
                    station.line,
                    "accommodations are only tracked on line C",
                ));
            }
            validate_member(registry, Line::C, &station)?;
            next.insert(station);
        }
        let excluded = &mut self.exclusions[Line::C.index()];
        excluded.retain(|station| !next.contains(station));
        self.accommodations = next;
        Ok(())
    }

    /// Flip the non-operational flag of `station`, returning the new state.
    pub fn toggle_exclusion(
        &mut self,
        registry: &StationRegistry,
        station: Station,
    ) -> Result<bool, RotationError> {
        validate_member(registry, station.line, &station)?;
        let excluded = &mut self.exclusions[station.line.index()];
        if excluded.remove(&station) {
            return Ok(false);
        }
        if self.accommodations.contains(&station) {
            return Err(RotationError::invalid(
                station.line,
                format!("station {station} is marked for accommodation"),
            ));
        }
        excluded.insert(station);
        Ok(true)
    }

    /// Flip the accommodation flag of `station`, returning the new state.
    pub fn toggle_accommodation(
        &mut self,
        registry: &StationRegistry,
        station: Station,
    ) -> Result<bool, RotationError> {
        if !station.line.supports_accommodations() {
            return Err(RotationError::invalid(
                station.line,
                "accommodations are only tracked on line C",
            ));
        }
        validate_member(registry, station.line, &station)?;
        if self.accommodations.remove(&station) {
            return Ok(false);
        }
        self.exclusions[station.line.index()].remove(&station);
        self.accommodations.insert(station);
        Ok(true)
    }

    /// Non-operational stations of `line`.
    pub fn exclusions(&self, line: Line) -> &BTreeSet<Station> {
        &self.exclusions[line.index()]
    }

    /// Accommodation stations of line C.
    pub fn accommodations(&self) -> &BTreeSet<Station> {
        &self.accommodations
    }

    /// Accommodation stations for `line`; always empty outside line C.
    pub fn accommodations_for(&self, line: Line) -> BTreeSet<Station> {
        if line.supports_accommodations() {
            self.accommodations.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Whether `station` is marked non-operational.
    pub fn is_excluded(&self, station: &Station) -> bool {
        self.exclusions[station.line.index()].contains(station)
    }

    /// Whether `station` is marked for accommodation.
    pub fn is_accommodated(&self, station: &Station) -> bool {
        self.accommodations.contains(station)
    }

    /// Drop every selection made for `line`.
    pub fn clear_line(&mut self, line: Line) {
        self.exclusions[line.index()].clear();
        if line.supports_accommodations() {
            self.accommodations.clear();
        }
    }

    /// Drop every selection.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether nothing has been selected on any line.
    pub fn is_empty(&self) -> bool {
        self.accommodations.is_empty() && self.exclusions.iter().all(BTreeSet::is_empty)
    }
}

fn validate_member(
    registry: &StationRegistry,
    line: Line,
    station: &Station,
) -> Result<(), RotationError> {
    if station.line != line {
        return Err(RotationError::invalid(
            line,
            format!("station {station} belongs to line {}", station.line),
        ));
    }
    registry.stations_for(line)?;
    if !registry.contains(station) {
        return Err(RotationError::invalid(
            line,
            format!("station {station} is not part of line {line}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> StationRegistry {
        StationRegistry::from_sizes([(Line::B, 5), (Line::C, 6)])
    }

    #[test]
    fn set_exclusions_rejects_foreign_stations() {
        let registry = registry();
        let mut selection = SelectionState::new();
        selection
            .set_exclusions(&registry, Line::B, [Station::new(Line::B, 3)])
            .expect("valid selection");

        let err = selection
            .set_exclusions(
                &registry,
                Line::B,
                [Station::new(Line::B, 1), Station::new(Line::C, 2)],
            )
            .unwrap_err();
        assert!(matches!(err, RotationError::InvalidSelection { line: Line::B, .. }));
        let err = selection
            .set_exclusions(&registry, Line::B, [Station::new(Line::B, 9)])
            .unwrap_err();
        assert!(matches!(err, RotationError::InvalidSelection { .. }));

        // failed calls leave the previous selection untouched
        assert_eq!(
            selection.exclusions(Line::B).iter().copied().collect::<Vec<_>>(),
            vec![Station::new(Line::B, 3)]
        );
    }

    #[test]
    fn unregistered_line_is_unknown() {
        let registry = registry();
        let mut selection = SelectionState::new();
        let err = selection
            .set_exclusions(&registry, Line::O, [Station::new(Line::O, 1)])
            .unwrap_err();
        assert_eq!(err, RotationError::UnknownLine("O".to_string()));
    }

    #[test]
    fn accommodations_are_line_c_only() {
        let registry = StationRegistry::standard();
        let mut selection = SelectionState::new();
        let err = selection
            .set_accommodations(&registry, [Station::new(Line::M, 2)])
            .unwrap_err();
        assert!(matches!(err, RotationError::InvalidSelection { line: Line::M, .. }));
        let err = selection
            .toggle_accommodation(&registry, Station::new(Line::B, 2))
            .unwrap_err();
        assert!(matches!(err, RotationError::InvalidSelection { line: Line::B, .. }));
        assert!(selection.accommodations().is_empty());
        assert!(selection.accommodations_for(Line::B).is_empty());
    }

    #[test]
    fn accommodation_takes_precedence_over_exclusion() {
        let registry = registry();
        let mut selection = SelectionState::new();
        let c2 = Station::new(Line::C, 2);
        let c4 = Station::new(Line::C, 4);
        selection
            .set_exclusions(&registry, Line::C, [c2, c4])
            .expect("valid selection");
        selection
            .set_accommodations(&registry, [c2])
            .expect("valid accommodation");
        assert!(selection.is_accommodated(&c2));
        assert!(!selection.is_excluded(&c2));
        assert!(selection.is_excluded(&c4));

        let err = selection.toggle_exclusion(&registry, c2).unwrap_err();
        assert!(matches!(err, RotationError::InvalidSelection { line: Line::C, .. }));
        let err = selection
            .set_exclusions(&registry, Line::C, [c2])
            .unwrap_err();
        assert!(matches!(err, RotationError::InvalidSelection { .. }));
    }

    #[test]
    fn toggles_flip_membership() -> Result<(), RotationError> {
        let registry = registry();
        let mut selection = SelectionState::new();
        let b1 = Station::new(Line::B, 1);
        let c3 = Station::new(Line::C, 3);

        assert!(selection.toggle_exclusion(&registry, b1)?);
        assert!(selection.is_excluded(&b1));
        assert!(!selection.toggle_exclusion(&registry, b1)?);
        assert!(!selection.is_excluded(&b1));

        assert!(selection.toggle_exclusion(&registry, c3)?);
        assert!(selection.toggle_accommodation(&registry, c3)?);
        assert!(!selection.is_excluded(&c3));
        assert!(selection.is_accommodated(&c3));
        assert!(!selection.toggle_accommodation(&registry, c3)?);
        assert!(selection.is_empty());
        Ok(())
    }

    #[test]
    fn clear_line_drops_line_c_accommodations() -> Result<(), RotationError> {
        let registry = registry();
        let mut selection = SelectionState::new();
        selection.toggle_exclusion(&registry, Station::new(Line::B, 2))?;
        selection.toggle_accommodation(&registry, Station::new(Line::C, 1))?;

        selection.clear_line(Line::B);
        assert!(selection.exclusions(Line::B).is_empty());
        assert!(!selection.accommodations().is_empty());

        selection.clear_line(Line::C);
        assert!(selection.is_empty());
        Ok(())
    }
}
