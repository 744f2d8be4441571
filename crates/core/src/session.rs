//! Day-scoped form session.

use chrono::NaiveDate;
use tracing::info;

use crate::selection::SelectionState;

/// Selections made on the form for a single calendar day.
///
/// Nothing here is persisted; a new day starts from an empty selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSession {
    date: NaiveDate,
    /// Current selections.
    pub selection: SelectionState,
}

impl FormSession {
    /// Start an empty session for `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: today,
            selection: SelectionState::new(),
        }
    }

    /// Day the session belongs to.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Reset the selections when `today` differs from the session day.
    ///
    /// Returns `true` when a reset happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if today == self.date {
            return false;
        }
        info!(previous = %self.date, today = %today, "New day; clearing station selections");
        self.date = today;
        self.selection.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Line, Station},
        registry::StationRegistry,
    };

    #[test]
    fn new_day_clears_selection() -> anyhow::Result<()> {
        let registry = StationRegistry::standard();
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).expect("valid date");
        let tuesday = monday.succ_opt().expect("valid date");

        let mut session = FormSession::new(monday);
        session
            .selection
            .toggle_exclusion(&registry, Station::new(Line::L, 4))?;

        assert!(!session.roll_over(monday));
        assert!(!session.selection.is_empty());

        assert!(session.roll_over(tuesday));
        assert_eq!(session.date(), tuesday);
        assert!(session.selection.is_empty());
        Ok(())
    }
}
