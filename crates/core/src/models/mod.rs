//! Shared domain models.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::RotationError;

/// Production line identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Line {
    /// Line B.
    B,
    /// Line C, the only line with accommodation stations.
    C,
    /// Line L.
    L,
    /// Line M.
    M,
    /// Line N.
    N,
    /// Line O.
    O,
}

impl Line {
    /// Number of known lines.
    pub const COUNT: usize = 6;

    /// Every line in display order.
    pub const ALL: [Line; Line::COUNT] = [Line::B, Line::C, Line::L, Line::M, Line::N, Line::O];

    /// Lines laid out in the left and right print columns.
    pub const COLUMNS: [[Line; 3]; 2] = [[Line::B, Line::C, Line::L], [Line::M, Line::N, Line::O]];

    /// Position of the line inside [`Line::ALL`].
    pub fn index(self) -> usize {
        match self {
            Line::B => 0,
            Line::C => 1,
            Line::L => 2,
            Line::M => 3,
            Line::N => 4,
            Line::O => 5,
        }
    }

    /// One-letter identifier.
    pub fn as_char(self) -> char {
        match self {
            Line::B => 'B',
            Line::C => 'C',
            Line::L => 'L',
            Line::M => 'M',
            Line::N => 'N',
            Line::O => 'O',
        }
    }

    /// Whether stations on this line can be marked for accommodation.
    pub fn supports_accommodations(self) -> bool {
        self == Line::C
    }

    /// Returns a user-facing label such as `Line B`.
    pub fn display_name(self) -> String {
        format!("Line {}", self.as_char())
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Line {
    type Err = RotationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let mut chars = trimmed.chars();
        let line = match (chars.next().map(|ch| ch.to_ascii_uppercase()), chars.next()) {
            (Some('B'), None) => Line::B,
            (Some('C'), None) => Line::C,
            (Some('L'), None) => Line::L,
            (Some('M'), None) => Line::M,
            (Some('N'), None) => Line::N,
            (Some('O'), None) => Line::O,
            _ => return Err(RotationError::UnknownLine(trimmed.to_string())),
        };
        Ok(line)
    }
}

/// A station on a production line.
///
/// Stations sort by line first, then by number, which matches registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Station {
    /// Owning line.
    pub line: Line,
    /// Position on the line, starting at 1.
    pub number: u32,
}

impl Station {
    /// Build a station reference.
    pub fn new(line: Line, number: u32) -> Self {
        Self { line, number }
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.line, self.number)
    }
}

/// Stations that rotate with each other for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RotationPair {
    /// Two stations whose operators alternate.
    Pair {
        /// First station in line order.
        first: Station,
        /// Second station in line order.
        second: Station,
    },
    /// Odd leftover station, shown as a pair of one.
    Single {
        /// The leftover station.
        station: Station,
    },
}

impl RotationPair {
    /// Stations covered by this pair, in line order.
    pub fn stations(&self) -> Vec<Station> {
        match *self {
            RotationPair::Pair { first, second } => vec![first, second],
            RotationPair::Single { station } => vec![station],
        }
    }

    /// Whether this is the odd leftover.
    pub fn is_single(&self) -> bool {
        matches!(self, RotationPair::Single { .. })
    }

    /// Print label using station numbers, e.g. `3-4`; a singleton reads `7-7`.
    pub fn label(&self) -> String {
        match *self {
            RotationPair::Pair { first, second } => format!("{}-{}", first.number, second.number),
            RotationPair::Single { station } => format!("{0}-{0}", station.number),
        }
    }
}
