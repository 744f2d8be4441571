#![warn(clippy::all, missing_docs)]

//! Core domain logic for the station rotation form.
//!
//! This crate hosts the station registry, the per-session selection
//! state, the rotation pairing generator, and the print/export layer
//! used by the terminal UI and any future frontends.

pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod print;
pub mod registry;
pub mod rotation;
pub mod selection;
pub mod session;

pub use config::AppConfig;
pub use error::RotationError;
pub use export::{ExportEntry, ScheduleExporter};
pub use models::{Line, RotationPair, Station};
pub use print::PrintOptions;
pub use registry::StationRegistry;
pub use rotation::{generate, generate_schedule, LineRotation, Schedule};
pub use selection::SelectionState;
pub use session::FormSession;
