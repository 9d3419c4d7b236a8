//! Pawnmark Script - RON loader and persistence
//!
//! Loads marker content from RON files and stores game state as RON:
//! - Marker set definitions and installed expansions
//! - Mod settings (`SettingsSnapshot`)
//! - Per-save markings (`MarkingSnapshot`)

mod error;
mod loader;
pub mod persist;
mod schema;

pub use error::{Error, Result};
pub use loader::{ContentDefs, Loader};
pub use persist::{read_markings, read_settings, write_markings, write_settings};
pub use schema::{ExpansionDefs, MarkerSetDef, MarkerSetDefs};
