//! Schema definitions for RON content files

pub mod marker_set;

pub use marker_set::{MarkerSetDef, MarkerSetDefs};

use pawnmark_core::Expansion;
use serde::{Deserialize, Serialize};

/// Optional content installed in this session
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExpansionDefs {
    pub expansions: Vec<Expansion>,
}
