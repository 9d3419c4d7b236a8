//! Error types for pawnmark-core

use crate::{Expansion, PawnType};
use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Cannot enable rule: {0}")]
    CannotEnable(String),

    #[error("Rule not found at index {0}")]
    RuleNotFound(usize),

    #[error("Rule at index {0} changed while it was being edited")]
    StaleDraft(usize),

    #[error("Rule is malformed: {0}")]
    MalformedRule(String),

    #[error("Pawn type {pawn_type} is not valid for {kind} rules")]
    InapplicablePawnType { kind: String, pawn_type: PawnType },

    #[error("Rule kind mismatch: expected {expected}, got {got}")]
    KindMismatch { expected: String, got: String },

    #[error("Marker set not found: {0}")]
    MarkerSetNotFound(String),

    #[error("Marker index {index} out of range for set {set} ({count} icons)")]
    MarkerIndexOutOfRange {
        set: String,
        index: usize,
        count: usize,
    },

    #[error("Invalid rule parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid field {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("Expansion not installed: {0}")]
    MissingExpansion(Expansion),

    #[error("Query not available: {0}")]
    QueryUnavailable(String),

    #[error("Snapshot map {map} has {keys} keys but {values} values")]
    SnapshotMismatch {
        map: &'static str,
        keys: usize,
        values: usize,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
