//! Identity types for things and definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-assigned load ID of a pawn, corpse or vehicle
///
/// The host hands out these numbers and keeps them across save and load,
/// so every per-thing map in the marking store is keyed by them. A corpse
/// gets a fresh ID; [`MarkingStore::transfer`](crate::MarkingStore::transfer)
/// moves the living pawn's entries over to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThingId(pub u64);

impl ThingId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Shown as `thing:<n>` so log lines can tell thing IDs from marker
/// indices and tick counts
impl fmt::Display for ThingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "thing:{}", self.0)
    }
}

/// Identifier for a game definition (trait, skill, hediff, marker set, ...)
///
/// Definitions are referenced by their def name so they survive save/load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefId(pub String);

impl DefId {
    /// Create a new definition ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DefId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DefId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for DefId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thing_id() {
        let id = ThingId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "thing:42");
    }

    #[test]
    fn test_def_id() {
        let id = DefId::new("Psychopath");
        assert_eq!(id.as_str(), "Psychopath");
        assert_eq!(format!("{}", id), "Psychopath");
        assert!(id == *"Psychopath");
    }
}
