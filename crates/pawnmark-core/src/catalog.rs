//! Session catalog: marker sets and installed expansions
//!
//! Decoding and validation need to know which marker sets exist and which
//! optional content is present. The catalog is built once per session and
//! passed by reference wherever that knowledge is needed.

use crate::{DefId, IconDef, MarkerSet, MarkerSetRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Optional content some rule kinds depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expansion {
    Royalty,
    Ideology,
    Biotech,
    Vehicles,
    QueryPlugin,
}

name_table!(Expansion {
    Royalty => "Royalty",
    Ideology => "Ideology",
    Biotech => "Biotech",
    Vehicles => "Vehicles",
    QueryPlugin => "QueryPlugin",
});

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub marker_sets: MarkerSetRegistry,
    expansions: HashSet<Expansion>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every expansion installed
    pub fn with_all_expansions() -> Self {
        Self {
            marker_sets: MarkerSetRegistry::new(),
            expansions: Expansion::ALL.iter().copied().collect(),
        }
    }

    pub fn with_marker_set(mut self, set: MarkerSet) -> Self {
        self.marker_sets.insert(set);
        self
    }

    pub fn with_expansion(mut self, expansion: Expansion) -> Self {
        self.expansions.insert(expansion);
        self
    }

    pub fn install(&mut self, expansion: Expansion) {
        self.expansions.insert(expansion);
    }

    pub fn has_expansion(&self, expansion: Expansion) -> bool {
        self.expansions.contains(&expansion)
    }

    pub fn icon(&self, set: &DefId, index: usize) -> Option<&IconDef> {
        self.marker_sets.icon(set, index)
    }
}
