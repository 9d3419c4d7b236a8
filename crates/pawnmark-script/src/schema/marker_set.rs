//! Marker set definition schema

use pawnmark_core::{DefId, IconDef, MarkerSet};
use serde::{Deserialize, Serialize};

/// Definition of a marker set (e.g., shapes, numbers, faction colours)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSetDef {
    /// Unique identifier for this marker set
    pub id: DefId,
    /// Display name; defaults to the id
    #[serde(default)]
    pub label: Option<String>,
    /// Texture paths, in icon order
    pub icons: Vec<String>,
}

impl MarkerSetDef {
    /// Create a new marker set definition
    pub fn new(id: impl Into<DefId>, icons: &[&str]) -> Self {
        Self {
            id: id.into(),
            label: None,
            icons: icons.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    /// Convert into the runtime marker set
    pub fn to_marker_set(&self) -> MarkerSet {
        MarkerSet {
            id: self.id.clone(),
            label: self.label.clone().unwrap_or_else(|| self.id.to_string()),
            icons: self
                .icons
                .iter()
                .map(|texture| IconDef {
                    texture: texture.clone(),
                })
                .collect(),
        }
    }
}

/// A collection of marker set definitions
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MarkerSetDefs {
    pub marker_sets: Vec<MarkerSetDef>,
}
