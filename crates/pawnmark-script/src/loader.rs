//! RON content loader

use crate::error::{Error, Result};
use crate::schema::{ExpansionDefs, MarkerSetDef, MarkerSetDefs};
use indexmap::IndexMap;
use pawnmark_core::{Catalog, DefId, Expansion};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Loaded content definitions
#[derive(Debug, Default)]
pub struct ContentDefs {
    /// Marker set definitions by ID, in load order
    pub marker_sets: IndexMap<DefId, MarkerSetDef>,
    /// Installed expansions
    pub expansions: Vec<Expansion>,
}

impl ContentDefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_marker_set(&self, id: &DefId) -> Option<&MarkerSetDef> {
        self.marker_sets.get(id)
    }

    /// Build the session catalog from the loaded definitions
    pub fn to_catalog(&self) -> Catalog {
        let mut catalog = Catalog::new();
        for def in self.marker_sets.values() {
            catalog.marker_sets.insert(def.to_marker_set());
        }
        for expansion in &self.expansions {
            catalog.install(*expansion);
        }
        catalog
    }
}

/// Loader for RON content files
pub struct Loader {
    defs: ContentDefs,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            defs: ContentDefs::new(),
        }
    }

    /// Load a single RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        debug!("Loading content from {}", path.display());

        if content.contains("marker_sets:") {
            self.load_marker_sets_str(&content)
        } else if content.contains("expansions:") {
            self.load_expansions_str(&content)
        } else {
            self.load_single_definition(&content)
        }
    }

    /// Load marker sets from a RON string
    pub fn load_marker_sets_str(&mut self, content: &str) -> Result<()> {
        let file: MarkerSetDefs = ron::from_str(content)?;
        for def in file.marker_sets {
            self.insert_marker_set(def)?;
        }
        Ok(())
    }

    /// Load installed expansions from a RON string
    pub fn load_expansions_str(&mut self, content: &str) -> Result<()> {
        let file: ExpansionDefs = ron::from_str(content)?;
        for expansion in file.expansions {
            if !self.defs.expansions.contains(&expansion) {
                self.defs.expansions.push(expansion);
            }
        }
        Ok(())
    }

    /// Load a file holding one bare marker set definition
    fn load_single_definition(&mut self, content: &str) -> Result<()> {
        let def: MarkerSetDef = ron::from_str(content)?;
        self.insert_marker_set(def)
    }

    fn insert_marker_set(&mut self, def: MarkerSetDef) -> Result<()> {
        if def.icons.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "marker set {} has no icons",
                def.id
            )));
        }
        if self.defs.marker_sets.contains_key(&def.id) {
            return Err(Error::DuplicateDefinition(def.id.to_string()));
        }
        self.defs.marker_sets.insert(def.id.clone(), def);
        Ok(())
    }

    /// Load all RON files from a directory, recursing into subdirectories
    ///
    /// Entries are visited in name order so the registry order is stable.
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for file_path in entries {
            if file_path.extension().is_some_and(|e| e == "ron") {
                self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                self.load_directory(&file_path)?;
            }
        }

        Ok(())
    }

    /// Finish loading and return the content definitions
    pub fn finish(self) -> ContentDefs {
        self.defs
    }

    /// Get the current definitions (for inspection during loading)
    pub fn defs(&self) -> &ContentDefs {
        &self.defs
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
