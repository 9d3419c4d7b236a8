//! Reading and writing persisted settings and save markings as RON

use crate::error::Result;
use pawnmark_core::{MarkingSnapshot, SettingsSnapshot};
use ron::ser::PrettyConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

fn to_ron<T: Serialize>(value: &T) -> Result<String> {
    Ok(ron::ser::to_string_pretty(value, PrettyConfig::default())?)
}

fn from_ron<T: DeserializeOwned>(content: &str) -> Result<T> {
    Ok(ron::from_str(content)?)
}

pub fn settings_to_string(snapshot: &SettingsSnapshot) -> Result<String> {
    to_ron(snapshot)
}

pub fn settings_from_str(content: &str) -> Result<SettingsSnapshot> {
    from_ron(content)
}

pub fn markings_to_string(snapshot: &MarkingSnapshot) -> Result<String> {
    to_ron(snapshot)
}

pub fn markings_from_str(content: &str) -> Result<MarkingSnapshot> {
    from_ron(content)
}

/// Read mod settings; a missing file yields the defaults
pub fn read_settings(path: impl AsRef<Path>) -> Result<SettingsSnapshot> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("No settings at {}, using defaults", path.display());
        return Ok(SettingsSnapshot::default());
    }
    settings_from_str(&fs::read_to_string(path)?)
}

pub fn write_settings(path: impl AsRef<Path>, snapshot: &SettingsSnapshot) -> Result<()> {
    fs::write(path, settings_to_string(snapshot)?)?;
    Ok(())
}

/// Read the markings stored with a save
pub fn read_markings(path: impl AsRef<Path>) -> Result<MarkingSnapshot> {
    markings_from_str(&fs::read_to_string(path)?)
}

pub fn write_markings(path: impl AsRef<Path>, snapshot: &MarkingSnapshot) -> Result<()> {
    fs::write(path, markings_to_string(snapshot)?)?;
    Ok(())
}
