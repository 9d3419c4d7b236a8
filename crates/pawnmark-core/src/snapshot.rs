//! Persisted forms of settings and per-save markings
//!
//! Both snapshots are flat serde values. Settings carry rules as blobs so a
//! rule that no longer loads still round-trips unchanged.

use crate::{MarkerSettings, PawnType, ThingId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-category marker set and opt-in flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySettings {
    /// Marker set used for explicit marks on this category
    #[serde(default)]
    pub marker_set: Option<crate::DefId>,
    /// Whether things of this category are marked at all
    pub enabled: bool,
}

impl Default for CategorySettings {
    fn default() -> Self {
        Self {
            marker_set: None,
            enabled: true,
        }
    }
}

/// Global mod settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsSnapshot {
    /// Rule blobs in list order
    pub rules: Vec<String>,
    pub refresh_rules_periodically: bool,
    pub show_on_corpses: bool,
    pub separate_temporary_markers: bool,
    pub rotate_icons: bool,
    pub show_multiple_markers: bool,
    pub icon_size: f32,
    pub icon_offset: f32,
    pub pulsing: bool,
    pub categories: IndexMap<PawnType, CategorySettings>,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        MarkerSettings::default().to_snapshot()
    }
}

/// One per-entity map as parallel key and value lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSnapshot<V> {
    pub keys: Vec<ThingId>,
    pub values: Vec<V>,
}

impl<V> Default for MapSnapshot<V> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<V> MapSnapshot<V> {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (ThingId, V)>) -> Self {
        let (keys, values) = pairs.into_iter().unzip();
        Self { keys, values }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.values.is_empty()
    }
}

/// Per-save marking state
///
/// Explicit marks use their raw form (`n >= 1`, `-1` automatic, `-2`
/// custom). Token lists use their joined blob form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkingSnapshot {
    pub explicit: MapSnapshot<i32>,
    pub automatic: MapSnapshot<String>,
    pub overrides: MapSnapshot<String>,
    pub custom: MapSnapshot<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_snapshot_ron() {
        let mut snapshot = SettingsSnapshot::default();
        snapshot.rules = vec![
            "Drafted;;A;0;true;0;Colonist".to_string(),
            "Weapon;;INVALID;X;true;0".to_string(),
        ];
        snapshot.categories.insert(
            PawnType::Enemy,
            CategorySettings {
                marker_set: Some(crate::DefId::new("B")),
                enabled: false,
            },
        );

        let text = ron::to_string(&snapshot).unwrap();
        let restored: SettingsSnapshot = ron::from_str(&text).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let restored: SettingsSnapshot = ron::from_str("(rules: [], pulsing: true)").unwrap();
        assert!(restored.pulsing);
        assert_eq!(restored.icon_size, SettingsSnapshot::default().icon_size);

        let marking: MarkingSnapshot =
            ron::from_str(r#"(custom: (keys: [3], values: ["x"]))"#).unwrap();
        assert!(marking.explicit.is_empty());
        assert_eq!(marking.custom.keys, vec![ThingId(3)]);
    }

    #[test]
    fn test_marking_snapshot_ron() {
        let snapshot = MarkingSnapshot {
            explicit: MapSnapshot::from_pairs([(ThingId(1), 2), (ThingId(2), -2)]),
            automatic: MapSnapshot::from_pairs([(ThingId(1), "A;1|$FactionIcon".to_string())]),
            overrides: MapSnapshot::default(),
            custom: MapSnapshot::from_pairs([(ThingId(2), "Icons/custom".to_string())]),
        };

        let text = ron::to_string(&snapshot).unwrap();
        let restored: MarkingSnapshot = ron::from_str(&text).unwrap();
        assert_eq!(restored, snapshot);
    }
}
