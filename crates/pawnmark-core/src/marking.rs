//! Per-entity marking state
//!
//! Four maps keyed by [`ThingId`]: explicit marks chosen by the player,
//! automatic token lists, override token lists and custom icon paths.
//! Every mutation keeps the invariant that an empty list is never stored.

use crate::snapshot::{MapSnapshot, MarkingSnapshot};
use crate::{Error, MarkerToken, PawnStore, Result, ThingId};
use indexmap::IndexMap;
use std::fmt;
use tracing::{debug, warn};

/// A marking the player chose by hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplicitMark {
    /// Icon `n` (1-based) of the category's marker set
    Index(u32),
    /// Follow the automatic rules
    Automatic,
    /// Use the custom icon path stored for the entity
    Custom,
}

impl ExplicitMark {
    const AUTOMATIC: i32 = -1;
    const CUSTOM: i32 = -2;

    /// Persisted form
    pub fn to_raw(self) -> i32 {
        match self {
            ExplicitMark::Index(n) => i32::try_from(n).unwrap_or(i32::MAX),
            ExplicitMark::Automatic => Self::AUTOMATIC,
            ExplicitMark::Custom => Self::CUSTOM,
        }
    }

    /// Parse the persisted form; 0 means "no explicit mark"
    pub fn from_raw(raw: i32) -> Result<Option<Self>> {
        match raw {
            0 => Ok(None),
            Self::AUTOMATIC => Ok(Some(ExplicitMark::Automatic)),
            Self::CUSTOM => Ok(Some(ExplicitMark::Custom)),
            n if n > 0 => Ok(Some(ExplicitMark::Index(n.unsigned_abs()))),
            n => Err(Error::InvalidField {
                field: "explicit mark",
                value: n.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExplicitMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_raw())
    }
}

/// Marking state for every tracked thing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkingStore {
    explicit: IndexMap<ThingId, ExplicitMark>,
    automatic: IndexMap<ThingId, Vec<MarkerToken>>,
    overrides: IndexMap<ThingId, Vec<MarkerToken>>,
    custom: IndexMap<ThingId, String>,
}

impl MarkingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn explicit(&self, id: ThingId) -> Option<ExplicitMark> {
        self.explicit.get(&id).copied()
    }

    /// Set or clear (`None`) the explicit mark
    pub fn set_explicit(&mut self, id: ThingId, mark: Option<ExplicitMark>) {
        match mark {
            Some(mark) => {
                self.explicit.insert(id, mark);
            }
            None => {
                self.explicit.shift_remove(&id);
            }
        }
    }

    pub fn automatic(&self, id: ThingId) -> &[MarkerToken] {
        self.automatic.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Store the automatic result; an empty list clears the entry
    pub fn set_automatic(&mut self, id: ThingId, tokens: Vec<MarkerToken>) {
        Self::put(&mut self.automatic, id, tokens);
    }

    pub fn overrides(&self, id: ThingId) -> &[MarkerToken] {
        self.overrides.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Store the override result; an empty list clears the entry
    pub fn set_overrides(&mut self, id: ThingId, tokens: Vec<MarkerToken>) {
        Self::put(&mut self.overrides, id, tokens);
    }

    pub fn custom(&self, id: ThingId) -> Option<&str> {
        self.custom.get(&id).map(String::as_str)
    }

    /// Set or clear (`None`) the custom icon path
    pub fn set_custom(&mut self, id: ThingId, path: Option<String>) {
        match path.filter(|p| !p.is_empty()) {
            Some(path) => {
                self.custom.insert(id, path);
            }
            None => {
                self.custom.shift_remove(&id);
            }
        }
    }

    fn put(map: &mut IndexMap<ThingId, Vec<MarkerToken>>, id: ThingId, tokens: Vec<MarkerToken>) {
        if tokens.is_empty() {
            map.shift_remove(&id);
        } else {
            map.insert(id, tokens);
        }
    }

    /// Drop one token from both token lists of an entity
    pub(crate) fn forget_token(&mut self, id: ThingId, token: &MarkerToken) {
        for map in [&mut self.automatic, &mut self.overrides] {
            if let Some(tokens) = map.get_mut(&id) {
                tokens.retain(|t| t != token);
                if tokens.is_empty() {
                    map.shift_remove(&id);
                }
            }
        }
    }

    /// Remove every entry for an entity
    pub fn clear(&mut self, id: ThingId) {
        self.explicit.shift_remove(&id);
        self.automatic.shift_remove(&id);
        self.overrides.shift_remove(&id);
        self.custom.shift_remove(&id);
    }

    /// Whether any map holds an entry for the entity
    pub fn contains(&self, id: ThingId) -> bool {
        self.explicit.contains_key(&id)
            || self.automatic.contains_key(&id)
            || self.overrides.contains_key(&id)
            || self.custom.contains_key(&id)
    }

    /// Rekey every entry from `from` to `to`
    ///
    /// Entries already stored under `to` are replaced, so afterwards `to`
    /// holds exactly what `from` held and `from` is absent everywhere.
    pub fn transfer(&mut self, from: ThingId, to: ThingId) {
        if from == to {
            return;
        }
        Self::rekey(&mut self.explicit, from, to);
        Self::rekey(&mut self.automatic, from, to);
        Self::rekey(&mut self.overrides, from, to);
        Self::rekey(&mut self.custom, from, to);
    }

    fn rekey<V>(map: &mut IndexMap<ThingId, V>, from: ThingId, to: ThingId) {
        match map.shift_remove(&from) {
            Some(value) => {
                map.insert(to, value);
            }
            None => {
                map.shift_remove(&to);
            }
        }
    }

    /// Remove entries whose key is no longer tracked by the host
    ///
    /// Returns the number of entries removed across all maps.
    pub fn compact(&mut self, pawns: &PawnStore) -> usize {
        let before = self.entry_count();
        self.explicit.retain(|id, _| pawns.contains(*id));
        self.automatic.retain(|id, _| pawns.contains(*id));
        self.overrides.retain(|id, _| pawns.contains(*id));
        self.custom.retain(|id, _| pawns.contains(*id));
        let removed = before - self.entry_count();
        if removed > 0 {
            debug!("Compacted {} marking entries", removed);
        }
        removed
    }

    /// Total number of entries across all four maps
    pub fn entry_count(&self) -> usize {
        self.explicit.len() + self.automatic.len() + self.overrides.len() + self.custom.len()
    }

    /// Every entity with at least one entry
    pub fn ids(&self) -> impl Iterator<Item = ThingId> + '_ {
        let mut ids: Vec<ThingId> = self
            .explicit
            .keys()
            .chain(self.automatic.keys())
            .chain(self.overrides.keys())
            .chain(self.custom.keys())
            .copied()
            .collect();
        ids.sort();
        ids.dedup();
        ids.into_iter()
    }

    pub fn to_snapshot(&self) -> MarkingSnapshot {
        MarkingSnapshot {
            explicit: MapSnapshot::from_pairs(
                self.explicit.iter().map(|(id, mark)| (*id, mark.to_raw())),
            ),
            automatic: MapSnapshot::from_pairs(
                self.automatic
                    .iter()
                    .map(|(id, tokens)| (*id, MarkerToken::join(tokens))),
            ),
            overrides: MapSnapshot::from_pairs(
                self.overrides
                    .iter()
                    .map(|(id, tokens)| (*id, MarkerToken::join(tokens))),
            ),
            custom: MapSnapshot::from_pairs(
                self.custom.iter().map(|(id, path)| (*id, path.clone())),
            ),
        }
    }

    /// Rebuild the store from a snapshot
    ///
    /// Mismatched key and value lists are an error. Individual values that
    /// fail to parse are skipped with a warning.
    pub fn from_snapshot(snapshot: &MarkingSnapshot) -> Result<Self> {
        let mut store = Self::new();
        for (id, raw) in Self::pairs("explicit", &snapshot.explicit)? {
            match ExplicitMark::from_raw(*raw) {
                Ok(mark) => store.set_explicit(id, mark),
                Err(e) => warn!("Skipping explicit mark for {}: {}", id, e),
            }
        }
        for (id, blob) in Self::pairs("automatic", &snapshot.automatic)? {
            match MarkerToken::split(blob) {
                Ok(tokens) => store.set_automatic(id, tokens),
                Err(e) => warn!("Skipping automatic marking for {}: {}", id, e),
            }
        }
        for (id, blob) in Self::pairs("overrides", &snapshot.overrides)? {
            match MarkerToken::split(blob) {
                Ok(tokens) => store.set_overrides(id, tokens),
                Err(e) => warn!("Skipping override marking for {}: {}", id, e),
            }
        }
        for (id, path) in Self::pairs("custom", &snapshot.custom)? {
            store.set_custom(id, Some(path.clone()));
        }
        Ok(store)
    }

    fn pairs<'a, V>(
        map: &'static str,
        snapshot: &'a MapSnapshot<V>,
    ) -> Result<impl Iterator<Item = (ThingId, &'a V)>> {
        if snapshot.keys.len() != snapshot.values.len() {
            return Err(Error::SnapshotMismatch {
                map,
                keys: snapshot.keys.len(),
                values: snapshot.values.len(),
            });
        }
        Ok(snapshot.keys.iter().copied().zip(snapshot.values.iter()))
    }
}
