//! Cache of icons computed from pawn state
//!
//! Faction and ideology icons depend on what the pawn currently belongs to.
//! The paths are rebuilt lazily on first use after an invalidation; a
//! rebuild always gives the same answer for the same pawn state.

use crate::{Pawn, PawnStore, ThingId};
use std::collections::HashMap;

/// Dynamic icon paths for one pawn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicIcons {
    pub faction: Option<String>,
    pub ideology: Option<String>,
}

impl DynamicIcons {
    fn build(pawn: &Pawn) -> Self {
        Self {
            faction: pawn.faction.as_ref().map(|f| f.icon.clone()),
            ideology: pawn.ideology.as_ref().map(|i| i.icon.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IconCache {
    entries: HashMap<ThingId, DynamicIcons>,
}

impl IconCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Icons for `pawn`, rebuilding them if needed
    pub fn icons_for(&mut self, pawn: &Pawn) -> &DynamicIcons {
        self.entries
            .entry(pawn.id)
            .or_insert_with(|| DynamicIcons::build(pawn))
    }

    pub fn is_cached(&self, id: ThingId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Forget the icons of one thing; the next lookup rebuilds them
    pub fn invalidate(&mut self, id: ThingId) {
        self.entries.remove(&id);
    }

    /// Drop entries for things the host no longer tracks
    pub fn retain(&mut self, pawns: &PawnStore) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| pawns.contains(*id));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DefId, FactionInfo, PawnType};

    fn pawn(icon: &str) -> Pawn {
        let mut pawn = Pawn::new(ThingId::new(1), PawnType::Enemy);
        pawn.faction = Some(FactionInfo {
            def: DefId::new("Pirates"),
            icon: icon.to_string(),
            is_leader: false,
        });
        pawn
    }

    #[test]
    fn test_icons_are_cached_until_invalidated() {
        let mut cache = IconCache::new();
        assert_eq!(
            cache.icons_for(&pawn("Icons/pirate")).faction.as_deref(),
            Some("Icons/pirate")
        );

        // Stale until invalidated
        assert_eq!(
            cache.icons_for(&pawn("Icons/outlander")).faction.as_deref(),
            Some("Icons/pirate")
        );

        cache.invalidate(ThingId::new(1));
        assert!(!cache.is_cached(ThingId::new(1)));
        let icons = cache.icons_for(&pawn("Icons/outlander"));
        assert_eq!(icons.faction.as_deref(), Some("Icons/outlander"));
        assert_eq!(icons.ideology, None);
    }

    #[test]
    fn test_retain() {
        let mut cache = IconCache::new();
        cache.icons_for(&pawn("Icons/pirate"));
        assert_eq!(cache.retain(&PawnStore::new()), 1);
        assert!(cache.is_empty());
    }
}
