//! Host-side view of pawns, corpses and vehicles
//!
//! The host mirrors the facts rules look at into a [`PawnStore`]. Rules only
//! ever read from it; the host keeps it current as its own state changes.

use crate::{DefId, ThingId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Coarse classification of a marked thing
///
/// `Default` doubles as "unrestricted" when used as a rule limitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PawnType {
    #[default]
    Default,
    Colonist,
    Prisoner,
    Slave,
    Enemy,
    Neutral,
    Vehicle,
}

name_table!(PawnType {
    Default => "Default",
    Colonist => "Colonist",
    Prisoner => "Prisoner",
    Slave => "Slave",
    Enemy => "Enemy",
    Neutral => "Neutral",
    Vehicle => "Vehicle",
});

impl PawnType {
    /// Categories that have their own marker set and opt-in flag
    pub const CATEGORIES: [PawnType; 6] = [
        PawnType::Colonist,
        PawnType::Prisoner,
        PawnType::Slave,
        PawnType::Enemy,
        PawnType::Neutral,
        PawnType::Vehicle,
    ];

    /// Whether a rule limited to `self` accepts a pawn of category `other`
    pub fn admits(&self, other: PawnType) -> bool {
        *self == PawnType::Default || *self == other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Gender {
    #[default]
    None,
    Male,
    Female,
}

name_table!(Gender {
    None => "None",
    Male => "Male",
    Female => "Female",
});

/// Passion for a skill, ordered from none to major
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Passion {
    #[default]
    None = 0,
    Minor = 1,
    Major = 2,
}

impl Passion {
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Passion::None),
            1 => Some(Passion::Minor),
            2 => Some(Passion::Major),
            _ => None,
        }
    }

    pub fn level(&self) -> u8 {
        *self as u8
    }
}

/// Dynamic health categories a hediff may fall into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HediffCategory {
    Bleeding,
    Tendable,
    LifeThreatening,
    Addiction,
    Implant,
    MissingPart,
}

name_table!(HediffCategory {
    Bleeding => "Bleeding",
    Tendable => "Tendable",
    LifeThreatening => "LifeThreatening",
    Addiction => "Addiction",
    Implant => "Implant",
    MissingPart => "MissingPart",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuestStatus {
    Visitor,
    Lodger,
}

name_table!(GuestStatus {
    Visitor => "Visitor",
    Lodger => "Lodger",
});

/// What kind of body the pawn has
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Race {
    #[default]
    Humanlike,
    Animal(DefId),
    Mechanoid(DefId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitEntry {
    pub def: DefId,
    pub degree: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SkillRecord {
    pub level: u32,
    pub passion: Passion,
}

/// A health condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hediff {
    pub def: DefId,
    pub visible: bool,
    pub bad: bool,
    pub categories: Vec<HediffCategory>,
}

impl Hediff {
    /// A visible, bad hediff with no dynamic categories
    pub fn new(def: impl Into<DefId>) -> Self {
        Self {
            def: def.into(),
            visible: true,
            bad: true,
            categories: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: HediffCategory) -> Self {
        self.categories.push(category);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub def: DefId,
    pub ranged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apparel {
    pub def: DefId,
    pub tags: Vec<DefId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionInfo {
    pub def: DefId,
    pub icon: String,
    pub is_leader: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeologyInfo {
    pub def: DefId,
    pub icon: String,
    pub role: Option<DefId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub kind: DefId,
    pub other: ThingId,
}

/// Snapshot of one pawn, corpse or vehicle as rules see it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pawn {
    pub id: ThingId,
    pub pawn_type: PawnType,
    pub spawned: bool,
    pub dead: bool,
    pub drafted: bool,
    pub downed: bool,
    pub mental_state: Option<DefId>,
    pub gender: Gender,
    pub age_years: u32,
    pub race: Race,
    pub traits: Vec<TraitEntry>,
    pub skills: IndexMap<DefId, SkillRecord>,
    pub hediffs: Vec<Hediff>,
    pub weapon: Option<Weapon>,
    pub apparel: Vec<Apparel>,
    pub faction: Option<FactionInfo>,
    pub guest: Option<GuestStatus>,
    pub ideology: Option<IdeologyInfo>,
    pub title: Option<DefId>,
    pub xenotype: Option<DefId>,
    pub genes: Vec<DefId>,
    pub relations: Vec<Relation>,
}

impl Pawn {
    /// Create a spawned, living humanlike pawn with no other facts
    pub fn new(id: ThingId, pawn_type: PawnType) -> Self {
        Self {
            id,
            pawn_type,
            spawned: true,
            dead: false,
            drafted: false,
            downed: false,
            mental_state: None,
            gender: Gender::None,
            age_years: 0,
            race: Race::Humanlike,
            traits: Vec::new(),
            skills: IndexMap::new(),
            hediffs: Vec::new(),
            weapon: None,
            apparel: Vec::new(),
            faction: None,
            guest: None,
            ideology: None,
            title: None,
            xenotype: None,
            genes: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn with_trait(mut self, def: impl Into<DefId>, degree: i32) -> Self {
        self.traits.push(TraitEntry {
            def: def.into(),
            degree,
        });
        self
    }

    pub fn with_skill(mut self, def: impl Into<DefId>, level: u32, passion: Passion) -> Self {
        self.skills.insert(def.into(), SkillRecord { level, passion });
        self
    }

    pub fn with_hediff(mut self, hediff: Hediff) -> Self {
        self.hediffs.push(hediff);
        self
    }

    pub fn with_weapon(mut self, def: impl Into<DefId>, ranged: bool) -> Self {
        self.weapon = Some(Weapon {
            def: def.into(),
            ranged,
        });
        self
    }

    pub fn with_relation(mut self, kind: impl Into<DefId>, other: ThingId) -> Self {
        self.relations.push(Relation {
            kind: kind.into(),
            other,
        });
        self
    }

    /// Spawned and alive
    pub fn is_alive_and_spawned(&self) -> bool {
        self.spawned && !self.dead
    }

    pub fn has_trait(&self, def: &DefId, degree: Option<i32>) -> bool {
        self.traits
            .iter()
            .any(|t| &t.def == def && degree.is_none_or(|d| d == t.degree))
    }

    pub fn skill(&self, def: &DefId) -> Option<&SkillRecord> {
        self.skills.get(def)
    }

    pub fn has_hediff(&self, def: &DefId) -> bool {
        self.hediffs.iter().any(|h| &h.def == def)
    }

    pub fn has_hediff_category(&self, category: HediffCategory) -> bool {
        self.hediffs.iter().any(|h| h.categories.contains(&category))
    }
}

/// All things the host currently tracks, keyed by identity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PawnStore {
    pawns: IndexMap<ThingId, Pawn>,
}

impl PawnStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a pawn
    pub fn insert(&mut self, pawn: Pawn) {
        self.pawns.insert(pawn.id, pawn);
    }

    pub fn get(&self, id: ThingId) -> Option<&Pawn> {
        self.pawns.get(&id)
    }

    pub fn get_mut(&mut self, id: ThingId) -> Option<&mut Pawn> {
        self.pawns.get_mut(&id)
    }

    /// Remove a destroyed thing
    pub fn remove(&mut self, id: ThingId) -> Option<Pawn> {
        self.pawns.shift_remove(&id)
    }

    /// Move a pawn's record to its corpse and mark it dead
    ///
    /// Returns false if the pawn was not tracked.
    pub fn kill(&mut self, pawn: ThingId, corpse: ThingId) -> bool {
        let Some(mut record) = self.pawns.shift_remove(&pawn) else {
            return false;
        };
        record.id = corpse;
        record.dead = true;
        record.drafted = false;
        record.downed = false;
        record.mental_state = None;
        self.pawns.insert(corpse, record);
        true
    }

    pub fn contains(&self, id: ThingId) -> bool {
        self.pawns.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = ThingId> + '_ {
        self.pawns.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pawn> {
        self.pawns.values()
    }

    pub fn len(&self) -> usize {
        self.pawns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pawns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pawn_facts() {
        let pawn = Pawn::new(ThingId::new(1), PawnType::Colonist)
            .with_trait("Psychopath", 0)
            .with_trait("Industriousness", 2)
            .with_skill("Shooting", 10, Passion::Major)
            .with_hediff(Hediff::new("Flu").with_category(HediffCategory::Tendable));

        assert!(pawn.has_trait(&DefId::new("Psychopath"), None));
        assert!(pawn.has_trait(&DefId::new("Industriousness"), Some(2)));
        assert!(!pawn.has_trait(&DefId::new("Industriousness"), Some(-1)));
        assert_eq!(pawn.skill(&DefId::new("Shooting")).map(|s| s.level), Some(10));
        assert!(pawn.has_hediff_category(HediffCategory::Tendable));
        assert!(!pawn.has_hediff_category(HediffCategory::Bleeding));
    }

    #[test]
    fn test_store_kill_moves_record() {
        let mut store = PawnStore::new();
        let mut pawn = Pawn::new(ThingId::new(1), PawnType::Colonist);
        pawn.drafted = true;
        store.insert(pawn);

        assert!(store.kill(ThingId::new(1), ThingId::new(99)));
        assert!(!store.contains(ThingId::new(1)));

        let corpse = store.get(ThingId::new(99)).unwrap();
        assert!(corpse.dead);
        assert!(!corpse.drafted);
        assert_eq!(corpse.id, ThingId::new(99));

        assert!(!store.kill(ThingId::new(5), ThingId::new(6)));
    }

    #[test]
    fn test_pawn_type_names() {
        assert_eq!(PawnType::from_name("Colonist"), Some(PawnType::Colonist));
        assert_eq!(PawnType::from_name("colonist"), None);
        assert_eq!(PawnType::Vehicle.to_string(), "Vehicle");
        assert!(PawnType::Default.admits(PawnType::Enemy));
        assert!(!PawnType::Colonist.admits(PawnType::Enemy));
    }
}
