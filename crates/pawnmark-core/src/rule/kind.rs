//! Rule kind registry
//!
//! Every rule kind has a persisted name, a fixed priority space, an optional
//! expansion dependency and the set of pawn categories it may be limited to.

use crate::{Catalog, Expansion, PawnType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    Weapon,
    WeaponType,
    Trait,
    Skill,
    HediffStatic,
    HediffDynamic,
    HediffAny,
    Relative,
    PawnType,
    Drafted,
    Downed,
    MentalState,
    Animal,
    Mechanoid,
    Gender,
    Age,
    Xenotype,
    Gene,
    Apparel,
    ApparelType,
    FactionIcon,
    FactionLeader,
    Guest,
    IdeologyIcon,
    IdeologyRole,
    Title,
    Query,
}

name_table!(RuleKind {
    Weapon => "Weapon",
    WeaponType => "WeaponType",
    Trait => "Trait",
    Skill => "Skill",
    HediffStatic => "HediffStatic",
    HediffDynamic => "HediffDynamic",
    HediffAny => "HediffAny",
    Relative => "Relative",
    PawnType => "PawnType",
    Drafted => "Drafted",
    Downed => "Downed",
    MentalState => "MentalState",
    Animal => "Animal",
    Mechanoid => "Mechanoid",
    Gender => "Gender",
    Age => "Age",
    Xenotype => "Xenotype",
    Gene => "Gene",
    Apparel => "Apparel",
    ApparelType => "ApparelType",
    FactionIcon => "FactionIcon",
    FactionLeader => "FactionLeader",
    Guest => "Guest",
    IdeologyIcon => "IdeologyIcon",
    IdeologyRole => "IdeologyRole",
    Title => "Title",
    Query => "Query",
});

const ANY: &[PawnType] = &[
    PawnType::Default,
    PawnType::Colonist,
    PawnType::Prisoner,
    PawnType::Slave,
    PawnType::Enemy,
    PawnType::Neutral,
    PawnType::Vehicle,
];

const HUMANLIKE: &[PawnType] = &[
    PawnType::Default,
    PawnType::Colonist,
    PawnType::Prisoner,
    PawnType::Slave,
    PawnType::Enemy,
    PawnType::Neutral,
];

const ARMED: &[PawnType] = &[
    PawnType::Default,
    PawnType::Colonist,
    PawnType::Slave,
    PawnType::Enemy,
    PawnType::Neutral,
];

const CREATURE: &[PawnType] = &[
    PawnType::Default,
    PawnType::Colonist,
    PawnType::Enemy,
    PawnType::Neutral,
];

const OUTSIDER: &[PawnType] = &[
    PawnType::Default,
    PawnType::Prisoner,
    PawnType::Slave,
    PawnType::Enemy,
    PawnType::Neutral,
];

const FOREIGN: &[PawnType] = &[
    PawnType::Default,
    PawnType::Prisoner,
    PawnType::Enemy,
    PawnType::Neutral,
];

const VISITOR: &[PawnType] = &[PawnType::Default, PawnType::Neutral];

const DRAFTABLE: &[PawnType] = &[PawnType::Default, PawnType::Colonist];

impl RuleKind {
    /// Override kinds model transient states and live in their own
    /// priority space
    pub fn is_override(&self) -> bool {
        matches!(
            self,
            RuleKind::Drafted | RuleKind::Downed | RuleKind::MentalState
        )
    }

    /// Kinds whose icon is computed from the pawn instead of a marker set
    pub fn has_dynamic_icon(&self) -> bool {
        matches!(self, RuleKind::FactionIcon | RuleKind::IdeologyIcon)
    }

    /// Expansion that must be installed for this kind to load
    pub fn required_expansion(&self) -> Option<Expansion> {
        match self {
            RuleKind::Xenotype | RuleKind::Gene => Some(Expansion::Biotech),
            RuleKind::IdeologyIcon | RuleKind::IdeologyRole => Some(Expansion::Ideology),
            RuleKind::Title => Some(Expansion::Royalty),
            RuleKind::Query => Some(Expansion::QueryPlugin),
            _ => None,
        }
    }

    fn base_types(&self) -> &'static [PawnType] {
        match self {
            RuleKind::PawnType => ANY,
            RuleKind::Weapon | RuleKind::WeaponType => ARMED,
            RuleKind::Animal | RuleKind::Mechanoid => CREATURE,
            RuleKind::FactionIcon => OUTSIDER,
            RuleKind::FactionLeader => FOREIGN,
            RuleKind::Guest => VISITOR,
            RuleKind::Drafted => DRAFTABLE,
            _ => HUMANLIKE,
        }
    }

    /// Pawn categories a rule of this kind may be limited to
    ///
    /// Slaves can only be drafted when Ideology is installed.
    pub fn applicable_types(&self, catalog: &Catalog) -> Vec<PawnType> {
        let mut types = self.base_types().to_vec();
        if *self == RuleKind::Drafted && catalog.has_expansion(Expansion::Ideology) {
            types.push(PawnType::Slave);
        }
        types
    }

    pub fn is_applicable(&self, pawn_type: PawnType, catalog: &Catalog) -> bool {
        self.applicable_types(catalog).contains(&pawn_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in RuleKind::ALL {
            assert_eq!(RuleKind::from_name(kind.as_str()), Some(*kind));
        }
        assert_eq!(RuleKind::ALL.len(), 27);
        assert_eq!(RuleKind::from_name("Teleport"), None);
    }

    #[test]
    fn test_override_space() {
        let overrides: Vec<_> = RuleKind::ALL.iter().filter(|k| k.is_override()).collect();
        assert_eq!(
            overrides,
            vec![&RuleKind::Drafted, &RuleKind::Downed, &RuleKind::MentalState]
        );
    }

    #[test]
    fn test_drafted_slaves_need_ideology() {
        let base = Catalog::new();
        assert!(!RuleKind::Drafted.is_applicable(PawnType::Slave, &base));
        assert!(RuleKind::Drafted.is_applicable(PawnType::Colonist, &base));

        let ideology = Catalog::new().with_expansion(Expansion::Ideology);
        assert!(RuleKind::Drafted.is_applicable(PawnType::Slave, &ideology));
        assert!(!RuleKind::Drafted.is_applicable(PawnType::Enemy, &ideology));
    }

    #[test]
    fn test_every_kind_allows_unrestricted() {
        let catalog = Catalog::new();
        for kind in RuleKind::ALL {
            assert!(kind.is_applicable(PawnType::Default, &catalog), "{kind}");
        }
    }
}
