//! Variant-specific rule predicates and their parameter payloads

use super::params::{self, ITEM_SEPARATOR, VALUE_SEPARATOR};
use super::{EvalContext, RuleKind};
use crate::{
    DefId, Error, Gender, GuestStatus, HediffCategory, Passion, Pawn, PawnQuery, PawnType,
    QueryProvider, Race, Result,
};
use std::fmt;
use std::sync::Arc;

/// A list of requirements matched in OR (any) or AND (all) mode
///
/// Encodes as `<entries>;<require_all>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Requirements<T> {
    pub entries: Vec<T>,
    pub require_all: bool,
}

impl<T> Default for Requirements<T> {
    fn default() -> Self {
        Self::any(Vec::new())
    }
}

impl<T> Requirements<T> {
    pub fn any(entries: Vec<T>) -> Self {
        Self {
            entries,
            require_all: false,
        }
    }

    pub fn all(entries: Vec<T>) -> Self {
        Self {
            entries,
            require_all: true,
        }
    }

    /// An empty requirement list never matches
    pub fn satisfied_by(&self, mut check: impl FnMut(&T) -> bool) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        if self.require_all {
            self.entries.iter().all(check)
        } else {
            self.entries.iter().any(&mut check)
        }
    }

    fn encode(&self, entry: impl Fn(&T) -> String) -> String {
        format!(
            "{}{ITEM_SEPARATOR}{}",
            params::join(&self.entries, entry),
            self.require_all
        )
    }

    fn decode(payload: &str, entry: impl Fn(&str) -> Result<T>) -> Result<Self> {
        let parts = params::items(payload, 2)?;
        let entries = params::list(parts[0])
            .into_iter()
            .map(entry)
            .collect::<Result<Vec<_>>>()?;
        let require_all = params::parse(parts[1], "require_all")?;
        Ok(Self {
            entries,
            require_all,
        })
    }
}

/// A trait, optionally pinned to one degree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitRequirement {
    pub def: DefId,
    pub degree: Option<i32>,
}

impl TraitRequirement {
    pub fn new(def: impl Into<DefId>, degree: Option<i32>) -> Self {
        Self {
            def: def.into(),
            degree,
        }
    }

    fn encode(&self) -> String {
        match self.degree {
            Some(d) => format!("{}{VALUE_SEPARATOR}{d}", self.def),
            None => self.def.to_string(),
        }
    }

    fn decode(entry: &str) -> Result<Self> {
        let parts = params::values(entry, 1, 2)?;
        let degree = match parts.get(1) {
            Some(d) => Some(params::parse(d, "trait degree")?),
            None => None,
        };
        Ok(Self {
            def: params::parse_def(parts[0])?,
            degree,
        })
    }
}

/// Minimum level and passion in one skill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillRequirement {
    pub skill: DefId,
    pub min_level: u32,
    pub min_passion: Passion,
}

impl SkillRequirement {
    pub fn new(skill: impl Into<DefId>, min_level: u32, min_passion: Passion) -> Self {
        Self {
            skill: skill.into(),
            min_level,
            min_passion,
        }
    }

    fn encode(&self) -> String {
        format!(
            "{}{VALUE_SEPARATOR}{}{VALUE_SEPARATOR}{}",
            self.skill,
            self.min_level,
            self.min_passion.level()
        )
    }

    fn decode(entry: &str) -> Result<Self> {
        let parts = params::values(entry, 3, 3)?;
        let passion: u8 = params::parse(parts[2], "passion")?;
        Ok(Self {
            skill: params::parse_def(parts[0])?,
            min_level: params::parse(parts[1], "skill level")?,
            min_passion: Passion::from_level(passion).ok_or_else(|| Error::InvalidField {
                field: "passion",
                value: parts[2].to_string(),
            })?,
        })
    }

    fn satisfied_by(&self, pawn: &Pawn) -> bool {
        pawn.skill(&self.skill)
            .is_some_and(|s| s.level >= self.min_level && s.passion >= self.min_passion)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WeaponClass {
    #[default]
    Ranged,
    Melee,
    Unarmed,
}

name_table!(WeaponClass {
    Ranged => "Ranged",
    Melee => "Melee",
    Unarmed => "Unarmed",
});

/// Inclusive biological age range in years
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

impl Default for AgeRange {
    fn default() -> Self {
        Self { min: 0, max: 120 }
    }
}

/// Reference to a query owned by the query plugin
///
/// Only the name is persisted; the live object is re-resolved after load.
#[derive(Clone, Default)]
pub struct QueryCondition {
    pub name: String,
    resolved: Option<Arc<dyn PawnQuery>>,
}

impl QueryCondition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resolved: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// Look the query up again; returns whether it was found
    pub fn resolve(&mut self, provider: &dyn QueryProvider) -> bool {
        self.resolved = provider.resolve(&self.name);
        self.resolved.is_some()
    }
}

impl fmt::Debug for QueryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCondition")
            .field("name", &self.name)
            .field("resolved", &self.resolved.is_some())
            .finish()
    }
}

impl PartialEq for QueryCondition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// The variant-specific part of a rule
#[derive(Debug, Clone, PartialEq)]
pub enum RuleCondition {
    Weapon(Vec<DefId>),
    WeaponType(WeaponClass),
    Trait(Requirements<TraitRequirement>),
    Skill(Requirements<SkillRequirement>),
    HediffStatic(Requirements<DefId>),
    HediffDynamic(Requirements<HediffCategory>),
    HediffAny,
    /// Relation kinds to any current colonist
    Relative(Vec<DefId>),
    /// Matches every pawn of the rule's limitation
    PawnType,
    Drafted,
    Downed,
    /// Empty list matches any mental state
    MentalState(Vec<DefId>),
    /// Empty list matches any animal
    Animal(Vec<DefId>),
    /// Empty list matches any mechanoid
    Mechanoid(Vec<DefId>),
    Gender(Gender),
    Age(AgeRange),
    Xenotype(Vec<DefId>),
    Gene(Requirements<DefId>),
    Apparel(Requirements<DefId>),
    /// Apparel tags
    ApparelType(Requirements<DefId>),
    FactionIcon,
    FactionLeader,
    /// Empty list matches any guest
    Guest(Vec<GuestStatus>),
    IdeologyIcon,
    /// Empty list matches any role
    IdeologyRole(Vec<DefId>),
    /// Empty list matches any title
    Title(Vec<DefId>),
    Query(QueryCondition),
    /// A kind name this build does not know; never matches
    Unrecognized(String),
}

fn in_list_or_any(list: &[DefId], value: &DefId) -> bool {
    list.is_empty() || list.contains(value)
}

impl RuleCondition {
    /// Zero-value condition for a freshly added rule of `kind`
    pub fn zero(kind: RuleKind) -> Self {
        match kind {
            RuleKind::Weapon => RuleCondition::Weapon(Vec::new()),
            RuleKind::WeaponType => RuleCondition::WeaponType(WeaponClass::default()),
            RuleKind::Trait => RuleCondition::Trait(Requirements::default()),
            RuleKind::Skill => RuleCondition::Skill(Requirements::default()),
            RuleKind::HediffStatic => RuleCondition::HediffStatic(Requirements::default()),
            RuleKind::HediffDynamic => RuleCondition::HediffDynamic(Requirements::default()),
            RuleKind::HediffAny => RuleCondition::HediffAny,
            RuleKind::Relative => RuleCondition::Relative(Vec::new()),
            RuleKind::PawnType => RuleCondition::PawnType,
            RuleKind::Drafted => RuleCondition::Drafted,
            RuleKind::Downed => RuleCondition::Downed,
            RuleKind::MentalState => RuleCondition::MentalState(Vec::new()),
            RuleKind::Animal => RuleCondition::Animal(Vec::new()),
            RuleKind::Mechanoid => RuleCondition::Mechanoid(Vec::new()),
            RuleKind::Gender => RuleCondition::Gender(Gender::Male),
            RuleKind::Age => RuleCondition::Age(AgeRange::default()),
            RuleKind::Xenotype => RuleCondition::Xenotype(Vec::new()),
            RuleKind::Gene => RuleCondition::Gene(Requirements::default()),
            RuleKind::Apparel => RuleCondition::Apparel(Requirements::default()),
            RuleKind::ApparelType => RuleCondition::ApparelType(Requirements::default()),
            RuleKind::FactionIcon => RuleCondition::FactionIcon,
            RuleKind::FactionLeader => RuleCondition::FactionLeader,
            RuleKind::Guest => RuleCondition::Guest(Vec::new()),
            RuleKind::IdeologyIcon => RuleCondition::IdeologyIcon,
            RuleKind::IdeologyRole => RuleCondition::IdeologyRole(Vec::new()),
            RuleKind::Title => RuleCondition::Title(Vec::new()),
            RuleKind::Query => RuleCondition::Query(QueryCondition::default()),
        }
    }

    pub fn kind(&self) -> Option<RuleKind> {
        let kind = match self {
            RuleCondition::Weapon(_) => RuleKind::Weapon,
            RuleCondition::WeaponType(_) => RuleKind::WeaponType,
            RuleCondition::Trait(_) => RuleKind::Trait,
            RuleCondition::Skill(_) => RuleKind::Skill,
            RuleCondition::HediffStatic(_) => RuleKind::HediffStatic,
            RuleCondition::HediffDynamic(_) => RuleKind::HediffDynamic,
            RuleCondition::HediffAny => RuleKind::HediffAny,
            RuleCondition::Relative(_) => RuleKind::Relative,
            RuleCondition::PawnType => RuleKind::PawnType,
            RuleCondition::Drafted => RuleKind::Drafted,
            RuleCondition::Downed => RuleKind::Downed,
            RuleCondition::MentalState(_) => RuleKind::MentalState,
            RuleCondition::Animal(_) => RuleKind::Animal,
            RuleCondition::Mechanoid(_) => RuleKind::Mechanoid,
            RuleCondition::Gender(_) => RuleKind::Gender,
            RuleCondition::Age(_) => RuleKind::Age,
            RuleCondition::Xenotype(_) => RuleKind::Xenotype,
            RuleCondition::Gene(_) => RuleKind::Gene,
            RuleCondition::Apparel(_) => RuleKind::Apparel,
            RuleCondition::ApparelType(_) => RuleKind::ApparelType,
            RuleCondition::FactionIcon => RuleKind::FactionIcon,
            RuleCondition::FactionLeader => RuleKind::FactionLeader,
            RuleCondition::Guest(_) => RuleKind::Guest,
            RuleCondition::IdeologyIcon => RuleKind::IdeologyIcon,
            RuleCondition::IdeologyRole(_) => RuleKind::IdeologyRole,
            RuleCondition::Title(_) => RuleKind::Title,
            RuleCondition::Query(_) => RuleKind::Query,
            RuleCondition::Unrecognized(_) => return None,
        };
        Some(kind)
    }

    /// Persisted kind name, including names this build does not know
    pub fn kind_name(&self) -> &str {
        match self {
            RuleCondition::Unrecognized(name) => name,
            other => other.kind().map(|k| k.as_str()).unwrap_or_default(),
        }
    }

    /// Decode the parameter payload of a rule of `kind`
    pub fn decode(kind: RuleKind, payload: &str) -> Result<Self> {
        let raw = payload;
        let payload = params::migrate_legacy(raw);
        let payload = payload.as_ref();
        let single = |payload: &str| -> Result<String> {
            Ok(params::items(payload, 1)?[0].to_string())
        };
        let condition = match kind {
            RuleKind::Weapon => RuleCondition::Weapon(params::def_list(&single(payload)?)?),
            RuleKind::WeaponType => RuleCondition::WeaponType(params::parse_named(
                &single(payload)?,
                "weapon class",
                WeaponClass::from_name,
            )?),
            RuleKind::Trait => {
                RuleCondition::Trait(Requirements::decode(payload, TraitRequirement::decode)?)
            }
            RuleKind::Skill => {
                RuleCondition::Skill(Requirements::decode(payload, SkillRequirement::decode)?)
            }
            RuleKind::HediffStatic => {
                RuleCondition::HediffStatic(Requirements::decode(payload, params::parse_def)?)
            }
            RuleKind::HediffDynamic => {
                RuleCondition::HediffDynamic(Requirements::decode(payload, |v| {
                    params::parse_named(v, "hediff category", HediffCategory::from_name)
                })?)
            }
            RuleKind::Relative => RuleCondition::Relative(params::def_list(&single(payload)?)?),
            RuleKind::MentalState => {
                RuleCondition::MentalState(params::def_list(&single(payload)?)?)
            }
            RuleKind::Animal => RuleCondition::Animal(params::def_list(&single(payload)?)?),
            RuleKind::Mechanoid => RuleCondition::Mechanoid(params::def_list(&single(payload)?)?),
            RuleKind::Gender => RuleCondition::Gender(params::parse_named(
                &single(payload)?,
                "gender",
                Gender::from_name,
            )?),
            RuleKind::Age => {
                let parts = params::items(payload, 2)?;
                RuleCondition::Age(AgeRange {
                    min: params::parse(parts[0], "min age")?,
                    max: params::parse(parts[1], "max age")?,
                })
            }
            RuleKind::Xenotype => RuleCondition::Xenotype(params::def_list(&single(payload)?)?),
            RuleKind::Gene => {
                RuleCondition::Gene(Requirements::decode(payload, params::parse_def)?)
            }
            RuleKind::Apparel => {
                RuleCondition::Apparel(Requirements::decode(payload, params::parse_def)?)
            }
            RuleKind::ApparelType => {
                RuleCondition::ApparelType(Requirements::decode(payload, params::parse_def)?)
            }
            RuleKind::Guest => RuleCondition::Guest(params::named_list(
                &single(payload)?,
                "guest status",
                GuestStatus::from_name,
            )?),
            RuleKind::IdeologyRole => {
                RuleCondition::IdeologyRole(params::def_list(&single(payload)?)?)
            }
            RuleKind::Title => RuleCondition::Title(params::def_list(&single(payload)?)?),
            // Query names are free text and take the whole payload verbatim
            RuleKind::Query => RuleCondition::Query(QueryCondition::new(raw)),
            RuleKind::HediffAny
            | RuleKind::PawnType
            | RuleKind::Drafted
            | RuleKind::Downed
            | RuleKind::FactionIcon
            | RuleKind::FactionLeader
            | RuleKind::IdeologyIcon => {
                params::items(payload, 0)?;
                Self::zero(kind)
            }
        };
        Ok(condition)
    }

    /// Encode the parameter payload
    pub fn encode(&self) -> String {
        match self {
            RuleCondition::Weapon(defs)
            | RuleCondition::Relative(defs)
            | RuleCondition::MentalState(defs)
            | RuleCondition::Animal(defs)
            | RuleCondition::Mechanoid(defs)
            | RuleCondition::Xenotype(defs)
            | RuleCondition::IdeologyRole(defs)
            | RuleCondition::Title(defs) => params::join_defs(defs),
            RuleCondition::WeaponType(class) => class.as_str().to_string(),
            RuleCondition::Trait(reqs) => reqs.encode(TraitRequirement::encode),
            RuleCondition::Skill(reqs) => reqs.encode(SkillRequirement::encode),
            RuleCondition::HediffStatic(reqs)
            | RuleCondition::Gene(reqs)
            | RuleCondition::Apparel(reqs)
            | RuleCondition::ApparelType(reqs) => reqs.encode(|d| d.to_string()),
            RuleCondition::HediffDynamic(reqs) => reqs.encode(|c| c.as_str().to_string()),
            RuleCondition::Gender(gender) => gender.as_str().to_string(),
            RuleCondition::Age(range) => format!("{}{ITEM_SEPARATOR}{}", range.min, range.max),
            RuleCondition::Guest(statuses) => params::join(statuses, |s| s.as_str().to_string()),
            RuleCondition::Query(query) => query.name.clone(),
            RuleCondition::HediffAny
            | RuleCondition::PawnType
            | RuleCondition::Drafted
            | RuleCondition::Downed
            | RuleCondition::FactionIcon
            | RuleCondition::FactionLeader
            | RuleCondition::IdeologyIcon
            | RuleCondition::Unrecognized(_) => String::new(),
        }
    }

    /// Describe the first required parameter that is missing, if any
    pub fn missing_parameters(&self, limitation: PawnType) -> Option<&'static str> {
        match self {
            RuleCondition::Weapon(defs) if defs.is_empty() => Some("no weapons selected"),
            RuleCondition::Relative(defs) if defs.is_empty() => Some("no relations selected"),
            RuleCondition::Xenotype(defs) if defs.is_empty() => Some("no xenotypes selected"),
            RuleCondition::Trait(reqs) if reqs.entries.is_empty() => Some("no traits selected"),
            RuleCondition::Skill(reqs) if reqs.entries.is_empty() => Some("no skills selected"),
            RuleCondition::HediffStatic(reqs) if reqs.entries.is_empty() => {
                Some("no hediffs selected")
            }
            RuleCondition::HediffDynamic(reqs) if reqs.entries.is_empty() => {
                Some("no hediff categories selected")
            }
            RuleCondition::Gene(reqs) if reqs.entries.is_empty() => Some("no genes selected"),
            RuleCondition::Apparel(reqs) if reqs.entries.is_empty() => {
                Some("no apparel selected")
            }
            RuleCondition::ApparelType(reqs) if reqs.entries.is_empty() => {
                Some("no apparel tags selected")
            }
            RuleCondition::Age(range) if range.min > range.max => {
                Some("minimum age exceeds maximum age")
            }
            RuleCondition::PawnType if limitation == PawnType::Default => {
                Some("no pawn type selected")
            }
            RuleCondition::Query(query) if query.name.is_empty() => Some("no query selected"),
            RuleCondition::Unrecognized(_) => Some("unknown rule kind"),
            _ => None,
        }
    }

    /// Variant predicate; the caller has already applied the base check
    pub fn matches(&self, pawn: &Pawn, ctx: &EvalContext<'_>) -> Result<bool> {
        let matched = match self {
            RuleCondition::Weapon(defs) => pawn
                .weapon
                .as_ref()
                .is_some_and(|w| defs.contains(&w.def)),
            RuleCondition::WeaponType(class) => match (class, &pawn.weapon) {
                (WeaponClass::Unarmed, weapon) => weapon.is_none(),
                (WeaponClass::Ranged, Some(weapon)) => weapon.ranged,
                (WeaponClass::Melee, Some(weapon)) => !weapon.ranged,
                (_, None) => false,
            },
            RuleCondition::Trait(reqs) => reqs.satisfied_by(|r| pawn.has_trait(&r.def, r.degree)),
            RuleCondition::Skill(reqs) => reqs.satisfied_by(|r| r.satisfied_by(pawn)),
            RuleCondition::HediffStatic(reqs) => reqs.satisfied_by(|d| pawn.has_hediff(d)),
            RuleCondition::HediffDynamic(reqs) => {
                reqs.satisfied_by(|c| pawn.has_hediff_category(*c))
            }
            RuleCondition::HediffAny => pawn.hediffs.iter().any(|h| h.visible && h.bad),
            RuleCondition::Relative(kinds) => pawn.relations.iter().any(|r| {
                kinds.contains(&r.kind)
                    && ctx
                        .pawns
                        .get(r.other)
                        .is_some_and(|o| o.pawn_type == PawnType::Colonist && !o.dead)
            }),
            RuleCondition::PawnType => true,
            RuleCondition::Drafted => pawn.drafted,
            RuleCondition::Downed => pawn.downed,
            RuleCondition::MentalState(states) => pawn
                .mental_state
                .as_ref()
                .is_some_and(|m| in_list_or_any(states, m)),
            RuleCondition::Animal(races) => match &pawn.race {
                Race::Animal(race) => in_list_or_any(races, race),
                _ => false,
            },
            RuleCondition::Mechanoid(kinds) => match &pawn.race {
                Race::Mechanoid(kind) => in_list_or_any(kinds, kind),
                _ => false,
            },
            RuleCondition::Gender(gender) => pawn.gender == *gender,
            RuleCondition::Age(range) => (range.min..=range.max).contains(&pawn.age_years),
            RuleCondition::Xenotype(xenotypes) => pawn
                .xenotype
                .as_ref()
                .is_some_and(|x| xenotypes.contains(x)),
            RuleCondition::Gene(reqs) => reqs.satisfied_by(|g| pawn.genes.contains(g)),
            RuleCondition::Apparel(reqs) => {
                reqs.satisfied_by(|d| pawn.apparel.iter().any(|a| &a.def == d))
            }
            RuleCondition::ApparelType(reqs) => {
                reqs.satisfied_by(|tag| pawn.apparel.iter().any(|a| a.tags.contains(tag)))
            }
            RuleCondition::FactionIcon => pawn.faction.is_some(),
            RuleCondition::FactionLeader => pawn.faction.as_ref().is_some_and(|f| f.is_leader),
            RuleCondition::Guest(statuses) => pawn
                .guest
                .is_some_and(|g| statuses.is_empty() || statuses.contains(&g)),
            RuleCondition::IdeologyIcon => pawn.ideology.is_some(),
            RuleCondition::IdeologyRole(roles) => pawn
                .ideology
                .as_ref()
                .and_then(|i| i.role.as_ref())
                .is_some_and(|r| in_list_or_any(roles, r)),
            RuleCondition::Title(titles) => pawn
                .title
                .as_ref()
                .is_some_and(|t| in_list_or_any(titles, t)),
            RuleCondition::Query(query) => {
                let live = query
                    .resolved
                    .as_ref()
                    .ok_or_else(|| Error::QueryUnavailable(query.name.clone()))?;
                live.matches(pawn)
            }
            RuleCondition::Unrecognized(name) => {
                return Err(Error::MalformedRule(format!("unknown rule kind {name}")))
            }
        };
        Ok(matched)
    }

    pub(crate) fn query_mut(&mut self) -> Option<&mut QueryCondition> {
        match self {
            RuleCondition::Query(query) => Some(query),
            _ => None,
        }
    }
}
