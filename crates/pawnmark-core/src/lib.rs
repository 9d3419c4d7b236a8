//! Pawnmark Core - automatic marker rules for pawns, corpses and vehicles
//!
//! This crate provides the rule engine behind pawn markers:
//! - Typed marker rules (`MarkerRule`, `RuleCondition`) with a kind registry
//! - The rule blob codec used by persisted settings
//! - Separate priority spaces for override and normal rules
//! - Per-entity marking state and effective marking resolution
//! - An incremental scheduler that re-evaluates one thing per tick
//!
//! ## Driving the engine
//!
//! The host mirrors pawn facts into a [`PawnStore`], reports lifecycle
//! events to [`MarkerRuntime::notify`], calls [`MarkerRuntime::tick`] once
//! per simulation tick and asks [`MarkerRuntime::resolve`] what to draw.
//! Settings and the session [`Catalog`] are values owned by the runtime;
//! there is no global state.

#[macro_use]
mod macros;

mod catalog;
pub mod codec;
mod error;
mod icon_cache;
mod identity;
mod lifecycle;
mod marker_set;
mod marking;
mod pawn;
pub mod priority;
mod query;
mod resolve;
pub mod rule;
pub mod runtime;
pub mod scheduler;
mod settings;
mod snapshot;
pub mod time;

pub use catalog::{Catalog, Expansion};
pub use codec::{decode_rule, encode_rule, try_decode_rule};
pub use error::{Error, Result};
pub use icon_cache::{DynamicIcons, IconCache};
pub use identity::{DefId, ThingId};
pub use lifecycle::HostEvent;
pub use marker_set::{IconDef, MarkerSet, MarkerSetRegistry, MarkerToken, TOKEN_LIST_SEPARATOR};
pub use marking::{ExplicitMark, MarkingStore};
pub use pawn::{
    Apparel, FactionInfo, Gender, GuestStatus, Hediff, HediffCategory, IdeologyInfo, Passion,
    Pawn, PawnStore, PawnType, Race, Relation, SkillRecord, TraitEntry, Weapon,
};
pub use query::{NoQueries, PawnQuery, QueryProvider};
pub use resolve::{resolve, Marking, Resolution};
pub use rule::{
    AgeRange, ConfigError, EvalContext, MarkerRule, QueryCondition, Requirements, RuleCondition,
    RuleKind, SkillRequirement, TraitRequirement, WeaponClass,
};
pub use runtime::{MarkerRuntime, TickReport};
pub use scheduler::{EvaluationOutcome, EvaluationQueue, QueueState};
pub use settings::{MarkerSettings, RuleDraft};
pub use snapshot::{CategorySettings, MapSnapshot, MarkingSnapshot, SettingsSnapshot};
pub use time::{Clock, Tick, TICKS_PER_DAY, TICKS_PER_HOUR};
