//! Shared fixtures for the scenario tests

#![allow(dead_code)]

use pawnmark_core::{
    Catalog, DefId, MarkerSet, MarkerSettings, NoQueries, PawnType, RuleCondition,
};

/// Two marker sets: `A` with two icons and `B` with three
pub fn catalog() -> Catalog {
    Catalog::with_all_expansions()
        .with_marker_set(MarkerSet::new("A", &["Icons/a1", "Icons/a2"]))
        .with_marker_set(MarkerSet::new("B", &["Icons/b1", "Icons/b2", "Icons/b3"]))
}

/// Add an enabled rule through the editing API and return its index
pub fn add_enabled_rule(
    settings: &mut MarkerSettings,
    catalog: &Catalog,
    condition: RuleCondition,
    set: &str,
    index: usize,
    limitation: PawnType,
) -> usize {
    let rule = settings.add_rule(condition);
    let mut draft = settings.begin_edit(rule).unwrap();
    draft.rule.set_marker(DefId::new(set), index, catalog).unwrap();
    draft.rule.set_limitation(limitation, catalog).unwrap();
    settings.commit_edit(draft, &mut NoQueries).unwrap();
    settings.set_enabled(rule, true, catalog).unwrap();
    rule
}
