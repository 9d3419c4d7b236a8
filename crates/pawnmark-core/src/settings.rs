//! Mod settings: the rule list and display toggles
//!
//! `MarkerSettings` is built once per session from a [`SettingsSnapshot`]
//! and passed by reference to everything that needs it.

use crate::codec::{decode_rule, encode_rule};
use crate::priority::{self, evaluation_order};
use crate::{
    Catalog, CategorySettings, DefId, Error, MarkerRule, PawnType, QueryProvider, Result,
    RuleCondition, SettingsSnapshot,
};
use indexmap::IndexMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSettings {
    rules: Vec<MarkerRule>,
    /// Re-evaluate every pawn once per in-game hour
    pub refresh_rules_periodically: bool,
    pub show_on_corpses: bool,
    /// Draw override markers next to the base marking instead of over it
    pub separate_temporary_markers: bool,
    pub rotate_icons: bool,
    pub show_multiple_markers: bool,
    pub icon_size: f32,
    pub icon_offset: f32,
    pub pulsing: bool,
    categories: IndexMap<PawnType, CategorySettings>,
}

impl Default for MarkerSettings {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            refresh_rules_periodically: false,
            show_on_corpses: true,
            separate_temporary_markers: false,
            rotate_icons: false,
            show_multiple_markers: false,
            icon_size: 1.0,
            icon_offset: 0.0,
            pulsing: false,
            categories: PawnType::CATEGORIES
                .iter()
                .map(|pt| (*pt, CategorySettings::default()))
                .collect(),
        }
    }
}

/// An independent copy of one rule, edited outside the live list
///
/// Dropping a draft discards its changes. The draft remembers the kind and
/// order the rule had when it was copied, so a commit after the list was
/// reordered or shortened is refused instead of landing on another rule.
#[derive(Debug, Clone)]
pub struct RuleDraft {
    index: usize,
    kind: String,
    order: i32,
    pub rule: MarkerRule,
}

impl RuleDraft {
    /// Position of the edited rule in the live list
    pub fn index(&self) -> usize {
        self.index
    }

    fn matches(&self, live: &MarkerRule) -> bool {
        live.kind_name() == self.kind && live.order() == self.order
    }
}

impl MarkerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rules, in the order the user added them
    pub fn rules(&self) -> &[MarkerRule] {
        &self.rules
    }

    /// Get a rule by its position in [`rules`](Self::rules)
    pub fn rule(&self, index: usize) -> Result<&MarkerRule> {
        self.rules.get(index).ok_or(Error::RuleNotFound(index))
    }

    /// Whether any rule is configured at all
    pub fn has_rules(&self) -> bool {
        !self.rules.is_empty()
    }

    /// Append a new, disabled rule at the end of its priority space
    ///
    /// Returns the index of the new rule.
    pub fn add_rule(&mut self, condition: RuleCondition) -> usize {
        let is_override = condition.kind().is_some_and(|k| k.is_override());
        let order = priority::next_order(&self.rules, is_override);
        self.rules.push(MarkerRule::new(condition, order));
        self.rules.len() - 1
    }

    /// Delete a rule and release any plugin query it owned
    pub fn remove_rule(
        &mut self,
        index: usize,
        queries: &mut dyn QueryProvider,
    ) -> Result<MarkerRule> {
        if index >= self.rules.len() {
            return Err(Error::RuleNotFound(index));
        }
        let rule = self.rules.remove(index);
        if let Some(name) = rule.query_name() {
            queries.release(name);
        }
        Ok(rule)
    }

    /// Swap a rule with the next higher-priority rule of its space
    ///
    /// Returns false if the rule is already first or does not exist.
    pub fn increase_priority(&mut self, index: usize) -> bool {
        priority::increase_priority(&mut self.rules, index)
    }

    /// Swap a rule with the next lower-priority rule of its space
    pub fn decrease_priority(&mut self, index: usize) -> bool {
        priority::decrease_priority(&mut self.rules, index)
    }

    /// Enable or disable a rule in place; see [`MarkerRule::set_enabled`]
    pub fn set_enabled(&mut self, index: usize, enabled: bool, catalog: &Catalog) -> Result<()> {
        self.rules
            .get_mut(index)
            .ok_or(Error::RuleNotFound(index))?
            .set_enabled(enabled, catalog)
    }

    /// Copy a rule out for editing
    pub fn begin_edit(&self, index: usize) -> Result<RuleDraft> {
        let rule = self.rule(index)?;
        Ok(RuleDraft {
            index,
            kind: rule.kind_name().to_string(),
            order: rule.order(),
            rule: rule.clone(),
        })
    }

    /// Replace the live rule with an edited draft
    ///
    /// A draft whose plugin query changed releases the old query and
    /// resolves the new one. Fails with [`Error::StaleDraft`] if the rule at
    /// the draft's index is no longer the one that was copied.
    pub fn commit_edit(&mut self, draft: RuleDraft, queries: &mut dyn QueryProvider) -> Result<()> {
        let index = draft.index;
        let live = self
            .rules
            .get_mut(index)
            .ok_or(Error::RuleNotFound(index))?;
        if !draft.matches(live) {
            return Err(Error::StaleDraft(index));
        }
        let mut rule = draft.rule;
        if live.query_name() != rule.query_name() {
            if let Some(old) = live.query_name() {
                queries.release(old);
            }
        }
        if !rule.resolve_query(queries) {
            warn!(
                "Query {:?} not found for edited rule {}",
                rule.query_name().unwrap_or_default(),
                index
            );
        }
        *live = rule;
        Ok(())
    }

    /// Active rules of one priority space, in evaluation order
    pub fn rules_in_priority(&self, is_override: bool) -> impl Iterator<Item = &MarkerRule> {
        evaluation_order(&self.rules, is_override)
            .into_iter()
            .map(move |i| &self.rules[i])
    }

    /// Re-resolve every plugin query; required after each load
    ///
    /// Returns the number of query rules that could not be resolved.
    pub fn resolve_queries(&mut self, queries: &dyn QueryProvider) -> usize {
        let mut missing = 0;
        for rule in &mut self.rules {
            if !rule.resolve_query(queries) {
                warn!(
                    "Query {:?} not found; its rule will not match",
                    rule.query_name().unwrap_or_default()
                );
                missing += 1;
            }
        }
        missing
    }

    /// Settings for one pawn category, defaults if never set
    pub fn category(&self, pawn_type: PawnType) -> CategorySettings {
        self.categories
            .get(&pawn_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether things of this category are marked at all
    pub fn category_enabled(&self, pawn_type: PawnType) -> bool {
        self.categories.get(&pawn_type).is_none_or(|c| c.enabled)
    }

    /// Marker set used for explicit marks on this category
    pub fn category_marker_set(&self, pawn_type: PawnType) -> Option<&DefId> {
        self.categories
            .get(&pawn_type)
            .and_then(|c| c.marker_set.as_ref())
    }

    pub fn set_category(&mut self, pawn_type: PawnType, settings: CategorySettings) {
        self.categories.insert(pawn_type, settings);
    }

    /// Persisted form; every rule is written as its blob
    pub fn to_snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            rules: self.rules.iter().map(encode_rule).collect(),
            refresh_rules_periodically: self.refresh_rules_periodically,
            show_on_corpses: self.show_on_corpses,
            separate_temporary_markers: self.separate_temporary_markers,
            rotate_icons: self.rotate_icons,
            show_multiple_markers: self.show_multiple_markers,
            icon_size: self.icon_size,
            icon_offset: self.icon_offset,
            pulsing: self.pulsing,
            categories: self.categories.clone(),
        }
    }

    /// Rebuild settings from a snapshot
    ///
    /// Rules that fail to decode are kept in error state. Plugin queries are
    /// left unresolved; call [`resolve_queries`](Self::resolve_queries).
    pub fn from_snapshot(snapshot: SettingsSnapshot, catalog: &Catalog) -> Self {
        let mut settings = Self {
            rules: snapshot
                .rules
                .iter()
                .map(|blob| decode_rule(blob, catalog))
                .collect(),
            refresh_rules_periodically: snapshot.refresh_rules_periodically,
            show_on_corpses: snapshot.show_on_corpses,
            separate_temporary_markers: snapshot.separate_temporary_markers,
            rotate_icons: snapshot.rotate_icons,
            show_multiple_markers: snapshot.show_multiple_markers,
            icon_size: snapshot.icon_size,
            icon_offset: snapshot.icon_offset,
            pulsing: snapshot.pulsing,
            ..Self::default()
        };
        for (pawn_type, category) in snapshot.categories {
            if let Some(set) = &category.marker_set {
                if !catalog.marker_sets.contains(set) {
                    warn!("Unknown marker set {} for {} ignored", set, pawn_type);
                    settings.set_category(
                        pawn_type,
                        CategorySettings {
                            marker_set: None,
                            ..category
                        },
                    );
                    continue;
                }
            }
            settings.set_category(pawn_type, category);
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        MarkerSet, Pawn, PawnQuery, QueryCondition, Requirements, RuleKind, TraitRequirement,
    };
    use std::sync::Arc;

    fn catalog() -> Catalog {
        Catalog::with_all_expansions().with_marker_set(MarkerSet::new("A", &["a1", "a2"]))
    }

    #[derive(Debug)]
    struct Always;

    impl PawnQuery for Always {
        fn matches(&self, _pawn: &Pawn) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct Plugin {
        released: Vec<String>,
    }

    impl QueryProvider for Plugin {
        fn resolve(&self, name: &str) -> Option<Arc<dyn PawnQuery>> {
            (name == "Snipers").then(|| Arc::new(Always) as Arc<dyn PawnQuery>)
        }

        fn release(&mut self, name: &str) {
            self.released.push(name.to_string());
        }
    }

    #[test]
    fn test_add_rule_orders_per_space() {
        let mut settings = MarkerSettings::new();
        assert!(!settings.has_rules());

        let a = settings.add_rule(RuleCondition::zero(RuleKind::Trait));
        let b = settings.add_rule(RuleCondition::Drafted);
        let c = settings.add_rule(RuleCondition::zero(RuleKind::Skill));

        assert_eq!(settings.rule(a).unwrap().order(), 0);
        assert_eq!(settings.rule(b).unwrap().order(), 0);
        assert_eq!(settings.rule(c).unwrap().order(), 1);
        assert!(settings.rules().iter().all(|r| !r.is_enabled()));
    }

    #[test]
    fn test_remove_rule_releases_query() {
        let mut plugin = Plugin::default();
        let mut settings = MarkerSettings::new();
        let index = settings.add_rule(RuleCondition::Query(QueryCondition::new("Snipers")));
        settings.add_rule(RuleCondition::Drafted);

        settings.remove_rule(index, &mut plugin).unwrap();
        assert_eq!(plugin.released, vec!["Snipers".to_string()]);
        assert_eq!(settings.rules().len(), 1);
        assert_eq!(
            settings.remove_rule(4, &mut plugin),
            Err(Error::RuleNotFound(4))
        );
    }

    #[test]
    fn test_draft_is_independent_until_committed() {
        let catalog = catalog();
        let mut plugin = Plugin::default();
        let mut settings = MarkerSettings::new();
        let index = settings.add_rule(RuleCondition::zero(RuleKind::Trait));

        let mut draft = settings.begin_edit(index).unwrap();
        draft
            .rule
            .set_condition(
                RuleCondition::Trait(Requirements::any(vec![TraitRequirement::new(
                    "Psychopath",
                    None,
                )])),
                &catalog,
            )
            .unwrap();
        draft.rule.set_marker(DefId::new("A"), 1, &catalog).unwrap();
        assert_eq!(settings.rule(index).unwrap().marker_set(), None);

        let discarded = settings.begin_edit(index).unwrap();
        drop(discarded);
        assert_eq!(settings.rule(index).unwrap().marker_set(), None);

        settings.commit_edit(draft, &mut plugin).unwrap();
        settings.set_enabled(index, true, &catalog).unwrap();
        assert_eq!(settings.rule(index).unwrap().marker_blob(), "A;2");
    }

    #[test]
    fn test_stale_draft_is_refused() {
        let catalog = catalog();
        let mut plugin = Plugin::default();
        let mut settings = MarkerSettings::new();
        let first = settings.add_rule(RuleCondition::zero(RuleKind::Trait));
        let second = settings.add_rule(RuleCondition::Downed);
        let third = settings.add_rule(RuleCondition::zero(RuleKind::Skill));

        let mut draft = settings.begin_edit(third).unwrap();
        draft.rule.set_marker(DefId::new("A"), 1, &catalog).unwrap();
        settings.remove_rule(first, &mut plugin).unwrap();

        // The draft's index now points past the end
        assert_eq!(
            settings.commit_edit(draft.clone(), &mut plugin),
            Err(Error::RuleNotFound(third))
        );

        let mut draft = settings.begin_edit(second - 1).unwrap();
        draft.rule.set_marker(DefId::new("A"), 0, &catalog).unwrap();
        settings.remove_rule(0, &mut plugin).unwrap();
        settings.add_rule(RuleCondition::zero(RuleKind::Trait));
        let before = settings.rules().to_vec();

        // Index 0 now holds the skill rule, not the downed rule
        assert_eq!(
            settings.commit_edit(draft, &mut plugin),
            Err(Error::StaleDraft(0))
        );
        assert_eq!(settings.rules(), &before[..]);
    }

    #[test]
    fn test_commit_edit_swaps_query() {
        let catalog = catalog();
        let mut plugin = Plugin::default();
        let mut settings = MarkerSettings::new();
        let index = settings.add_rule(RuleCondition::Query(QueryCondition::new("Medics")));

        let mut draft = settings.begin_edit(index).unwrap();
        draft
            .rule
            .set_condition(RuleCondition::Query(QueryCondition::new("Snipers")), &catalog)
            .unwrap();
        settings.commit_edit(draft, &mut plugin).unwrap();

        assert_eq!(plugin.released, vec!["Medics".to_string()]);
        match settings.rule(index).unwrap().condition() {
            RuleCondition::Query(query) => assert!(query.is_resolved()),
            other => panic!("unexpected condition {other:?}"),
        }
    }

    #[test]
    fn test_resolve_queries_counts_missing() {
        let mut settings = MarkerSettings::new();
        settings.add_rule(RuleCondition::Query(QueryCondition::new("Snipers")));
        settings.add_rule(RuleCondition::Query(QueryCondition::new("Gone")));
        settings.add_rule(RuleCondition::Downed);

        assert_eq!(settings.resolve_queries(&Plugin::default()), 1);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let catalog = catalog();
        let mut settings = MarkerSettings::new();
        let index = settings.add_rule(RuleCondition::Drafted);
        settings.rules[index]
            .set_marker(DefId::new("A"), 0, &catalog)
            .unwrap();
        settings.set_enabled(index, true, &catalog).unwrap();
        settings.show_multiple_markers = true;
        settings.set_category(
            PawnType::Colonist,
            CategorySettings {
                marker_set: Some(DefId::new("A")),
                enabled: true,
            },
        );
        settings.set_category(
            PawnType::Enemy,
            CategorySettings {
                marker_set: None,
                enabled: false,
            },
        );

        let mut snapshot = settings.to_snapshot();
        snapshot.rules.push("Weapon;;INVALID;X;true;0".to_string());

        let restored = MarkerSettings::from_snapshot(snapshot.clone(), &catalog);
        assert_eq!(restored.rules().len(), 2);
        assert!(restored.rule(0).unwrap().is_active());
        assert!(restored.rule(1).unwrap().is_malformed());
        assert!(restored.show_multiple_markers);
        assert!(!restored.category_enabled(PawnType::Enemy));
        assert_eq!(
            restored.category_marker_set(PawnType::Colonist),
            Some(&DefId::new("A"))
        );
        assert_eq!(restored.to_snapshot(), snapshot);
    }

    #[test]
    fn test_unknown_category_marker_set_is_dropped() {
        let mut snapshot = SettingsSnapshot::default();
        snapshot.categories.insert(
            PawnType::Prisoner,
            CategorySettings {
                marker_set: Some(DefId::new("Gone")),
                enabled: true,
            },
        );
        let settings = MarkerSettings::from_snapshot(snapshot, &catalog());
        assert_eq!(settings.category_marker_set(PawnType::Prisoner), None);
        assert!(settings.category_enabled(PawnType::Prisoner));
    }
}
