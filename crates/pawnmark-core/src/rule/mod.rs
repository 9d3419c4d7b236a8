//! Automatic marking rules
//!
//! A [`MarkerRule`] pairs a variant predicate ([`RuleCondition`]) with the
//! fields every rule shares: the marker it assigns, its priority, its pawn
//! category limitation and whether it is enabled.

mod condition;
mod kind;
pub mod params;

pub use condition::{
    AgeRange, QueryCondition, Requirements, RuleCondition, SkillRequirement, TraitRequirement,
    WeaponClass,
};
pub use kind::RuleKind;

use crate::{
    Catalog, DefId, Error, Expansion, MarkerSettings, MarkerToken, Pawn, PawnStore, PawnType,
    QueryProvider, Result,
};

/// Read-only state a rule may look at while matching
pub struct EvalContext<'a> {
    /// Every tracked pawn, for rules that look at other pawns
    pub pawns: &'a PawnStore,
    pub settings: &'a MarkerSettings,
}

impl<'a> EvalContext<'a> {
    pub fn new(pawns: &'a PawnStore, settings: &'a MarkerSettings) -> Self {
        Self { pawns, settings }
    }
}

/// Why a persisted rule could not be loaded
///
/// `raw` is the blob exactly as it was read; it is written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub message: String,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRule {
    condition: RuleCondition,
    enabled: bool,
    order: i32,
    limitation: PawnType,
    marker_set: Option<DefId>,
    marker_index: usize,
    config_error: Option<ConfigError>,
}

impl MarkerRule {
    /// Create a disabled rule with no marker assigned
    pub fn new(condition: RuleCondition, order: i32) -> Self {
        Self {
            condition,
            enabled: false,
            order,
            limitation: PawnType::Default,
            marker_set: None,
            marker_index: 0,
            config_error: None,
        }
    }

    /// A rule that failed to load; inert until replaced
    pub fn malformed(
        condition: RuleCondition,
        order: i32,
        raw: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            config_error: Some(ConfigError {
                message: message.into(),
                raw: raw.into(),
            }),
            ..Self::new(condition, order)
        }
    }

    /// Builder used by the codec and tests; skips enablement checks
    pub(crate) fn with_fields(
        mut self,
        marker_set: Option<DefId>,
        marker_index: usize,
        limitation: PawnType,
    ) -> Self {
        self.marker_set = marker_set;
        self.marker_index = marker_index;
        self.limitation = limitation;
        self
    }

    pub(crate) fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Kind of the condition; `None` for a blob whose kind name is unknown
    pub fn kind(&self) -> Option<RuleKind> {
        self.condition.kind()
    }

    /// Persisted kind name, also available for unknown kinds
    pub fn kind_name(&self) -> &str {
        self.condition.kind_name()
    }

    pub fn condition(&self) -> &RuleCondition {
        &self.condition
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Position within the rule's priority space; lower is evaluated first
    pub fn order(&self) -> i32 {
        self.order
    }

    pub(crate) fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    /// Pawn category the rule is limited to; `Default` means any
    pub fn limitation(&self) -> PawnType {
        self.limitation
    }

    /// Marker set the rule draws from, if one was assigned
    pub fn marker_set(&self) -> Option<&DefId> {
        self.marker_set.as_ref()
    }

    /// Zero-based icon index within [`marker_set`](Self::marker_set)
    pub fn marker_index(&self) -> usize {
        self.marker_index
    }

    /// Why the rule failed to load, with the blob it was loaded from
    pub fn config_error(&self) -> Option<&ConfigError> {
        self.config_error.as_ref()
    }

    pub fn is_malformed(&self) -> bool {
        self.config_error.is_some()
    }

    /// Override rules live in their own priority space
    pub fn is_override(&self) -> bool {
        self.kind().is_some_and(|k| k.is_override())
    }

    /// Enabled and loaded cleanly
    pub fn is_active(&self) -> bool {
        self.enabled && self.config_error.is_none()
    }

    /// Check every precondition for enabling this rule
    pub fn can_enable(&self, catalog: &Catalog) -> Result<()> {
        self.check_enable(catalog, false)
    }

    /// Like [`can_enable`](MarkerRule::can_enable), but a marker index past
    /// the end of its set is accepted
    ///
    /// Used at load time: the stale token is dropped when the marking is
    /// resolved, and the rule comes back once the set grows again.
    pub(crate) fn can_stay_enabled(&self, catalog: &Catalog) -> Result<()> {
        self.check_enable(catalog, true)
    }

    fn check_enable(&self, catalog: &Catalog, allow_stale_index: bool) -> Result<()> {
        if let Some(error) = &self.config_error {
            return Err(Error::CannotEnable(format!("rule is malformed: {}", error.message)));
        }
        let kind = self
            .kind()
            .ok_or_else(|| Error::CannotEnable("unknown rule kind".to_string()))?;
        if let Some(expansion) = kind.required_expansion() {
            if !catalog.has_expansion(expansion) {
                return Err(Error::CannotEnable(format!("{expansion} is not installed")));
            }
        }
        if !kind.has_dynamic_icon() {
            let set = self
                .marker_set
                .as_ref()
                .ok_or_else(|| Error::CannotEnable("no marker assigned".to_string()))?;
            match catalog.marker_sets.validate(set, self.marker_index) {
                Ok(()) => {}
                Err(Error::MarkerIndexOutOfRange { .. }) if allow_stale_index => {}
                Err(e) => return Err(Error::CannotEnable(e.to_string())),
            }
        }
        if let Some(missing) = self.condition.missing_parameters(self.limitation) {
            return Err(Error::CannotEnable(missing.to_string()));
        }
        Ok(())
    }

    /// Enable or disable the rule
    ///
    /// Enabling is rejected, and nothing changes, unless [`can_enable`]
    /// holds.
    ///
    /// [`can_enable`]: MarkerRule::can_enable
    pub fn set_enabled(&mut self, enabled: bool, catalog: &Catalog) -> Result<()> {
        if enabled {
            self.can_enable(catalog)?;
        }
        self.enabled = enabled;
        Ok(())
    }

    /// Assign icon `index` (0-based) of marker set `set`
    pub fn set_marker(&mut self, set: DefId, index: usize, catalog: &Catalog) -> Result<()> {
        self.ensure_editable()?;
        catalog.marker_sets.validate(&set, index)?;
        self.marker_set = Some(set);
        self.marker_index = index;
        Ok(())
    }

    /// Remove the assigned marker; the rule is disabled
    pub fn clear_marker(&mut self) {
        self.marker_set = None;
        self.marker_index = 0;
        self.enabled = false;
    }

    /// Restrict the rule to one pawn category (`Default` lifts the restriction)
    pub fn set_limitation(&mut self, limitation: PawnType, catalog: &Catalog) -> Result<()> {
        self.ensure_editable()?;
        let kind = self
            .kind()
            .ok_or_else(|| Error::MalformedRule("unknown rule kind".to_string()))?;
        if !kind.is_applicable(limitation, catalog) {
            return Err(Error::InapplicablePawnType {
                kind: kind.to_string(),
                pawn_type: limitation,
            });
        }
        if limitation == PawnType::Vehicle && !catalog.has_expansion(Expansion::Vehicles) {
            return Err(Error::MissingExpansion(Expansion::Vehicles));
        }
        self.limitation = limitation;
        if self.enabled && self.can_enable(catalog).is_err() {
            self.enabled = false;
        }
        Ok(())
    }

    /// Replace the variant parameters; the kind cannot change
    ///
    /// An enabled rule whose new parameters are incomplete is disabled.
    pub fn set_condition(&mut self, condition: RuleCondition, catalog: &Catalog) -> Result<()> {
        self.ensure_editable()?;
        if condition.kind() != self.kind() {
            return Err(Error::KindMismatch {
                expected: self.kind_name().to_string(),
                got: condition.kind_name().to_string(),
            });
        }
        self.condition = condition;
        if self.enabled && self.can_enable(catalog).is_err() {
            self.enabled = false;
        }
        Ok(())
    }

    fn ensure_editable(&self) -> Result<()> {
        match &self.config_error {
            Some(error) => Err(Error::MalformedRule(error.message.clone())),
            None => Ok(()),
        }
    }

    /// Re-resolve the plugin query of a `Query` rule
    ///
    /// Returns false only for a query rule whose query was not found.
    pub fn resolve_query(&mut self, provider: &dyn QueryProvider) -> bool {
        match self.condition.query_mut() {
            Some(query) => query.resolve(provider),
            None => true,
        }
    }

    /// Name of the plugin query this rule owns, if any
    pub fn query_name(&self) -> Option<&str> {
        match &self.condition {
            RuleCondition::Query(query) if !query.name.is_empty() => Some(&query.name),
            _ => None,
        }
    }

    /// Presence and category check shared by every kind
    fn base_applies(&self, pawn: &Pawn, ctx: &EvalContext<'_>) -> bool {
        let present =
            pawn.is_alive_and_spawned() || (pawn.dead && ctx.settings.show_on_corpses);
        present && self.limitation.admits(pawn.pawn_type)
    }

    /// Match this rule against a pawn
    ///
    /// Inert rules never match. Errors come only from variant predicates.
    pub fn try_match(&self, pawn: &Pawn, ctx: &EvalContext<'_>) -> Result<bool> {
        if !self.is_active() || !self.base_applies(pawn, ctx) {
            return Ok(false);
        }
        self.condition.matches(pawn, ctx)
    }

    /// Match this rule, treating a failing predicate as no match
    pub fn applies_to_pawn(&self, pawn: &Pawn, ctx: &EvalContext<'_>) -> bool {
        match self.try_match(pawn, ctx) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::debug!("{} rule skipped for {}: {}", self.kind_name(), pawn.id, e);
                false
            }
        }
    }

    /// The token this rule contributes when it matches
    pub fn marker_token(&self) -> Option<MarkerToken> {
        match self.kind()? {
            RuleKind::FactionIcon => Some(MarkerToken::FactionIcon),
            RuleKind::IdeologyIcon => Some(MarkerToken::IdeologyIcon),
            _ => self.marker_set.as_ref().map(|set| MarkerToken::Fixed {
                set: set.clone(),
                index: self.marker_index,
            }),
        }
    }

    /// String form of [`marker_token`](MarkerRule::marker_token), empty if none
    pub fn marker_blob(&self) -> String {
        self.marker_token()
            .map(|t| t.to_string())
            .unwrap_or_default()
    }
}
