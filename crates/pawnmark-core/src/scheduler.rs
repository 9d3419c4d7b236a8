//! Incremental re-evaluation scheduler
//!
//! Lifecycle events put things on a FIFO queue. Each simulation tick drains
//! at most one of them and re-runs the rules against it, so a burst of
//! events is spread over many ticks instead of stalling one frame.

use crate::{
    EvalContext, IconCache, MarkerSettings, MarkerToken, MarkingStore, Pawn, PawnStore, ThingId,
};
use std::collections::{HashSet, VecDeque};
use tracing::trace;

/// Where a thing is in the evaluation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    NotQueued,
    Queued,
    /// Taken off the queue by [`EvaluationQueue::begin_next`] and not yet
    /// finished
    Evaluating,
}

/// What one evaluation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationOutcome {
    /// The thing no longer exists
    Missing,
    /// No rules are configured; both lists were cleared
    Dropped,
    /// Both lists were recomputed
    Evaluated { overrides: usize, automatic: usize },
}

/// FIFO of things waiting for evaluation, with set membership
#[derive(Debug, Clone, Default)]
pub struct EvaluationQueue {
    order: VecDeque<ThingId>,
    queued: HashSet<ThingId>,
    evaluating: Option<ThingId>,
}

impl EvaluationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a thing; a thing already queued keeps its place
    ///
    /// Returns true if the thing was newly queued.
    pub fn enqueue(&mut self, id: ThingId) -> bool {
        if !self.queued.insert(id) {
            return false;
        }
        self.order.push_back(id);
        true
    }

    pub fn state(&self, id: ThingId) -> QueueState {
        if self.queued.contains(&id) {
            QueueState::Queued
        } else if self.evaluating == Some(id) {
            QueueState::Evaluating
        } else {
            QueueState::NotQueued
        }
    }

    pub fn is_queued(&self, id: ThingId) -> bool {
        self.queued.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Queued things, front first
    pub fn iter(&self) -> impl Iterator<Item = ThingId> + '_ {
        self.order.iter().copied()
    }

    /// Take the thing at the front of the queue and mark it as being
    /// evaluated
    ///
    /// A thing queued again before [`finish`](EvaluationQueue::finish)
    /// reports `Queued` and is evaluated a second time later.
    pub fn begin_next(&mut self) -> Option<ThingId> {
        let id = self.order.pop_front()?;
        self.queued.remove(&id);
        self.evaluating = Some(id);
        Some(id)
    }

    pub fn finish(&mut self, id: ThingId) {
        if self.evaluating == Some(id) {
            self.evaluating = None;
        }
    }

    /// Evaluate the thing at the front of the queue, if any
    pub fn drain_one(
        &mut self,
        pawns: &PawnStore,
        settings: &MarkerSettings,
        store: &mut MarkingStore,
        icons: &mut IconCache,
    ) -> Option<(ThingId, EvaluationOutcome)> {
        let id = self.begin_next()?;
        let outcome = evaluate(id, pawns, settings, store, icons);
        self.finish(id);
        trace!("Evaluated {}: {:?}", id, outcome);
        Some((id, outcome))
    }
}

/// Re-run every active rule against one thing and store the results
///
/// The dynamic icon cache entry is invalidated in every case. With no
/// rules configured, lists left over from earlier rules are cleared.
pub fn evaluate(
    id: ThingId,
    pawns: &PawnStore,
    settings: &MarkerSettings,
    store: &mut MarkingStore,
    icons: &mut IconCache,
) -> EvaluationOutcome {
    icons.invalidate(id);
    let Some(pawn) = pawns.get(id) else {
        return EvaluationOutcome::Missing;
    };
    if !settings.has_rules() {
        store.set_overrides(id, Vec::new());
        store.set_automatic(id, Vec::new());
        return EvaluationOutcome::Dropped;
    }

    let ctx = EvalContext::new(pawns, settings);
    let overrides = matching_tokens(pawn, &ctx, true);
    let automatic = matching_tokens(pawn, &ctx, false);
    let outcome = EvaluationOutcome::Evaluated {
        overrides: overrides.len(),
        automatic: automatic.len(),
    };
    store.set_overrides(id, overrides);
    store.set_automatic(id, automatic);
    outcome
}

/// Tokens of every matching rule in one priority space, primary first
fn matching_tokens(pawn: &Pawn, ctx: &EvalContext<'_>, is_override: bool) -> Vec<MarkerToken> {
    let mut tokens: Vec<MarkerToken> = Vec::new();
    for rule in ctx.settings.rules_in_priority(is_override) {
        if !rule.applies_to_pawn(pawn, ctx) {
            continue;
        }
        if let Some(token) = rule.marker_token() {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
    }
    tokens
}
