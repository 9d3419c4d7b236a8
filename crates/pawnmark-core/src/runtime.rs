//! Host-facing runtime for the marking engine

use crate::{
    Catalog, Clock, DefId, EvaluationOutcome, EvaluationQueue, ExplicitMark, HostEvent, IconCache,
    MarkerSettings, MarkerToken, MarkingSnapshot, MarkingStore, Pawn, PawnStore, QueryProvider,
    Resolution, Result, SettingsSnapshot, ThingId, Tick,
};
use tracing::debug;

/// Result of one simulation tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The tick that was processed
    pub tick: Tick,
    /// The thing evaluated this tick, if the queue was not empty
    pub evaluated: Option<(ThingId, EvaluationOutcome)>,
    /// Entries removed by the daily compaction, if it ran
    pub compacted: Option<usize>,
    /// Things queued by the hourly refresh
    pub refreshed: usize,
}

/// The marking engine as the host sees it
///
/// Owns the settings, the session catalog and all per-entity state. The
/// host reports lifecycle events through [`notify`](Self::notify), calls
/// [`tick`](Self::tick) once per simulation tick and asks
/// [`resolve`](Self::resolve) what to draw.
#[derive(Debug, Clone)]
pub struct MarkerRuntime {
    settings: MarkerSettings,
    catalog: Catalog,
    store: MarkingStore,
    queue: EvaluationQueue,
    icons: IconCache,
    clock: Clock,
}

impl MarkerRuntime {
    /// Create a runtime with empty marking state
    pub fn new(settings: MarkerSettings, catalog: Catalog) -> Self {
        Self {
            settings,
            catalog,
            store: MarkingStore::new(),
            queue: EvaluationQueue::new(),
            icons: IconCache::new(),
            clock: Clock::new(),
        }
    }

    /// Create a runtime from persisted settings
    ///
    /// Plugin queries are resolved against `queries` straight away.
    pub fn load(snapshot: SettingsSnapshot, catalog: Catalog, queries: &dyn QueryProvider) -> Self {
        let mut settings = MarkerSettings::from_snapshot(snapshot, &catalog);
        settings.resolve_queries(queries);
        Self::new(settings, catalog)
    }

    /// Get the settings
    pub fn settings(&self) -> &MarkerSettings {
        &self.settings
    }

    /// Get the settings for editing
    ///
    /// Rule changes take effect as things are re-evaluated; call
    /// [`refresh_all`](Self::refresh_all) to re-evaluate everything.
    pub fn settings_mut(&mut self) -> &mut MarkerSettings {
        &mut self.settings
    }

    /// Get the session catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Get the per-entity marking state
    pub fn store(&self) -> &MarkingStore {
        &self.store
    }

    /// Get the evaluation queue
    pub fn queue(&self) -> &EvaluationQueue {
        &self.queue
    }

    /// Get the current tick
    pub fn current_tick(&self) -> Tick {
        self.clock.tick
    }

    /// Set the clock, e.g. after loading a save mid-game
    pub fn set_tick(&mut self, tick: Tick) {
        self.clock = Clock::at(tick);
    }

    /// Queue a thing for re-evaluation
    pub fn enqueue(&mut self, id: ThingId) -> bool {
        self.queue.enqueue(id)
    }

    /// Move all marking state from a pawn to its corpse
    pub fn transfer_to_corpse(&mut self, pawn: ThingId, corpse: ThingId) {
        self.store.transfer(pawn, corpse);
        self.icons.invalidate(pawn);
    }

    /// Handle a lifecycle event from the host
    pub fn notify(&mut self, event: HostEvent) {
        if let HostEvent::Killed { pawn, corpse } = event {
            self.transfer_to_corpse(pawn, corpse);
        }
        self.enqueue(event.subject());
    }

    /// Queue every tracked thing; returns how many were newly queued
    pub fn refresh_all(&mut self, pawns: &PawnStore) -> usize {
        pawns.ids().filter(|id| self.queue.enqueue(*id)).count()
    }

    /// Remove state for things the host no longer tracks
    pub fn compact(&mut self, pawns: &PawnStore) -> usize {
        let removed = self.store.compact(pawns);
        self.icons.retain(pawns);
        removed
    }

    /// Advance one simulation tick
    ///
    /// Runs the daily compaction and the optional hourly refresh when due,
    /// then evaluates at most one queued thing.
    pub fn tick(&mut self, pawns: &PawnStore) -> TickReport {
        let tick = self.clock.advance();
        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };

        if self.clock.is_day_boundary() {
            report.compacted = Some(self.compact(pawns));
        }
        if self.clock.is_hour_boundary() && self.settings.refresh_rules_periodically {
            report.refreshed = self.refresh_all(pawns);
            debug!("Periodic refresh queued {} things", report.refreshed);
        }

        report.evaluated = self
            .queue
            .drain_one(pawns, &self.settings, &mut self.store, &mut self.icons);
        report
    }

    /// Resolve what to draw for a pawn
    ///
    /// Stale state found while resolving is repaired.
    pub fn resolve(&mut self, pawn: &Pawn) -> Resolution {
        crate::resolve::resolve(&mut self.store, pawn, &self.settings, &self.catalog)
    }

    /// Set or clear (`None`) the player's explicit mark
    pub fn set_explicit_mark(&mut self, id: ThingId, mark: Option<ExplicitMark>) {
        self.store.set_explicit(id, mark);
    }

    /// Mark a thing with a custom icon path, or clear it (`None`)
    ///
    /// Clearing also removes an explicit mark that pointed at the custom
    /// icon.
    pub fn set_custom_icon(&mut self, id: ThingId, path: Option<String>) {
        match path {
            Some(path) => {
                self.store.set_custom(id, Some(path));
                self.store.set_explicit(id, Some(ExplicitMark::Custom));
            }
            None => {
                self.store.set_custom(id, None);
                if self.store.explicit(id) == Some(ExplicitMark::Custom) {
                    self.store.set_explicit(id, None);
                }
            }
        }
    }

    /// Texture of icon `index` (0-based) of a marker set
    pub fn icon_texture(&self, set: &DefId, index: usize) -> Option<&str> {
        self.catalog
            .icon(set, index)
            .map(|icon| icon.texture.as_str())
    }

    /// Texture to draw for one token of a pawn's marking
    ///
    /// Dynamic tokens are looked up in the icon cache, rebuilding it if
    /// needed.
    pub fn token_texture(&mut self, pawn: &Pawn, token: &MarkerToken) -> Option<String> {
        match token {
            MarkerToken::Fixed { set, index } => self.icon_texture(set, *index).map(str::to_string),
            MarkerToken::FactionIcon => self.icons.icons_for(pawn).faction.clone(),
            MarkerToken::IdeologyIcon => self.icons.icons_for(pawn).ideology.clone(),
        }
    }

    /// Persisted form of the settings
    pub fn settings_snapshot(&self) -> SettingsSnapshot {
        self.settings.to_snapshot()
    }

    /// Persisted form of the marking state
    ///
    /// Entries for things the host no longer tracks are pruned first.
    pub fn snapshot(&mut self, pawns: &PawnStore) -> MarkingSnapshot {
        self.compact(pawns);
        self.store.to_snapshot()
    }

    /// Replace the marking state with a loaded snapshot
    ///
    /// The queue and icon cache start empty; the host re-spawns things
    /// after loading, which queues them again.
    pub fn restore(&mut self, snapshot: &MarkingSnapshot) -> Result<()> {
        self.store = MarkingStore::from_snapshot(snapshot)?;
        self.queue = EvaluationQueue::new();
        self.icons = IconCache::new();
        Ok(())
    }
}
