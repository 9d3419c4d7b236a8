//! Lifecycle notifications from the host

use crate::ThingId;
use serde::{Deserialize, Serialize};

/// Something happened to a tracked thing that may change its marking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostEvent {
    /// Spawned on a map (including after loading)
    Spawned(ThingId),
    /// Health cache dirtied: hediffs added, removed or changed
    HealthChanged(ThingId),
    DraftedChanged(ThingId),
    DownedChanged(ThingId),
    MentalStateStarted(ThingId),
    MentalStateCleared(ThingId),
    /// A pawn died and left a corpse
    Killed { pawn: ThingId, corpse: ThingId },
}

impl HostEvent {
    /// The thing to re-evaluate after this event
    pub fn subject(&self) -> ThingId {
        match *self {
            HostEvent::Spawned(id)
            | HostEvent::HealthChanged(id)
            | HostEvent::DraftedChanged(id)
            | HostEvent::DownedChanged(id)
            | HostEvent::MentalStateStarted(id)
            | HostEvent::MentalStateCleared(id) => id,
            HostEvent::Killed { corpse, .. } => corpse,
        }
    }
}
