//! Effective marking resolution
//!
//! Combines the four per-entity maps into the one marking the renderer
//! draws. Precedence, highest first:
//!
//! 1. an explicit icon index chosen by the player
//! 2. the override list (drafted, downed, mental break)
//! 3. an explicit custom icon
//! 4. the automatic list
//!
//! With separate temporary markers on, overrides are reported on their own
//! and never replace the base marking.

use crate::{
    Catalog, DefId, Error, ExplicitMark, MarkerSettings, MarkerToken, MarkingStore, Pawn, ThingId,
};
use tracing::{debug, warn};

/// What the renderer should draw for one entity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Marking {
    #[default]
    None,
    /// Icon `index` (0-based) of `set`, chosen by the player
    Manual { set: DefId, index: usize },
    /// Custom icon path chosen by the player
    Custom(String),
    /// Tokens from matching normal rules, primary first
    Automatic(Vec<MarkerToken>),
    /// Tokens from matching override rules, primary first
    Override(Vec<MarkerToken>),
}

impl Marking {
    pub fn is_none(&self) -> bool {
        matches!(self, Marking::None)
    }

    /// Tokens to draw, in display order
    pub fn tokens(&self) -> Vec<MarkerToken> {
        match self {
            Marking::None | Marking::Custom(_) => Vec::new(),
            Marking::Manual { set, index } => vec![MarkerToken::fixed(set.clone(), *index)],
            Marking::Automatic(tokens) | Marking::Override(tokens) => tokens.clone(),
        }
    }

    /// The token shown when only one icon fits
    pub fn primary(&self) -> Option<MarkerToken> {
        self.tokens().into_iter().next()
    }
}

/// Result of resolving one entity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolution {
    pub marking: Marking,
    /// Override tokens drawn beside the marking in separate mode
    pub temporary: Vec<MarkerToken>,
}

/// Resolve the marking of `pawn`
///
/// Stale state found along the way is repaired in `store`: an explicit index
/// past the end of its marker set is removed, and fixed tokens that no longer
/// name a valid icon are dropped.
pub fn resolve(
    store: &mut MarkingStore,
    pawn: &Pawn,
    settings: &MarkerSettings,
    catalog: &Catalog,
) -> Resolution {
    if !settings.category_enabled(pawn.pawn_type) {
        return Resolution::default();
    }
    let id = pawn.id;
    let explicit = store.explicit(id);

    let manual = match explicit {
        Some(ExplicitMark::Index(n)) => manual_marking(store, pawn, n, settings, catalog),
        _ => None,
    };

    let overrides = store.overrides(id).to_vec();
    let overrides = live_tokens(store, id, overrides, catalog);
    let automatic = store.automatic(id).to_vec();
    let automatic = live_tokens(store, id, automatic, catalog);
    let separate = settings.separate_temporary_markers;
    let limit = |tokens: Vec<MarkerToken>| shown(tokens, settings);

    let custom = match explicit {
        Some(ExplicitMark::Custom) => store.custom(id).map(str::to_string),
        _ => None,
    };

    let marking = if let Some(manual) = manual {
        manual
    } else if !separate && !overrides.is_empty() {
        Marking::Override(limit(overrides.clone()))
    } else if let Some(path) = custom {
        Marking::Custom(path)
    } else if !automatic.is_empty() {
        Marking::Automatic(limit(automatic))
    } else {
        Marking::None
    };

    let temporary = if separate {
        limit(overrides)
    } else {
        Vec::new()
    };

    Resolution { marking, temporary }
}

fn manual_marking(
    store: &mut MarkingStore,
    pawn: &Pawn,
    n: u32,
    settings: &MarkerSettings,
    catalog: &Catalog,
) -> Option<Marking> {
    let Some(set) = settings.category_marker_set(pawn.pawn_type) else {
        debug!("No marker set for {}; ignoring explicit mark of {}", pawn.pawn_type, pawn.id);
        return None;
    };
    let checked = match (n as usize).checked_sub(1) {
        Some(index) => catalog.marker_sets.validate(set, index).map(|()| index),
        None => Err(Error::InvalidField {
            field: "explicit mark",
            value: n.to_string(),
        }),
    };
    match checked {
        Ok(index) => Some(Marking::Manual {
            set: set.clone(),
            index,
        }),
        Err(e) => {
            warn!("Resetting explicit mark {} of {}: {}", n, pawn.id, e);
            store.set_explicit(pawn.id, None);
            None
        }
    }
}

/// Drop fixed tokens that no longer name a valid icon, from the list and
/// from the store
fn live_tokens(
    store: &mut MarkingStore,
    id: ThingId,
    tokens: Vec<MarkerToken>,
    catalog: &Catalog,
) -> Vec<MarkerToken> {
    let mut live = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let MarkerToken::Fixed { set, index } = &token {
            if let Err(e) = catalog.marker_sets.validate(set, *index) {
                warn!("Dropping marker {} of {}: {}", token, id, e);
                store.forget_token(id, &token);
                continue;
            }
        }
        live.push(token);
    }
    live
}

fn shown(mut tokens: Vec<MarkerToken>, settings: &MarkerSettings) -> Vec<MarkerToken> {
    if !settings.show_multiple_markers {
        tokens.truncate(1);
    }
    tokens
}
