//! Marker sets and the tokens rules emit
//!
//! A marker set is a named, ordered list of interchangeable icons. Rules
//! assign "icon N of set S"; the renderer asks the registry for the texture.

use crate::{DefId, Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One icon in a marker set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconDef {
    /// Texture path handed to the renderer
    pub texture: String,
}

/// A named, ordered collection of icons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSet {
    pub id: DefId,
    #[serde(default)]
    pub label: String,
    pub icons: Vec<IconDef>,
}

impl MarkerSet {
    pub fn new(id: impl Into<DefId>, textures: &[&str]) -> Self {
        let id = id.into();
        Self {
            label: id.to_string(),
            id,
            icons: textures
                .iter()
                .map(|t| IconDef {
                    texture: (*t).to_string(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

/// All marker sets known to the session
#[derive(Debug, Clone, Default)]
pub struct MarkerSetRegistry {
    sets: IndexMap<DefId, MarkerSet>,
}

impl MarkerSetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a set, replacing any set with the same id
    pub fn insert(&mut self, set: MarkerSet) {
        self.sets.insert(set.id.clone(), set);
    }

    pub fn get(&self, id: &DefId) -> Option<&MarkerSet> {
        self.sets.get(id)
    }

    pub fn contains(&self, id: &DefId) -> bool {
        self.sets.contains_key(id)
    }

    /// Number of icons in a set, 0 if the set is unknown
    pub fn icon_count(&self, id: &DefId) -> usize {
        self.sets.get(id).map(MarkerSet::len).unwrap_or(0)
    }

    /// Icon `index` (0-based) of set `id`
    pub fn icon(&self, id: &DefId, index: usize) -> Option<&IconDef> {
        self.sets.get(id).and_then(|s| s.icons.get(index))
    }

    /// Check that `index` names an icon of set `id`
    pub fn validate(&self, id: &DefId, index: usize) -> Result<()> {
        let set = self
            .sets
            .get(id)
            .ok_or_else(|| Error::MarkerSetNotFound(id.to_string()))?;
        if index >= set.len() {
            return Err(Error::MarkerIndexOutOfRange {
                set: id.to_string(),
                index,
                count: set.len(),
            });
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarkerSet> {
        self.sets.values()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Separator between tokens when a token list is persisted
pub const TOKEN_LIST_SEPARATOR: char = '|';

const FACTION_ICON_TOKEN: &str = "$FactionIcon";
const IDEOLOGY_ICON_TOKEN: &str = "$IdeologyIcon";

/// What a matching rule contributes to a pawn's marking
///
/// Fixed tokens render as `"<set>;<index+1>"`. The dynamic variants are
/// sentinels: the renderer computes the icon from the pawn's current
/// faction or ideology.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerToken {
    Fixed { set: DefId, index: usize },
    FactionIcon,
    IdeologyIcon,
}

impl MarkerToken {
    pub fn fixed(set: impl Into<DefId>, index: usize) -> Self {
        MarkerToken::Fixed {
            set: set.into(),
            index,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        !matches!(self, MarkerToken::Fixed { .. })
    }

    /// Join a token list into its persisted form
    pub fn join(tokens: &[MarkerToken]) -> String {
        tokens
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(&TOKEN_LIST_SEPARATOR.to_string())
    }

    /// Split a persisted token list; the empty string is the empty list
    pub fn split(blob: &str) -> Result<Vec<MarkerToken>> {
        if blob.is_empty() {
            return Ok(Vec::new());
        }
        blob.split(TOKEN_LIST_SEPARATOR).map(str::parse).collect()
    }
}

impl fmt::Display for MarkerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerToken::Fixed { set, index } => write!(f, "{};{}", set, index + 1),
            MarkerToken::FactionIcon => f.write_str(FACTION_ICON_TOKEN),
            MarkerToken::IdeologyIcon => f.write_str(IDEOLOGY_ICON_TOKEN),
        }
    }
}

impl FromStr for MarkerToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            FACTION_ICON_TOKEN => return Ok(MarkerToken::FactionIcon),
            IDEOLOGY_ICON_TOKEN => return Ok(MarkerToken::IdeologyIcon),
            _ => {}
        }
        let invalid = || Error::InvalidField {
            field: "marker token",
            value: s.to_string(),
        };
        let (set, number) = s.split_once(';').ok_or_else(invalid)?;
        let number: usize = number.parse().map_err(|_| invalid())?;
        if set.is_empty() || number == 0 {
            return Err(invalid());
        }
        Ok(MarkerToken::fixed(set, number - 1))
    }
}
