//! Delimiters and parsing helpers for rule parameter payloads
//!
//! Parameters use three nested separators: items (`;`), list entries (`|`)
//! and values inside an entry (`§`). A skill rule, for example, encodes as
//! `Shooting§8§0|Melee§8§0;false`.

use crate::{DefId, Error, Result};
use std::borrow::Cow;
use std::str::FromStr;

pub const ITEM_SEPARATOR: char = ';';
pub const LIST_SEPARATOR: char = '|';
pub const VALUE_SEPARATOR: char = '§';

/// Older blobs separated list entries with a plain comma
const LEGACY_LIST_SEPARATOR: char = ',';

/// Rewrite a legacy comma-separated payload into the current scheme
///
/// Only payloads that use none of the current list or value separators are
/// touched, so a migrated payload is never migrated twice.
pub fn migrate_legacy(params: &str) -> Cow<'_, str> {
    if params.contains(LEGACY_LIST_SEPARATOR)
        && !params.contains(LIST_SEPARATOR)
        && !params.contains(VALUE_SEPARATOR)
    {
        Cow::Owned(params.replace(LEGACY_LIST_SEPARATOR, &LIST_SEPARATOR.to_string()))
    } else {
        Cow::Borrowed(params)
    }
}

/// Split a payload into exactly `expected` items
pub fn items(params: &str, expected: usize) -> Result<Vec<&str>> {
    if expected == 0 {
        if params.is_empty() {
            return Ok(Vec::new());
        }
        return Err(Error::InvalidParameters(format!(
            "expected no parameters, found {params:?}"
        )));
    }
    let parts: Vec<&str> = params.split(ITEM_SEPARATOR).collect();
    if parts.len() != expected {
        return Err(Error::InvalidParameters(format!(
            "expected {expected} items, found {} in {params:?}",
            parts.len()
        )));
    }
    Ok(parts)
}

/// Split a list item into its entries; the empty string is the empty list
pub fn list(item: &str) -> Vec<&str> {
    if item.is_empty() {
        Vec::new()
    } else {
        item.split(LIST_SEPARATOR).collect()
    }
}

/// Split a list entry into between `min` and `max` values
pub fn values(entry: &str, min: usize, max: usize) -> Result<Vec<&str>> {
    let parts: Vec<&str> = entry.split(VALUE_SEPARATOR).collect();
    if parts.len() < min || parts.len() > max {
        return Err(Error::InvalidParameters(format!(
            "expected {min}..={max} values, found {} in {entry:?}",
            parts.len()
        )));
    }
    Ok(parts)
}

pub fn parse<T: FromStr>(value: &str, field: &'static str) -> Result<T> {
    value.parse().map_err(|_| Error::InvalidField {
        field,
        value: value.to_string(),
    })
}

pub fn parse_def(value: &str) -> Result<DefId> {
    if value.is_empty() {
        return Err(Error::InvalidField {
            field: "def",
            value: String::new(),
        });
    }
    Ok(DefId::new(value))
}

pub fn parse_named<T>(
    value: &str,
    field: &'static str,
    from_name: fn(&str) -> Option<T>,
) -> Result<T> {
    from_name(value).ok_or_else(|| Error::InvalidField {
        field,
        value: value.to_string(),
    })
}

pub fn def_list(item: &str) -> Result<Vec<DefId>> {
    list(item).into_iter().map(parse_def).collect()
}

pub fn named_list<T>(
    item: &str,
    field: &'static str,
    from_name: fn(&str) -> Option<T>,
) -> Result<Vec<T>> {
    list(item)
        .into_iter()
        .map(|v| parse_named(v, field, from_name))
        .collect()
}

pub fn join<T, F>(entries: &[T], encode: F) -> String
where
    F: Fn(&T) -> String,
{
    entries
        .iter()
        .map(encode)
        .collect::<Vec<_>>()
        .join(&LIST_SEPARATOR.to_string())
}

pub fn join_defs(defs: &[DefId]) -> String {
    join(defs, |d| d.to_string())
}
