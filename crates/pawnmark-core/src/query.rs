//! Capability interface for the external query plugin
//!
//! The plugin owns saved pawn queries. A `Query` rule stores only the query
//! name and asks the provider for the live object after every load.

use crate::Pawn;
use std::fmt;
use std::sync::Arc;

/// A saved predicate owned by the plugin
pub trait PawnQuery: fmt::Debug {
    fn matches(&self, pawn: &Pawn) -> bool;
}

/// Resolves query names to live query objects
pub trait QueryProvider {
    fn resolve(&self, name: &str) -> Option<Arc<dyn PawnQuery>>;

    /// Called when the rule that owned `name` is deleted
    fn release(&mut self, _name: &str) {}
}

/// Provider used when the plugin is not installed
#[derive(Debug, Default, Clone, Copy)]
pub struct NoQueries;

impl QueryProvider for NoQueries {
    fn resolve(&self, _name: &str) -> Option<Arc<dyn PawnQuery>> {
        None
    }
}
