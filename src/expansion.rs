//! Caller-owned expand/collapse state.
//!
//! The renderer never remembers which messages are expanded; whoever lists
//! messages keeps this map and passes the flag on every render.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Message id to expanded flag. Unknown ids are collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpansionState {
    expanded: HashMap<String, bool>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given ids expanded.
    pub fn with_expanded<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expanded: ids.into_iter().map(|id| (id.into(), true)).collect(),
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.get(id).copied().unwrap_or(false)
    }

    pub fn set(&mut self, id: impl Into<String>, expanded: bool) {
        self.expanded.insert(id.into(), expanded);
    }

    /// Flip the flag for `id` and return the new value.
    pub fn toggle(&mut self, id: &str) -> bool {
        let entry = self.expanded.entry(id.to_string()).or_insert(false);
        *entry = !*entry;
        *entry
    }

    /// Number of messages currently expanded.
    pub fn expanded_count(&self) -> usize {
        self.expanded.values().filter(|v| **v).count()
    }
}
