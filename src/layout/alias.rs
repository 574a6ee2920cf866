use std::collections::HashMap;

use parking_lot::Mutex;

use crate::layout::boxspec::Location;

/// Alias name -> last published [`Location`], owned by one render context.
///
/// Only directly resolved (or key-resolved) locations are stored, so following an alias never
/// leads to another alias.
#[derive(Debug, Default)]
pub struct AliasRegistry {
    entries: Mutex<HashMap<String, Location>>,
}

impl AliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `location` under `name`, replacing any earlier entry.
    pub fn publish(&self, name: impl Into<String>, location: Location) {
        self.entries.lock().insert(name.into(), location);
    }

    /// Look up a published alias. The lock is released before the caller recurses.
    pub fn lookup(&self, name: &str) -> Option<Location> {
        self.entries.lock().get(name).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
