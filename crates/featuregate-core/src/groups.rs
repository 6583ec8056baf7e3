//! # Group Registry
//!
//! Process-local map from group name to predicate.
//!
//! Predicates are closures and cannot be persisted, so this is the only
//! state a gate keeps in memory. Registration is expected at startup; the
//! hot path only takes the read lock.

use crate::primitives::ALL_GROUP;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// A group predicate. Receives `None` when nobody is logged in.
pub type GroupPredicate<U> = Arc<dyn Fn(Option<&U>) -> bool + Send + Sync>;

/// Named predicates used by the group strategy.
pub struct GroupRegistry<U> {
    groups: RwLock<BTreeMap<String, GroupPredicate<U>>>,
}

impl<U: 'static> fmt::Debug for GroupRegistry<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupRegistry")
            .field("groups", &self.names())
            .finish()
    }
}

impl<U: 'static> Default for GroupRegistry<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: 'static> GroupRegistry<U> {
    /// Create a registry holding only the built-in `all` group.
    #[must_use]
    pub fn new() -> Self {
        let all: GroupPredicate<U> = Arc::new(|_: Option<&U>| true);
        let mut groups = BTreeMap::new();
        groups.insert(ALL_GROUP.to_string(), all);
        Self {
            groups: RwLock::new(groups),
        }
    }

    /// Register or overwrite the predicate for `name`.
    pub fn define<F>(&self, name: impl Into<String>, predicate: F)
    where
        F: Fn(Option<&U>) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(group = %name, "defining group");
        self.groups
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name, Arc::new(predicate));
    }

    /// Look up a predicate. The lock is released before the caller runs it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<GroupPredicate<U>> {
        self.groups
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    /// Whether `name` has a predicate.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.groups
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(name)
    }

    /// Registered group names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.groups
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    /// Evaluate `name` against `user`. Unknown groups evaluate to false.
    #[must_use]
    pub fn matches(&self, name: &str, user: Option<&U>) -> bool {
        self.get(name).is_some_and(|predicate| predicate(user))
    }
}
