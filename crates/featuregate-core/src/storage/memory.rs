//! In-memory store.
//!
//! A `BTreeMap` behind a `RwLock`. Each command holds the lock for its whole
//! duration, which gives the same per-command atomicity as a real server.

use super::{KeyValueStore, StoredValue, glob_match};
use crate::GateError;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Volatile key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, StoredValue>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, StoredValue>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, StoredValue>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn smembers(&self, key: &str) -> Result<BTreeSet<String>, GateError> {
        match self.read().get(key) {
            Some(value) => value.as_set(key).cloned(),
            None => Ok(BTreeSet::new()),
        }
    }

    fn sismember(&self, key: &str, member: &str) -> Result<bool, GateError> {
        match self.read().get(key) {
            Some(value) => Ok(value.as_set(key)?.contains(member)),
            None => Ok(false),
        }
    }

    fn sadd(&self, key: &str, member: &str) -> Result<bool, GateError> {
        let mut entries = self.write();
        match entries.get_mut(key) {
            Some(StoredValue::Set(members)) => Ok(members.insert(member.to_string())),
            Some(other) => other.as_set(key).map(|_| false),
            None => {
                let members = BTreeSet::from([member.to_string()]);
                entries.insert(key.to_string(), StoredValue::Set(members));
                Ok(true)
            }
        }
    }

    fn srem(&self, key: &str, member: &str) -> Result<bool, GateError> {
        let mut entries = self.write();
        let Some(value) = entries.get_mut(key) else {
            return Ok(false);
        };
        let StoredValue::Set(members) = value else {
            return value.as_set(key).map(|_| false);
        };

        let removed = members.remove(member);
        if members.is_empty() {
            entries.remove(key);
        }
        Ok(removed)
    }

    fn get(&self, key: &str) -> Result<Option<String>, GateError> {
        match self.read().get(key) {
            Some(value) => value.as_scalar(key).map(|s| Some(s.to_string())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), GateError> {
        self.write()
            .insert(key.to_string(), StoredValue::Scalar(value.to_string()));
        Ok(())
    }

    fn del(&self, key: &str) -> Result<bool, GateError> {
        Ok(self.write().remove(key).is_some())
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>, GateError> {
        Ok(self
            .read()
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect())
    }
}
