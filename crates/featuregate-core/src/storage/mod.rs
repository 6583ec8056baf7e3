//! # Key-Value Storage
//!
//! The store contract the gate runs against, plus two backends:
//! - `MemoryStore`: in-process `BTreeMap` (tests, ephemeral runs)
//! - `RedbStore`: disk-backed redb database (ACID per command)
//!
//! Semantics follow the common key-value server conventions: a set whose
//! last member is removed disappears, and a set command against a scalar
//! key (or the reverse) fails with a wrong-type error.

mod memory;
mod pattern;
mod redb_store;

pub use memory::MemoryStore;
pub use pattern::glob_match;
pub use redb_store::RedbStore;

use crate::GateError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// KEYVALUESTORE TRAIT
// =============================================================================

/// The commands the gate needs from a key-value store.
///
/// Every command is atomic on its own. Nothing spans keys.
/// All methods take `&self`; backends handle their own synchronization.
pub trait KeyValueStore {
    /// Members of the set at `key`. Empty if the key is absent.
    fn smembers(&self, key: &str) -> Result<BTreeSet<String>, GateError>;

    /// Whether `member` is in the set at `key`.
    fn sismember(&self, key: &str, member: &str) -> Result<bool, GateError>;

    /// Add `member` to the set at `key`, creating it if needed.
    /// Returns true if the member was not already present.
    fn sadd(&self, key: &str, member: &str) -> Result<bool, GateError>;

    /// Remove `member` from the set at `key`.
    /// Returns true if the member was present.
    fn srem(&self, key: &str, member: &str) -> Result<bool, GateError>;

    /// Scalar value at `key`.
    fn get(&self, key: &str) -> Result<Option<String>, GateError>;

    /// Overwrite `key` with a scalar value, whatever it held before.
    fn set(&self, key: &str, value: &str) -> Result<(), GateError>;

    /// Delete `key`. Returns true if it existed.
    fn del(&self, key: &str) -> Result<bool, GateError>;

    /// All keys matching a glob `pattern`, in sorted order.
    fn keys(&self, pattern: &str) -> Result<Vec<String>, GateError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn smembers(&self, key: &str) -> Result<BTreeSet<String>, GateError> {
        (**self).smembers(key)
    }

    fn sismember(&self, key: &str, member: &str) -> Result<bool, GateError> {
        (**self).sismember(key, member)
    }

    fn sadd(&self, key: &str, member: &str) -> Result<bool, GateError> {
        (**self).sadd(key, member)
    }

    fn srem(&self, key: &str, member: &str) -> Result<bool, GateError> {
        (**self).srem(key, member)
    }

    fn get(&self, key: &str) -> Result<Option<String>, GateError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), GateError> {
        (**self).set(key, value)
    }

    fn del(&self, key: &str) -> Result<bool, GateError> {
        (**self).del(key)
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>, GateError> {
        (**self).keys(pattern)
    }
}

// =============================================================================
// STORED VALUE
// =============================================================================

/// A value held under one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoredValue {
    Set(BTreeSet<String>),
    Scalar(String),
}

impl StoredValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Set(_) => "set",
            Self::Scalar(_) => "scalar",
        }
    }

    /// Borrow as a set, failing on scalars.
    pub fn as_set(&self, key: &str) -> Result<&BTreeSet<String>, GateError> {
        match self {
            Self::Set(members) => Ok(members),
            Self::Scalar(_) => Err(wrong_type(key, "set", self.kind())),
        }
    }

    /// Take as a set, failing on scalars.
    pub fn into_set(self, key: &str) -> Result<BTreeSet<String>, GateError> {
        match self {
            Self::Set(members) => Ok(members),
            Self::Scalar(_) => Err(wrong_type(key, "set", "scalar")),
        }
    }

    /// Borrow as a scalar, failing on sets.
    pub fn as_scalar(&self, key: &str) -> Result<&str, GateError> {
        match self {
            Self::Scalar(value) => Ok(value),
            Self::Set(_) => Err(wrong_type(key, "scalar", self.kind())),
        }
    }
}

fn wrong_type(key: &str, expected: &str, found: &str) -> GateError {
    GateError::Store(format!(
        "WRONGTYPE key '{}' holds a {}, expected a {}",
        key, found, expected
    ))
}
