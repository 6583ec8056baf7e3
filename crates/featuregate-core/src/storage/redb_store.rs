//! # redb-backed Store
//!
//! A disk-backed key-value store using the redb embedded database.
//!
//! One table, `entries`, maps each key to a postcard-encoded `StoredValue`.
//! Every command runs in its own transaction, so each one is atomic and
//! crash-safe, and nothing spans commands. Readers never block the writer
//! (MVCC), which lets one database back several gates in the same process.

use super::{KeyValueStore, StoredValue, glob_match};
use crate::GateError;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::collections::BTreeSet;
use std::path::Path;

/// Table for entries: key string -> serialized StoredValue bytes
const ENTRIES: TableDefinition<&str, &[u8]> = TableDefinition::new("entries");

/// Disk-backed key-value store.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

fn store_err(e: impl std::fmt::Display) -> GateError {
    GateError::Store(e.to_string())
}

fn encode(value: &StoredValue) -> Result<Vec<u8>, GateError> {
    postcard::to_allocvec(value).map_err(|e| GateError::SerializationError(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<StoredValue, GateError> {
    postcard::from_bytes(bytes).map_err(|e| GateError::SerializationError(e.to_string()))
}

impl RedbStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GateError> {
        let db = Database::create(path.as_ref()).map_err(store_err)?;

        // Initialize the table if it doesn't exist
        {
            let write_txn = db.begin_write().map_err(store_err)?;
            let _ = write_txn.open_table(ENTRIES).map_err(store_err)?;
            write_txn.commit().map_err(store_err)?;
        }

        Ok(Self { db })
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), GateError> {
        self.db.compact().map_err(store_err)?;
        Ok(())
    }

    /// Number of keys held.
    pub fn len(&self) -> Result<u64, GateError> {
        let read_txn = self.db.begin_read().map_err(store_err)?;
        let table = read_txn.open_table(ENTRIES).map_err(store_err)?;
        table.len().map_err(store_err)
    }

    pub fn is_empty(&self) -> Result<bool, GateError> {
        Ok(self.len()? == 0)
    }

    /// Read one entry in a read transaction.
    fn load(&self, key: &str) -> Result<Option<StoredValue>, GateError> {
        let read_txn = self.db.begin_read().map_err(store_err)?;
        let table = read_txn.open_table(ENTRIES).map_err(store_err)?;
        let entry = table.get(key).map_err(store_err)?;
        entry.map(|guard| decode(guard.value())).transpose()
    }

    /// Read-modify-write one entry inside a single write transaction.
    ///
    /// `update` receives the current value and returns the new one (`None`
    /// deletes the key) plus the command's result. Nothing is committed if
    /// `update` fails.
    fn modify<T, F>(&self, key: &str, update: F) -> Result<T, GateError>
    where
        F: FnOnce(Option<StoredValue>) -> Result<(Option<StoredValue>, T), GateError>,
    {
        let write_txn = self.db.begin_write().map_err(store_err)?;
        let result = {
            let mut table = write_txn.open_table(ENTRIES).map_err(store_err)?;
            let current = table
                .get(key)
                .map_err(store_err)?
                .map(|guard| decode(guard.value()))
                .transpose()?;

            let (next, result) = update(current)?;
            match next {
                Some(value) => {
                    let bytes = encode(&value)?;
                    table.insert(key, bytes.as_slice()).map_err(store_err)?;
                }
                None => {
                    table.remove(key).map_err(store_err)?;
                }
            }
            result
        };
        write_txn.commit().map_err(store_err)?;
        Ok(result)
    }
}

impl KeyValueStore for RedbStore {
    fn smembers(&self, key: &str) -> Result<BTreeSet<String>, GateError> {
        match self.load(key)? {
            Some(value) => value.into_set(key),
            None => Ok(BTreeSet::new()),
        }
    }

    fn sismember(&self, key: &str, member: &str) -> Result<bool, GateError> {
        match self.load(key)? {
            Some(value) => Ok(value.as_set(key)?.contains(member)),
            None => Ok(false),
        }
    }

    fn sadd(&self, key: &str, member: &str) -> Result<bool, GateError> {
        self.modify(key, |current| {
            let mut members = match current {
                Some(value) => value.into_set(key)?,
                None => BTreeSet::new(),
            };
            let added = members.insert(member.to_string());
            Ok((Some(StoredValue::Set(members)), added))
        })
    }

    fn srem(&self, key: &str, member: &str) -> Result<bool, GateError> {
        self.modify(key, |current| {
            let Some(value) = current else {
                return Ok((None, false));
            };
            let mut members = value.into_set(key)?;
            let removed = members.remove(member);
            let next = (!members.is_empty()).then_some(StoredValue::Set(members));
            Ok((next, removed))
        })
    }

    fn get(&self, key: &str) -> Result<Option<String>, GateError> {
        match self.load(key)? {
            Some(value) => value.as_scalar(key).map(|s| Some(s.to_string())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), GateError> {
        self.modify(key, |_| Ok((Some(StoredValue::Scalar(value.to_string())), ())))
    }

    fn del(&self, key: &str) -> Result<bool, GateError> {
        let write_txn = self.db.begin_write().map_err(store_err)?;
        let existed = {
            let mut table = write_txn.open_table(ENTRIES).map_err(store_err)?;
            table.remove(key).map_err(store_err)?.is_some()
        };
        write_txn.commit().map_err(store_err)?;
        Ok(existed)
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>, GateError> {
        let read_txn = self.db.begin_read().map_err(store_err)?;
        let table = read_txn.open_table(ENTRIES).map_err(store_err)?;

        let mut keys = Vec::new();
        for entry in table.iter().map_err(store_err)? {
            let (key, _) = entry.map_err(store_err)?;
            let key = key.value();
            if glob_match(pattern, key) {
                keys.push(key.to_string());
            }
        }
        Ok(keys)
    }
}

// =============================================================================
// TESTS
// =============================================================================
