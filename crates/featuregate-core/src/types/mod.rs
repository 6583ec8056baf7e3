//! # Core Type Definitions
//!
//! This module contains the shared types for featuregate:
//! - User identity (`Identity`, `UserId`)
//! - Stored rule snapshot (`FeatureState`)
//! - Error types (`GateError`)
//!
//! ## Determinism Guarantees
//!
//! All collections use `BTreeSet` so that listings and snapshots come out in
//! a stable order regardless of store iteration order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

// =============================================================================
// USER IDENTITY
// =============================================================================

/// Anything that can be evaluated against a feature.
///
/// The gate only ever reads the identity. Group predicates receive the full
/// value and may inspect whatever else the implementor carries.
pub trait Identity {
    /// Stable, non-negative identity used for user lists and bucketing.
    fn id(&self) -> u64;
}

/// Bare user identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl Identity for UserId {
    fn id(&self) -> u64 {
        self.0
    }
}

impl<T: Identity + ?Sized> Identity for &T {
    fn id(&self) -> u64 {
        (**self).id()
    }
}

// =============================================================================
// FEATURE STATE
// =============================================================================

/// The raw rules stored for one feature.
///
/// This is a read-only snapshot. It says nothing about which users resolve
/// as active, since group predicates live outside the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureState {
    /// Feature name.
    pub name: String,
    /// Group names stored for the feature (registered or not).
    pub groups: BTreeSet<String>,
    /// Explicitly activated user identities.
    pub users: BTreeSet<u64>,
    /// Percentage threshold, if one is stored and parses.
    pub percentage: Option<i64>,
}

impl FeatureState {
    /// Create an empty snapshot for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// True when no rule of any kind is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.users.is_empty() && self.percentage.is_none()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in featuregate.
///
/// `InvalidFeature` is the only domain error. Store failures are kept apart
/// so that a broken store is never mistaken for an inactive feature.
#[derive(Debug, Error)]
pub enum GateError {
    /// The feature name is not on the allow-list, or is malformed.
    #[error("Invalid feature: {0}")]
    InvalidFeature(String),

    /// The key-value store failed to execute a command.
    #[error("Store error: {0}")]
    Store(String),

    /// A stored record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A filesystem operation outside the store failed.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
