//! # featuregate-core
//!
//! Feature toggles over a shared key-value store - THE LOGIC.
//!
//! A feature is active for a user when any of three stored rules says so:
//! - a group the feature is enabled for, whose predicate accepts the user
//! - the user's identity is on the feature's user list
//! - the user's identity falls inside the feature's percentage rollout
//!
//! ## Architecture
//!
//! ```text
//!   caller ──► FeatureGate ──► KeyValueStore (MemoryStore | RedbStore)
//!                 │   │
//!                 │   └── ValidFeatures (optional allow-list for writes)
//!                 └────── GroupRegistry (in-process predicates)
//! ```
//!
//! ## Architectural Constraints
//!
//! - The store is the single source of truth; the gate caches nothing
//! - Group predicates are the only in-process state
//! - Key layout (`feature:<name>:groups|users|percentage`) is fixed for
//!   compatibility with existing stores
//! - No async, no network dependencies

// =============================================================================
// MODULES
// =============================================================================

pub mod evaluator;
pub mod gate;
pub mod groups;
pub mod keys;
pub mod mutation;
pub mod primitives;
pub mod storage;
pub mod types;
pub mod validity;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{FeatureState, GateError, Identity, UserId};

// =============================================================================
// RE-EXPORTS: Gate
// =============================================================================

pub use gate::FeatureGate;
pub use groups::{GroupPredicate, GroupRegistry};
pub use keys::FeatureKeys;
pub use validity::ValidFeatures;

// =============================================================================
// RE-EXPORTS: Storage
// =============================================================================

pub use storage::{KeyValueStore, MemoryStore, RedbStore, StoredValue};
