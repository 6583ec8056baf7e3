//! # Feature Gate
//!
//! The facade tying the store, the group registry and the allow-list
//! together. Evaluation lives in `evaluator`, writes in `mutation`; both are
//! further `impl` blocks on [`FeatureGate`].

use crate::groups::GroupRegistry;
use crate::keys::FeatureKeys;
use crate::storage::KeyValueStore;
use crate::validity::ValidFeatures;
use crate::{FeatureState, GateError, Identity, UserId};

/// Feature toggles over a key-value store.
///
/// The store is the single source of truth; the gate itself only owns the
/// group predicates. A gate is `Send + Sync` whenever its store is, and every
/// operation takes `&self`, so it can be shared behind an `Arc`.
pub struct FeatureGate<S, U = UserId> {
    pub(crate) store: S,
    pub(crate) groups: GroupRegistry<U>,
    pub(crate) valid: ValidFeatures,
}

impl<S, U: 'static> std::fmt::Debug for FeatureGate<S, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureGate")
            .field("groups", &self.groups)
            .field("valid", &self.valid)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore, U: Identity + 'static> FeatureGate<S, U> {
    /// Create a gate that accepts mutations on any feature name.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_valid_features(store, ValidFeatures::Unrestricted)
    }

    /// Create a gate restricted to the given allow-list.
    #[must_use]
    pub fn with_valid_features(store: S, valid: ValidFeatures) -> Self {
        Self {
            store,
            groups: GroupRegistry::new(),
            valid,
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The group registry.
    #[must_use]
    pub fn groups(&self) -> &GroupRegistry<U> {
        &self.groups
    }

    /// Register or overwrite the predicate for a group.
    pub fn define_group<F>(&self, name: impl Into<String>, predicate: F)
    where
        F: Fn(Option<&U>) -> bool + Send + Sync + 'static,
    {
        self.groups.define(name, predicate);
    }

    /// The allow-list supplied at construction.
    ///
    /// This is process-local configuration, not store state.
    #[must_use]
    pub fn registered_features(&self) -> &ValidFeatures {
        &self.valid
    }

    /// Snapshot of the rules stored for `feature`.
    ///
    /// User members that are not integers are skipped. The percentage is
    /// reported as evaluation reads it, by its leading integer.
    pub fn describe(&self, feature: &str) -> Result<FeatureState, GateError> {
        let keys = FeatureKeys::for_feature(feature);
        let mut state = FeatureState::new(feature);

        state.groups = self.store.smembers(&keys.groups)?;
        state.users = self
            .store
            .smembers(&keys.users)?
            .iter()
            .filter_map(|member| member.parse().ok())
            .collect();
        state.percentage = self.stored_percentage(&keys.percentage)?;

        Ok(state)
    }
}

// =============================================================================
// TESTS
// =============================================================================
