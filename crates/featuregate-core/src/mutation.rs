//! # Mutation API
//!
//! Activate/deactivate operations for groups, users and percentages.
//!
//! Every entry point checks the feature against the validity gate before
//! touching the store. A rejected call returns `InvalidFeature` and writes
//! nothing. Repeating an activation or deactivation is a no-op at the data
//! level.

use crate::gate::FeatureGate;
use crate::keys::{self, FeatureKeys, group_key, percentage_key, user_key};
use crate::primitives::is_percentage_in_range;
use crate::storage::KeyValueStore;
use crate::{GateError, Identity};
use std::collections::BTreeSet;

impl<S: KeyValueStore, U: Identity + 'static> FeatureGate<S, U> {
    /// Add `group` to the feature's group set.
    pub fn activate_group(&self, feature: &str, group: &str) -> Result<(), GateError> {
        let key = group_key(feature);
        self.ensure_valid(feature, &key)?;
        tracing::debug!(feature, group, "activating group");
        self.store.sadd(&key, group)?;
        Ok(())
    }

    /// Remove `group` from the feature's group set.
    pub fn deactivate_group(&self, feature: &str, group: &str) -> Result<(), GateError> {
        let key = group_key(feature);
        self.ensure_valid(feature, &key)?;
        tracing::debug!(feature, group, "deactivating group");
        self.store.srem(&key, group)?;
        Ok(())
    }

    /// Add the user's identity to the feature's user set.
    pub fn activate_user(&self, feature: &str, user: &U) -> Result<(), GateError> {
        let key = user_key(feature);
        self.ensure_valid(feature, &key)?;
        let id = user.id();
        tracing::debug!(feature, user = id, "activating user");
        self.store.sadd(&key, &id.to_string())?;
        Ok(())
    }

    /// Remove the user's identity from the feature's user set.
    pub fn deactivate_user(&self, feature: &str, user: &U) -> Result<(), GateError> {
        let key = user_key(feature);
        self.ensure_valid(feature, &key)?;
        let id = user.id();
        tracing::debug!(feature, user = id, "deactivating user");
        self.store.srem(&key, &id.to_string())?;
        Ok(())
    }

    /// Set the feature's percentage threshold, replacing any previous one.
    ///
    /// Values outside `[0, 100]` are stored as given and logged.
    pub fn activate_percentage(&self, feature: &str, percentage: i64) -> Result<(), GateError> {
        let key = percentage_key(feature);
        self.ensure_valid(feature, &key)?;
        if !is_percentage_in_range(percentage) {
            tracing::warn!(feature, percentage, "percentage outside 0..=100");
        }
        tracing::debug!(feature, percentage, "activating percentage");
        self.store.set(&key, &percentage.to_string())
    }

    /// Remove the feature's percentage threshold.
    pub fn deactivate_percentage(&self, feature: &str) -> Result<(), GateError> {
        let key = percentage_key(feature);
        self.ensure_valid(feature, &key)?;
        tracing::debug!(feature, "deactivating percentage");
        self.store.del(&key)?;
        Ok(())
    }

    /// Remove groups, users and percentage for the feature.
    ///
    /// All three keys pass the gate before anything is deleted. The deletes
    /// themselves are separate commands; a concurrent reader may see some of
    /// them applied and not others.
    pub fn deactivate_all(&self, feature: &str) -> Result<(), GateError> {
        let keys = FeatureKeys::for_feature(feature);
        for key in keys.all() {
            self.ensure_valid(feature, key)?;
        }
        tracing::debug!(feature, "deactivating all rules");
        for key in keys.all() {
            self.store.del(key)?;
        }
        Ok(())
    }

    /// Names of every feature with at least one key in the store.
    ///
    /// A feature is listed as soon as any rule is stored, even one that
    /// matches nobody (a 0% threshold, an unregistered group).
    pub fn active_features(&self) -> Result<BTreeSet<String>, GateError> {
        let stored = self.store.keys(&keys::namespace_pattern())?;
        Ok(stored
            .iter()
            .filter_map(|key| keys::feature_name(key))
            .map(str::to_string)
            .collect())
    }

    fn ensure_valid(&self, feature: &str, key: &str) -> Result<(), GateError> {
        if keys::is_well_formed(feature) && self.valid.is_valid(key) {
            Ok(())
        } else {
            tracing::debug!(feature, key, "rejected mutation on invalid feature");
            Err(GateError::InvalidFeature(feature.to_string()))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserId;
    use crate::storage::MemoryStore;
    use crate::validity::ValidFeatures;

    fn gate() -> FeatureGate<MemoryStore> {
        FeatureGate::new(MemoryStore::new())
    }

    #[test]
    fn activate_group_writes_group_set() {
        let gate = gate();
        gate.activate_group("chat", "all").expect("activate");

        let groups = gate.store().smembers("feature:chat:groups").expect("smembers");
        assert!(groups.contains("all"));
    }

    #[test]
    fn deactivate_group_leaves_others() {
        let gate = gate();
        gate.define_group("fivesonly", |user: Option<&UserId>| {
            user.is_some_and(|u| u.id() == 5)
        });
        gate.activate_group("chat", "all").expect("activate");
        gate.activate_group("chat", "fivesonly").expect("activate");
        gate.deactivate_group("chat", "all").expect("deactivate");

        assert!(!gate.active("chat", Some(&UserId(10))).expect("active"));
        assert!(gate.active("chat", Some(&UserId(5))).expect("active"));
    }

    #[test]
    fn deactivate_user_leaves_others() {
        let gate = gate();
        gate.activate_user("chat", &UserId(42)).expect("activate");
        gate.activate_user("chat", &UserId(24)).expect("activate");
        gate.deactivate_user("chat", &UserId(42)).expect("deactivate");

        assert!(!gate.active("chat", Some(&UserId(42))).expect("active"));
        assert!(gate.active("chat", Some(&UserId(24))).expect("active"));
    }

    #[test]
    fn activate_user_is_idempotent() {
        let gate = gate();
        gate.activate_user("chat", &UserId(42)).expect("first");
        gate.activate_user("chat", &UserId(42)).expect("second");

        let users = gate.store().smembers("feature:chat:users").expect("smembers");
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn percentage_overwrites() {
        let gate = gate();
        gate.activate_percentage("chat", 20).expect("activate");
        gate.activate_percentage("chat", 5).expect("overwrite");

        assert_eq!(
            gate.store().get("feature:chat:percentage").expect("get").as_deref(),
            Some("5")
        );
    }

    #[test]
    fn out_of_range_percentage_is_stored() {
        let gate = gate();
        gate.activate_percentage("chat", 150).expect("above range");
        assert!(gate.active("chat", Some(&UserId(99))).expect("active"));

        gate.activate_percentage("chat", -5).expect("below range");
        assert!(!gate.active("chat", Some(&UserId(0))).expect("active"));
    }

    #[test]
    fn deactivate_percentage_removes_key() {
        let gate = gate();
        gate.activate_percentage("chat", 100).expect("activate");
        gate.deactivate_percentage("chat").expect("deactivate");

        assert!(!gate.active("chat", Some(&UserId(24))).expect("active"));
        assert!(!gate.active("chat", None).expect("active"));
        assert!(gate.store().is_empty());
    }

    #[test]
    fn deactivate_all_clears_every_key() {
        let gate = gate();
        gate.activate_group("chat", "all").expect("group");
        gate.activate_user("chat", &UserId(51)).expect("user");
        gate.activate_percentage("chat", 100).expect("percentage");
        gate.activate_group("other", "all").expect("other");

        gate.deactivate_all("chat").expect("deactivate all");

        assert!(!gate.active("chat", Some(&UserId(0))).expect("active"));
        assert!(!gate.active("chat", Some(&UserId(51))).expect("active"));
        assert!(!gate.active("chat", None).expect("active"));
        assert!(gate.active("other", None).expect("untouched"));
    }

    #[test]
    fn invalid_feature_rejected_without_writes() {
        let valid = ValidFeatures::restricted(["chat"]);
        let gate: FeatureGate<MemoryStore> =
            FeatureGate::with_valid_features(MemoryStore::new(), valid);

        let attempts = [
            gate.activate_group("invalid", "all"),
            gate.deactivate_group("invalid", "all"),
            gate.activate_user("invalid", &UserId(42)),
            gate.deactivate_user("invalid", &UserId(42)),
            gate.activate_percentage("invalid", 20),
            gate.deactivate_percentage("invalid"),
            gate.deactivate_all("invalid"),
        ];
        for attempt in attempts {
            assert!(matches!(attempt, Err(GateError::InvalidFeature(name)) if name == "invalid"));
        }
        assert!(gate.store().is_empty());
    }

    #[test]
    fn colon_names_rejected_even_unrestricted() {
        let gate = gate();
        assert!(matches!(
            gate.activate_group("chat:v2", "all"),
            Err(GateError::InvalidFeature(_))
        ));
        assert!(matches!(
            gate.activate_percentage("", 10),
            Err(GateError::InvalidFeature(_))
        ));
        assert!(gate.store().is_empty());
    }

    #[test]
    fn active_features_deduplicates() {
        let gate = gate();
        gate.activate_group("chat", "all").expect("group");
        gate.activate_user("chat", &UserId(1)).expect("user");
        gate.activate_percentage("admin", 0).expect("zero percent still listed");
        gate.store().set("session:abc", "x").expect("foreign key");

        let features = gate.active_features().expect("active features");
        assert_eq!(
            features.into_iter().collect::<Vec<_>>(),
            vec!["admin".to_string(), "chat".to_string()]
        );
    }
}
