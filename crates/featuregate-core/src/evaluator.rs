//! # Activation Evaluator
//!
//! Decides whether a feature is active for a user. Three independent
//! strategies, OR-ed together and tried cheapest-first:
//!
//! 1. Group: any stored group whose predicate accepts the user
//! 2. User: the user's identity is in the feature's user set
//! 3. Percentage: `id mod 100 < threshold`
//!
//! An absent user can only pass the group strategy. A stored threshold is
//! read by its leading integer, so `"20.5"` and `"20%"` both mean 20.

use crate::gate::FeatureGate;
use crate::keys::{group_key, percentage_key, user_key};
use crate::primitives::{leading_integer, within_percentage};
use crate::storage::KeyValueStore;
use crate::{GateError, Identity};

impl<S: KeyValueStore, U: Identity + 'static> FeatureGate<S, U> {
    /// Whether `feature` is active for `user` (`None` when not logged in).
    ///
    /// Store failures are returned as errors, never read as "inactive".
    pub fn active(&self, feature: &str, user: Option<&U>) -> Result<bool, GateError> {
        Ok(self.user_in_active_group(feature, user)?
            || self.user_active(feature, user)?
            || self.user_within_active_percentage(feature, user)?)
    }

    fn user_in_active_group(&self, feature: &str, user: Option<&U>) -> Result<bool, GateError> {
        let groups = self.store.smembers(&group_key(feature))?;
        Ok(groups.iter().any(|group| self.groups.matches(group, user)))
    }

    fn user_active(&self, feature: &str, user: Option<&U>) -> Result<bool, GateError> {
        match user {
            Some(user) => self
                .store
                .sismember(&user_key(feature), &user.id().to_string()),
            None => Ok(false),
        }
    }

    fn user_within_active_percentage(
        &self,
        feature: &str,
        user: Option<&U>,
    ) -> Result<bool, GateError> {
        let Some(threshold) = self.stored_percentage(&percentage_key(feature))? else {
            return Ok(false);
        };
        Ok(user.is_some_and(|user| within_percentage(user.id(), threshold)))
    }

    /// Threshold stored at `key`, read by its leading integer.
    ///
    /// A value with no leading digits reads as 0. Anything past the digits
    /// is dropped and logged.
    pub(crate) fn stored_percentage(&self, key: &str) -> Result<Option<i64>, GateError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        let (threshold, clean) = leading_integer(&raw);
        if !clean {
            tracing::warn!(
                key,
                value = %raw,
                threshold,
                "malformed percentage, using leading integer"
            );
        }
        Ok(Some(threshold))
    }
}

// =============================================================================
// TESTS
// =============================================================================
