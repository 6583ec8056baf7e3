//! # Feature Validity Gate
//!
//! Optional allow-list of feature names that mutations may touch.

use crate::keys;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which feature names may be mutated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "features", rename_all = "snake_case")]
pub enum ValidFeatures {
    /// Any well-formed name is accepted.
    #[default]
    Unrestricted,
    /// Only the listed names are accepted.
    Restricted(BTreeSet<String>),
}

impl ValidFeatures {
    /// Build a restricted list from any collection of names.
    pub fn restricted<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Restricted(names.into_iter().map(Into::into).collect())
    }

    /// Whether the feature owning `key` may be mutated.
    ///
    /// The name is recovered from the key, so a key outside the feature
    /// namespace is rejected in both modes. A name containing the separator
    /// cannot be detected from its key; check it with [`Self::allows`].
    #[must_use]
    pub fn is_valid(&self, key: &str) -> bool {
        keys::feature_name(key).is_some_and(|name| self.allows(name))
    }

    /// Whether `name` itself may be mutated.
    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        if !keys::is_well_formed(name) {
            return false;
        }
        match self {
            Self::Unrestricted => true,
            Self::Restricted(names) => names.contains(name),
        }
    }

    /// The allow-list, or `None` when unrestricted.
    #[must_use]
    pub fn names(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Unrestricted => None,
            Self::Restricted(names) => Some(names),
        }
    }

    #[must_use]
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Restricted(_))
    }
}

impl<S: Into<String>> FromIterator<S> for ValidFeatures {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::restricted(iter)
    }
}
