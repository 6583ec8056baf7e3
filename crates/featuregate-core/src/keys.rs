//! # Key Namer
//!
//! Maps a feature name to the store keys it owns, and back.
//!
//! ```text
//! feature:<name>
//! feature:<name>:groups
//! feature:<name>:users
//! feature:<name>:percentage
//! ```
//!
//! This is the only place that knows the string layout. Everything else
//! passes keys around as opaque strings.

use crate::primitives::{
    GROUPS_SUFFIX, KEY_PREFIX, KEY_SEPARATOR, PERCENTAGE_SUFFIX, USERS_SUFFIX,
};

/// The three derived keys of one feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureKeys {
    pub groups: String,
    pub users: String,
    pub percentage: String,
}

impl FeatureKeys {
    /// Derive all keys for `name`.
    #[must_use]
    pub fn for_feature(name: &str) -> Self {
        Self {
            groups: group_key(name),
            users: user_key(name),
            percentage: percentage_key(name),
        }
    }

    /// The keys in deletion order: groups, users, percentage.
    #[must_use]
    pub fn all(&self) -> [&str; 3] {
        [&self.groups, &self.users, &self.percentage]
    }
}

/// `feature:<name>`
#[must_use]
pub fn base_key(name: &str) -> String {
    format!("{KEY_PREFIX}{KEY_SEPARATOR}{name}")
}

/// `feature:<name>:groups`
#[must_use]
pub fn group_key(name: &str) -> String {
    format!("{}{KEY_SEPARATOR}{GROUPS_SUFFIX}", base_key(name))
}

/// `feature:<name>:users`
#[must_use]
pub fn user_key(name: &str) -> String {
    format!("{}{KEY_SEPARATOR}{USERS_SUFFIX}", base_key(name))
}

/// `feature:<name>:percentage`
#[must_use]
pub fn percentage_key(name: &str) -> String {
    format!("{}{KEY_SEPARATOR}{PERCENTAGE_SUFFIX}", base_key(name))
}

/// Glob pattern matching every key in the feature namespace.
#[must_use]
pub fn namespace_pattern() -> String {
    format!("{KEY_PREFIX}{KEY_SEPARATOR}*")
}

/// Recover the feature name from any derived key.
///
/// The name is the second separator-delimited segment. Returns `None` for
/// keys outside the namespace or with an empty name.
#[must_use]
pub fn feature_name(key: &str) -> Option<&str> {
    let mut segments = key.split(KEY_SEPARATOR);
    if segments.next()? != KEY_PREFIX {
        return None;
    }
    segments.next().filter(|name| !name.is_empty())
}

/// Whether `name` can be stored without corrupting the inverse mapping.
#[must_use]
pub fn is_well_formed(name: &str) -> bool {
    !name.is_empty() && !name.contains(KEY_SEPARATOR)
}
