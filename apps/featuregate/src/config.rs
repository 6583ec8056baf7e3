//! # Configuration
//!
//! TOML file naming the valid features and id-list groups.
//!
//! ```toml
//! [features]
//! valid = ["chat", "comment"]   # omit for unrestricted
//!
//! [groups]
//! staff = [1, 2, 3]
//! ```
//!
//! Closures cannot live in a file, so a configured group is the set of user
//! ids its predicate accepts.

use featuregate_core::{FeatureGate, GateError, Identity, KeyValueStore, UserId, ValidFeatures};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    #[serde(default)]
    pub features: FeaturesSection,
    #[serde(default)]
    pub groups: BTreeMap<String, BTreeSet<u64>>,
}

/// `[features]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeaturesSection {
    /// Allow-list for mutations. `None` leaves the gate unrestricted.
    pub valid: Option<Vec<String>>,
}

impl GateConfig {
    /// Load from `path`. A missing file yields the default configuration.
    pub fn load(path: &Path) -> Result<Self, GateError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| GateError::IoError(format!("Read config: {}", e)))?;
        Self::parse(&text)
    }

    /// Parse configuration text.
    pub fn parse(text: &str) -> Result<Self, GateError> {
        toml::from_str(text)
            .map_err(|e| GateError::SerializationError(format!("Parse config: {}", e)))
    }

    /// The allow-list this configuration describes.
    #[must_use]
    pub fn valid_features(&self) -> ValidFeatures {
        match &self.features.valid {
            Some(names) => ValidFeatures::restricted(names.iter().cloned()),
            None => ValidFeatures::Unrestricted,
        }
    }

    /// Register every configured group on `gate`.
    pub fn apply_groups<S: KeyValueStore>(&self, gate: &FeatureGate<S>) {
        for (name, ids) in &self.groups {
            let ids = ids.clone();
            gate.define_group(name.clone(), move |user: Option<&UserId>| {
                user.is_some_and(|u| ids.contains(&u.id()))
            });
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use featuregate_core::MemoryStore;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_default() {
        let temp = tempdir().expect("temp dir");
        let config = GateConfig::load(&temp.path().join("absent.toml")).expect("load");
        assert_eq!(config, GateConfig::default());
        assert_eq!(config.valid_features(), ValidFeatures::Unrestricted);
    }

    #[test]
    fn parses_features_and_groups() {
        let config = GateConfig::parse(
            r#"
            [features]
            valid = ["chat", "comment"]

            [groups]
            staff = [1, 2, 3]
            "#,
        )
        .expect("parse");

        assert_eq!(
            config.valid_features(),
            ValidFeatures::restricted(["chat", "comment"])
        );
        assert_eq!(config.groups["staff"].len(), 3);
    }

    #[test]
    fn malformed_file_is_error() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("featuregate.toml");
        std::fs::write(&path, "[features]\nvalid = 7\n").expect("write");

        assert!(matches!(
            GateConfig::load(&path),
            Err(GateError::SerializationError(_))
        ));
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let temp = tempdir().expect("temp dir");
        // a directory exists but cannot be read as text
        assert!(matches!(
            GateConfig::load(temp.path()),
            Err(GateError::IoError(_))
        ));
    }

    #[test]
    fn unknown_section_is_error() {
        assert!(GateConfig::parse("[rollouts]\nchat = 5\n").is_err());
    }

    #[test]
    fn configured_groups_match_listed_ids() {
        let config = GateConfig::parse("[groups]\nstaff = [1, 2]\n").expect("parse");
        let gate: FeatureGate<MemoryStore> = FeatureGate::new(MemoryStore::new());
        config.apply_groups(&gate);
        gate.activate_group("admin", "staff").expect("group");

        assert!(gate.active("admin", Some(&UserId(2))).expect("active"));
        assert!(!gate.active("admin", Some(&UserId(3))).expect("active"));
        assert!(!gate.active("admin", None).expect("active"));
    }
}
