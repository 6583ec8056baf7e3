//! # CLI Command Implementations
//!
//! Each command opens the database, applies the configuration and runs one
//! gate operation. The database handle is dropped when the command returns.

use crate::config::GateConfig;
use featuregate_core::{FeatureGate, GateError, RedbStore, UserId, ValidFeatures};
use std::path::Path;

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new database.
pub fn cmd_init(db_path: &Path, force: bool) -> Result<(), GateError> {
    if db_path.exists() {
        if !force {
            return Err(GateError::SerializationError(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(db_path)
            .map_err(|e| GateError::IoError(format!("Remove db: {}", e)))?;
    }

    let _store = RedbStore::open(db_path)?;
    println!("Initialized new redb database at {:?}", db_path);
    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Report whether `feature` is active for `user`.
pub fn cmd_check(
    db_path: &Path,
    config_path: &Path,
    json_mode: bool,
    feature: &str,
    user: Option<u64>,
) -> Result<(), GateError> {
    let gate = open_gate(db_path, config_path)?;
    let active = gate.active(feature, user.map(UserId).as_ref())?;

    if json_mode {
        print_json(&serde_json::json!({
            "feature": feature,
            "user": user,
            "active": active
        }));
        return Ok(());
    }

    let who = match user {
        Some(id) => format!("user {}", id),
        None => "anonymous user".to_string(),
    };
    let verdict = if active { "active" } else { "inactive" };
    println!("{}: {} for {}", feature, verdict, who);
    Ok(())
}

// =============================================================================
// MUTATION COMMANDS
// =============================================================================

/// Enable `feature` for `group`.
pub fn cmd_activate_group(
    db_path: &Path,
    config_path: &Path,
    json_mode: bool,
    feature: &str,
    group: &str,
) -> Result<(), GateError> {
    let gate = open_gate(db_path, config_path)?;
    if !gate.groups().contains(group) {
        tracing::warn!(feature, group, "group is not defined in the configuration");
    }
    gate.activate_group(feature, group)?;
    report(json_mode, "activate_group", feature, serde_json::json!(group));
    Ok(())
}

/// Disable `feature` for `group`.
pub fn cmd_deactivate_group(
    db_path: &Path,
    config_path: &Path,
    json_mode: bool,
    feature: &str,
    group: &str,
) -> Result<(), GateError> {
    let gate = open_gate(db_path, config_path)?;
    gate.deactivate_group(feature, group)?;
    report(json_mode, "deactivate_group", feature, serde_json::json!(group));
    Ok(())
}

/// Enable `feature` for one user.
pub fn cmd_activate_user(
    db_path: &Path,
    config_path: &Path,
    json_mode: bool,
    feature: &str,
    user: u64,
) -> Result<(), GateError> {
    let gate = open_gate(db_path, config_path)?;
    gate.activate_user(feature, &UserId(user))?;
    report(json_mode, "activate_user", feature, serde_json::json!(user));
    Ok(())
}

/// Disable `feature` for one user.
pub fn cmd_deactivate_user(
    db_path: &Path,
    config_path: &Path,
    json_mode: bool,
    feature: &str,
    user: u64,
) -> Result<(), GateError> {
    let gate = open_gate(db_path, config_path)?;
    gate.deactivate_user(feature, &UserId(user))?;
    report(json_mode, "deactivate_user", feature, serde_json::json!(user));
    Ok(())
}

/// Set the percentage rollout for `feature`.
pub fn cmd_activate_percentage(
    db_path: &Path,
    config_path: &Path,
    json_mode: bool,
    feature: &str,
    percentage: i64,
) -> Result<(), GateError> {
    let gate = open_gate(db_path, config_path)?;
    gate.activate_percentage(feature, percentage)?;
    report(
        json_mode,
        "activate_percentage",
        feature,
        serde_json::json!(percentage),
    );
    Ok(())
}

/// Remove the percentage rollout for `feature`.
pub fn cmd_deactivate_percentage(
    db_path: &Path,
    config_path: &Path,
    json_mode: bool,
    feature: &str,
) -> Result<(), GateError> {
    let gate = open_gate(db_path, config_path)?;
    gate.deactivate_percentage(feature)?;
    report(
        json_mode,
        "deactivate_percentage",
        feature,
        serde_json::Value::Null,
    );
    Ok(())
}

/// Remove every rule for `feature`.
pub fn cmd_deactivate_all(
    db_path: &Path,
    config_path: &Path,
    json_mode: bool,
    feature: &str,
) -> Result<(), GateError> {
    let gate = open_gate(db_path, config_path)?;
    gate.deactivate_all(feature)?;
    report(json_mode, "deactivate_all", feature, serde_json::Value::Null);
    Ok(())
}

// =============================================================================
// READ COMMANDS
// =============================================================================

/// Show the configured allow-list. Does not open the database.
pub fn cmd_registered(config_path: &Path, json_mode: bool) -> Result<(), GateError> {
    let valid = GateConfig::load(config_path)?.valid_features();

    if json_mode {
        print_json(&serde_json::to_value(&valid).unwrap_or_default());
        return Ok(());
    }

    match valid {
        ValidFeatures::Unrestricted => println!("Unrestricted: any feature may be changed"),
        ValidFeatures::Restricted(names) => {
            println!("Registered features ({}):", names.len());
            for name in names {
                println!("  {}", name);
            }
        }
    }
    Ok(())
}

/// List features with at least one stored rule.
pub fn cmd_list(db_path: &Path, config_path: &Path, json_mode: bool) -> Result<(), GateError> {
    let gate = open_gate(db_path, config_path)?;
    let features = gate.active_features()?;

    if json_mode {
        print_json(&serde_json::json!({ "features": features }));
        return Ok(());
    }

    if features.is_empty() {
        println!("No features have stored rules");
        return Ok(());
    }
    println!("Features ({}):", features.len());
    for feature in features {
        println!("  {}", feature);
    }
    Ok(())
}

/// Show the stored rules for `feature`.
pub fn cmd_describe(
    db_path: &Path,
    config_path: &Path,
    json_mode: bool,
    feature: &str,
) -> Result<(), GateError> {
    let gate = open_gate(db_path, config_path)?;
    let state = gate.describe(feature)?;

    if json_mode {
        print_json(&serde_json::to_value(&state).unwrap_or_default());
        return Ok(());
    }

    println!("Feature: {}", state.name);
    println!("==========");
    if state.is_empty() {
        println!("No stored rules");
        return Ok(());
    }
    let groups: Vec<&str> = state.groups.iter().map(String::as_str).collect();
    let users: Vec<String> = state.users.iter().map(u64::to_string).collect();
    println!("Groups:     {}", groups.join(", "));
    println!("Users:      {}", users.join(", "));
    match state.percentage {
        Some(p) => println!("Percentage: {}%", p),
        None => println!("Percentage: -"),
    }
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Open the database and build a gate from the configuration file.
pub fn open_gate(db_path: &Path, config_path: &Path) -> Result<FeatureGate<RedbStore>, GateError> {
    let config = GateConfig::load(config_path)?;
    let store = RedbStore::open(db_path)?;
    let gate = FeatureGate::with_valid_features(store, config.valid_features());
    config.apply_groups(&gate);
    Ok(gate)
}

fn report(json_mode: bool, action: &str, feature: &str, target: serde_json::Value) {
    if json_mode {
        print_json(&serde_json::json!({
            "action": action,
            "feature": feature,
            "target": target,
            "ok": true
        }));
        return;
    }

    if target.is_null() {
        println!("{}: {}", action, feature);
    } else {
        println!("{}: {} -> {}", action, feature, target);
    }
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}
