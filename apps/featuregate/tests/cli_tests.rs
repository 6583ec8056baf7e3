//! Integration tests for the featuregate CLI commands.
//!
//! Commands run against a temporary redb database and config file.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use clap::Parser;
use featuregate::cli::{
    Cli, Commands, cmd_activate_group, cmd_activate_percentage, cmd_activate_user, cmd_check,
    cmd_deactivate_all, cmd_deactivate_group, cmd_deactivate_percentage, cmd_deactivate_user,
    cmd_describe, cmd_init, cmd_list, cmd_registered, execute, open_gate,
};
use featuregate_core::{GateError, UserId};
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

struct Workspace {
    _dir: TempDir,
    db: PathBuf,
    config: PathBuf,
}

/// Fresh database plus an optional config file.
fn workspace(config: Option<&str>) -> Workspace {
    let dir = tempdir().unwrap();
    let db = dir.path().join("featuregate.db");
    let config_path = dir.path().join("featuregate.toml");
    if let Some(text) = config {
        std::fs::write(&config_path, text).unwrap();
    }
    cmd_init(&db, false).unwrap();
    Workspace {
        _dir: dir,
        db,
        config: config_path,
    }
}

fn is_active(ws: &Workspace, feature: &str, user: Option<u64>) -> bool {
    let gate = open_gate(&ws.db, &ws.config).unwrap();
    gate.active(feature, user.map(UserId).as_ref()).unwrap()
}

fn cli(ws: &Workspace, args: &[&str]) -> Cli {
    let db = ws.db.to_string_lossy().to_string();
    let config = ws.config.to_string_lossy().to_string();
    let mut argv = vec!["featuregate", "-q", "-D", &db, "-c", &config];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

const RESTRICTED: &str = r#"
[features]
valid = ["chat", "admin"]

[groups]
staff = [1, 2]
"#;

// =============================================================================
// INIT TESTS
// =============================================================================

#[test]
fn test_init_refuses_existing_database() {
    let ws = workspace(None);
    let result = cmd_init(&ws.db, false);
    assert!(matches!(result, Err(GateError::SerializationError(_))));
}

#[test]
fn test_init_force_wipes_rules() {
    let ws = workspace(None);
    cmd_activate_group(&ws.db, &ws.config, false, "chat", "all").unwrap();
    assert!(is_active(&ws, "chat", None));

    cmd_init(&ws.db, true).unwrap();
    assert!(!is_active(&ws, "chat", None));
}

#[test]
fn test_init_force_reports_io_failure() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("featuregate.db");
    std::fs::create_dir(&db).unwrap();

    let result = cmd_init(&db, true);
    assert!(matches!(result, Err(GateError::IoError(_))));
}

// =============================================================================
// MUTATION TESTS
// =============================================================================

#[test]
fn test_group_commands() {
    let ws = workspace(Some(RESTRICTED));
    cmd_activate_group(&ws.db, &ws.config, false, "admin", "staff").unwrap();

    assert!(is_active(&ws, "admin", Some(1)));
    assert!(!is_active(&ws, "admin", Some(3)));

    cmd_deactivate_group(&ws.db, &ws.config, true, "admin", "staff").unwrap();
    assert!(!is_active(&ws, "admin", Some(1)));
}

#[test]
fn test_user_commands() {
    let ws = workspace(None);
    cmd_activate_user(&ws.db, &ws.config, false, "chat", 42).unwrap();
    cmd_activate_user(&ws.db, &ws.config, false, "chat", 24).unwrap();
    cmd_deactivate_user(&ws.db, &ws.config, false, "chat", 42).unwrap();

    assert!(!is_active(&ws, "chat", Some(42)));
    assert!(is_active(&ws, "chat", Some(24)));
}

#[test]
fn test_percentage_commands() {
    let ws = workspace(None);
    cmd_activate_percentage(&ws.db, &ws.config, false, "chat", 20).unwrap();

    let gate = open_gate(&ws.db, &ws.config).unwrap();
    let active = (1..=120)
        .filter(|&id| gate.active("chat", Some(&UserId(id))).unwrap())
        .count();
    assert_eq!(active, 39);
    drop(gate);

    cmd_deactivate_percentage(&ws.db, &ws.config, false, "chat").unwrap();
    assert!(!is_active(&ws, "chat", Some(1)));
}

#[test]
fn test_deactivate_all_command() {
    let ws = workspace(None);
    cmd_activate_group(&ws.db, &ws.config, false, "chat", "all").unwrap();
    cmd_activate_user(&ws.db, &ws.config, false, "chat", 51).unwrap();
    cmd_activate_percentage(&ws.db, &ws.config, false, "chat", 100).unwrap();

    cmd_deactivate_all(&ws.db, &ws.config, false, "chat").unwrap();

    let gate = open_gate(&ws.db, &ws.config).unwrap();
    assert!(gate.active_features().unwrap().is_empty());
}

#[test]
fn test_invalid_feature_rejected() {
    let ws = workspace(Some(RESTRICTED));
    let result = cmd_activate_user(&ws.db, &ws.config, false, "invalid", 42);
    assert!(matches!(result, Err(GateError::InvalidFeature(name)) if name == "invalid"));

    let gate = open_gate(&ws.db, &ws.config).unwrap();
    assert!(gate.active_features().unwrap().is_empty());
}

// =============================================================================
// READ TESTS
// =============================================================================

#[test]
fn test_read_commands_succeed() {
    let ws = workspace(Some(RESTRICTED));
    cmd_activate_group(&ws.db, &ws.config, false, "chat", "all").unwrap();

    for json_mode in [false, true] {
        cmd_check(&ws.db, &ws.config, json_mode, "chat", Some(7)).unwrap();
        cmd_check(&ws.db, &ws.config, json_mode, "chat", None).unwrap();
        cmd_list(&ws.db, &ws.config, json_mode).unwrap();
        cmd_describe(&ws.db, &ws.config, json_mode, "chat").unwrap();
        cmd_describe(&ws.db, &ws.config, json_mode, "admin").unwrap();
        cmd_registered(&ws.config, json_mode).unwrap();
    }
}

#[test]
fn test_registered_without_config() {
    let ws = workspace(None);
    cmd_registered(&ws.config, false).unwrap();
}

#[test]
fn test_malformed_config_fails() {
    let ws = workspace(Some("[features]\nvalid = \"chat\"\n"));
    let result = cmd_list(&ws.db, &ws.config, false);
    assert!(matches!(result, Err(GateError::SerializationError(_))));
}

// =============================================================================
// ARGUMENT PARSING TESTS
// =============================================================================

#[test]
fn test_parse_check_with_user() {
    let ws = workspace(None);
    let parsed = cli(&ws, &["check", "chat", "--user", "5"]);
    match parsed.command {
        Some(Commands::Check { feature, user }) => {
            assert_eq!(feature, "chat");
            assert_eq!(user, Some(5));
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_parse_negative_percentage() {
    let ws = workspace(None);
    let parsed = cli(&ws, &["activate-percentage", "chat", "-5"]);
    assert!(matches!(
        parsed.command,
        Some(Commands::ActivatePercentage { percentage: -5, .. })
    ));
}

#[test]
fn test_execute_round_trip() {
    let ws = workspace(None);
    execute(cli(&ws, &["activate-user", "chat", "9"])).unwrap();
    execute(cli(&ws, &["--json-mode", "check", "chat", "-u", "9"])).unwrap();

    assert!(is_active(&ws, "chat", Some(9)));
}
