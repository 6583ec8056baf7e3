//! # featuregate CLI Module
//!
//! ## Available Commands
//!
//! - `init` - Create an empty database
//! - `check` - Is a feature active for a user
//! - `activate-group` / `deactivate-group` - Enable a feature for a group
//! - `activate-user` / `deactivate-user` - Enable a feature for one user
//! - `activate-percentage` / `deactivate-percentage` - Percentage rollout
//! - `deactivate-all` - Remove every rule for a feature
//! - `registered` - Show the configured allow-list
//! - `list` - Features with stored rules
//! - `describe` - Stored rules for one feature

mod commands;

use clap::{Parser, Subcommand};
use featuregate_core::GateError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// featuregate - feature toggles over a redb database
///
/// Enable features per group, per user, or for a percentage of users.
#[derive(Parser, Debug)]
#[command(name = "featuregate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the redb database
    #[arg(
        short = 'D',
        long,
        global = true,
        env = "FEATUREGATE_DATABASE",
        default_value = "featuregate.db"
    )]
    pub database: PathBuf,

    /// Path to the TOML configuration (optional)
    #[arg(
        short,
        long,
        global = true,
        env = "FEATUREGATE_CONFIG",
        default_value = "featuregate.toml"
    )]
    pub config: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new empty database
    Init {
        /// Replace an existing database
        #[arg(short, long)]
        force: bool,
    },

    /// Check whether a feature is active
    Check {
        /// Feature name
        feature: String,

        /// User id (omit for an anonymous user)
        #[arg(short, long)]
        user: Option<u64>,
    },

    /// Enable a feature for a group
    ActivateGroup { feature: String, group: String },

    /// Disable a feature for a group
    DeactivateGroup { feature: String, group: String },

    /// Enable a feature for one user
    ActivateUser { feature: String, user: u64 },

    /// Disable a feature for one user
    DeactivateUser { feature: String, user: u64 },

    /// Enable a feature for a percentage of users
    ActivatePercentage {
        feature: String,

        /// Threshold; users with `id % 100` below it are active
        #[arg(allow_negative_numbers = true)]
        percentage: i64,
    },

    /// Remove a feature's percentage rollout
    DeactivatePercentage { feature: String },

    /// Remove every rule for a feature
    DeactivateAll { feature: String },

    /// Show the allow-list from the configuration
    Registered,

    /// List features with stored rules
    List,

    /// Show the stored rules for a feature
    Describe { feature: String },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), GateError> {
    let db = cli.database.as_path();
    let config = cli.config.as_path();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(db, force),
        Some(Commands::Check { feature, user }) => {
            cmd_check(db, config, json_mode, &feature, user)
        }
        Some(Commands::ActivateGroup { feature, group }) => {
            cmd_activate_group(db, config, json_mode, &feature, &group)
        }
        Some(Commands::DeactivateGroup { feature, group }) => {
            cmd_deactivate_group(db, config, json_mode, &feature, &group)
        }
        Some(Commands::ActivateUser { feature, user }) => {
            cmd_activate_user(db, config, json_mode, &feature, user)
        }
        Some(Commands::DeactivateUser { feature, user }) => {
            cmd_deactivate_user(db, config, json_mode, &feature, user)
        }
        Some(Commands::ActivatePercentage {
            feature,
            percentage,
        }) => cmd_activate_percentage(db, config, json_mode, &feature, percentage),
        Some(Commands::DeactivatePercentage { feature }) => {
            cmd_deactivate_percentage(db, config, json_mode, &feature)
        }
        Some(Commands::DeactivateAll { feature }) => {
            cmd_deactivate_all(db, config, json_mode, &feature)
        }
        Some(Commands::Registered) => cmd_registered(config, json_mode),
        Some(Commands::List) => cmd_list(db, config, json_mode),
        Some(Commands::Describe { feature }) => cmd_describe(db, config, json_mode, &feature),
        None => {
            // No subcommand - list features by default
            cmd_list(db, config, json_mode)
        }
    }
}
