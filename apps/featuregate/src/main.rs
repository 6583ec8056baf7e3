//! # featuregate
//!
//! Command-line front end for featuregate-core.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │          apps/featuregate (THE BINARY)         │
//! │                                                │
//! │   ┌─────────────┐        ┌────────────────┐    │
//! │   │    CLI      │        │  TOML config   │    │
//! │   │   (clap)    │        │ (valid, groups)│    │
//! │   └──────┬──────┘        └───────┬────────┘    │
//! │          └───────────┬───────────┘             │
//! │                      ▼                         │
//! │             ┌──────────────────┐               │
//! │             │ featuregate-core │               │
//! │             │   (THE LOGIC)    │               │
//! │             └──────────────────┘               │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! featuregate init
//! featuregate activate-group chat staff
//! featuregate activate-percentage chat 20
//! featuregate check chat --user 42
//! featuregate --json-mode describe chat
//! ```

use clap::Parser;
use featuregate::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // FEATUREGATE_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("FEATUREGATE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "featuregate=debug,featuregate_core=debug"
    } else {
        "featuregate=info,featuregate_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!("featuregate v{}", env!("CARGO_PKG_VERSION"));
    println!();
}
