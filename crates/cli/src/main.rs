//! catsync - Google Sheet to Shopify catalog sync CLI.
//!
//! # Usage
//!
//! ```bash
//! # Run a full sync (definitions, files, products, metafields)
//! catsync sync
//!
//! # Delete all uploaded files
//! catsync clean files
//!
//! # Delete all products
//! catsync clean products
//!
//! # Delete all product metafield definitions (and their metafields)
//! catsync clean definitions
//! ```
//!
//! Configuration comes from the environment (or a `.env` file); see
//! `catalog_sync::config` for the variable list. Partial failures inside a
//! run are reported in the log output only; the exit code reflects fatal
//! errors alone.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "catsync")]
#[command(author, version, about = "Google Sheet to Shopify catalog sync")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full catalog sync from the configured sheet
    Sync,
    /// Bulk-delete store objects created by previous syncs
    Clean {
        #[command(subcommand)]
        target: CleanTarget,
    },
}

#[derive(Subcommand)]
enum CleanTarget {
    /// Delete all files, in batches
    Files,
    /// Delete all products, one by one
    Products,
    /// Delete all product metafield definitions and their metafields
    Definitions,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), catalog_sync::SyncError> {
    match cli.command {
        Commands::Sync => commands::sync::run().await,
        Commands::Clean { target } => match target {
            CleanTarget::Files => commands::clean::files().await,
            CleanTarget::Products => commands::clean::products().await,
            CleanTarget::Definitions => commands::clean::definitions().await,
        },
    }
}
