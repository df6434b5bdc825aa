//! Catalog Sync - Google Sheet to Shopify synchronization.
//!
//! One-shot batch synchronization of a product catalog defined in a Google
//! Sheet into a Shopify store, plus cleanup routines that bulk-delete the
//! objects a sync creates.
//!
//! # Architecture
//!
//! - [`sheets`] - Google Sheets reader (service-account auth, typed tabs)
//! - [`shopify`] - Shopify Admin API client (GraphQL + REST product create)
//! - [`pipeline`] - the reconciliation run: definitions, files, products,
//!   metafield attachment by alt-text matching
//! - [`cleanup`] - list-then-delete routines for files, products, and
//!   metafield definitions
//! - [`config`] - environment-sourced configuration
//! - [`log`] - the append-only run-result log file
//!
//! Execution is strictly sequential: every remote call completes before the
//! next begins, and no stage retries a failed call. Item-level failures are
//! logged and skipped; only a sheet load failure or an empty pipeline stage
//! stops a run.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cleanup;
pub mod config;
pub mod log;
pub mod pipeline;
pub mod sheets;
pub mod shopify;

use thiserror::Error;

/// Top-level error for a sync or cleanup run.
///
/// Only the fatal conditions surface here; item-level failures are logged
/// inside the run and never abort it.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration could not be loaded from the environment.
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    /// The source spreadsheet could not be read.
    #[error(transparent)]
    Sheets(#[from] sheets::SheetsError),

    /// A Shopify call failed outside the log-and-continue loops.
    #[error(transparent)]
    Shopify(#[from] shopify::ShopifyError),
}
