//! Catalog Sync Core - Shared types library.
//!
//! Types and pure functions shared between the sync library and the CLI.
//! No I/O, no HTTP clients; everything here can run anywhere.
//!
//! # Modules
//!
//! - [`types`] - Spreadsheet row records and uploaded-file records
//! - [`metafield`] - Metafield type aliasing (`File` / `Files` references)
//! - [`matching`] - File-to-product alt-text matching

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod matching;
pub mod metafield;
pub mod types;

pub use types::*;
