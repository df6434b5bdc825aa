//! Core types for catalog-sync.
//!
//! Row records mirror the four source spreadsheet tabs; every cell is
//! optional because a missing column resolves to `None`, never an error.

pub mod metakey_map;
pub mod records;

pub use metakey_map::MetakeyMap;
pub use records::{ImageRecord, MetafieldDefinitionRecord, ProductRecord, UploadedFile};
