//! Command implementations for `catsync`.

pub mod clean;
pub mod sync;
