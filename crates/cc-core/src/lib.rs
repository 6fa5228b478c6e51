//! # cc-core
//!
//! Shared building blocks for ChurnCause: the error type and the in-memory
//! observation table that every pipeline stage consumes and returns.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error type and `Result` alias.
pub mod error;
/// Column-oriented observation table.
pub mod table;

pub use error::{Error, Result};
pub use table::{Column, ColumnKind, Table};

/// Crate version, reported in artifacts and bundles.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
