//! Domain models and types for tabledump.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`DatabaseName`], [`TableName`], [`ExportTarget`], [`Selection`])
//! - **Row records** ([`Record`]) and field projection ([`FieldFilter`])
//! - **Error types** ([`DumpError`], [`ErrorKind`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, DumpError>`]:
//!
//! ```rust
//! use tabledump::domain::{DumpError, Result, Selection};
//!
//! fn parse(item: &str) -> Result<Selection> {
//!     item.parse::<Selection>().map_err(DumpError::Configuration)
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

pub use errors::{DumpError, ErrorKind};
pub use ids::{DatabaseName, ExportTarget, Selection, TableName};
pub use record::{FieldFilter, Record};
pub use result::Result;
