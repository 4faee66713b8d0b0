//! Row source abstraction layer
//!
//! This module provides the trait the export pipeline reads through, and a
//! factory that builds the configured implementation.

pub mod factory;
pub mod traits;

pub use factory::create_row_source;
pub use traits::{RowSource, RowStream, SourceConnection};
