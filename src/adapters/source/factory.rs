//! Row source factory
//!
//! This module provides the factory function that builds the row source the
//! export command reads from.

use crate::adapters::postgresql::PostgreSQLSource;
use crate::adapters::source::traits::RowSource;
use crate::config::SourceConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create a row source from the source configuration
///
/// # Errors
///
/// Returns an error if the connection pool cannot be built
pub fn create_row_source(config: &SourceConfig) -> Result<Arc<dyn RowSource>> {
    tracing::info!(target_db = %config.display_target(), "Creating PostgreSQL row source");
    let source = PostgreSQLSource::new(config)?;
    Ok(Arc::new(source) as Arc<dyn RowSource>)
}
