//! PostgreSQL row source
//!
//! This module exports PostgreSQL schemas and tables through the
//! [`crate::adapters::source::RowSource`] traits.

pub mod adapter;
pub mod client;
pub mod queries;

pub use adapter::{PostgreSQLConnection, PostgreSQLSource};
pub use client::PostgreSQLClient;
