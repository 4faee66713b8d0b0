//! In-memory row source

pub mod adapter;

pub use adapter::{MemoryConnection, MemorySource};
