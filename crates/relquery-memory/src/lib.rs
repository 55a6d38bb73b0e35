//! In-memory backend for relquery.
//!
//! [`MemoryDb`] is a schemaless table store implementing the
//! [`Connection`](relquery_core::Connection) trait by interpreting statements
//! structurally. It exists for tests and examples: seed it with
//! [`MemoryDb::insert`], then run queries and relationship loads against it
//! exactly as against a real backend.

pub mod config;
pub mod engine;

pub use config::MemoryConfig;
pub use engine::MemoryDb;
