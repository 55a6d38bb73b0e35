//! Core types and traits for relquery.
//!
//! `relquery-core` holds the pieces everything else builds on:
//!
//! - [`Value`] - dynamically-typed SQL values
//! - [`Row`] / [`ColumnInfo`] - result rows with shared column metadata
//! - [`Statement`] - structured parametrized select statements
//! - [`Connection`] - the synchronous execution boundary
//! - [`QueryLog`] / [`Observed`] - explicit, call-scoped query observation
//! - [`Error`] / [`Result`] - the workspace error type
//!
//! This crate performs no I/O itself; backends implement [`Connection`].

pub mod connection;
pub mod error;
pub mod observe;
pub mod row;
pub mod statement;
pub mod value;

pub use connection::Connection;
pub use error::{Error, NonAugmentableError, QueryError, Result, TypeError};
pub use observe::{Observed, QueryLog, QueryRecord};
pub use row::{ColumnInfo, FromValue, Row};
pub use statement::{CmpOp, Filter, Projection, Statement};
pub use value::Value;
