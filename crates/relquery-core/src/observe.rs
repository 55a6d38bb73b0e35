//! Query observation.
//!
//! Observation is an explicit collector passed into the call context, not a
//! process-wide toggle: wrap a connection in [`Observed`] with a borrowed
//! [`QueryLog`] and every statement executed through the wrapper is recorded.
//! Tests use this to assert query counts (the eager loader's O(1)-in-N
//! guarantee is checked this way).

use crate::Result;
use crate::connection::Connection;
use crate::row::Row;
use crate::statement::Statement;
use std::sync::Mutex;

/// One recorded statement execution.
#[derive(Debug, Clone)]
pub struct QueryRecord {
    /// Rendered SQL text
    pub sql: String,
    /// Bound parameters
    pub params: Vec<crate::value::Value>,
}

/// An explicit, call-scoped query collector.
#[derive(Debug, Default)]
pub struct QueryLog {
    entries: Mutex<Vec<QueryRecord>>,
}

impl QueryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one executed statement.
    pub fn record(&self, stmt: &Statement) {
        let (sql, params) = stmt.to_sql();
        tracing::debug!(target: "relquery::log", sql = %sql, params = params.len(), "query recorded");
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(QueryRecord { sql, params });
    }

    /// Number of statements recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Check whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all recorded entries.
    #[must_use]
    pub fn entries(&self) -> Vec<QueryRecord> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Clear all recorded entries.
    pub fn reset(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

/// A connection wrapper that records every executed statement.
#[derive(Debug, Clone, Copy)]
pub struct Observed<'a, C> {
    inner: &'a C,
    log: &'a QueryLog,
}

impl<'a, C: Connection> Observed<'a, C> {
    /// Wrap a connection with a borrowed log.
    pub fn new(inner: &'a C, log: &'a QueryLog) -> Self {
        Self { inner, log }
    }
}

impl<C: Connection> Connection for Observed<'_, C> {
    fn query(&self, stmt: &Statement) -> Result<Vec<Row>> {
        self.log.record(stmt);
        self.inner.query(stmt)
    }

    fn query_one(&self, stmt: &Statement) -> Result<Option<Row>> {
        self.log.record(stmt);
        self.inner.query_one(stmt)
    }
}
