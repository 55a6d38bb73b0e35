//! The connection trait.
//!
//! A [`Connection`] is the execution boundary: it accepts a parametrized
//! [`Statement`] and returns rows or an error. Everything above this trait is
//! pure query construction; everything below it (storage, wire protocol,
//! timeouts) belongs to the backend. Execution is a synchronous, blocking
//! round trip; this layer never retries.

use crate::Result;
use crate::row::Row;
use crate::statement::Statement;

/// A connection capable of executing select statements.
pub trait Connection {
    /// Execute a statement and return all matching rows, in storage order.
    fn query(&self, stmt: &Statement) -> Result<Vec<Row>>;

    /// Execute a statement and return the first matching row, if any.
    ///
    /// The default implementation runs `query` with the statement's own limit;
    /// backends that can push the limit down should override it.
    fn query_one(&self, stmt: &Statement) -> Result<Option<Row>> {
        Ok(self.query(stmt)?.into_iter().next())
    }
}

impl<C: Connection + ?Sized> Connection for &C {
    fn query(&self, stmt: &Statement) -> Result<Vec<Row>> {
        (**self).query(stmt)
    }

    fn query_one(&self, stmt: &Statement) -> Result<Option<Row>> {
        (**self).query_one(stmt)
    }
}
