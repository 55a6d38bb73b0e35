//! The fluent query builder.
//!
//! Building is pure: no I/O happens until one of the terminal calls
//! ([`Query::get`], [`Query::first`]) executes exactly one statement through a
//! [`Connection`]. Repeated terminal calls issue independent statements; there
//! is no caching at this layer.

use crate::entity::EntityMeta;
use relquery_core::{CmpOp, Connection, Filter, Projection, Result, Row, Statement, Value};

/// A filterable select query against a single table.
///
/// A `Query` is also the "raw query handle" form a relationship accessor may
/// return: the relationship resolver can inspect and rewrite its filters for
/// batched loading.
#[derive(Debug, Clone)]
pub struct Query {
    table: String,
    columns: Option<Vec<String>>,
    filters: Vec<Filter>,
    limit: Option<u64>,
    meta: Option<&'static EntityMeta>,
}

impl Query {
    /// Start a query against the named table.
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            table: name.into(),
            columns: None,
            filters: Vec::new(),
            limit: None,
            meta: None,
        }
    }

    /// Start a query against an entity's table, keeping the entity metadata
    /// so result rows hydrate as full entities.
    #[must_use]
    pub fn for_entity(meta: &'static EntityMeta) -> Self {
        Self {
            table: meta.table.to_string(),
            columns: None,
            filters: Vec::new(),
            limit: None,
            meta: Some(meta),
        }
    }

    /// Restrict the projection to the given columns.
    #[must_use]
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|&c| c.to_string()).collect());
        self
    }

    /// Add a comparison predicate (combined with AND).
    #[must_use]
    pub fn filter(mut self, column: impl Into<String>, op: CmpOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Cmp {
            column: column.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Add an equality predicate. Shorthand for `filter(column, CmpOp::Eq, value)`.
    #[must_use]
    pub fn filter_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, CmpOp::Eq, value)
    }

    /// Add an `IN` predicate (combined with AND).
    #[must_use]
    pub fn filter_in(mut self, column: impl Into<String>, values: Vec<Value>) -> Self {
        self.filters.push(Filter::In {
            column: column.into(),
            values,
        });
        self
    }

    /// Cap the number of returned rows.
    #[must_use]
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// The target table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// The entity metadata this query hydrates into, if any.
    #[must_use]
    pub fn entity_meta(&self) -> Option<&'static EntityMeta> {
        self.meta
    }

    /// The predicates added so far, in insertion order.
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub(crate) fn remove_filter(&mut self, index: usize) -> Filter {
        self.filters.remove(index)
    }

    /// Lower this query to a structured statement.
    #[must_use]
    pub fn statement(&self) -> Statement {
        Statement {
            table: self.table.clone(),
            projection: match &self.columns {
                Some(cols) => Projection::Columns(cols.clone()),
                None => Projection::All,
            },
            filters: self.filters.clone(),
            limit: self.limit,
        }
    }

    /// Execute and return all matching rows, in storage order.
    pub fn get<C: Connection>(&self, conn: &C) -> Result<Vec<Row>> {
        let stmt = self.statement();
        let (sql, params) = stmt.to_sql();
        tracing::debug!(target: "relquery::query", sql = %sql, params = params.len(), "executing query");
        conn.query(&stmt)
    }

    /// Execute and return the first matching row, if any.
    pub fn first<C: Connection>(&self, conn: &C) -> Result<Option<Row>> {
        let mut stmt = self.statement();
        stmt.limit = Some(stmt.limit.map_or(1, |n| n.min(1)));
        let (sql, params) = stmt.to_sql();
        tracing::debug!(target: "relquery::query", sql = %sql, params = params.len(), "executing query");
        conn.query_one(&stmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_is_pure() {
        let query = Query::table("posts")
            .filter_eq("user_email", "framework@laravel.com")
            .limit(10);

        let stmt = query.statement();
        let (sql, params) = stmt.to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM posts WHERE user_email = $1 LIMIT 10"
        );
        assert_eq!(params, vec![Value::Text("framework@laravel.com".into())]);
    }

    #[test]
    fn test_filters_accumulate_in_order() {
        let query = Query::table("posts")
            .filter("id", CmpOp::Gt, 5_i64)
            .filter_eq("user_email", "a@b.c");

        assert_eq!(query.filters().len(), 2);
        assert_eq!(query.filters()[0].column(), "id");
        assert_eq!(query.filters()[1].column(), "user_email");
    }

    #[test]
    fn test_select_projection() {
        let query = Query::table("users").select(&["id", "email"]);
        let stmt = query.statement();
        assert_eq!(
            stmt.projection,
            Projection::Columns(vec!["id".to_string(), "email".to_string()])
        );
    }

    #[test]
    fn test_first_caps_limit() {
        let query = Query::table("users").limit(50);
        let mut stmt = query.statement();
        stmt.limit = Some(stmt.limit.map_or(1, |n| n.min(1)));
        assert_eq!(stmt.limit, Some(1));
    }
}
