//! Structured select statements.
//!
//! The query builder lowers to a [`Statement`] rather than straight to SQL
//! text. A statement renders to parametrized SQL (for logging and SQL-speaking
//! backends) via [`Statement::to_sql`], while structural backends such as the
//! in-memory engine interpret the statement directly and never need an SQL
//! parser.

use crate::value::Value;

/// Comparison operator for a single-column filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CmpOp {
    /// Get the SQL operator token.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "<>",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// A single WHERE predicate.
///
/// Filters combine with AND; the builder surface has no OR, which keeps the
/// batching rewrite (drop one equality, add one IN) unambiguous.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column <op> value`
    Cmp {
        /// Column name on the target table
        column: String,
        /// Comparison operator
        op: CmpOp,
        /// Bound value
        value: Value,
    },
    /// `column IN (values...)`
    In {
        /// Column name on the target table
        column: String,
        /// Bound values
        values: Vec<Value>,
    },
}

impl Filter {
    /// The column this filter constrains.
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Filter::Cmp { column, .. } | Filter::In { column, .. } => column,
        }
    }
}

/// What a statement projects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// All columns (`SELECT *`)
    All,
    /// An explicit column list
    Columns(Vec<String>),
    /// `SELECT <group>, COUNT(*) AS count ... GROUP BY <group>`
    ///
    /// Used by the aggregate loader to compute per-key counts in one query.
    CountBy(String),
}

/// A parametrized select statement against a single table.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Target table name
    pub table: String,
    /// Projection
    pub projection: Projection,
    /// WHERE predicates, combined with AND
    pub filters: Vec<Filter>,
    /// Optional LIMIT
    pub limit: Option<u64>,
}

impl Statement {
    /// Create a `SELECT *` statement with no filters.
    pub fn select_all(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            projection: Projection::All,
            filters: Vec::new(),
            limit: None,
        }
    }

    /// Render this statement to SQL text plus bound parameters.
    ///
    /// Placeholders are `$1`, `$2`, ... in parameter order.
    #[must_use]
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut params = Vec::new();

        let projection = match &self.projection {
            Projection::All => "*".to_string(),
            Projection::Columns(cols) => cols.join(", "),
            Projection::CountBy(group) => format!("{group}, COUNT(*) AS count"),
        };

        let mut sql = format!("SELECT {} FROM {}", projection, self.table);

        let mut predicates = Vec::new();
        for filter in &self.filters {
            match filter {
                Filter::Cmp { column, op, value } => {
                    params.push(value.clone());
                    predicates.push(format!("{} {} ${}", column, op.as_sql(), params.len()));
                }
                Filter::In { column, values } => {
                    let placeholders: Vec<String> = values
                        .iter()
                        .map(|value| {
                            params.push(value.clone());
                            format!("${}", params.len())
                        })
                        .collect();
                    predicates.push(format!("{} IN ({})", column, placeholders.join(", ")));
                }
            }
        }

        if !predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
        }

        if let Projection::CountBy(group) = &self.projection {
            sql.push_str(" GROUP BY ");
            sql.push_str(group);
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all_render() {
        let stmt = Statement::select_all("users");
        let (sql, params) = stmt.to_sql();
        assert_eq!(sql, "SELECT * FROM users");
        assert!(params.is_empty());
    }

    #[test]
    fn test_filters_render_in_order() {
        let stmt = Statement {
            table: "posts".to_string(),
            projection: Projection::All,
            filters: vec![
                Filter::Cmp {
                    column: "user_email".to_string(),
                    op: CmpOp::Eq,
                    value: Value::Text("framework@laravel.com".into()),
                },
                Filter::Cmp {
                    column: "id".to_string(),
                    op: CmpOp::Gt,
                    value: Value::Int(0),
                },
            ],
            limit: Some(1),
        };
        let (sql, params) = stmt.to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM posts WHERE user_email = $1 AND id > $2 LIMIT 1"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_in_filter_render() {
        let stmt = Statement {
            table: "posts".to_string(),
            projection: Projection::All,
            filters: vec![Filter::In {
                column: "user_email".to_string(),
                values: vec![Value::Text("a".into()), Value::Text("b".into())],
            }],
            limit: None,
        };
        let (sql, params) = stmt.to_sql();
        assert_eq!(sql, "SELECT * FROM posts WHERE user_email IN ($1, $2)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_count_by_render() {
        let stmt = Statement {
            table: "posts".to_string(),
            projection: Projection::CountBy("user_email".to_string()),
            filters: vec![Filter::In {
                column: "user_email".to_string(),
                values: vec![Value::Text("a".into())],
            }],
            limit: None,
        };
        let (sql, _) = stmt.to_sql();
        assert_eq!(
            sql,
            "SELECT user_email, COUNT(*) AS count FROM posts WHERE user_email IN ($1) GROUP BY user_email"
        );
    }

    #[test]
    fn test_column_projection_render() {
        let stmt = Statement {
            table: "users".to_string(),
            projection: Projection::Columns(vec!["id".to_string(), "email".to_string()]),
            filters: Vec::new(),
            limit: None,
        };
        let (sql, _) = stmt.to_sql();
        assert_eq!(sql, "SELECT id, email FROM users");
    }
}
