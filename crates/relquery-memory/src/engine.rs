//! The in-memory table engine.
//!
//! Tables are schemaless: the column set of a table is the union of the
//! columns seen across its inserts, with earlier rows padded with NULL when a
//! later insert introduces a new column. Statements are interpreted
//! structurally; the engine never parses SQL text.
//!
//! Comparison semantics follow SQL: NULL matches nothing (not even NULL), and
//! comparing values of incompatible types matches nothing rather than erroring.

use crate::config::MemoryConfig;
use relquery_core::{ColumnInfo, Connection, Filter, Projection, Result, Row, Statement, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    next_key: i64,
}

impl Table {
    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col == name)
    }

    fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(Value::Null);
        }
        self.columns.len() - 1
    }
}

/// A shared in-memory database.
///
/// Interior mutability lets the same instance serve as a [`Connection`] while
/// tests seed it between queries.
#[derive(Debug, Default)]
pub struct MemoryDb {
    tables: RwLock<HashMap<String, Table>>,
    config: MemoryConfig,
}

impl MemoryDb {
    /// Create an empty database with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MemoryConfig::default())
    }

    /// Create an empty database with the given configuration.
    #[must_use]
    pub fn with_config(config: MemoryConfig) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Insert a row, returning its auto-assigned key.
    ///
    /// The key column (default `"id"`) receives the next integer key for the
    /// table unless `pairs` sets it explicitly. New column names extend the
    /// table's column set; rows that predate a column read NULL in it.
    pub fn insert(&self, table: &str, pairs: &[(&str, Value)]) -> i64 {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let table_entry = tables.entry(table.to_string()).or_insert_with(|| Table {
            columns: vec![self.config.key_column.clone()],
            rows: Vec::new(),
            next_key: 1,
        });

        let auto_key = table_entry.next_key;
        table_entry.next_key += 1;

        let key_index = table_entry.ensure_column(&self.config.key_column);
        let indices: Vec<usize> = pairs
            .iter()
            .map(|(name, _)| table_entry.ensure_column(name))
            .collect();

        let mut row = vec![Value::Null; table_entry.columns.len()];
        row[key_index] = Value::Int(auto_key);
        for (&index, (_, value)) in indices.iter().zip(pairs) {
            row[index] = value.clone();
        }

        let key = match &row[key_index] {
            Value::Int(explicit) => *explicit,
            _ => auto_key,
        };

        tracing::trace!(
            target: "relquery::memory",
            table,
            key,
            columns = pairs.len(),
            "row inserted"
        );
        table_entry.rows.push(row);
        key
    }

    /// Number of rows currently stored in a table (0 for unknown tables).
    #[must_use]
    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(table)
            .map_or(0, |t| t.rows.len())
    }
}

impl Connection for MemoryDb {
    fn query(&self, stmt: &Statement) -> Result<Vec<Row>> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        let Some(table) = tables.get(&stmt.table) else {
            return Ok(Vec::new());
        };

        let matched = table
            .rows
            .iter()
            .filter(|row| stmt.filters.iter().all(|f| row_matches(table, row, f)));

        let mut rows = match &stmt.projection {
            Projection::All => {
                let columns = Arc::new(ColumnInfo::new(table.columns.clone()));
                matched
                    .map(|values| Row::with_columns(Arc::clone(&columns), values.clone()))
                    .collect()
            }
            Projection::Columns(names) => {
                let indices: Vec<Option<usize>> =
                    names.iter().map(|name| table.column_index(name)).collect();
                let columns = Arc::new(ColumnInfo::new(names.clone()));
                matched
                    .map(|values| {
                        let projected = indices
                            .iter()
                            .map(|index| index.map_or(Value::Null, |i| values[i].clone()))
                            .collect();
                        Row::with_columns(Arc::clone(&columns), projected)
                    })
                    .collect()
            }
            Projection::CountBy(group) => count_by(table, matched, group),
        };

        if let Some(limit) = stmt.limit {
            rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(rows)
    }
}

/// Group matched rows by the value of `group`, in first-seen order.
fn count_by<'a>(
    table: &Table,
    matched: impl Iterator<Item = &'a Vec<Value>>,
    group: &str,
) -> Vec<Row> {
    let index = table.column_index(group);
    // Linear scan keeps first-seen group order without requiring hashing.
    let mut groups: Vec<(Value, i64)> = Vec::new();
    for values in matched {
        let key = index.map_or(Value::Null, |i| values[i].clone());
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += 1,
            None => groups.push((key, 1)),
        }
    }

    let columns = Arc::new(ColumnInfo::new(vec![
        group.to_string(),
        "count".to_string(),
    ]));
    groups
        .into_iter()
        .map(|(key, count)| Row::with_columns(Arc::clone(&columns), vec![key, Value::Int(count)]))
        .collect()
}

fn row_matches(table: &Table, row: &[Value], filter: &Filter) -> bool {
    let cell = table
        .column_index(filter.column())
        .map_or(&Value::Null, |i| &row[i]);
    match filter {
        Filter::Cmp { op, value, .. } => match compare(cell, value) {
            Some(ordering) => op_accepts(*op, ordering),
            None => false,
        },
        Filter::In { values, .. } => values
            .iter()
            .any(|value| compare(cell, value) == Some(Ordering::Equal)),
    }
}

fn op_accepts(op: relquery_core::CmpOp, ordering: Ordering) -> bool {
    use relquery_core::CmpOp;
    match op {
        CmpOp::Eq => ordering == Ordering::Equal,
        CmpOp::Ne => ordering != Ordering::Equal,
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::Le => ordering != Ordering::Greater,
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::Ge => ordering != Ordering::Less,
    }
}

/// SQL-style comparison: NULL and type mismatches are incomparable, integers
/// and doubles compare numerically.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Double(x), Value::Double(y)) => x.partial_cmp(y),
        (Value::Int(x), Value::Double(y)) => (*x as f64).partial_cmp(y),
        (Value::Double(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)),
        (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Bytes(x), Value::Bytes(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relquery_core::CmpOp;

    fn select(table: &str) -> Statement {
        Statement::select_all(table)
    }

    fn eq(column: &str, value: Value) -> Filter {
        Filter::Cmp {
            column: column.to_string(),
            op: CmpOp::Eq,
            value,
        }
    }

    #[test]
    fn test_insert_assigns_sequential_keys() {
        let db = MemoryDb::new();
        assert_eq!(db.insert("users", &[("email", "a@b.c".into())]), 1);
        assert_eq!(db.insert("users", &[("email", "d@e.f".into())]), 2);
        assert_eq!(db.insert("posts", &[]), 1);
    }

    #[test]
    fn test_unknown_table_is_empty() {
        let db = MemoryDb::new();
        let rows = db.query(&select("ghosts")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_equality_filter() {
        let db = MemoryDb::new();
        db.insert("users", &[("email", "a@b.c".into())]);
        db.insert("users", &[("email", "d@e.f".into())]);

        let mut stmt = select("users");
        stmt.filters.push(eq("email", "d@e.f".into()));
        let rows = db.query(&stmt).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_by_name("id"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_null_matches_nothing() {
        let db = MemoryDb::new();
        db.insert("users", &[("nickname", Value::Null)]);

        let mut stmt = select("users");
        stmt.filters.push(eq("nickname", Value::Null));
        assert!(db.query(&stmt).unwrap().is_empty());
    }

    #[test]
    fn test_in_filter() {
        let db = MemoryDb::new();
        for email in ["a@b.c", "d@e.f", "g@h.i"] {
            db.insert("users", &[("email", email.into())]);
        }

        let mut stmt = select("users");
        stmt.filters.push(Filter::In {
            column: "email".to_string(),
            values: vec!["a@b.c".into(), "g@h.i".into()],
        });
        let rows = db.query(&stmt).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get_by_name("id"), Some(&Value::Int(1)));
        assert_eq!(rows[1].get_by_name("id"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_ordering_filters() {
        let db = MemoryDb::new();
        for age in [30_i64, 40, 50] {
            db.insert("users", &[("age", Value::Int(age))]);
        }

        let mut stmt = select("users");
        stmt.filters.push(Filter::Cmp {
            column: "age".to_string(),
            op: CmpOp::Gt,
            value: Value::Int(35),
        });
        assert_eq!(db.query(&stmt).unwrap().len(), 2);
    }

    #[test]
    fn test_late_column_pads_earlier_rows() {
        let db = MemoryDb::new();
        db.insert("users", &[("email", "a@b.c".into())]);
        db.insert("users", &[("email", "d@e.f".into()), ("age", Value::Int(30))]);

        let rows = db.query(&select("users")).unwrap();
        assert_eq!(rows[0].get_by_name("age"), Some(&Value::Null));
        assert_eq!(rows[1].get_by_name("age"), Some(&Value::Int(30)));
    }

    #[test]
    fn test_column_projection() {
        let db = MemoryDb::new();
        db.insert("users", &[("email", "a@b.c".into()), ("age", Value::Int(30))]);

        let mut stmt = select("users");
        stmt.projection = Projection::Columns(vec!["email".to_string(), "missing".to_string()]);
        let rows = db.query(&stmt).unwrap();
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0].get_by_name("email"), Some(&Value::Text("a@b.c".into())));
        assert_eq!(rows[0].get_by_name("missing"), Some(&Value::Null));
    }

    #[test]
    fn test_count_by_first_seen_order() {
        let db = MemoryDb::new();
        for user_id in [2_i64, 1, 2, 2, 1] {
            db.insert("posts", &[("user_id", Value::Int(user_id))]);
        }

        let mut stmt = select("posts");
        stmt.projection = Projection::CountBy("user_id".to_string());
        let rows = db.query(&stmt).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get_by_name("user_id"), Some(&Value::Int(2)));
        assert_eq!(rows[0].get_by_name("count"), Some(&Value::Int(3)));
        assert_eq!(rows[1].get_by_name("user_id"), Some(&Value::Int(1)));
        assert_eq!(rows[1].get_by_name("count"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_count_by_respects_filters() {
        let db = MemoryDb::new();
        db.insert("posts", &[("user_id", Value::Int(1)), ("published", Value::Bool(true))]);
        db.insert("posts", &[("user_id", Value::Int(1)), ("published", Value::Bool(false))]);

        let mut stmt = select("posts");
        stmt.filters.push(eq("published", Value::Bool(true)));
        stmt.projection = Projection::CountBy("user_id".to_string());
        let rows = db.query(&stmt).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_by_name("count"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_limit_truncates() {
        let db = MemoryDb::new();
        for _ in 0..5 {
            db.insert("users", &[]);
        }

        let mut stmt = select("users");
        stmt.limit = Some(2);
        assert_eq!(db.query(&stmt).unwrap().len(), 2);
    }

    #[test]
    fn test_query_one_returns_first() {
        let db = MemoryDb::new();
        db.insert("users", &[("email", "a@b.c".into())]);
        db.insert("users", &[("email", "d@e.f".into())]);

        let row = db.query_one(&select("users")).unwrap().unwrap();
        assert_eq!(row.get_by_name("id"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_explicit_key_override() {
        let db = MemoryDb::new();
        let key = db.insert("users", &[("id", Value::Int(42))]);
        assert_eq!(key, 42);
    }

    #[test]
    fn test_poisoned_lock_recovers() {
        use std::sync::Arc;

        let db = Arc::new(MemoryDb::new());
        db.insert("users", &[("email", "a@b.c".into())]);

        let poisoner = Arc::clone(&db);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.tables.write().unwrap_or_else(|e| e.into_inner());
            panic!("poison the table lock");
        })
        .join();

        // Later use recovers the guard instead of panicking on the poison.
        assert_eq!(db.row_count("users"), 1);
        db.insert("users", &[("email", "d@e.f".into())]);
        assert_eq!(db.query(&select("users")).unwrap().len(), 2);
    }

    #[test]
    fn test_numeric_cross_type_compare() {
        let db = MemoryDb::new();
        db.insert("metrics", &[("score", Value::Double(1.0))]);

        let mut stmt = select("metrics");
        stmt.filters.push(eq("score", Value::Int(1)));
        assert_eq!(db.query(&stmt).unwrap().len(), 1);
    }
}
