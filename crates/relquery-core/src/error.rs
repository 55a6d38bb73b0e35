//! Error types for relquery operations.

use std::fmt;

/// The primary error type for all relquery operations.
#[derive(Debug)]
pub enum Error {
    /// Query execution errors
    Query(QueryError),
    /// Type conversion errors
    Type(TypeError),
    /// A relationship name that does not resolve to a descriptor or query handle
    UndefinedRelation {
        /// The parent entity's table name
        table: String,
        /// The requested relationship name
        relation: String,
    },
    /// A raw query handle that cannot accept a batching constraint
    NonAugmentable(NonAugmentableError),
    /// Custom error with message
    Custom(String),
}

/// A query that failed at the execution layer.
#[derive(Debug)]
pub struct QueryError {
    /// Human-readable error message
    pub message: String,
    /// The rendered SQL, if available
    pub sql: Option<String>,
    /// Underlying error from the connection layer
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// A value that could not be converted to the requested type.
#[derive(Debug)]
pub struct TypeError {
    /// The type that was requested
    pub expected: &'static str,
    /// What was actually found
    pub actual: String,
    /// The column involved, if known
    pub column: Option<String>,
}

/// Why a raw query handle could not be rewritten for batching.
#[derive(Debug)]
pub struct NonAugmentableError {
    /// The handle's target table
    pub table: String,
    /// The specific reason the rewrite failed
    pub reason: String,
}

impl Error {
    /// Create a query error with just a message.
    pub fn query(message: impl Into<String>) -> Self {
        Error::Query(QueryError {
            message: message.into(),
            sql: None,
            source: None,
        })
    }

    /// Create a query error carrying the rendered SQL.
    pub fn query_with_sql(message: impl Into<String>, sql: impl Into<String>) -> Self {
        Error::Query(QueryError {
            message: message.into(),
            sql: Some(sql.into()),
            source: None,
        })
    }

    /// Create an undefined-relation error.
    pub fn undefined_relation(table: impl Into<String>, relation: impl Into<String>) -> Self {
        Error::UndefinedRelation {
            table: table.into(),
            relation: relation.into(),
        }
    }

    /// Create a non-augmentable-query error.
    pub fn non_augmentable(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::NonAugmentable(NonAugmentableError {
            table: table.into(),
            reason: reason.into(),
        })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Query(e) => {
                write!(f, "query error: {}", e.message)?;
                if let Some(sql) = &e.sql {
                    write!(f, " (sql: {sql})")?;
                }
                Ok(())
            }
            Error::Type(e) => {
                write!(f, "type error: expected {}, got {}", e.expected, e.actual)?;
                if let Some(col) = &e.column {
                    write!(f, " (column '{col}')")?;
                }
                Ok(())
            }
            Error::UndefinedRelation { table, relation } => {
                write!(f, "undefined relationship '{relation}' on '{table}'")
            }
            Error::NonAugmentable(e) => {
                write!(
                    f,
                    "non-augmentable query against '{}': {}",
                    e.table, e.reason
                )
            }
            Error::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Query(e) => e
                .source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;
