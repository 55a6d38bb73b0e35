//! Relationship resolution and batched eager loading over plain queries.
//!
//! relquery maps rows to entities, lets entity types declare named
//! relationships, and resolves those relationships either lazily (one query
//! per parent on first access) or eagerly (one query for an entire
//! collection, however large). A relationship accessor can return a canonical
//! descriptor or a raw query handle; both batch identically.
//!
//! # Quick Start
//!
//! ```ignore
//! use relquery::{Entity, EntityMeta, Relation, RelationSource};
//! use relquery_memory::MemoryDb;
//!
//! static POST: EntityMeta = EntityMeta::new("posts", "id");
//! static USER: EntityMeta = EntityMeta::new("users", "id")
//!     .relations(&[("posts", user_posts)]);
//!
//! fn user_posts(_user: &Entity) -> RelationSource {
//!     Relation::has_many(&POST, "user_id").into()
//! }
//!
//! let db = MemoryDb::new();
//! let user_id = db.insert("users", &[("email", "framework@laravel.com".into())]);
//! db.insert("posts", &[("user_id", user_id.into()), ("text", "This is a post.".into())]);
//!
//! // One query fetches the users, one more resolves "posts" for all of them.
//! let mut users = USER.all(&db)?;
//! users.load("posts", &db)?;
//! users.load_count("posts", &db)?;
//! ```
//!
//! # Pieces
//!
//! - [`Query`] - fluent single-table query builder (pure until executed)
//! - [`EntityMeta`] / [`Entity`] - entity declarations and materialized records
//! - [`Relation`] / [`RelationSource`] - relationship accessor results
//! - [`Collection`] - ordered entities with [`Collection::load`] and
//!   [`Collection::load_count`]
//! - [`Connection`] - the execution boundary backends implement
//! - [`QueryLog`] / [`Observed`] - explicit query observation for tests

pub use relquery_core::{
    CmpOp,
    ColumnInfo,
    Connection,
    Error,
    Filter,
    FromValue,
    NonAugmentableError,
    Observed,
    Projection,
    QueryError,
    QueryLog,
    QueryRecord,
    Result,
    Row,
    Statement,
    TypeError,
    Value,
};

pub use relquery_query::{
    Collection, Entity, EntityMeta, FetchPlan, Loaded, Query, Relation, RelationFn, RelationKind,
    RelationSource, resolve,
};
