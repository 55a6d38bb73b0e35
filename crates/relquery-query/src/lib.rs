//! Query building, entity mapping, and relationship loading.
//!
//! This crate layers the relationship machinery on top of `relquery-core`:
//!
//! - [`Query`] - the fluent single-table query builder
//! - [`EntityMeta`] / [`Entity`] - entity declarations and materialized records
//! - [`Relation`] / [`RelationSource`] - what a relationship accessor returns
//! - [`resolve`] / [`FetchPlan`] - normalization of accessors into batchable plans
//! - [`Collection`] - ordered entity sequences with the eager loaders
//!   ([`Collection::load`], [`Collection::load_count`])
//!
//! Loading a relationship for a whole collection costs one query regardless of
//! collection size; loading lazily per entity costs one query per entity. Both
//! paths produce identical attached data.

pub mod collection;
pub mod eager;
pub mod entity;
pub mod query;
pub mod relation;

pub use collection::Collection;
pub use entity::{Entity, EntityMeta, Loaded, RelationFn};
pub use query::Query;
pub use relation::{FetchPlan, Relation, RelationKind, RelationSource, resolve};
