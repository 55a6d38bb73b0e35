//! Relationship descriptors and the resolver.
//!
//! A relationship accessor may return either a canonical [`Relation`]
//! descriptor or a raw [`Query`] handle. [`resolve`] normalizes both into a
//! [`FetchPlan`] — the common representation the eager and aggregate loaders
//! batch against — without executing anything.
//!
//! # Raw-handle convention
//!
//! A raw handle carries no relationship metadata, so the resolver rewrites it
//! under a fixed convention rather than guessing:
//!
//! 1. The *first* equality filter on the handle is the foreign-key predicate.
//!    It is removed from the plan's base query (the batcher replaces it with
//!    an `IN` constraint); every other filter is preserved.
//! 2. The parent-side key column is the probe entity's column whose value
//!    equals that predicate's bound value. Zero or multiple matching columns
//!    fail with a non-augmentable error: fetching unconstrained or wrongly
//!    constrained data is never acceptable.
//! 3. A handle with no equality filter is non-augmentable.
//!
//! Raw-handle relationships always have [`RelationKind::Many`] cardinality;
//! callers wanting to-one semantics take the first element.

use crate::entity::{Entity, EntityMeta};
use crate::query::Query;
use relquery_core::{CmpOp, Error, Filter, Result};

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// At most one related entity.
    One,
    /// Any number of related entities.
    Many,
}

/// Canonical foreign-key relationship metadata.
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    /// The related entity type.
    pub related: &'static EntityMeta,
    /// Foreign key column on the related table.
    pub foreign_key: &'static str,
    /// Key column on the parent supplying the matched values.
    pub local_key: &'static str,
    /// Cardinality.
    pub kind: RelationKind,
}

impl Relation {
    /// A to-many relationship: rows of `related` whose `foreign_key` equals
    /// the parent's local key (default `"id"`).
    #[must_use]
    pub const fn has_many(related: &'static EntityMeta, foreign_key: &'static str) -> Self {
        Self {
            related,
            foreign_key,
            local_key: "id",
            kind: RelationKind::Many,
        }
    }

    /// A to-one relationship.
    #[must_use]
    pub const fn has_one(related: &'static EntityMeta, foreign_key: &'static str) -> Self {
        Self {
            related,
            foreign_key,
            local_key: "id",
            kind: RelationKind::One,
        }
    }

    /// Override the parent-side key column.
    #[must_use]
    pub const fn local_key(mut self, key: &'static str) -> Self {
        self.local_key = key;
        self
    }
}

/// What a relationship accessor returns.
#[derive(Debug, Clone)]
pub enum RelationSource {
    /// A canonical descriptor.
    Relation(Relation),
    /// A raw query handle (escape hatch for relationships that cannot be
    /// expressed as a simple foreign-key descriptor).
    Query(Query),
}

impl From<Relation> for RelationSource {
    fn from(rel: Relation) -> Self {
        RelationSource::Relation(rel)
    }
}

impl From<Query> for RelationSource {
    fn from(query: Query) -> Self {
        RelationSource::Query(query)
    }
}

/// The normalized fetch plan for one relationship, ready for batching.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    /// Base query on the related table, with no parent binding. Extra
    /// constraints from a raw handle are preserved here.
    pub query: Query,
    /// Child column the batcher constrains with `IN (parent keys)`.
    pub foreign_key: String,
    /// Parent column supplying the key values.
    pub local_key: String,
    /// Cardinality of the attached result.
    pub kind: RelationKind,
    /// Metadata for hydrating child rows, if the target table has a declared
    /// entity type.
    pub related: Option<&'static EntityMeta>,
}

/// Resolve a named relationship on a probe entity into a fetch plan.
///
/// Fails with an undefined-relationship error before any query executes when
/// the name does not resolve to an accessor; fails with a non-augmentable
/// error when a raw handle cannot accept the batching constraint.
pub fn resolve(probe: &Entity, name: &str) -> Result<FetchPlan> {
    let Some(meta) = probe.meta() else {
        return Err(Error::undefined_relation(probe.table().to_string(), name));
    };
    let accessor = meta
        .relation(name)
        .ok_or_else(|| Error::undefined_relation(meta.table, name))?;

    match accessor(probe) {
        RelationSource::Relation(rel) => Ok(FetchPlan {
            query: Query::for_entity(rel.related),
            foreign_key: rel.foreign_key.to_string(),
            local_key: rel.local_key.to_string(),
            kind: rel.kind,
            related: Some(rel.related),
        }),
        RelationSource::Query(handle) => plan_from_handle(probe, handle),
    }
}

fn plan_from_handle(probe: &Entity, mut handle: Query) -> Result<FetchPlan> {
    let table = handle.table_name().to_string();

    let position = handle
        .filters()
        .iter()
        .position(|filter| matches!(filter, Filter::Cmp { op: CmpOp::Eq, .. }));
    let Some(position) = position else {
        return Err(Error::non_augmentable(
            table,
            "no equality filter to treat as the foreign-key predicate",
        ));
    };

    let Filter::Cmp { column, value, .. } = handle.remove_filter(position) else {
        // position() matched a Cmp filter above.
        return Err(Error::non_augmentable(table, "predicate shape changed"));
    };

    let candidates: Vec<String> = probe
        .columns()
        .filter(|col| probe.attr(col) == Some(&value))
        .map(ToString::to_string)
        .collect();

    let local_key = match candidates.as_slice() {
        [single] => single.clone(),
        [] => {
            return Err(Error::non_augmentable(
                table,
                format!(
                    "no parent column on '{}' carries the bound value of '{}'",
                    probe.table(),
                    column
                ),
            ));
        }
        many => {
            return Err(Error::non_augmentable(
                table,
                format!(
                    "ambiguous parent key for '{}': columns {:?} all carry the bound value",
                    column, many
                ),
            ));
        }
    };

    let related = handle.entity_meta();
    Ok(FetchPlan {
        query: handle,
        foreign_key: column,
        local_key,
        kind: RelationKind::Many,
        related,
    })
}
