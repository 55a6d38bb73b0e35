//! Entities and their declaration metadata.
//!
//! An [`Entity`] is a materialized record: the row it came from, the table it
//! originated in, an overlay of computed attributes (aggregate fields land
//! here), and a cache of resolved relationships. The cache is populated only
//! by the lazy loader on this type and the eager loaders on
//! [`Collection`](crate::Collection); each slot is written at most once per
//! load cycle.
//!
//! [`EntityMeta`] is the declaration surface: per entity type, its table name,
//! primary key column, and relationship accessors by name. Metas are `static`s
//! built with a const builder, mirroring how relationship metadata stays
//! zero-allocation.

use crate::collection::Collection;
use crate::query::Query;
use crate::relation::{RelationKind, RelationSource};
use relquery_core::{Connection, Error, FromValue, Result, Row, Value};
use std::collections::BTreeMap;

/// A relationship accessor: invoked on a parent entity, returns either a
/// canonical descriptor or a raw query handle.
///
/// Plain `fn` by design: re-invoking an accessor with the same parent must
/// produce the same query shape, which eager loading relies on.
pub type RelationFn = fn(&Entity) -> RelationSource;

/// Declaration metadata for one entity type.
#[derive(Debug)]
pub struct EntityMeta {
    /// The table this entity materializes from.
    pub table: &'static str,
    /// The primary key column.
    pub primary_key: &'static str,
    /// Named relationship accessors.
    pub relations: &'static [(&'static str, RelationFn)],
}

impl EntityMeta {
    /// Create a meta with no relationships.
    #[must_use]
    pub const fn new(table: &'static str, primary_key: &'static str) -> Self {
        Self {
            table,
            primary_key,
            relations: &[],
        }
    }

    /// Set the relationship accessor table.
    #[must_use]
    pub const fn relations(mut self, relations: &'static [(&'static str, RelationFn)]) -> Self {
        self.relations = relations;
        self
    }

    /// Look up a relationship accessor by name.
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<RelationFn> {
        self.relations
            .iter()
            .find(|(rel_name, _)| *rel_name == name)
            .map(|(_, accessor)| *accessor)
    }

    /// Start a query against this entity's table.
    #[must_use]
    pub fn query(&'static self) -> Query {
        Query::for_entity(self)
    }

    /// Materialize every row of this entity's table, in storage order.
    pub fn all<C: Connection>(&'static self, conn: &C) -> Result<Collection> {
        let rows = self.query().get(conn)?;
        Ok(self.hydrate(rows))
    }

    /// Materialize the first row of this entity's table, if any.
    pub fn first<C: Connection>(&'static self, conn: &C) -> Result<Option<Entity>> {
        Ok(self.query().first(conn)?.map(|row| self.entity(row)))
    }

    /// Map raw rows into a collection of entities.
    #[must_use]
    pub fn hydrate(&'static self, rows: Vec<Row>) -> Collection {
        Collection::new(rows.into_iter().map(|row| self.entity(row)).collect())
    }

    /// Map one raw row into an entity.
    #[must_use]
    pub fn entity(&'static self, row: Row) -> Entity {
        Entity::from_row(row, self.table, Some(self))
    }
}

/// A resolved relationship slot.
#[derive(Debug, Clone)]
pub enum Loaded {
    /// To-one result: the first match, or none.
    One(Option<Entity>),
    /// To-many result: all matches, in storage order.
    Many(Vec<Entity>),
}

impl Loaded {
    /// The related entities as a slice (a to-one result is a 0/1-element slice).
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        match self {
            Loaded::One(Some(entity)) => std::slice::from_ref(entity),
            Loaded::One(None) => &[],
            Loaded::Many(entities) => entities,
        }
    }

    /// The first related entity, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Entity> {
        self.entities().first()
    }

    /// Number of related entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities().len()
    }

    /// Check whether the slot resolved to no related entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities().is_empty()
    }
}

/// A materialized record with a relationship cache.
#[derive(Debug, Clone)]
pub struct Entity {
    table: String,
    meta: Option<&'static EntityMeta>,
    row: Row,
    extra: BTreeMap<String, Value>,
    relations: BTreeMap<String, Loaded>,
}

impl Entity {
    /// Build an entity from a raw row.
    ///
    /// `meta` is absent for rows produced by a raw query handle against a
    /// table with no declared entity type; such detached entities carry data
    /// but cannot load relationships of their own.
    #[must_use]
    pub fn from_row(row: Row, table: impl Into<String>, meta: Option<&'static EntityMeta>) -> Self {
        Self {
            table: table.into(),
            meta,
            row,
            extra: BTreeMap::new(),
            relations: BTreeMap::new(),
        }
    }

    /// The table this entity originated from.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The declaration metadata, if this entity has a declared type.
    #[must_use]
    pub fn meta(&self) -> Option<&'static EntityMeta> {
        self.meta
    }

    /// The underlying row.
    #[must_use]
    pub fn row(&self) -> &Row {
        &self.row
    }

    /// Get an attribute by name: row columns first, then overlay attributes
    /// (aggregate fields such as `posts_count` live in the overlay).
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.row.get_by_name(name).or_else(|| self.extra.get(name))
    }

    /// Get an attribute by name, cloning; missing attributes read as NULL.
    #[must_use]
    pub fn value(&self, name: &str) -> Value {
        self.attr(name).cloned().unwrap_or(Value::Null)
    }

    /// Get a typed attribute by name.
    pub fn get_named<T: FromValue>(&self, name: &str) -> Result<T> {
        match self.attr(name) {
            Some(value) => T::from_value(value),
            None => self.row.get_named(name),
        }
    }

    /// This entity's primary key value (NULL if it has no declared type).
    #[must_use]
    pub fn primary_key(&self) -> Value {
        match self.meta {
            Some(meta) => self.value(meta.primary_key),
            None => Value::Null,
        }
    }

    /// Column names of the underlying row, in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.row.column_names()
    }

    /// Peek a relationship slot without touching the connection.
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&Loaded> {
        self.relations.get(name)
    }

    /// Check whether a relationship slot is resolved.
    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    pub(crate) fn set_relation(&mut self, name: &str, loaded: Loaded) {
        self.relations.insert(name.to_string(), loaded);
    }

    pub(crate) fn set_attr(&mut self, name: String, value: Value) {
        self.extra.insert(name, value);
    }

    /// Lazily resolve a relationship: first access executes the accessor's
    /// query; later accesses return the cached slot with no further I/O.
    pub fn load<C: Connection>(&mut self, name: &str, conn: &C) -> Result<&Loaded> {
        if !self.relations.contains_key(name) {
            let Some(meta) = self.meta else {
                return Err(Error::undefined_relation(self.table.clone(), name));
            };
            let accessor = meta
                .relation(name)
                .ok_or_else(|| Error::undefined_relation(meta.table, name))?;

            let loaded = match accessor(self) {
                RelationSource::Relation(rel) => {
                    let query = Query::for_entity(rel.related)
                        .filter_eq(rel.foreign_key, self.value(rel.local_key));
                    match rel.kind {
                        RelationKind::Many => {
                            Loaded::Many(hydrate_rows(query.get(conn)?, rel.related.table, Some(rel.related)))
                        }
                        RelationKind::One => Loaded::One(
                            query
                                .first(conn)?
                                .map(|row| Entity::from_row(row, rel.related.table, Some(rel.related))),
                        ),
                    }
                }
                RelationSource::Query(handle) => {
                    let related_meta = handle.entity_meta();
                    let table = handle.table_name().to_string();
                    Loaded::Many(hydrate_rows(handle.get(conn)?, table, related_meta))
                }
            };

            tracing::debug!(
                target: "relquery::lazy",
                table = self.table.as_str(),
                relation = name,
                loaded = loaded.len(),
                "lazy relationship resolved"
            );
            self.relations.insert(name.to_string(), loaded);
        }

        Ok(&self.relations[name])
    }
}

pub(crate) fn hydrate_rows(
    rows: Vec<Row>,
    table: impl Into<String>,
    meta: Option<&'static EntityMeta>,
) -> Vec<Entity> {
    let table = table.into();
    rows.into_iter()
        .map(|row| Entity::from_row(row, table.clone(), meta))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::Relation;

    static TEAM: EntityMeta = EntityMeta::new("teams", "id");

    static HERO: EntityMeta = EntityMeta::new("heroes", "id").relations(&[("team", hero_team)]);

    fn hero_team(_hero: &Entity) -> RelationSource {
        RelationSource::Relation(Relation::has_one(&TEAM, "id").local_key("team_id"))
    }

    fn hero(id: i64, team_id: i64) -> Entity {
        HERO.entity(Row::new(
            vec!["id".to_string(), "team_id".to_string()],
            vec![Value::Int(id), Value::Int(team_id)],
        ))
    }

    #[test]
    fn test_meta_relation_lookup() {
        assert!(HERO.relation("team").is_some());
        assert!(HERO.relation("powers").is_none());
        assert!(TEAM.relation("team").is_none());
    }

    #[test]
    fn test_entity_attr_access() {
        let hero = hero(1, 7);
        assert_eq!(hero.value("team_id"), Value::Int(7));
        assert_eq!(hero.value("missing"), Value::Null);
        assert_eq!(hero.primary_key(), Value::Int(1));
        assert_eq!(hero.table(), "heroes");
    }

    #[test]
    fn test_overlay_attr_shadowed_by_row() {
        let mut hero = hero(1, 7);
        hero.set_attr("team_count".to_string(), Value::Int(3));
        assert_eq!(hero.value("team_count"), Value::Int(3));

        // A row column with the same name wins over the overlay.
        hero.set_attr("id".to_string(), Value::Int(99));
        assert_eq!(hero.value("id"), Value::Int(1));
    }

    #[test]
    fn test_typed_attr_access() {
        let mut hero = hero(1, 7);
        hero.set_attr("team_count".to_string(), Value::Int(3));
        let count: i64 = hero.get_named("team_count").unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_relation_cache_starts_empty() {
        let hero = hero(1, 7);
        assert!(!hero.is_loaded("team"));
        assert!(hero.relation("team").is_none());
    }

    #[test]
    fn test_loaded_accessors() {
        let one = Loaded::One(Some(hero(1, 7)));
        assert_eq!(one.len(), 1);
        assert!(one.first().is_some());

        let none = Loaded::One(None);
        assert!(none.is_empty());
        assert!(none.first().is_none());

        let many = Loaded::Many(vec![hero(1, 7), hero(2, 7)]);
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn test_detached_entity_has_no_relations() {
        let row = Row::new(vec!["email".to_string()], vec![Value::Text("x".into())]);
        let detached = Entity::from_row(row, "users", None);
        assert!(detached.meta().is_none());
        assert_eq!(detached.primary_key(), Value::Null);
    }
}
