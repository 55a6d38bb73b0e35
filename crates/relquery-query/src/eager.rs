//! Eager and aggregate relationship loading.
//!
//! Both loaders batch one relationship across a whole collection into a
//! single query, independent of the number of parents: resolve the fetch plan
//! once against a representative parent, collect the distinct parent keys,
//! and constrain the plan's base query with `IN (keys)`. This is the
//! alternative to issuing one query per parent row (the N+1 anti-pattern).

use crate::collection::Collection;
use crate::entity::{Entity, Loaded, hydrate_rows};
use crate::relation::{FetchPlan, RelationKind, resolve};
use relquery_core::{Connection, Projection, Result, Value};
use std::collections::HashMap;

impl Collection {
    /// Eagerly resolve a relationship for every entity in the collection.
    ///
    /// Issues exactly one query regardless of collection size; an empty
    /// collection issues none. Every parent ends up with a resolved slot:
    /// parents with no matching children get an empty collection (to-many)
    /// or a missing entity (to-one) — never an unresolved slot.
    pub fn load<C: Connection>(&mut self, name: &str, conn: &C) -> Result<()> {
        let Some(probe) = self.first() else {
            return Ok(());
        };
        let plan = resolve(probe, name)?;
        let keys = self.distinct_keys(&plan.local_key);

        let batched = plan
            .query
            .clone()
            .filter_in(plan.foreign_key.clone(), keys.clone());
        let rows = batched.get(conn)?;

        tracing::debug!(
            target: "relquery::eager",
            relation = name,
            parents = self.len(),
            keys = keys.len(),
            children = rows.len(),
            "eager load batched"
        );

        let children = hydrate_rows(rows, plan.query.table_name().to_string(), plan.related);
        let mut groups: HashMap<Value, Vec<Entity>> = HashMap::new();
        for child in children {
            groups
                .entry(child.value(&plan.foreign_key))
                .or_default()
                .push(child);
        }

        for parent in self.items_mut() {
            let key = parent.value(&plan.local_key);
            let matched = if key.is_null() {
                &[][..]
            } else {
                groups.get(&key).map_or(&[][..], Vec::as_slice)
            };
            let loaded = match plan.kind {
                RelationKind::Many => Loaded::Many(matched.to_vec()),
                RelationKind::One => Loaded::One(matched.first().cloned()),
            };
            parent.set_relation(name, loaded);
        }

        Ok(())
    }

    /// Attach a per-parent related-row count under `<name>_count`.
    ///
    /// Issues exactly one grouped counting query regardless of collection
    /// size; an empty collection issues none. Parents with no matching
    /// children get a count of `0`, not a missing field. Works identically
    /// whether the relationship is a descriptor or a raw query handle, with a
    /// raw handle's extra constraints applied to the count.
    pub fn load_count<C: Connection>(&mut self, name: &str, conn: &C) -> Result<()> {
        let Some(probe) = self.first() else {
            return Ok(());
        };
        let plan = resolve(probe, name)?;
        let keys = self.distinct_keys(&plan.local_key);

        let counts = fetch_counts(&plan, keys, conn)?;

        tracing::debug!(
            target: "relquery::eager",
            relation = name,
            parents = self.len(),
            groups = counts.len(),
            "aggregate count loaded"
        );

        let field = format!("{name}_count");
        for parent in self.items_mut() {
            let key = parent.value(&plan.local_key);
            let count = counts.get(&key).copied().unwrap_or(0);
            parent.set_attr(field.clone(), Value::Int(count));
        }

        Ok(())
    }

    fn distinct_keys(&self, local_key: &str) -> Vec<Value> {
        let mut keys: Vec<Value> = Vec::new();
        for entity in self.items() {
            let key = entity.value(local_key);
            if !key.is_null() && !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

fn fetch_counts<C: Connection>(
    plan: &FetchPlan,
    keys: Vec<Value>,
    conn: &C,
) -> Result<HashMap<Value, i64>> {
    let mut stmt = plan
        .query
        .clone()
        .filter_in(plan.foreign_key.clone(), keys)
        .statement();
    stmt.projection = Projection::CountBy(plan.foreign_key.clone());

    let (sql, params) = stmt.to_sql();
    tracing::debug!(target: "relquery::query", sql = %sql, params = params.len(), "executing query");

    let rows = conn.query(&stmt)?;
    let mut counts = HashMap::new();
    for row in rows {
        let key = row
            .get_by_name(&plan.foreign_key)
            .cloned()
            .unwrap_or(Value::Null);
        let count: i64 = row.get_named("count")?;
        counts.insert(key, count);
    }
    Ok(counts)
}
