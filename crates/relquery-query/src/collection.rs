//! Ordered entity collections.

use crate::entity::Entity;

/// An ordered sequence of entities.
///
/// Insertion order is preserved through every operation; the eager and
/// aggregate loaders (see [`load`](Collection::load) and
/// [`load_count`](Collection::load_count) in the eager module) resolve a
/// relationship for every member in a bounded number of queries.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    items: Vec<Entity>,
}

impl Collection {
    /// Create a collection from entities.
    #[must_use]
    pub fn new(items: Vec<Entity>) -> Self {
        Self { items }
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The first entity, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Entity> {
        self.items.first()
    }

    /// Get an entity by position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.items.get(index)
    }

    /// Append an entity.
    pub fn push(&mut self, entity: Entity) {
        self.items.push(entity);
    }

    /// Iterate over the entities in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.items.iter()
    }

    /// Iterate mutably over the entities in order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entity> {
        self.items.iter_mut()
    }

    pub(crate) fn items(&self) -> &[Entity] {
        &self.items
    }

    pub(crate) fn items_mut(&mut self) -> &mut [Entity] {
        &mut self.items
    }
}

impl IntoIterator for Collection {
    type Item = Entity;
    type IntoIter = std::vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Entity> for Collection {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
