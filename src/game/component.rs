//! Component Storage
//!
//! `ComponentStorage<T>` is a sparse array indexed by entity slot. Each
//! occupied slot remembers the full handle it was inserted with, so lookups
//! through a stale handle (same slot, older generation) miss instead of
//! returning the object that recycled the slot.
//!
//! Iteration follows registration order, not slot order: a recycled low
//! slot does not move a newcomer ahead of older objects. Stages hold a few
//! dozen live objects at most, so a flat `Vec<Option<_>>` plus a sort per
//! iteration is all we need.

use super::entity::Entity;

#[derive(Debug)]
struct Entry<T> {
    /// Registration sequence number
    order: u64,
    entity: Entity,
    value: T,
}

/// Sparse storage for one kind of stage object.
#[derive(Debug)]
pub struct ComponentStorage<T> {
    data: Vec<Option<Entry<T>>>,
    next_order: u64,
}

impl<T> ComponentStorage<T> {
    pub fn new() -> Self {
        Self { data: Vec::new(), next_order: 0 }
    }

    fn ensure_capacity(&mut self, index: usize) {
        if index >= self.data.len() {
            self.data.resize_with(index + 1, || None);
        }
    }

    /// Insert a value for an entity, replacing whatever occupied the slot.
    pub fn insert(&mut self, entity: Entity, value: T) {
        let idx = entity.index() as usize;
        self.ensure_capacity(idx);
        let order = self.next_order;
        self.next_order += 1;
        self.data[idx] = Some(Entry { order, entity, value });
    }

    /// Remove and return the value if the handle is current.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        if !self.contains(entity) {
            return None;
        }
        self.data[entity.index() as usize].take().map(|entry| entry.value)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        match self.data.get(entity.index() as usize) {
            Some(Some(entry)) if entry.entity == entity => Some(&entry.value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        match self.data.get_mut(entity.index() as usize) {
            Some(Some(entry)) if entry.entity == entity => Some(&mut entry.value),
            _ => None,
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    /// Iterate over (handle, value) pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        let mut entries: Vec<&Entry<T>> = self.data.iter().flatten().collect();
        entries.sort_by_key(|entry| entry.order);
        entries.into_iter().map(|entry| (entry.entity, &entry.value))
    }

    /// Iterate mutably over (handle, value) pairs in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        let mut entries: Vec<&mut Entry<T>> = self.data.iter_mut().flatten().collect();
        entries.sort_by_key(|entry| entry.order);
        entries.into_iter().map(|entry| (entry.entity, &mut entry.value))
    }

    /// Handles of every stored object, oldest first.
    pub fn entities(&self) -> Vec<Entity> {
        self.iter().map(|(entity, _)| entity).collect()
    }

    /// Empty a slot regardless of generation (used on despawn).
    pub fn clear_slot(&mut self, index: u32) {
        if let Some(slot) = self.data.get_mut(index as usize) {
            *slot = None;
        }
    }

    pub fn clear(&mut self) {
        for slot in &mut self.data {
            *slot = None;
        }
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut storage: ComponentStorage<i32> = ComponentStorage::new();
        let entity = Entity::new(5, 0);

        storage.insert(entity, 42);
        assert_eq!(storage.get(entity), Some(&42));
        assert!(storage.contains(entity));
        assert!(!storage.contains(Entity::new(4, 0)));
    }

    #[test]
    fn test_stale_handle_misses() {
        let mut storage: ComponentStorage<&str> = ComponentStorage::new();
        let old = Entity::new(3, 0);
        let new = Entity::new(3, 1);

        storage.insert(new, "octo");
        assert_eq!(storage.get(old), None);
        assert_eq!(storage.remove(old), None);
        assert_eq!(storage.remove(new), Some("octo"));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_iteration_yields_handles() {
        let mut storage: ComponentStorage<&str> = ComponentStorage::new();

        storage.insert(Entity::new(0, 0), "zero");
        storage.insert(Entity::new(2, 4), "two");
        storage.insert(Entity::new(5, 1), "five");

        let items: Vec<_> = storage.iter().collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1], (Entity::new(2, 4), &"two"));
        assert_eq!(storage.entities().len(), 3);

        storage.clear_slot(2);
        assert_eq!(storage.count(), 2);
    }

    #[test]
    fn test_iteration_follows_registration_order() {
        let mut storage: ComponentStorage<&str> = ComponentStorage::new();

        storage.insert(Entity::new(0, 0), "gone");
        storage.insert(Entity::new(1, 0), "first");
        storage.remove(Entity::new(0, 0));
        // Recycled slot 0 goes to the newest object
        storage.insert(Entity::new(0, 1), "second");

        let names: Vec<_> = storage.iter().map(|(_, name)| *name).collect();
        assert_eq!(names, vec!["first", "second"]);
        let names: Vec<_> = storage.iter_mut().map(|(_, name)| *name).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(storage.entities(), vec![Entity::new(1, 0), Entity::new(0, 1)]);
    }
}
