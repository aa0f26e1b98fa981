//! Entity Handles with Generational Indices
//!
//! Every dynamic object in a stage (enemies, pellets, items, explosions)
//! is addressed through an `Entity` handle instead of a reference:
//! - A handle is a slot index plus the generation of that slot
//! - Despawning bumps the slot generation, so stale handles stop resolving
//! - Freed slots are recycled for the next spawn
//!
//! An enemy pellet that outlives the shooter, or a loot drop that refers to
//! a killed enemy, can therefore never alias a newly spawned object.

use std::fmt;
use serde::{Serialize, Deserialize};

/// Handle to a dynamic stage object.
///
/// Two handles with the same index but different generations refer to
/// different objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// A handle that never resolves.
    pub const NULL: Entity = Entity { index: u32::MAX, generation: 0 };

    /// Only the allocator mints handles.
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index (for component storage access).
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for Entity {
    fn default() -> Self {
        Entity::NULL
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "entity(null)")
        } else {
            write!(f, "entity({}v{})", self.index, self.generation)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    generation: u32,
    alive: bool,
}

/// Hands out entity handles and tracks which ones are still alive.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    slots: Vec<Slot>,
    /// Recycled slot indices (LIFO)
    free_indices: Vec<u32>,
    alive_count: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a handle, recycling a freed slot when one is available.
    pub fn allocate(&mut self) -> Entity {
        self.alive_count += 1;

        if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            slot.alive = true;
            Entity::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, alive: true });
            Entity::new(index, 0)
        }
    }

    /// Release a handle. Returns false when it was already stale.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let slot = &mut self.slots[entity.index as usize];
        slot.alive = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_indices.push(entity.index);
        self.alive_count -= 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        if entity.is_null() {
            return false;
        }
        self.slots
            .get(entity.index as usize)
            .map(|slot| slot.alive && slot.generation == entity.generation)
            .unwrap_or(false)
    }

    pub fn alive_count(&self) -> u32 {
        self.alive_count
    }

    /// Highest slot count ever reached.
    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Invalidate every outstanding handle.
    pub fn clear(&mut self) {
        self.free_indices.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.alive {
                slot.alive = false;
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free_indices.push(index as u32);
        }
        self.alive_count = 0;
    }
}
