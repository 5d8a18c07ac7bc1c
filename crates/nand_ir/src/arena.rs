//! Append-only storage keyed by typed IDs.
//!
//! A [`Builder`](crate::builder::Builder) keeps its nodes, deferred slots, and
//! group records in arenas. Nothing is ever removed or moved, so an ID handed
//! out while wiring still names the same entry once the arena has been moved
//! into a [`ChipGraph`](crate::graph::ChipGraph).

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// An ID type that names one arena slot.
pub trait ArenaId: Copy {
    /// The ID of slot `index`.
    fn from_index(index: usize) -> Self;

    /// The slot this ID names.
    fn index(self) -> usize;
}

/// Dense storage where each entry is addressed by the ID it was allocated
/// under. The ID type parameter keeps node IDs from indexing group storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arena<I: ArenaId, T> {
    slots: Vec<T>,
    #[serde(skip)]
    kind: PhantomData<fn() -> I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// An arena with no entries.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            kind: PhantomData,
        }
    }

    /// Stores `item` and returns its ID.
    pub fn alloc(&mut self, item: T) -> I {
        let id = self.next_id();
        self.slots.push(item);
        id
    }

    /// The ID the next [`alloc`](Self::alloc) will return. Node ranges use this
    /// to mark where a chip body starts and ends.
    pub fn next_id(&self) -> I {
        I::from_index(self.slots.len())
    }

    /// Whether `id` names an entry of this arena.
    pub fn contains(&self, id: I) -> bool {
        id.index() < self.slots.len()
    }

    /// The entry for `id`.
    ///
    /// # Panics
    ///
    /// If `id` came from a different arena and is out of range.
    pub fn get(&self, id: I) -> &T {
        &self.slots[id.index()]
    }

    /// The entry for `id`, or `None` for an ID this arena never issued.
    pub fn try_get(&self, id: I) -> Option<&T> {
        self.slots.get(id.index())
    }

    /// Mutable access to the entry for `id`.
    ///
    /// # Panics
    ///
    /// If `id` came from a different arena and is out of range.
    pub fn get_mut(&mut self, id: I) -> &mut T {
        &mut self.slots[id.index()]
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// `true` before the first allocation.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Entries with their IDs, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots.iter().enumerate().map(|(i, v)| (I::from_index(i), v))
    }

    /// Mutable entries with their IDs, oldest first.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> {
        self.slots.iter_mut().enumerate().map(|(i, v)| (I::from_index(i), v))
    }

    /// Entries without their IDs, oldest first.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        self.get(id)
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        self.get_mut(id)
    }
}
