//! Generational arena storage shared by the render tree and the element tree.
//!
//! Values live contiguously in a dense `Vec`, with a sparse map from stable
//! ids to dense slots. Removal is a swap-remove, so iteration stays
//! cache-friendly and never walks holes.
//!
//! Ids carry a generation counter. A slot that is freed and reused bumps its
//! generation, so a stale id held across a removal resolves to `None` instead
//! of silently aliasing the new occupant.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

/// An id type that can address an [`Arena`] slot.
pub trait ArenaId: Copy + Eq + Hash + Debug {
    fn from_parts(index: u32, generation: u32) -> Self;
    fn index(self) -> u32;
    fn generation(self) -> u32;
}

/// Declares a generational id type usable as an arena key.
macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl $name {
            /// Packs generation (high bits) and index (low bits) into one value.
            pub fn as_u64(self) -> u64 {
                ((self.generation as u64) << 32) | (self.index as u64)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({}v{})", stringify!($name), self.index, self.generation)
            }
        }

        impl $crate::arena::ArenaId for $name {
            fn from_parts(index: u32, generation: u32) -> Self {
                Self { index, generation }
            }

            fn index(self) -> u32 {
                self.index
            }

            fn generation(self) -> u32 {
                self.generation
            }
        }
    };
}

pub(crate) use arena_id;

/// Sparse slot. The generation outlives the occupant so reuse can bump it.
struct Slot {
    dense_index: Option<usize>,
    generation: u32,
}

struct Entry<V> {
    value: V,
    sparse_index: u32,
}

pub struct Arena<K: ArenaId, V> {
    dense: Vec<Entry<V>>,
    sparse: Vec<Slot>,
    free_indices: Vec<u32>,
    _key: PhantomData<K>,
}

impl<K: ArenaId, V> Arena<K, V> {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            free_indices: Vec::new(),
            _key: PhantomData,
        }
    }

    pub fn insert(&mut self, value: V) -> K {
        let dense_index = self.dense.len();
        let (sparse_index, generation) = match self.free_indices.pop() {
            Some(index) => {
                let slot = &mut self.sparse[index as usize];
                slot.generation = slot.generation.wrapping_add(1);
                slot.dense_index = Some(dense_index);
                (index, slot.generation)
            }
            None => {
                let index = self.sparse.len() as u32;
                self.sparse.push(Slot {
                    dense_index: Some(dense_index),
                    generation: 0,
                });
                (index, 0)
            }
        };

        self.dense.push(Entry {
            value,
            sparse_index,
        });

        K::from_parts(sparse_index, generation)
    }

    pub fn remove(&mut self, id: K) -> Option<V> {
        let dense_index = self.dense_index(id)?;
        let removed = self.dense.swap_remove(dense_index);

        // Fix up the entry that moved into the hole.
        if let Some(moved) = self.dense.get(dense_index) {
            self.sparse[moved.sparse_index as usize].dense_index = Some(dense_index);
        }

        self.sparse[id.index() as usize].dense_index = None;
        self.free_indices.push(id.index());
        Some(removed.value)
    }

    fn dense_index(&self, id: K) -> Option<usize> {
        self.sparse
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.dense_index)
    }

    pub fn get(&self, id: K) -> Option<&V> {
        self.dense_index(id).map(|index| &self.dense[index].value)
    }

    pub fn get_mut(&mut self, id: K) -> Option<&mut V> {
        self.dense_index(id)
            .map(move |index| &mut self.dense[index].value)
    }

    pub fn contains(&self, id: K) -> bool {
        self.dense_index(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Iterates live entries in dense (not insertion) order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.dense.iter().map(|entry| {
            let generation = self.sparse[entry.sparse_index as usize].generation;
            (K::from_parts(entry.sparse_index, generation), &entry.value)
        })
    }
}

impl<K: ArenaId, V> Default for Arena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    arena_id!(TestId);

    #[test]
    fn test_arena_insert_remove() {
        let mut arena: Arena<TestId, &str> = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a), Some(&"a"));

        assert_eq!(arena.remove(a), Some("a"));
        assert!(!arena.contains(a));
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_arena_stale_id_after_reuse() {
        let mut arena: Arena<TestId, u32> = Arena::new();
        let first = arena.insert(1);
        arena.remove(first);
        let second = arena.insert(2);
        assert_eq!(first.index(), second.index());
        assert_ne!(first, second);
        assert_eq!(arena.get(first), None);

        // Reusing the slot again must not resurrect either older id.
        arena.remove(second);
        let third = arena.insert(3);
        assert_eq!(arena.get(first), None);
        assert_eq!(arena.get(second), None);
        assert_eq!(arena.get(third), Some(&3));
    }

    #[test]
    fn test_arena_swap_remove_fixup() {
        let mut arena: Arena<TestId, u32> = Arena::new();
        let ids: Vec<_> = (0..4).map(|n| arena.insert(n)).collect();
        arena.remove(ids[1]);
        for (n, id) in ids.iter().enumerate() {
            if n == 1 {
                continue;
            }
            assert_eq!(arena.get(*id), Some(&(n as u32)));
        }
        assert_eq!(arena.iter().count(), 3);
    }
}
