//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::arena::ArenaKey;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::slice;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// A primary mapping of `K -> V`, where keys are handed out by [`Self::insert`].
///
/// This is a typed wrapper around `Vec<V>`. Entities are never removed, so
/// a key stays valid for the lifetime of the arena and insertion order is
/// the iteration order. Every AST entity that can be referenced by name
/// (functions, globals, blocks, instructions, metadata nodes, named types)
/// lives inside one of these, and references to it are keys rather than
/// pointers. That is what lets cyclic structures exist without cyclic ownership.
///
/// ```
/// # use llasm::arena_key;
/// # use llasm::arena::ArenaMap;
/// arena_key! { struct Key; }
///
/// let mut map = ArenaMap::new();
/// let k1: Key = map.insert(15);
/// let k2 = map.next_key();
///
/// assert!(map.contains(k1));
/// assert!(!map.contains(k2));
/// assert_eq!(map.insert(16), k2);
/// ```
#[derive(Clone)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct ArenaMap<K: ArenaKey, V> {
    slots: Vec<V>,
    #[cfg_attr(feature = "enable-serde", serde(skip))]
    _unused: PhantomData<fn() -> K>,
}

impl<K: ArenaKey, V> ArenaMap<K, V> {
    /// Creates a new, empty arena.
    #[inline]
    pub fn new() -> Self {
        Self {
            slots: Vec::default(),
            _unused: PhantomData,
        }
    }

    /// Checks if `key` has been returned by [`Self::insert`] at some point.
    #[inline]
    pub fn contains(&self, key: K) -> bool {
        key.key_index() < self.slots.len()
    }

    /// Gets the value associated with `key`, if it exists.
    #[inline]
    pub fn get(&self, key: K) -> Option<&V> {
        self.slots.get(key.key_index())
    }

    /// Gets the value associated with `key` mutably, if it exists.
    #[inline]
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.slots.get_mut(key.key_index())
    }

    /// Adds a value into the arena, and returns the key that refers to it.
    #[inline]
    pub fn insert(&mut self, value: V) -> K {
        self.slots.push(value);

        K::key_new(self.slots.len() - 1)
    }

    /// Gets the key that the next call to [`Self::insert`] will return.
    #[inline]
    pub fn next_key(&self) -> K {
        K::key_new(self.slots.len())
    }

    /// The number of values in the arena.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Checks if nothing has been inserted yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the most recently inserted value and its key.
    #[inline]
    pub fn last(&self) -> Option<(K, &V)> {
        let last = self.slots.last()?;

        Some((K::key_new(self.slots.len() - 1), last))
    }

    /// Iterates over every key in insertion order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = K> + ExactSizeIterator {
        (0..self.slots.len()).map(K::key_new)
    }

    /// Iterates over every value in insertion order.
    pub fn values(&self) -> slice::Iter<'_, V> {
        self.slots.iter()
    }

    /// Iterates over every value in insertion order, mutably.
    pub fn values_mut(&mut self) -> slice::IterMut<'_, V> {
        self.slots.iter_mut()
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (K, &V)> + ExactSizeIterator {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, v)| (K::key_new(i), v))
    }

    /// Iterates over `(key, value)` pairs in insertion order, mutably.
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (K, &mut V)> + ExactSizeIterator {
        self.slots
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (K::key_new(i), v))
    }
}

impl<K: ArenaKey, V> Default for ArenaMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ArenaKey, V> FromIterator<V> for ArenaMap<K, V> {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        Self {
            slots: Vec::from_iter(iter),
            _unused: PhantomData,
        }
    }
}

impl<K: ArenaKey, V: PartialEq> PartialEq for ArenaMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
    }
}

impl<K: ArenaKey, V: Eq> Eq for ArenaMap<K, V> {}

impl<K: ArenaKey, V: Hash> Hash for ArenaMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slots.hash(state);
    }
}

impl<K: ArenaKey, V: Debug> Debug for ArenaMap<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: ArenaKey, V> Index<K> for ArenaMap<K, V> {
    type Output = V;

    fn index(&self, key: K) -> &Self::Output {
        self.slots
            .get(key.key_index())
            .expect("tried to access invalid key on `ArenaMap`")
    }
}

impl<K: ArenaKey, V> IndexMut<K> for ArenaMap<K, V> {
    fn index_mut(&mut self, key: K) -> &mut Self::Output {
        self.slots
            .get_mut(key.key_index())
            .expect("tried to access invalid key on `ArenaMap`")
    }
}

#[cfg(test)]
mod tests {
    use crate::arena::*;
    use crate::arena_key;

    arena_key! { struct Key; }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut map = ArenaMap::new();
        let k1: Key = map.insert("c");
        let k2 = map.insert("a");
        let k3 = map.insert("b");

        let pairs: Vec<_> = map.iter().collect();

        assert_eq!(pairs, vec![(k1, &"c"), (k2, &"a"), (k3, &"b")]);
        assert_eq!(map.keys().rev().next(), Some(k3));
    }

    #[test]
    fn last_is_most_recent() {
        let mut map = ArenaMap::<Key, i32>::new();

        assert_eq!(map.last(), None);

        let k = map.insert(7);

        assert_eq!(map.last(), Some((k, &7)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn equality_is_by_value() {
        let a: ArenaMap<Key, i32> = [1, 2, 3].into_iter().collect();
        let b: ArenaMap<Key, i32> = [1, 2, 3].into_iter().collect();
        let c: ArenaMap<Key, i32> = [1, 2].into_iter().collect();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    #[should_panic(expected = "tried to access invalid key on `ArenaMap`")]
    fn invalid_key_panics() {
        let map = ArenaMap::<Key, i32>::new();

        let _ = map[Key::key_new(3)];
    }
}
