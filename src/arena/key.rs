//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use std::fmt::Debug;
use std::hash::Hash;

/// Models a type that can act as a key for [`ArenaMap`](crate::arena::ArenaMap).
///
/// Keys are plain indices wrapped in a distinct type, so a key for one kind of
/// entity (e.g. a basic block) can never be used to index an arena of another
/// kind (e.g. instructions).
///
/// This should almost never be implemented by hand, use [`arena_key`](crate::arena_key).
pub trait ArenaKey: Copy + Eq + Hash + Debug {
    /// Creates a key from an index into an arena.
    ///
    /// Panics if `index` cannot be represented by the key's storage type.
    fn key_new(index: usize) -> Self;

    /// Converts the key back into the index it was created from.
    fn key_index(self) -> usize;
}

/// Creates one or more type-safe keys for an [`ArenaMap`](crate::arena::ArenaMap).
///
/// Every key is stored as a `u32`, which is more than enough for any entity
/// that can appear inside of a textual module.
///
/// ```
/// # use llasm::arena_key;
/// # use llasm::arena::ArenaMap;
/// arena_key! {
///     /// Doc comments are forwarded to the generated type.
///     pub struct Node;
///
///     struct Edge;
/// }
///
/// let mut nodes = ArenaMap::new();
/// let n: Node = nodes.insert("entry");
///
/// assert_eq!(nodes[n], "entry");
/// ```
#[macro_export(local_inner_macros)]
macro_rules! arena_key {
    ( $(#[$outer:meta])* $vis:vis struct $name:ident; $($rest:tt)* ) => {
        $(#[$outer])*
        #[repr(transparent)]
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(u32);

        impl $crate::arena::ArenaKey for $name {
            #[inline]
            fn key_new(index: usize) -> Self {
                use std::convert::TryInto;

                Self(index.try_into().expect("index is not representable with key type"))
            }

            #[inline]
            fn key_index(self) -> usize {
                self.0 as usize
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::write!(f, "{}({})", ::std::stringify!($name), self.0)
            }
        }

        arena_key!($($rest)*);
    };

    () => {}
}

#[cfg(test)]
mod tests {
    use crate::arena::*;
    use crate::arena_key;
    use static_assertions::assert_eq_size;

    #[test]
    fn keys_are_u32() {
        arena_key! { struct Key; }

        assert_eq_size!(Key, u32);
    }

    #[test]
    fn keys_round_trip_through_index() {
        arena_key! { struct Key; }

        let k = Key::key_new(41);

        assert_eq!(k.key_index(), 41);
        assert_eq!(format!("{k:?}"), "Key(41)");
    }

    #[test]
    fn distinct_keys_index_their_own_maps() {
        arena_key! {
            struct First;
            struct Second;
        }

        let mut a = ArenaMap::new();
        let mut b = ArenaMap::new();
        let ka: First = a.insert("a");
        let kb: Second = b.insert(2);

        assert_eq!(a[ka], "a");
        assert_eq!(b[kb], 2);
    }
}
