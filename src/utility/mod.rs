//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Small helpers shared by the reader and the writer.

/// Declares a fieldless enum where every variant is spelled by exactly one
/// keyword, along with `keyword`/`from_keyword` conversions.
macro_rules! keyword_enum {
    (
        $(#[$outer:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident => $kw:literal ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
        #[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
        $vis enum $name {
            $( #[doc = concat!("`", $kw, "`")] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The keyword that spells this variant.
            pub const fn keyword(self) -> &'static str {
                match self {
                    $( $name::$variant => $kw ),+
                }
            }

            /// Maps a keyword back to the variant it spells.
            pub fn from_keyword(word: &str) -> Option<Self> {
                match word {
                    $( $kw => Some($name::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

mod strings;

pub use strings::*;

use std::collections::HashMap;

/// `HashMap` with `ahash` as the hasher. Scope tables and interners are keyed
/// by small values, where the default SipHash is needlessly slow.
pub type SaHashMap<K, V> = HashMap<K, V, ahash::RandomState>;
