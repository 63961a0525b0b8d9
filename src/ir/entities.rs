//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::arena_key;
use crate::utility::name_text;
use std::fmt;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

arena_key! {
    /// A type interned inside of a module's [`TypeContext`](crate::ir::TypeContext).
    ///
    /// Two structurally identical types always get the same key, so comparing
    /// keys is comparing types.
    pub struct Type;

    /// A named type (`%T`), whose body lives in the named type registry.
    pub struct NamedType;

    /// A global value: a function, a global variable, an alias or an ifunc.
    pub struct Global;

    /// A parameter of a function.
    pub struct Param;

    /// A basic block inside of a function body.
    pub struct Block;

    /// An instruction inside of a function body.
    pub struct Inst;

    /// A metadata node definition (`!N = ...`).
    pub struct MdNode;

    /// An attribute group definition (`attributes #N = { ... }`).
    pub struct AttrGroup;

    /// A comdat definition (`$name = comdat any`).
    pub struct Comdat;
}

/// The identifier that follows a sigil, either a name (`%x`, `@"a b"`) or an
/// unnamed slot number (`%0`, `@1`, `!2`).
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum Ident {
    /// A named identifier
    Name(String),
    /// A numbered identifier
    Id(u32),
}

impl Ident {
    /// Renders the identifier after `sigil`, quoting the name if necessary.
    ///
    /// ```
    /// # use llasm::ir::Ident;
    /// assert_eq!(Ident::Name("main".into()).with_sigil('@'), "@main");
    /// assert_eq!(Ident::Id(3).with_sigil('%'), "%3");
    /// ```
    pub fn with_sigil(&self, sigil: char) -> String {
        match self {
            Ident::Name(name) => format!("{sigil}{}", name_text(name)),
            Ident::Id(id) => format!("{sigil}{id}"),
        }
    }

    /// Gets the name, if the identifier is named.
    pub fn name(&self) -> Option<&str> {
        match self {
            Ident::Name(name) => Some(name),
            Ident::Id(_) => None,
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ident::Name(name) => write!(f, "{}", name_text(name)),
            Ident::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Hands out the numbers given to unnamed entities within one scope.
///
/// The same counter drives the parser (checking that `%N` definitions are
/// sequential), the resolver (mapping `%N` uses to entities) and the writer
/// (synthesizing names), so all three agree on what `%N` means.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SlotCounter {
    next: u32,
}

impl SlotCounter {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number that the next unnamed entity will get.
    pub fn peek(&self) -> u32 {
        self.next
    }

    /// Takes the next number.
    pub fn take(&mut self) -> u32 {
        self.next += 1;

        self.next - 1
    }
}
