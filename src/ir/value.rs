//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::ir::{Block, Constant, Global, Inst, Metadata, Param, Type};

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// Stands in for a reference that has been parsed but not yet bound to the
/// entity it names. Every placeholder is replaced before a module is handed
/// out by [`parse`](crate::parse).
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct Placeholder(u32);

impl Placeholder {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A reference to an entity of kind `K` that may not be resolved yet.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum Ref<K> {
    /// Not bound yet, only seen while a module is being built
    Pending(Placeholder),
    /// Bound to the entity it names
    Resolved(K),
}

impl<K: Copy> Ref<K> {
    /// Gets the entity, if the reference has been resolved.
    pub fn get(&self) -> Option<K> {
        match self {
            Ref::Pending(_) => None,
            Ref::Resolved(k) => Some(*k),
        }
    }
}

/// An inline assembly callee, `asm sideeffect "..." "..."`.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct InlineAsm {
    /// `sideeffect`
    pub side_effect: bool,
    /// `alignstack`
    pub align_stack: bool,
    /// `inteldialect`
    pub intel_dialect: bool,
    /// `unwind`
    pub unwind: bool,
    /// The assembly template
    pub template: Vec<u8>,
    /// The constraint string
    pub constraints: Vec<u8>,
}

/// Anything that can appear as an operand.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// A reference that hasn't been bound yet
    Placeholder(Placeholder),
    /// A parameter of the enclosing function
    Argument(Param),
    /// The result of an instruction in the enclosing function
    Inst(Inst),
    /// A block of the enclosing function (only as a `label` operand)
    Block(Block),
    /// A global value, `@name`
    Global(Global),
    /// A literal constant or a constant expression
    Const(Box<Constant>),
    /// A metadata operand, `metadata !0`
    Metadata(Box<Metadata>),
    /// An inline assembly callee
    InlineAsm(Box<InlineAsm>),
}

impl Value {
    /// Wraps a constant.
    pub fn constant(c: Constant) -> Self {
        Value::Const(Box::new(c))
    }

    /// Gets the constant if the value is one.
    pub fn as_const(&self) -> Option<&Constant> {
        match self {
            Value::Const(c) => Some(c),
            _ => None,
        }
    }
}

/// An operand along with the type it was written with.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct TypedValue {
    /// The type of the operand
    pub ty: Type,
    /// The operand itself
    pub value: Value,
}

impl TypedValue {
    /// Pairs a value with its type.
    pub fn new(ty: Type, value: Value) -> Self {
        Self { ty, value }
    }
}
