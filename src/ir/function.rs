//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::arena::ArenaMap;
use crate::ir::{
    Attachment, Attribute, Block, CallingConv, ComdatRef, GlobalHeader, Inst, Instruction, Param,
    Type, TypeContext, TypedConst, UnnamedAddr,
};

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// A formal parameter.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct Parameter {
    /// The parameter's type
    pub ty: Type,
    /// Attributes between the type and the name
    pub attrs: Vec<Attribute>,
    /// The name, `None` for unnamed parameters
    pub name: Option<String>,
}

/// A basic block: a label, zero or more instructions, and a terminator.
///
/// The terminator is always the last instruction in [`BasicBlock::insts`].
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct BasicBlock {
    pub(crate) name: Option<String>,
    pub(crate) insts: Vec<Inst>,
}

impl BasicBlock {
    /// Creates an empty block.
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            insts: Vec::new(),
        }
    }

    /// The label, `None` for unnamed blocks.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Every instruction in order, the terminator last.
    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    /// The terminator, if the block has been completed.
    pub fn terminator(&self) -> Option<Inst> {
        self.insts.last().copied()
    }
}

/// The blocks and instructions of a function definition.
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct FunctionBody {
    pub(crate) blocks: ArenaMap<Block, BasicBlock>,
    pub(crate) insts: ArenaMap<Inst, Instruction>,
}

impl FunctionBody {
    /// Creates an empty body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every block, in layout order. The first one is the entry block.
    pub fn blocks(&self) -> impl DoubleEndedIterator<Item = (Block, &BasicBlock)> + '_ {
        self.blocks.iter()
    }

    /// Gets a block.
    pub fn block(&self, block: Block) -> &BasicBlock {
        &self.blocks[block]
    }

    /// Gets an instruction.
    pub fn inst(&self, inst: Inst) -> &Instruction {
        &self.insts[inst]
    }

    /// Gets an instruction mutably.
    pub fn inst_mut(&mut self, inst: Inst) -> &mut Instruction {
        &mut self.insts[inst]
    }

    /// Every instruction, in the order they were created.
    pub fn insts(&self) -> impl DoubleEndedIterator<Item = (Inst, &Instruction)> + '_ {
        self.insts.iter()
    }

    /// Appends a new block at the end of the layout.
    pub fn append_block(&mut self, block: BasicBlock) -> Block {
        self.blocks.insert(block)
    }

    /// Appends an instruction to the end of `block`.
    pub fn append_inst(&mut self, block: Block, inst: Instruction) -> Inst {
        let key = self.insts.insert(inst);

        self.blocks[block].insts.push(key);

        key
    }
}

/// A function declaration or definition.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct Function {
    /// Linkage, preemption, visibility and DLL storage (and `unnamed_addr`,
    /// which functions write after the parameter list)
    pub header: GlobalHeader,
    /// The calling convention, if one was written
    pub cconv: Option<CallingConv>,
    /// Attributes on the return value
    pub ret_attrs: Vec<Attribute>,
    /// The function's type
    pub sig: Type,
    /// The formal parameters, in order
    pub params: ArenaMap<Param, Parameter>,
    /// `addrspace(N)`
    pub addrspace: Option<u32>,
    /// Function attributes, including `#N` group references
    pub fn_attrs: Vec<Attribute>,
    /// `section "name"`
    pub section: Option<Vec<u8>>,
    /// `partition "name"`
    pub partition: Option<Vec<u8>>,
    /// `comdat` or `comdat($name)`
    pub comdat: Option<ComdatRef>,
    /// `align N`
    pub align: Option<u64>,
    /// `gc "name"`
    pub gc: Option<Vec<u8>>,
    /// `prefix T v`
    pub prefix: Option<TypedConst>,
    /// `prologue T v`
    pub prologue: Option<TypedConst>,
    /// `personality T v`
    pub personality: Option<TypedConst>,
    /// Metadata attachments
    pub attachments: Vec<Attachment>,
    /// The body, `None` for declarations
    pub body: Option<FunctionBody>,
}

impl Function {
    /// Creates a declaration with a given signature and no parameters.
    pub fn new(sig: Type) -> Self {
        Self {
            header: GlobalHeader::default(),
            cconv: None,
            ret_attrs: Vec::new(),
            sig,
            params: ArenaMap::new(),
            addrspace: None,
            fn_attrs: Vec::new(),
            section: None,
            partition: None,
            comdat: None,
            align: None,
            gc: None,
            prefix: None,
            prologue: None,
            personality: None,
            attachments: Vec::new(),
            body: None,
        }
    }

    /// Checks if the function has a body.
    pub fn is_definition(&self) -> bool {
        self.body.is_some()
    }

    /// The return type.
    pub fn return_ty(&self, types: &TypeContext) -> Option<Type> {
        types.function_info(self.sig).map(|(ret, _, _)| ret)
    }

    /// Whether the parameter list ends with `...`.
    pub fn is_vararg(&self, types: &TypeContext) -> bool {
        types
            .function_info(self.sig)
            .map_or(false, |(_, _, vararg)| vararg)
    }

    /// `unnamed_addr` or `local_unnamed_addr`.
    pub fn unnamed_addr(&self) -> Option<UnnamedAddr> {
        self.header.unnamed_addr
    }
}
