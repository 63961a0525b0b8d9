//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! The in-memory tree that modules are parsed into and printed from.
//!
//! Everything that can be referenced by name (globals, named types, blocks,
//! instructions, metadata nodes, ...) lives in an arena owned by its parent,
//! and references are copyable keys into those arenas. Forward references
//! and cycles (a block branching to itself, a metadata node listing itself)
//! are therefore plain keys, never owned cycles.

mod attributes;
mod constant;
mod entities;
mod function;
mod global;
mod instruction;
mod metadata;
mod module;
mod types;
mod value;

pub use attributes::*;
pub use constant::*;
pub use entities::*;
pub use function::*;
pub use global::*;
pub use instruction::*;
pub use metadata::*;
pub use module::*;
pub use types::*;
pub use value::*;
