//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! A simple typed arena module.
//!
//! These arenas do not allow deletion. They act as the owning registries of
//! the AST: anything that can be referenced by name lives in one, and is
//! referred to everywhere else by a small copyable key.

mod key;
mod map;

pub use key::ArenaKey;
pub use map::ArenaMap;
