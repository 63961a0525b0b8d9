//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! A hand-written lexer, parser and reference resolver for LLVM assembly.
//!
//! Parsing happens in two steps. The parser builds the whole module in one
//! forward pass, leaving every reference to a named entity as a placeholder.
//! The resolver then binds each placeholder to its definition and checks
//! that the types written at the use agree with the definition.

mod cursor;
mod errors;
mod lex;
mod parse;
mod resolve;

pub use cursor::*;
pub use errors::*;
pub use lex::*;

use crate::ir::Module;

/// The result of anything that can fail while reading a module.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a whole module out of `source`. `name` is only used in log output.
///
/// The first error aborts the parse, partially-built modules are never returned.
///
/// ```
/// # use llasm::reader::parse_module;
/// let module = parse_module("add.ll", "define i32 @add(i32 %a, i32 %b) {\n  %c = add i32 %a, %b\n  ret i32 %c\n}\n").unwrap();
///
/// assert_eq!(module.functions().count(), 1);
/// ```
pub fn parse_module(name: &str, source: &str) -> ParseResult<Module> {
    log::debug!("parsing module '{name}' ({} bytes)", source.len());

    let mut parsed = parse::Parser::new(source).parse()?;

    log::debug!(
        "parsed '{name}': {} entities, {} pending references",
        parsed.module.entities().len(),
        parsed.pending.len()
    );

    resolve::resolve(&mut parsed.module, &mut parsed.pending, &parsed.sites)?;

    Ok(parsed.module)
}
