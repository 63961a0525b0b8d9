//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

#![deny(
    unreachable_pub,
    missing_docs,
    missing_abi,
    rust_2018_idioms,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links
)]

//! # llasm
//!
//! A reader and writer for the textual LLVM IR assembly format.
//!
//! [`parse`] turns a `.ll` file into an in-memory [`ir::Module`], with every
//! name bound and every operand checked against its type. [`print`] turns a
//! module back into canonical text, which parses back into an equal module.
//!
//! ```
//! let source = "define i32 @add(i32 %a, i32 %b) {\nentry:\n  %sum = add nsw i32 %a, %b\n  ret i32 %sum\n}\n";
//! let module = llasm::parse(source).unwrap();
//!
//! assert_eq!(llasm::print(&module), source);
//! ```

#[macro_use]
pub mod utility;

pub mod arena;
pub mod ir;
pub mod reader;
pub mod writer;

#[cfg(feature = "dev-tools")]
pub mod cli;

pub use reader::{format_parse_error, ParseError};

/// Parses an entire module. Errors are reported with the file name `<input>`.
pub fn parse(source: &str) -> Result<ir::Module, ParseError> {
    reader::parse_module("<input>", source)
}

/// Parses an entire module that was read from a file called `name`.
pub fn parse_named(name: &str, source: &str) -> Result<ir::Module, ParseError> {
    reader::parse_module(name, source)
}

/// Prints a module in canonical form.
pub fn print(module: &ir::Module) -> String {
    writer::ModuleWriter::new(module).into_string()
}

#[cfg(test)]
mod tests {
    use crate::ParseError;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn add_example() {
        init_logging();

        let source = "define i32 @add(i32 %a, i32 %b) {\nentry:\n  %sum = add nsw i32 %a, %b\n  ret i32 %sum\n}\n";
        let module = crate::parse(source).unwrap();
        let (_, add) = module.functions().next().unwrap();

        assert!(add.is_definition());
        assert_eq!(crate::print(&module), source);
    }

    #[test]
    fn reparsing_printed_text_is_structurally_equal() {
        init_logging();

        let source = r#"%T = type { i32, %T* }
@head = global %T { i32 0, %T* null }
define  i32 @len(%T* %p)   {
  %f = getelementptr %T, %T* %p, i32 0, i32 0
  %v = load i32, i32* %f
  ret i32 %v
}
!0 = !{!0}
"#;
        let module = crate::parse(source).unwrap();
        let printed = crate::print(&module);

        assert_eq!(crate::parse(&printed).unwrap(), module);
        assert_eq!(crate::print(&crate::parse(&printed).unwrap()), printed);
    }

    #[test]
    fn instruction_using_its_own_result() {
        init_logging();

        let err = crate::parse("define i32 @f() {\n  %x = add i32 %x, 1\n  ret i32 %x\n}\n").unwrap_err();

        assert!(matches!(
            err,
            ParseError::UnresolvedReference { ref ident, .. } if ident == "%x"
        ));
    }

    #[test]
    fn module_is_shareable() {
        fn shareable<T: Send + Sync>() {}

        shareable::<crate::ir::Module>();
    }
}
