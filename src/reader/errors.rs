//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::reader::{Lex, LexError, SourcePos};
use thiserror::Error;

/// Everything that can make a parse fail. The first error aborts the parse,
/// no partial module is ever produced.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ParseError {
    /// A malformed token
    #[error(transparent)]
    Lex(#[from] LexError),
    /// A grammar violation: an unexpected token, an unknown keyword or opcode,
    /// a wrong number of operands, etc.
    #[error("expected {expected}, found {found}")]
    Syntax {
        /// Where the offending token starts
        pos: SourcePos,
        /// What the grammar wanted
        expected: String,
        /// What was actually there
        found: String,
    },
    /// A name that has no definition in the scope it is looked up in
    #[error("use of undefined '{ident}' in {scope}")]
    UnresolvedReference {
        /// The identifier, sigil included
        ident: String,
        /// The scope it was looked up in
        scope: String,
        /// The first use
        pos: SourcePos,
    },
    /// A name that is defined more than once in a single scope
    #[error("redefinition of '{ident}' in {scope}")]
    DuplicateDefinition {
        /// The identifier, sigil included
        ident: String,
        /// The scope it was defined in
        scope: String,
        /// The second definition
        pos: SourcePos,
    },
    /// Operands or a definition whose types don't fit the use
    #[error("{message}")]
    TypeMismatch {
        /// Where the mismatch was detected
        pos: SourcePos,
        /// What was wrong
        message: String,
    },
}

impl ParseError {
    /// Where the error happened.
    pub fn pos(&self) -> SourcePos {
        match self {
            ParseError::Lex(err) => err.pos,
            ParseError::Syntax { pos, .. }
            | ParseError::UnresolvedReference { pos, .. }
            | ParseError::DuplicateDefinition { pos, .. }
            | ParseError::TypeMismatch { pos, .. } => *pos,
        }
    }

    pub(crate) fn syntax(pos: SourcePos, expected: impl Into<String>, found: impl Into<String>) -> Self {
        ParseError::Syntax {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn mismatch(pos: SourcePos, message: impl Into<String>) -> Self {
        ParseError::TypeMismatch {
            pos,
            message: message.into(),
        }
    }
}

/// Formats a parse error into a human-readable string, pointing at the
/// offending source line.
///
/// ```
/// # use llasm::reader::format_parse_error;
/// let source = "define void @f() {\n  ret i32 0\n}\n";
/// let err = llasm::parse(source).unwrap_err();
/// let text = format_parse_error("f.ll", source, &err);
///
/// assert!(text.starts_with("  --> f.ll:2:7\n"));
/// ```
pub fn format_parse_error(name: &str, source: &str, err: &ParseError) -> String {
    let pos = err.pos();

    let line = match source.lines().nth(pos.line.saturating_sub(1) as usize) {
        Some(line) => line,
        None => return format!("{name}: hit EOF while expecting tokens, error: '{err}'"),
    };

    // underline the whole token if one can be lexed at the position
    let len = match Lex::resume(source, pos).next_token() {
        Ok(Some(pair)) if pair.pos == pos => pair.len.max(1),
        _ => 1,
    };

    let (line_n, col_n) = (pos.line.to_string(), pos.col.to_string());
    let mut error = String::default();

    let num_padding = " ".repeat(line_n.len());
    let col_padding = " ".repeat(pos.col.saturating_sub(1) as usize);
    let underline = "^".repeat(len as usize);

    error += &format!("  --> {name}:{line_n}:{col_n}\n");
    error += &format!(" {num_padding} |\n");
    error += &format!(" {line_n} | {line}\n");
    error += &format!(" {num_padding} | {col_padding}{underline}\n");
    error += &format!(" {num_padding} |\n");
    error += &format!(" {num_padding} = {err}");

    error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_caret_under_token() {
        let source = "@x = global i32 0\n@y = global i32 %bad\n";
        let err = ParseError::syntax(
            SourcePos {
                offset: 34,
                line: 2,
                col: 17,
            },
            "a constant",
            "local '%bad'",
        );

        let expected = "  --> t.ll:2:17\n   |\n 2 | @y = global i32 %bad\n   |                 ^^^^\n   |\n   = expected a constant, found local '%bad'";

        assert_eq!(format_parse_error("t.ll", source, &err), expected);
    }

    #[test]
    fn every_variant_has_a_position() {
        let pos = SourcePos {
            offset: 3,
            line: 1,
            col: 4,
        };

        let errors = [
            ParseError::syntax(pos, "a", "b"),
            ParseError::mismatch(pos, "nope"),
            ParseError::UnresolvedReference {
                ident: "%x".into(),
                scope: "function '@f'".into(),
                pos,
            },
            ParseError::DuplicateDefinition {
                ident: "@f".into(),
                scope: "module".into(),
                pos,
            },
        ];

        for err in errors {
            assert_eq!(err.pos(), pos);
        }
    }
}
