//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use super::functions::FnState;
use super::Parser;
use crate::ir::*;
use crate::reader::{ParseError, ParseResult, SourcePos, Token};
use crate::writer::stringify_ty;

impl<'a> Parser<'a> {
    /// Parses everything after the opcode of a terminator.
    pub(super) fn parse_terminator(
        &mut self,
        state: &mut FnState,
        op: Opcode,
        pos: SourcePos,
    ) -> ParseResult<(Type, InstKind)> {
        let func = Some(state.func);
        let void = self.types().void();

        let kind = match op {
            Opcode::Ret => {
                let ty_pos = self.position();
                let ty = self.parse_type()?;

                if ty != state.ret_ty {
                    let types = self.module.types();

                    return Err(ParseError::mismatch(
                        ty_pos,
                        format!(
                            "value doesn't match function result type '{}'",
                            stringify_ty(types, state.ret_ty)
                        ),
                    ));
                }

                let value = if self.module.types().is_void(ty) {
                    None
                } else {
                    Some(TypedValue::new(ty, self.parse_value(ty, func)?))
                };

                InstKind::Ret { value }
            }
            Opcode::Br => {
                if self.peek_keyword()? == Some("label") {
                    InstKind::Br {
                        dest: self.parse_label(func)?,
                    }
                } else {
                    let cond_pos = self.position();
                    let cond = self.parse_typed_value(func)?;

                    if self.module.types().int_width(cond.ty) != Some(1) {
                        return Err(ParseError::mismatch(cond_pos, "branch condition must have type 'i1'"));
                    }

                    self.expect(Token::Comma, "','")?;

                    let if_true = self.parse_label(func)?;

                    self.expect(Token::Comma, "','")?;

                    let if_false = self.parse_label(func)?;

                    InstKind::CondBr { cond, if_true, if_false }
                }
            }
            Opcode::Switch => {
                let value_pos = self.position();
                let value = self.parse_typed_value(func)?;

                if self.module.types().int_width(value.ty).is_none() {
                    return Err(ParseError::mismatch(value_pos, "switch condition must have integer type"));
                }

                self.expect(Token::Comma, "','")?;

                let default = self.parse_label(func)?;
                let mut cases = Vec::new();

                self.expect(Token::LBracket, "'['")?;

                while !self.eat(Token::RBracket)? {
                    let case_pos = self.position();
                    let ty = self.parse_type()?;

                    if ty != value.ty {
                        return Err(ParseError::mismatch(case_pos, "case value doesn't match the condition type"));
                    }

                    let case = Constant::Int(match self.parse_const(ty)? {
                        Constant::Int(v) => v,
                        _ => return Err(ParseError::mismatch(case_pos, "case value must be a constant integer")),
                    });

                    self.expect(Token::Comma, "','")?;

                    let dest = self.parse_label(func)?;

                    cases.push((TypedValue::new(ty, Value::constant(case)), dest));
                }

                InstKind::Switch { value, default, cases }
            }
            Opcode::IndirectBr => {
                let address_pos = self.position();
                let address = self.parse_typed_value(func)?;

                if !self.module.types().is_pointer(address.ty) {
                    return Err(ParseError::mismatch(address_pos, "indirectbr address must have pointer type"));
                }

                self.expect(Token::Comma, "','")?;
                self.expect(Token::LBracket, "'['")?;

                let mut dests = Vec::new();

                if !self.eat(Token::RBracket)? {
                    loop {
                        dests.push(self.parse_label(func)?);

                        if !self.eat(Token::Comma)? {
                            break;
                        }
                    }

                    self.expect(Token::RBracket, "']'")?;
                }

                InstKind::IndirectBr { address, dests }
            }
            Opcode::Invoke => {
                let (ty, site) = self.parse_call_site(state.func)?;

                self.expect_word("to")?;

                let normal = self.parse_label(func)?;

                self.expect_word("unwind")?;

                let unwind = self.parse_label(func)?;

                return Ok((
                    ty,
                    InstKind::Invoke {
                        site: Box::new(site),
                        normal,
                        unwind,
                    },
                ));
            }
            Opcode::CallBr => {
                let (ty, site) = self.parse_call_site(state.func)?;

                self.expect_word("to")?;

                let fallthrough = self.parse_label(func)?;
                let mut indirect = Vec::new();

                self.expect(Token::LBracket, "'['")?;

                if !self.eat(Token::RBracket)? {
                    loop {
                        indirect.push(self.parse_label(func)?);

                        if !self.eat(Token::Comma)? {
                            break;
                        }
                    }

                    self.expect(Token::RBracket, "']'")?;
                }

                return Ok((
                    ty,
                    InstKind::CallBr {
                        site: Box::new(site),
                        fallthrough,
                        indirect,
                    },
                ));
            }
            Opcode::Resume => InstKind::Resume {
                value: self.parse_typed_value(func)?,
            },
            Opcode::CatchSwitch => {
                self.expect_word("within")?;

                let token = self.types().token();
                let within = self.parse_value(token, func)?;
                let mut handlers = Vec::new();

                self.expect(Token::LBracket, "'['")?;

                loop {
                    handlers.push(self.parse_label(func)?);

                    if !self.eat(Token::Comma)? {
                        break;
                    }
                }

                self.expect(Token::RBracket, "']'")?;
                self.expect_word("unwind")?;

                let unwind = self.parse_unwind_dest(func)?;

                return Ok((
                    token,
                    InstKind::CatchSwitch {
                        within,
                        handlers,
                        unwind,
                    },
                ));
            }
            Opcode::CatchRet => {
                self.expect_word("from")?;

                let token = self.types().token();
                let from = self.parse_value(token, func)?;

                self.expect_word("to")?;

                let dest = self.parse_label(func)?;

                InstKind::CatchRet { from, dest }
            }
            Opcode::CleanupRet => {
                self.expect_word("from")?;

                let token = self.types().token();
                let from = self.parse_value(token, func)?;

                self.expect_word("unwind")?;

                let unwind = self.parse_unwind_dest(func)?;

                InstKind::CleanupRet { from, unwind }
            }
            Opcode::Unreachable => InstKind::Unreachable,
            _ => {
                return Err(ParseError::syntax(
                    pos,
                    "an instruction",
                    format!("opcode '{}'", op.keyword()),
                ))
            }
        };

        Ok((void, kind))
    }

    /// `label %bb`
    pub(super) fn parse_label(&mut self, func: Option<Global>) -> ParseResult<TypedValue> {
        self.expect_word("label")?;

        if !matches!(self.peek_tok()?, Some(Token::Local(_))) {
            return self.unexpected("a block name");
        }

        let label = self.types().label();
        let value = self.parse_value(label, func)?;

        Ok(TypedValue::new(label, value))
    }

    // `to caller` or `label %bb`, after `unwind`
    fn parse_unwind_dest(&mut self, func: Option<Global>) -> ParseResult<Option<TypedValue>> {
        if self.eat_word("to")? {
            self.expect_word("caller")?;

            return Ok(None);
        }

        self.parse_label(func).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse::tests::{parse_error, parse_unresolved};

    fn kinds_of(source: &str) -> Vec<InstKind> {
        let parsed = parse_unresolved(source);
        let (_, func) = parsed.module.functions().last().unwrap();

        func.body
            .as_ref()
            .unwrap()
            .insts()
            .map(|(_, i)| i.kind().clone())
            .collect()
    }

    #[test]
    fn branches() {
        let kinds = kinds_of(
            "define void @f(i1 %c, i32 %v, i8* %a) {\nentry:\n  br i1 %c, label %a1, label %b\na1:\n  switch i32 %v, label %b [\n    i32 0, label %a1\n    i32 -1, label %b\n  ]\nb:\n  indirectbr i8* %a, [label %a1, label %b]\n}\n",
        );

        assert!(matches!(kinds[0], InstKind::CondBr { .. }));

        match &kinds[1] {
            InstKind::Switch { cases, .. } => {
                assert_eq!(cases.len(), 2);
                assert_eq!(cases[1].0.value.as_const(), Some(&Constant::Int((-1).into())));
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(&kinds[2], InstKind::IndirectBr { dests, .. } if dests.len() == 2));
    }

    #[test]
    fn exception_handling() {
        let kinds = kinds_of(
            "declare void @g()\ndefine void @f() personality i8* null {\nentry:\n  invoke void @g() to label %ok unwind label %sw\nok:\n  ret void\nsw:\n  %cs = catchswitch within none [label %h] unwind to caller\nh:\n  %p = catchpad within %cs [i8* null]\n  catchret from %p to label %ok\n}\n",
        );

        assert!(matches!(kinds[0], InstKind::Invoke { .. }));
        assert!(matches!(&kinds[2], InstKind::CatchSwitch { unwind: None, within, .. } if within.as_const() == Some(&Constant::None)));
        assert!(matches!(kinds[3], InstKind::CatchPad { .. }));
        assert!(matches!(kinds[4], InstKind::CatchRet { .. }));
    }

    #[test]
    fn callbr_lists_its_indirect_targets() {
        let kinds = kinds_of(
            "define i32 @f(i32 %x) {\nentry:\n  %r = callbr i32 asm \"\", \"=r,r,!i\"(i32 %x) to label %next [label %fail]\nnext:\n  ret i32 %r\nfail:\n  ret i32 0\n}\n",
        );

        match &kinds[0] {
            InstKind::CallBr { indirect, .. } => assert_eq!(indirect.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ret_type_must_match() {
        let err = parse_error("define void @f() {\n  ret i32 0\n}\n");

        match err {
            ParseError::TypeMismatch { pos, message } => {
                assert_eq!((pos.line, pos.col), (2, 7));
                assert!(message.contains("'void'"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn switch_cases_are_constants() {
        assert!(matches!(
            parse_error("define void @f(i32 %v) {\n  switch i32 %v, label %x [ i32 %v, label %x ]\nx:\n  ret void\n}\n"),
            ParseError::Syntax { .. }
        ));
    }
}
