//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use super::{AttrContext, Parser};
use crate::arena::ArenaMap;
use crate::ir::*;
use crate::reader::resolve::Site;
use crate::reader::{ParseError, ParseResult, SourcePos, Token};
use smallvec::SmallVec;

/// The state of the function body currently being parsed.
#[derive(Debug)]
pub(super) struct FnState {
    pub(super) func: Global,
    pub(super) slots: SlotCounter,
    pub(super) body: FunctionBody,
    pub(super) ret_ty: Type,
}

// the parameters, where each named one was defined, and whether it's variadic
type ParamList = (ArenaMap<Param, Parameter>, Vec<(Param, SourcePos)>, bool);

impl<'a> Parser<'a> {
    /// `define ... { ... }` or `declare ...`
    pub(super) fn parse_function(&mut self, define: bool) -> ParseResult<()> {
        self.bump()?;

        let header = self.parse_global_header()?;
        let cconv = self.parse_cconv()?;
        let ret_attrs = self.parse_attrs(AttrContext::Param)?;
        let ret_pos = self.position();
        let ret_ty = self.parse_type()?;

        {
            let types = self.module.types();

            if types.is_label(ret_ty) || types.is_metadata(ret_ty) || types.function_info(ret_ty).is_some() {
                return Err(ParseError::mismatch(ret_pos, "invalid function return type"));
            }
        }

        let name_pair = self.next_pair("a function name")?;
        let name = match name_pair.tok {
            Token::Global(name) => self.ident(name, name_pair.pos)?,
            _ => return Err(ParseError::syntax(name_pair.pos, "a function name", name_pair.tok.describe())),
        };

        Self::check_slot(&mut self.global_slots, &name, '@', name_pair.pos)?;

        let mut slots = SlotCounter::new();
        let (params, param_sites, vararg) = self.parse_params(define, &mut slots)?;
        let param_tys: SmallVec<[Type; 8]> = params.values().map(|p| p.ty).collect();
        let sig = self.types().function(ret_ty, &param_tys, vararg);

        let mut func = Function::new(sig);

        func.header = header;
        func.header.unnamed_addr = self.eat_keyword(UnnamedAddr::from_keyword)?;
        func.cconv = cconv;
        func.ret_attrs = ret_attrs;
        func.params = params;
        func.addrspace = self.parse_opt_addrspace()?;
        func.fn_attrs = self.parse_attrs(AttrContext::Function)?;

        self.parse_function_trailers(&mut func, &name)?;

        if define {
            log::trace!("parsing body of '{}'", name.with_sigil('@'));
        }

        let key = self.module.push_global(GlobalValue::new(name, GlobalKind::Function(func)));

        self.record(Site::Global(key), name_pair.pos);

        for (param, pos) in param_sites {
            self.record(Site::Param(key, param), pos);
        }

        if !define {
            return Ok(());
        }

        self.expect(Token::LBrace, "'{'")?;

        let mut state = FnState {
            func: key,
            slots,
            body: FunctionBody::new(),
            ret_ty,
        };

        while self.peek_tok()? != Some(Token::RBrace) {
            self.parse_block(&mut state)?;
        }

        let close = self.expect(Token::RBrace, "'}'")?;

        if state.body.blocks().next().is_none() {
            return Err(ParseError::syntax(close, "a basic block", "'}'"));
        }

        if let GlobalKind::Function(func) = self.module.global_mut(key).kind_mut() {
            func.body = Some(state.body);
        }

        Ok(())
    }

    // the parenthesized parameter list, numbering unnamed parameters as it goes
    fn parse_params(&mut self, define: bool, slots: &mut SlotCounter) -> ParseResult<ParamList> {
        let mut params = ArenaMap::new();
        let mut sites = Vec::new();
        let mut vararg = false;

        self.expect(Token::LParen, "'('")?;

        if !self.eat(Token::RParen)? {
            loop {
                if self.eat(Token::Ellipsis)? {
                    vararg = true;

                    break;
                }

                let ty_pos = self.position();
                let ty = self.parse_type()?;

                {
                    let types = self.module.types();

                    if types.is_void(ty) || types.is_label(ty) {
                        return Err(ParseError::mismatch(ty_pos, "invalid type for function argument"));
                    }
                }

                let attrs = self.parse_attrs(AttrContext::Param)?;
                let pos = self.position();

                let ident = match self.peek_tok()? {
                    Some(Token::Local(name)) => {
                        self.bump()?;

                        Some(self.ident(name, pos)?)
                    }
                    _ => None,
                };

                let name = match ident {
                    Some(Ident::Name(name)) => Some(name),
                    Some(Ident::Id(id)) if define => {
                        Self::check_slot(slots, &Ident::Id(id), '%', pos)?;

                        None
                    }
                    _ => {
                        if define {
                            slots.take();
                        }

                        None
                    }
                };

                let named = name.is_some();
                let key = params.insert(Parameter { ty, attrs, name });

                if named {
                    sites.push((key, pos));
                }

                if !self.eat(Token::Comma)? {
                    break;
                }
            }

            self.expect(Token::RParen, "')'")?;
        }

        Ok((params, sites, vararg))
    }

    // everything between the attributes and the body
    fn parse_function_trailers(&mut self, func: &mut Function, name: &Ident) -> ParseResult<()> {
        loop {
            let pos = self.position();

            match self.peek_tok()? {
                Some(Token::Word("section")) => {
                    self.bump()?;
                    func.section = Some(self.parse_string("a section name")?);
                }
                Some(Token::Word("partition")) => {
                    self.bump()?;
                    func.partition = Some(self.parse_string("a partition name")?);
                }
                Some(Token::Word("comdat")) => func.comdat = Some(self.parse_comdat_ref(name)?),
                Some(Token::Word("align")) => {
                    self.bump()?;
                    func.align = Some(self.parse_alignment(pos)?);
                }
                Some(Token::Word("gc")) => {
                    self.bump()?;
                    func.gc = Some(self.parse_string("a GC name")?);
                }
                Some(Token::Word("prefix")) => {
                    self.bump()?;
                    func.prefix = Some(self.parse_typed_const()?);
                }
                Some(Token::Word("prologue")) => {
                    self.bump()?;
                    func.prologue = Some(self.parse_typed_const()?);
                }
                Some(Token::Word("personality")) => {
                    self.bump()?;
                    func.personality = Some(self.parse_typed_const()?);
                }
                Some(Token::MetaName(_)) => func.attachments.push(self.parse_attachment(None)?),
                _ => return Ok(()),
            }
        }
    }

    // a label (optional on the first block) followed by instructions up to
    // and including a terminator
    fn parse_block(&mut self, state: &mut FnState) -> ParseResult<()> {
        let pos = self.position();
        let name = match self.peek_tok()? {
            Some(Token::Label(label)) => {
                self.bump()?;

                match self.ident(label, pos)? {
                    Ident::Name(name) => Some(name),
                    id @ Ident::Id(_) => {
                        Self::check_slot(&mut state.slots, &id, '%', pos)?;

                        None
                    }
                }
            }
            _ => {
                state.slots.take();

                None
            }
        };

        let block = state.body.append_block(BasicBlock::new(name));

        self.record(Site::Block(state.func, block), pos);

        loop {
            if self.peek_tok()?.is_none() || matches!(self.peek_tok()?, Some(Token::Label(_) | Token::RBrace)) {
                return self.unexpected("an instruction");
            }

            let (inst, pos) = self.parse_statement(state)?;
            let terminator = inst.is_terminator();
            let key = state.body.append_inst(block, inst);

            self.record(Site::Inst(state.func, key), pos);

            if terminator {
                return Ok(());
            }
        }
    }

    /// `ccc`, `fastcc`, `cc N`, etc.
    pub(super) fn parse_cconv(&mut self) -> ParseResult<Option<CallingConv>> {
        if self.eat_word("cc")? {
            return Ok(Some(CallingConv::Numbered(self.parse_u32("a calling convention number")?)));
        }

        Ok(self
            .eat_keyword(CallingConvKind::from_keyword)?
            .map(CallingConv::Named))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse::tests::{parse_error, parse_unresolved};

    #[test]
    fn declaration_header() {
        let parsed = parse_unresolved(
            "declare dllimport fastcc noalias i8* @f(i32, ...) local_unnamed_addr addrspace(2) nounwind align 16 gc \"shadow\"",
        );
        let (_, func) = parsed.module.functions().next().unwrap();
        let types = parsed.module.types();

        assert_eq!(func.header.dll_storage, Some(DllStorage::Import));
        assert_eq!(func.cconv, Some(CallingConv::Named(CallingConvKind::Fast)));
        assert_eq!(func.ret_attrs, vec![Attribute::Enum(AttrKind::NoAlias)]);
        assert_eq!(func.header.unnamed_addr, Some(UnnamedAddr::Local));
        assert_eq!(func.addrspace, Some(2));
        assert_eq!(func.fn_attrs, vec![Attribute::Enum(AttrKind::NoUnwind)]);
        assert_eq!(func.align, Some(16));
        assert_eq!(func.gc.as_deref(), Some(&b"shadow"[..]));
        assert!(func.is_vararg(types));
        assert!(!func.is_definition());
    }

    #[test]
    fn blocks_and_numbering() {
        let parsed = parse_unresolved(
            "define i32 @f(i32 %0, i32) {\n  %3 = add i32 %0, %1\n  br label %next\nnext:\n  ret i32 %3\n}\n",
        );
        let (_, func) = parsed.module.functions().next().unwrap();
        let body = func.body.as_ref().unwrap();
        let names: Vec<_> = body.blocks().map(|(_, b)| b.name().map(str::to_owned)).collect();

        assert_eq!(names, vec![None, Some("next".to_owned())]);
        assert_eq!(body.insts().count(), 3);
    }

    #[test]
    fn numbering_gaps_are_rejected() {
        let err = parse_error("define void @f(i32 %0) {\n2:\n  ret void\n}\n");

        assert!(matches!(err, ParseError::Syntax { ref found, .. } if found == "'%2'"));
    }

    #[test]
    fn blocks_need_terminators() {
        assert!(matches!(
            parse_error("define void @f() {\n  %x = add i32 1, 2\n}\n"),
            ParseError::Syntax { .. }
        ));
        assert!(matches!(parse_error("define void @f() {\n}\n"), ParseError::Syntax { .. }));
    }
}
