//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use super::constants::const_int;
use super::functions::FnState;
use super::{checks, AttrContext, Parser};
use crate::ir::*;
use crate::reader::{ParseError, ParseResult, SourcePos, Token};
use smallvec::SmallVec;

impl<'a> Parser<'a> {
    /// Parses one instruction, along with the `%name =` before it and any
    /// attachments after it. Gives back the position of the statement.
    pub(super) fn parse_statement(&mut self, state: &mut FnState) -> ParseResult<(Instruction, SourcePos)> {
        let pos = self.position();
        let name = match self.peek_tok()? {
            Some(Token::Local(name)) if self.peek_nth_tok(1)? == Some(Token::Equal) => {
                self.bump()?;
                self.bump()?;

                Some(self.ident(name, pos)?)
            }
            _ => None,
        };

        let tail = self.eat_keyword(TailKind::from_keyword)?;
        let op_pos = self.position();
        let pair = self.next_pair("an instruction")?;
        let op = match pair.tok {
            Token::Opcode(op) => op,
            _ => return Err(ParseError::syntax(pair.pos, "an instruction", pair.tok.describe())),
        };

        if tail.is_some() && op != Opcode::Call {
            return Err(ParseError::syntax(op_pos, "'call'", pair.tok.describe()));
        }

        let (ty, kind) = self.parse_inst_kind(state, op, tail, op_pos)?;
        let void = self.module.types().is_void(ty);

        let name = match name {
            Some(_) if void => {
                return Err(ParseError::mismatch(pos, "instructions returning void cannot have a name"));
            }
            Some(Ident::Name(name)) => Some(name),
            Some(id @ Ident::Id(_)) => {
                Self::check_slot(&mut state.slots, &id, '%', pos)?;

                None
            }
            None => {
                if !void {
                    state.slots.take();
                }

                None
            }
        };

        let mut inst = Instruction::new(name, ty, kind);

        for attachment in self.parse_trailing_attachments(Some(state.func))? {
            inst.attach(attachment);
        }

        Ok((inst, pos))
    }

    fn parse_inst_kind(
        &mut self,
        state: &mut FnState,
        op: Opcode,
        tail: Option<TailKind>,
        pos: SourcePos,
    ) -> ParseResult<(Type, InstKind)> {
        let func = Some(state.func);
        let mismatch = |message: String| ParseError::mismatch(pos, message);

        if let Some(bop) = op.as_binary() {
            let flags = self.parse_wrap_flags(bop)?;
            let fmf = if bop.is_float() {
                self.parse_fast_math()?
            } else {
                FastMathFlags::default()
            };

            let lhs = self.parse_typed_value(func)?;

            self.expect(Token::Comma, "','")?;

            let rhs = TypedValue::new(lhs.ty, self.parse_value(lhs.ty, func)?);

            checks::binary(self.module.types(), bop, lhs.ty).map_err(mismatch)?;

            return Ok((
                lhs.ty,
                InstKind::Binary {
                    op: bop,
                    flags,
                    fmf,
                    lhs,
                    rhs,
                },
            ));
        }

        if let Some(cast) = op.as_cast() {
            let value = self.parse_typed_value(func)?;

            self.expect_word("to")?;

            let to = self.parse_type()?;

            checks::cast(self.module.types(), cast, value.ty, to).map_err(mismatch)?;

            return Ok((to, InstKind::Cast { op: cast, value }));
        }

        let void = self.types().void();

        let result = match op {
            Opcode::FNeg => {
                let fmf = self.parse_fast_math()?;
                let operand = self.parse_typed_value(func)?;

                if !self.module.types().is_fp_or_fp_vector(operand.ty) {
                    return Err(mismatch("invalid operand type for 'fneg'".into()));
                }

                (operand.ty, InstKind::FNeg { fmf, operand })
            }
            Opcode::ExtractElement => {
                let vector = self.parse_typed_value(func)?;

                self.expect(Token::Comma, "','")?;

                let index = self.parse_typed_value(func)?;
                let elem = checks::extract_element(self.module.types(), vector.ty, index.ty).map_err(mismatch)?;

                (elem, InstKind::ExtractElement { vector, index })
            }
            Opcode::InsertElement => {
                let vector = self.parse_typed_value(func)?;

                self.expect(Token::Comma, "','")?;

                let elem = self.parse_typed_value(func)?;

                self.expect(Token::Comma, "','")?;

                let index = self.parse_typed_value(func)?;

                checks::insert_element(self.module.types(), vector.ty, elem.ty, index.ty).map_err(mismatch)?;

                (vector.ty, InstKind::InsertElement { vector, elem, index })
            }
            Opcode::ShuffleVector => {
                let lhs = self.parse_typed_value(func)?;

                self.expect(Token::Comma, "','")?;

                let rhs = self.parse_typed_value(func)?;

                self.expect(Token::Comma, "','")?;

                let mask = self.parse_typed_value(func)?;
                let ty = checks::shuffle_vector(self.types(), lhs.ty, rhs.ty, mask.ty).map_err(mismatch)?;

                (ty, InstKind::ShuffleVector { lhs, rhs, mask })
            }
            Opcode::ExtractValue => {
                let aggregate = self.parse_typed_value(func)?;
                let indices: SmallVec<[u32; 2]> = self.parse_const_indices()?.into();
                let ty = checks::member_path(self.module.types(), aggregate.ty, &indices).map_err(mismatch)?;

                (ty, InstKind::ExtractValue { aggregate, indices })
            }
            Opcode::InsertValue => {
                let aggregate = self.parse_typed_value(func)?;

                self.expect(Token::Comma, "','")?;

                let elem = self.parse_typed_value(func)?;
                let indices: SmallVec<[u32; 2]> = self.parse_const_indices()?.into();
                let member = checks::member_path(self.module.types(), aggregate.ty, &indices).map_err(mismatch)?;

                if !self.module.types().compatible(member, elem.ty) {
                    return Err(mismatch("inserted value doesn't match the member type".into()));
                }

                (
                    aggregate.ty,
                    InstKind::InsertValue {
                        aggregate,
                        elem,
                        indices,
                    },
                )
            }
            Opcode::Alloca => self.parse_alloca(func)?,
            Opcode::Load => self.parse_load(func, pos)?,
            Opcode::Store => (void, self.parse_store(func, pos)?),
            Opcode::Fence => {
                let syncscope = self.parse_syncscope()?;
                let ordering = self.expect_keyword(AtomicOrdering::from_keyword, "an atomic ordering")?;

                (void, InstKind::Fence { syncscope, ordering })
            }
            Opcode::CmpXchg => self.parse_cmpxchg(func, pos)?,
            Opcode::AtomicRmw => self.parse_atomicrmw(func, pos)?,
            Opcode::GetElementPtr => {
                let inbounds = self.eat_word("inbounds")?;
                let source = self.parse_type()?;

                self.expect(Token::Comma, "','")?;

                let base = self.parse_typed_value(func)?;
                let mut indices = Vec::new();

                while self.peek_tok()? == Some(Token::Comma) && !self.at_attachment()? {
                    self.bump()?;

                    indices.push(self.parse_typed_value(func)?);
                }

                let operands: Vec<_> = indices
                    .iter()
                    .map(|index| (index.ty, index.value.as_const().and_then(const_int)))
                    .collect();

                let ty = checks::gep_operands(self.types(), source, base.ty, &operands).map_err(mismatch)?;

                (
                    ty,
                    InstKind::GetElementPtr {
                        inbounds,
                        source,
                        base,
                        indices,
                    },
                )
            }
            Opcode::ICmp => {
                let pred = self.expect_keyword(ICmpPred::from_keyword, "an integer comparison predicate")?;
                let (lhs, rhs) = self.parse_operand_pair(func)?;
                let ty = checks::icmp(self.types(), lhs.ty, rhs.ty).map_err(mismatch)?;

                (ty, InstKind::ICmp { pred, lhs, rhs })
            }
            Opcode::FCmp => {
                let fmf = self.parse_fast_math()?;
                let pred = self.expect_keyword(FCmpPred::from_keyword, "a floating point comparison predicate")?;
                let (lhs, rhs) = self.parse_operand_pair(func)?;
                let ty = checks::fcmp(self.types(), lhs.ty, rhs.ty).map_err(mismatch)?;

                (ty, InstKind::FCmp { fmf, pred, lhs, rhs })
            }
            Opcode::Phi => self.parse_phi(func, pos)?,
            Opcode::Select => {
                let fmf = self.parse_fast_math()?;
                let cond = self.parse_typed_value(func)?;

                self.expect(Token::Comma, "','")?;

                let on_true = self.parse_typed_value(func)?;

                self.expect(Token::Comma, "','")?;

                let on_false = self.parse_typed_value(func)?;

                checks::select(self.module.types(), cond.ty, on_true.ty, on_false.ty).map_err(mismatch)?;

                (
                    on_true.ty,
                    InstKind::Select {
                        fmf,
                        cond,
                        on_true,
                        on_false,
                    },
                )
            }
            Opcode::Call => {
                let fmf = self.parse_fast_math()?;
                let (ty, site) = self.parse_call_site(state.func)?;

                (
                    ty,
                    InstKind::Call {
                        tail,
                        fmf,
                        site: Box::new(site),
                    },
                )
            }
            Opcode::VaArg => {
                let list = self.parse_typed_value(func)?;

                self.expect(Token::Comma, "','")?;

                let ty = self.parse_type()?;

                (ty, InstKind::VaArg { list })
            }
            Opcode::LandingPad => {
                let ty = self.parse_type()?;
                let cleanup = self.eat_word("cleanup")?;
                let mut clauses = Vec::new();

                loop {
                    if self.eat_word("catch")? {
                        clauses.push(Clause::Catch(self.parse_typed_value(func)?));
                    } else if self.eat_word("filter")? {
                        clauses.push(Clause::Filter(self.parse_typed_value(func)?));
                    } else {
                        break;
                    }
                }

                if !cleanup && clauses.is_empty() {
                    return Err(ParseError::syntax(
                        pos,
                        "'cleanup' or a clause",
                        "a landingpad without either",
                    ));
                }

                (ty, InstKind::LandingPad { cleanup, clauses })
            }
            Opcode::CatchPad => {
                self.expect_word("within")?;

                let token = self.types().token();
                let within = self.parse_value(token, func)?;
                let args = self.parse_pad_args(func)?;

                (token, InstKind::CatchPad { within, args })
            }
            Opcode::CleanupPad => {
                self.expect_word("within")?;

                let token = self.types().token();
                let within = self.parse_value(token, func)?;
                let args = self.parse_pad_args(func)?;

                (token, InstKind::CleanupPad { within, args })
            }
            Opcode::Freeze => {
                let value = self.parse_typed_value(func)?;

                (value.ty, InstKind::Freeze { value })
            }
            _ => self.parse_terminator(state, op, pos)?,
        };

        Ok(result)
    }

    /// Fast-math flags, if any are written.
    pub(super) fn parse_fast_math(&mut self) -> ParseResult<FastMathFlags> {
        let mut fmf = FastMathFlags::default();

        while let Some(word) = self.peek_keyword()? {
            if !fmf.set_keyword(word) {
                break;
            }

            self.bump()?;
        }

        Ok(fmf)
    }

    // `T a, b`
    fn parse_operand_pair(&mut self, func: Option<Global>) -> ParseResult<(TypedValue, TypedValue)> {
        let lhs = self.parse_typed_value(func)?;

        self.expect(Token::Comma, "','")?;

        let rhs = TypedValue::new(lhs.ty, self.parse_value(lhs.ty, func)?);

        Ok((lhs, rhs))
    }

    // `syncscope("...")`, if it's there
    fn parse_syncscope(&mut self) -> ParseResult<Option<Vec<u8>>> {
        if !self.eat_word("syncscope")? {
            return Ok(None);
        }

        self.expect(Token::LParen, "'('")?;

        let scope = self.parse_string("a synchronization scope")?;

        self.expect(Token::RParen, "')'")?;

        Ok(Some(scope))
    }

    // `, align N` at the end of a memory instruction
    fn parse_opt_align(&mut self) -> ParseResult<Option<u64>> {
        if !self.eat_comma_word("align")? {
            return Ok(None);
        }

        let pos = self.cursor.prev_position();

        self.parse_alignment(pos).map(Some)
    }

    // a pointer operand, checked against the type it is accessed with
    fn check_pointer_operand(&self, ptr: &TypedValue, accessed: Type, pos: SourcePos) -> ParseResult<()> {
        let types = self.module.types();

        if !types.is_pointer(ptr.ty) {
            return Err(ParseError::mismatch(pos, "operand must be a pointer"));
        }

        match types.pointee(ptr.ty) {
            Some(pointee) if pointee != accessed => Err(ParseError::mismatch(
                pos,
                "explicit pointee type doesn't match the operand's pointee type",
            )),
            _ => Ok(()),
        }
    }

    // everything after `alloca`
    fn parse_alloca(&mut self, func: Option<Global>) -> ParseResult<(Type, InstKind)> {
        let inalloca = self.eat_word("inalloca")?;
        let allocated = self.parse_type()?;
        let mut count = None;
        let mut align = None;
        let mut addrspace = None;

        while self.peek_tok()? == Some(Token::Comma) && !self.at_attachment()? {
            self.bump()?;

            let pos = self.position();

            match self.peek_keyword()? {
                Some("align") => {
                    self.bump()?;
                    align = Some(self.parse_alignment(pos)?);
                }
                Some("addrspace") => addrspace = self.parse_opt_addrspace()?,
                _ if count.is_none() && align.is_none() && addrspace.is_none() => {
                    let value = self.parse_typed_value(func)?;

                    if self.module.types().int_width(value.ty).is_none() {
                        return Err(ParseError::mismatch(pos, "element count must have integer type"));
                    }

                    count = Some(value);
                }
                _ => return self.unexpected("'align' or 'addrspace'"),
            }
        }

        let ty = self.types().pointer(Some(allocated), addrspace.unwrap_or(0));

        Ok((
            ty,
            InstKind::Alloca {
                inalloca,
                allocated,
                count,
                align,
                addrspace,
            },
        ))
    }

    // everything after `load`
    fn parse_load(&mut self, func: Option<Global>, pos: SourcePos) -> ParseResult<(Type, InstKind)> {
        let atomic = self.eat_word("atomic")?;
        let volatile = self.eat_word("volatile")?;
        let ty = self.parse_type()?;

        self.expect(Token::Comma, "','")?;

        let ptr_pos = self.position();
        let ptr = self.parse_typed_value(func)?;

        self.check_pointer_operand(&ptr, ty, ptr_pos)?;

        let (syncscope, ordering) = if atomic {
            let scope = self.parse_syncscope()?;
            let ordering = self.expect_keyword(AtomicOrdering::from_keyword, "an atomic ordering")?;

            if matches!(ordering, AtomicOrdering::Release | AtomicOrdering::AcqRel) {
                return Err(ParseError::syntax(pos, "a load ordering", format!("'{}'", ordering.keyword())));
            }

            (scope, Some(ordering))
        } else {
            (None, None)
        };

        let align = self.parse_opt_align()?;

        Ok((
            ty,
            InstKind::Load {
                atomic,
                volatile,
                ptr,
                syncscope,
                ordering,
                align,
            },
        ))
    }

    // everything after `store`
    fn parse_store(&mut self, func: Option<Global>, pos: SourcePos) -> ParseResult<InstKind> {
        let atomic = self.eat_word("atomic")?;
        let volatile = self.eat_word("volatile")?;
        let value = self.parse_typed_value(func)?;

        self.expect(Token::Comma, "','")?;

        let ptr_pos = self.position();
        let ptr = self.parse_typed_value(func)?;

        self.check_pointer_operand(&ptr, value.ty, ptr_pos)?;

        let (syncscope, ordering) = if atomic {
            let scope = self.parse_syncscope()?;
            let ordering = self.expect_keyword(AtomicOrdering::from_keyword, "an atomic ordering")?;

            if matches!(ordering, AtomicOrdering::Acquire | AtomicOrdering::AcqRel) {
                return Err(ParseError::syntax(pos, "a store ordering", format!("'{}'", ordering.keyword())));
            }

            (scope, Some(ordering))
        } else {
            (None, None)
        };

        let align = self.parse_opt_align()?;

        Ok(InstKind::Store {
            atomic,
            volatile,
            value,
            ptr,
            syncscope,
            ordering,
            align,
        })
    }

    // everything after `cmpxchg`
    fn parse_cmpxchg(&mut self, func: Option<Global>, pos: SourcePos) -> ParseResult<(Type, InstKind)> {
        let weak = self.eat_word("weak")?;
        let volatile = self.eat_word("volatile")?;
        let ptr_pos = self.position();
        let ptr = self.parse_typed_value(func)?;

        self.expect(Token::Comma, "','")?;

        let cmp = self.parse_typed_value(func)?;

        self.expect(Token::Comma, "','")?;

        let new = self.parse_typed_value(func)?;

        if cmp.ty != new.ty {
            return Err(ParseError::mismatch(pos, "compare value and new value type do not match"));
        }

        self.check_pointer_operand(&ptr, cmp.ty, ptr_pos)?;

        let syncscope = self.parse_syncscope()?;
        let success = self.expect_keyword(AtomicOrdering::from_keyword, "an atomic ordering")?;
        let failure = self.expect_keyword(AtomicOrdering::from_keyword, "an atomic ordering")?;
        let align = self.parse_opt_align()?;

        let i1 = self.types().bool();
        let ty = self.types().structure(&[cmp.ty, i1], false);

        Ok((
            ty,
            InstKind::CmpXchg {
                weak,
                volatile,
                ptr,
                cmp,
                new,
                syncscope,
                success,
                failure,
                align,
            },
        ))
    }

    // everything after `atomicrmw`
    fn parse_atomicrmw(&mut self, func: Option<Global>, pos: SourcePos) -> ParseResult<(Type, InstKind)> {
        let volatile = self.eat_word("volatile")?;
        let op = self.expect_keyword(AtomicRmwOp::from_keyword, "an atomicrmw operation")?;
        let ptr_pos = self.position();
        let ptr = self.parse_typed_value(func)?;

        self.expect(Token::Comma, "','")?;

        let value = self.parse_typed_value(func)?;

        self.check_pointer_operand(&ptr, value.ty, ptr_pos)?;

        {
            let types = self.module.types();
            let valid = match op {
                AtomicRmwOp::Xchg => {
                    types.int_width(value.ty).is_some()
                        || types.float_kind(value.ty).is_some()
                        || types.is_pointer(value.ty)
                }
                AtomicRmwOp::FAdd | AtomicRmwOp::FSub | AtomicRmwOp::FMax | AtomicRmwOp::FMin => {
                    types.float_kind(value.ty).is_some()
                }
                _ => types.int_width(value.ty).is_some(),
            };

            if !valid {
                return Err(ParseError::mismatch(
                    pos,
                    format!("invalid operand type for 'atomicrmw {}'", op.keyword()),
                ));
            }
        }

        let syncscope = self.parse_syncscope()?;
        let ordering = self.expect_keyword(AtomicOrdering::from_keyword, "an atomic ordering")?;
        let align = self.parse_opt_align()?;

        Ok((
            value.ty,
            InstKind::AtomicRmw {
                volatile,
                op,
                ptr,
                value,
                syncscope,
                ordering,
                align,
            },
        ))
    }

    // everything after `phi`
    fn parse_phi(&mut self, func: Option<Global>, pos: SourcePos) -> ParseResult<(Type, InstKind)> {
        let fmf = self.parse_fast_math()?;
        let ty = self.parse_type()?;

        {
            let types = self.module.types();

            if types.is_void(ty) || types.is_label(ty) {
                return Err(ParseError::mismatch(pos, "phi node must have first class type"));
            }
        }

        let label = self.types().label();
        let mut incoming = Vec::new();

        loop {
            self.expect(Token::LBracket, "'['")?;

            let value = self.parse_value(ty, func)?;

            self.expect(Token::Comma, "','")?;

            let block = self.parse_value(label, func)?;

            self.expect(Token::RBracket, "']'")?;

            incoming.push(Incoming { value, block });

            if self.peek_tok()? != Some(Token::Comma) || self.at_attachment()? {
                break;
            }

            self.bump()?;
        }

        Ok((ty, InstKind::Phi { fmf, incoming }))
    }

    // `[T v, ...]` after the parent of a pad
    fn parse_pad_args(&mut self, func: Option<Global>) -> ParseResult<Vec<TypedValue>> {
        let mut args = Vec::new();

        self.expect(Token::LBracket, "'['")?;

        if self.eat(Token::RBracket)? {
            return Ok(args);
        }

        loop {
            args.push(self.parse_typed_value(func)?);

            if !self.eat(Token::Comma)? {
                break;
            }
        }

        self.expect(Token::RBracket, "']'")?;

        Ok(args)
    }

    /// Everything after `call` (and its fast-math flags) or `invoke`, up to
    /// the operand bundles. Gives back the result type along with the site.
    pub(super) fn parse_call_site(&mut self, func: Global) -> ParseResult<(Type, CallSite)> {
        let cconv = self.parse_cconv()?;
        let ret_attrs = self.parse_attrs(AttrContext::Param)?;
        let addrspace = self.parse_opt_addrspace()?;
        let ty_pos = self.position();
        let written_ty = self.parse_type()?;
        let callee_ptr = self.types().pointer(None, addrspace.unwrap_or(0));
        let callee = self.parse_value(callee_ptr, Some(func))?;

        self.expect(Token::LParen, "'('")?;

        let mut args = Vec::new();

        if !self.eat(Token::RParen)? {
            loop {
                let ty_pos = self.position();
                let ty = self.parse_type()?;

                if self.module.types().is_void(ty) {
                    return Err(ParseError::mismatch(ty_pos, "argument can not have void type"));
                }

                let attrs = self.parse_attrs(AttrContext::Param)?;
                let value = self.parse_value(ty, Some(func))?;

                args.push(Arg { ty, attrs, value });

                if !self.eat(Token::Comma)? {
                    break;
                }
            }

            self.expect(Token::RParen, "')'")?;
        }

        let fn_ty = match self.module.types().function_info(written_ty) {
            Some((_, params, vararg)) => {
                let arity_ok = if vararg {
                    args.len() >= params.len()
                } else {
                    args.len() == params.len()
                };

                let types_ok = params.iter().zip(&args).all(|(param, arg)| *param == arg.ty);

                if !arity_ok || !types_ok {
                    return Err(ParseError::mismatch(
                        ty_pos,
                        "arguments don't match the callee's function type",
                    ));
                }

                written_ty
            }
            None => {
                let types = self.module.types();

                if types.is_label(written_ty) || types.is_metadata(written_ty) {
                    return Err(ParseError::mismatch(ty_pos, "invalid result type for a call"));
                }

                let arg_tys: SmallVec<[Type; 8]> = args.iter().map(|arg| arg.ty).collect();

                self.types().function(written_ty, &arg_tys, false)
            }
        };

        if let Value::Placeholder(placeholder) = &callee {
            let expected = self.types().pointer(Some(fn_ty), addrspace.unwrap_or(0));

            self.pending.expect(*placeholder, expected);
        }

        let fn_attrs = self.parse_attrs(AttrContext::Function)?;
        let bundles = self.parse_bundles(func)?;

        let ret = match self.module.types().function_info(fn_ty) {
            Some((ret, _, _)) => ret,
            None => written_ty,
        };

        Ok((
            ret,
            CallSite {
                cconv,
                ret_attrs,
                addrspace,
                written_ty,
                fn_ty,
                callee,
                args,
                fn_attrs,
                bundles,
            },
        ))
    }

    // `[ "tag"(T v, ...), ... ]`, if there
    fn parse_bundles(&mut self, func: Global) -> ParseResult<Vec<OperandBundle>> {
        let mut bundles = Vec::new();

        if !self.eat(Token::LBracket)? {
            return Ok(bundles);
        }

        loop {
            let tag = self.parse_string("an operand bundle tag")?;
            let mut inputs = Vec::new();

            self.expect(Token::LParen, "'('")?;

            if !self.eat(Token::RParen)? {
                loop {
                    inputs.push(self.parse_typed_value(Some(func))?);

                    if !self.eat(Token::Comma)? {
                        break;
                    }
                }

                self.expect(Token::RParen, "')'")?;
            }

            bundles.push(OperandBundle { tag, inputs });

            if !self.eat(Token::Comma)? {
                break;
            }
        }

        self.expect(Token::RBracket, "']'")?;

        Ok(bundles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse::tests::{parse_error, parse_unresolved};

    fn body_of(source: &str) -> Vec<Instruction> {
        let parsed = parse_unresolved(source);
        let (_, func) = parsed.module.functions().last().unwrap();

        func.body.as_ref().unwrap().insts().map(|(_, i)| i.clone()).collect()
    }

    #[test]
    fn binary_flags() {
        let insts = body_of(
            "define void @f(i32 %a, float %b) {\n  %x = add nuw nsw i32 %a, 1\n  %y = fadd fast float %b, 1.0\n  %z = udiv exact i32 %a, 2\n  ret void\n}\n",
        );

        match insts[0].kind() {
            InstKind::Binary { flags, .. } => assert!(flags.nuw && flags.nsw),
            other => panic!("unexpected {other:?}"),
        }

        match insts[1].kind() {
            InstKind::Binary { fmf, .. } => assert!(fmf.is_fast()),
            other => panic!("unexpected {other:?}"),
        }

        match insts[2].kind() {
            InstKind::Binary { flags, .. } => assert!(flags.exact && !flags.nuw),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn memory_instructions() {
        let insts = body_of(
            "define void @f() {\n  %p = alloca i32, i32 4, align 8\n  store atomic volatile i32 1, i32* %p syncscope(\"agent\") release, align 4\n  %v = load i32, i32* %p\n  %c = cmpxchg weak i32* %p, i32 0, i32 1 acq_rel monotonic\n  %r = atomicrmw add i32* %p, i32 1 seq_cst\n  fence syncscope(\"x\") acquire\n  ret void\n}\n",
        );

        assert!(matches!(insts[0].kind(), InstKind::Alloca { align: Some(8), count: Some(_), .. }));

        match insts[1].kind() {
            InstKind::Store {
                atomic,
                volatile,
                syncscope,
                ordering,
                align,
                ..
            } => {
                assert!(*atomic && *volatile);
                assert_eq!(syncscope.as_deref(), Some(&b"agent"[..]));
                assert_eq!(*ordering, Some(AtomicOrdering::Release));
                assert_eq!(*align, Some(4));
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(insts[3].kind(), InstKind::CmpXchg { weak: true, .. }));
        assert!(matches!(insts[4].kind(), InstKind::AtomicRmw { op: AtomicRmwOp::Add, .. }));
        assert!(matches!(insts[5].kind(), InstKind::Fence { ordering: AtomicOrdering::Acquire, .. }));
    }

    #[test]
    fn calls() {
        let insts = body_of(
            "declare i32 @printf(i8*, ...)\ndefine void @f(i8* %s) {\n  %r = tail call fastcc i32 (i8*, ...) @printf(i8* nonnull %s, i32 1) #0 [ \"deopt\"(i32 0) ]\n  call void @f(i8* %s)\n  ret void\n}\n",
        );

        match insts[0].kind() {
            InstKind::Call { tail, site, .. } => {
                assert_eq!(*tail, Some(TailKind::Tail));
                assert_eq!(site.args.len(), 2);
                assert_eq!(site.args[0].attrs, vec![Attribute::Enum(AttrKind::NonNull)]);
                assert_eq!(site.bundles[0].tag, b"deopt".to_vec());
                assert_eq!(site.written_ty, site.fn_ty);
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(insts[1].name().is_none());
    }

    #[test]
    fn void_results_cannot_be_named() {
        let err = parse_error("define void @f() {\n  %x = call void @f()\n  ret void\n}\n");

        assert!(matches!(err, ParseError::TypeMismatch { pos, .. } if pos.line == 2 && pos.col == 3));
    }

    #[test]
    fn operand_types_are_checked() {
        assert!(matches!(
            parse_error("define void @f(i32 %a) {\n  %x = fadd i32 %a, %a\n  ret void\n}\n"),
            ParseError::TypeMismatch { .. }
        ));
        assert!(matches!(
            parse_error("define void @f(i32* %p) {\n  %x = load i64, i32* %p\n  ret void\n}\n"),
            ParseError::TypeMismatch { .. }
        ));
        assert!(matches!(
            parse_error("define void @f(i32 %a) {\n  %x = trunc i32 %a to i64\n  ret void\n}\n"),
            ParseError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn tail_requires_call() {
        assert!(matches!(
            parse_error("define void @f() {\n  tail ret void\n}\n"),
            ParseError::Syntax { .. }
        ));
    }
}
