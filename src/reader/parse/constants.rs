//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use super::{checks, Parser};
use crate::ir::*;
use crate::reader::resolve::Scope;
use crate::reader::{ParseError, ParseResult, SourcePos, Token};
use num_bigint::{BigInt, BigUint};

// the exactness checks for literals of the narrow float formats

fn fits_float(value: f64) -> bool {
    value.is_nan() || f64::from(value as f32) == value
}

fn fits_bfloat(value: f64) -> bool {
    // a bfloat is a float with the low 16 bits of the significand dropped
    fits_float(value) && (value.is_nan() || (value as f32).to_bits() & 0xFFFF == 0)
}

fn fits_half(value: f64) -> bool {
    if !value.is_finite() || value == 0.0 {
        return true;
    }

    let magnitude = value.abs();

    if magnitude > 65504.0 {
        return false;
    }

    // every half is a multiple of the smallest subnormal, 2^-24, with at
    // most 11 significant bits
    let scaled = magnitude * 16_777_216.0;

    if scaled.fract() != 0.0 {
        return false;
    }

    let bits = scaled as u64;

    64 - bits.leading_zeros() - bits.trailing_zeros() <= 11
}

fn fits_kind(kind: FloatKind, value: f64) -> bool {
    match kind {
        FloatKind::Half => fits_half(value),
        FloatKind::BFloat => fits_bfloat(value),
        FloatKind::Float => fits_float(value),
        _ => true,
    }
}

impl<'a> Parser<'a> {
    /// `T c`
    pub(super) fn parse_typed_const(&mut self) -> ParseResult<TypedConst> {
        let ty = self.parse_type()?;
        let value = self.parse_const(ty)?;

        Ok(TypedConst::new(ty, value))
    }

    /// Parses a constant of type `ty`, the type has already been parsed.
    pub(super) fn parse_const(&mut self, ty: Type) -> ParseResult<Constant> {
        let pos = self.position();
        let pair = match self.peek()? {
            Some(pair) => pair,
            None => return self.unexpected("a constant"),
        };

        match pair.tok {
            Token::Int(text) => {
                self.bump()?;

                let value = BigInt::parse_bytes(text.as_bytes(), 10)
                    .ok_or_else(|| ParseError::syntax(pos, "an integer", text))?;

                self.int_literal(ty, value, pos)
            }
            Token::HexInt(text) => {
                self.bump()?;
                self.hex_int_literal(ty, text, pos)
            }
            Token::Float(_) | Token::HexFloat(_) => {
                self.bump()?;
                self.float_literal(ty, pair.tok, pos).map(Constant::Float)
            }
            Token::CStr(body) => {
                self.bump()?;

                let bytes = self.decode(body, pos)?;
                let i8_ty = self.types().int(8);
                let expected = self.types().array(bytes.len() as u64, i8_ty);

                if ty != expected {
                    return Err(ParseError::mismatch(
                        pos,
                        format!("constant string has type '[{} x i8]'", bytes.len()),
                    ));
                }

                Ok(Constant::Bytes(bytes))
            }
            Token::Global(name) => {
                self.bump()?;

                if !self.module.types().is_pointer(ty) {
                    return Err(ParseError::mismatch(pos, "global variable reference must have pointer type"));
                }

                let ident = self.ident(name, pos)?;
                let placeholder = self.register(Scope::Module, ident, pos, Some(ty));

                Ok(Constant::Global(Ref::Pending(placeholder)))
            }
            Token::LBracket => {
                self.bump()?;
                self.parse_array_const(ty, pos)
            }
            Token::LBrace => {
                self.bump()?;

                let fields = self.parse_const_list(Token::RBrace, "'}'")?;

                self.check_struct_const(ty, false, &fields, pos)?;

                Ok(Constant::Struct(fields))
            }
            Token::Less => {
                self.bump()?;

                if self.eat(Token::LBrace)? {
                    let fields = self.parse_const_list(Token::RBrace, "'}'")?;

                    self.expect(Token::Greater, "'>'")?;
                    self.check_struct_const(ty, true, &fields, pos)?;

                    return Ok(Constant::Struct(fields));
                }

                self.parse_vector_const(ty, pos)
            }
            Token::Opcode(op) => {
                self.bump()?;
                self.parse_const_expr(ty, op, pos)
                    .map(|expr| Constant::Expr(Box::new(expr)))
            }
            Token::Word(word) => {
                self.bump()?;
                self.parse_keyword_const(ty, word, pos)
            }
            _ => self.unexpected("a constant"),
        }
    }

    fn parse_keyword_const(&mut self, ty: Type, word: &str, pos: SourcePos) -> ParseResult<Constant> {
        let types = self.module.types();

        match word {
            "true" | "false" => {
                if types.int_width(ty) != Some(1) {
                    return Err(ParseError::mismatch(pos, "boolean constant must have type 'i1'"));
                }

                Ok(Constant::Int(BigInt::from(if word == "true" { -1 } else { 0 })))
            }
            "null" if types.is_pointer(ty) => Ok(Constant::Null),
            "null" => Err(ParseError::mismatch(pos, "null must be a pointer type")),
            "none" if matches!(types.data(ty), TypeData::Token) => Ok(Constant::None),
            "none" => Err(ParseError::mismatch(pos, "none must have token type")),
            "undef" | "poison" | "zeroinitializer" => {
                let invalid = types.is_void(ty)
                    || types.is_label(ty)
                    || types.is_metadata(ty)
                    || types.function_info(ty).is_some();

                if invalid {
                    return Err(ParseError::mismatch(pos, format!("invalid type for '{word}'")));
                }

                Ok(match word {
                    "undef" => Constant::Undef,
                    "poison" => Constant::Poison,
                    _ => Constant::ZeroInitializer,
                })
            }
            "blockaddress" => {
                if !types.is_pointer(ty) {
                    return Err(ParseError::mismatch(pos, "blockaddress must have pointer type"));
                }

                self.parse_block_address()
            }
            _ => Err(ParseError::syntax(pos, "a constant", format!("keyword '{word}'"))),
        }
    }

    // `(@f, %bb)`, after `blockaddress`
    fn parse_block_address(&mut self) -> ParseResult<Constant> {
        self.expect(Token::LParen, "'('")?;

        let func_pair = self.next_pair("a function name")?;
        let func = match func_pair.tok {
            Token::Global(name) => self.ident(name, func_pair.pos)?,
            _ => return Err(ParseError::syntax(func_pair.pos, "a function name", func_pair.tok.describe())),
        };

        self.expect(Token::Comma, "','")?;

        let block_pair = self.next_pair("a block name")?;
        let block = match block_pair.tok {
            Token::Local(name) => self.ident(name, block_pair.pos)?,
            _ => return Err(ParseError::syntax(block_pair.pos, "a block name", block_pair.tok.describe())),
        };

        self.expect(Token::RParen, "')'")?;

        let func = self.register(Scope::Module, func, func_pair.pos, None);
        let block = self.register(Scope::BlockAddress, block, block_pair.pos, None);

        Ok(Constant::BlockAddress {
            func: Ref::Pending(func),
            block: Ref::Pending(block),
        })
    }

    fn int_literal(&mut self, ty: Type, value: BigInt, pos: SourcePos) -> ParseResult<Constant> {
        let width = self
            .module
            .types()
            .int_width(ty)
            .ok_or_else(|| ParseError::mismatch(pos, "integer constant must have integer type"))?;

        if !int_fits(&value, width) {
            return Err(ParseError::mismatch(
                pos,
                format!("integer constant {value} is out of range for 'i{width}'"),
            ));
        }

        Ok(Constant::Int(normalize_int(&value, width)))
    }

    // `s0x...` is the two's complement bit pattern at the type's width,
    // `u0x...` is an unsigned number. Both are limited to `width` bits.
    fn hex_int_literal(&mut self, ty: Type, text: &str, pos: SourcePos) -> ParseResult<Constant> {
        let bits = BigUint::parse_bytes(text[3..].as_bytes(), 16)
            .ok_or_else(|| ParseError::syntax(pos, "a hexadecimal integer", text))?;

        let width = self
            .module
            .types()
            .int_width(ty)
            .ok_or_else(|| ParseError::mismatch(pos, "integer constant must have integer type"))?;

        if bits.bits() > u64::from(width) {
            return Err(ParseError::mismatch(
                pos,
                format!("integer constant is out of range for 'i{width}'"),
            ));
        }

        Ok(Constant::Int(normalize_int(&BigInt::from(bits), width)))
    }

    fn float_literal(&mut self, ty: Type, tok: Token<'_>, pos: SourcePos) -> ParseResult<FloatValue> {
        let kind = self.module.types().float_kind(ty).ok_or_else(|| {
            ParseError::mismatch(pos, "floating point constant must have floating point type")
        })?;

        let inexact = || ParseError::mismatch(pos, format!("floating point constant invalid for type '{}'", kind.keyword()));
        let too_large = || ParseError::mismatch(pos, "floating point constant is too large");

        match tok {
            Token::Float(text) => {
                let value: f64 = text
                    .parse()
                    .map_err(|_| ParseError::syntax(pos, "a floating point number", text))?;

                if !fits_kind(kind, value) {
                    return Err(inexact());
                }

                Ok(FloatValue::encode(kind, value))
            }
            Token::HexFloat(text) => {
                let digits = &text[2..];
                let (prefix, digits) = match digits.as_bytes().first() {
                    Some(&b @ (b'K' | b'L' | b'M' | b'H' | b'R')) => (Some(b), &digits[1..]),
                    _ => (None, digits),
                };

                let bits = u128::from_str_radix(digits, 16).map_err(|_| too_large())?;
                let expected = match prefix {
                    None => None,
                    Some(b'H') => Some(FloatKind::Half),
                    Some(b'R') => Some(FloatKind::BFloat),
                    Some(b'K') => Some(FloatKind::X86Fp80),
                    Some(b'L') => Some(FloatKind::Fp128),
                    _ => Some(FloatKind::PpcFp128),
                };

                if let Some(expected) = expected {
                    if expected != kind {
                        return Err(inexact());
                    }
                }

                let value = match kind {
                    FloatKind::Half if prefix.is_some() => FloatValue::Half(u16::try_from(bits).map_err(|_| too_large())?),
                    FloatKind::BFloat if prefix.is_some() => FloatValue::BFloat(u16::try_from(bits).map_err(|_| too_large())?),
                    FloatKind::X86Fp80 if prefix.is_some() => {
                        if bits >> 80 != 0 {
                            return Err(too_large());
                        }

                        FloatValue::X86Fp80(bits)
                    }
                    FloatKind::Fp128 if prefix.is_some() => FloatValue::Fp128(bits),
                    FloatKind::PpcFp128 if prefix.is_some() => FloatValue::PpcFp128(bits),
                    _ => {
                        let value = f64::from_bits(u64::try_from(bits).map_err(|_| too_large())?);

                        if !fits_kind(kind, value) {
                            return Err(inexact());
                        }

                        FloatValue::encode(kind, value)
                    }
                };

                Ok(value)
            }
            _ => Err(ParseError::syntax(pos, "a floating point number", tok.describe())),
        }
    }

    // `T c, T c, ...` up to (and including) `close`
    fn parse_const_list(&mut self, close: Token<'static>, expected: &str) -> ParseResult<Vec<TypedConst>> {
        let mut elems = Vec::new();

        if self.eat(close)? {
            return Ok(elems);
        }

        loop {
            elems.push(self.parse_typed_const()?);

            if !self.eat(Token::Comma)? {
                break;
            }
        }

        self.expect(close, expected)?;

        Ok(elems)
    }

    fn parse_array_const(&mut self, ty: Type, pos: SourcePos) -> ParseResult<Constant> {
        let elems = self.parse_const_list(Token::RBracket, "']'")?;
        let types = self.module.types();

        let (len, elem) = match types.data(types.resolve(ty)) {
            TypeData::Array { len, elem } => (*len, *elem),
            _ => return Err(ParseError::mismatch(pos, "array constant must have array type")),
        };

        if elems.len() as u64 != len {
            return Err(ParseError::mismatch(
                pos,
                format!("array constant has {} elements but the type has {len}", elems.len()),
            ));
        }

        if elems.iter().any(|c| !types.compatible(elem, c.ty)) {
            return Err(ParseError::mismatch(pos, "array element type doesn't match the array type"));
        }

        Ok(Constant::Array(elems))
    }

    fn parse_vector_const(&mut self, ty: Type, pos: SourcePos) -> ParseResult<Constant> {
        let elems = self.parse_const_list(Token::Greater, "'>'")?;
        let types = self.module.types();

        let (len, elem) = match types.data(ty) {
            TypeData::Vector {
                len,
                elem,
                scalable: false,
            } => (*len, *elem),
            _ => return Err(ParseError::mismatch(pos, "vector constant must have fixed vector type")),
        };

        if elems.len() as u64 != len {
            return Err(ParseError::mismatch(
                pos,
                format!("vector constant has {} elements but the type has {len}", elems.len()),
            ));
        }

        if elems.iter().any(|c| !types.compatible(elem, c.ty)) {
            return Err(ParseError::mismatch(pos, "vector element type doesn't match the vector type"));
        }

        Ok(Constant::Vector(elems))
    }

    fn check_struct_const(&self, ty: Type, packed: bool, fields: &[TypedConst], pos: SourcePos) -> ParseResult<()> {
        let types = self.module.types();

        let expected = match types.data(types.resolve(ty)) {
            TypeData::Struct { fields: members, packed: p } if *p == packed => members,
            _ => return Err(ParseError::mismatch(pos, "struct constant doesn't match the struct type")),
        };

        let matches = expected.len() == fields.len()
            && expected
                .iter()
                .zip(fields)
                .all(|(ty, field)| types.compatible(*ty, field.ty));

        if !matches {
            return Err(ParseError::mismatch(pos, "struct constant doesn't match the struct type"));
        }

        Ok(())
    }

    fn parse_const_operands<const N: usize>(&mut self) -> ParseResult<[TypedConst; N]> {
        self.expect(Token::LParen, "'('")?;

        let mut operands = Vec::with_capacity(N);

        for i in 0..N {
            if i != 0 {
                self.expect(Token::Comma, "','")?;
            }

            operands.push(self.parse_typed_const()?);
        }

        self.expect(Token::RParen, "')'")?;

        // exactly N elements were pushed above
        operands
            .try_into()
            .map_err(|_| ParseError::mismatch(self.cursor.prev_position(), "wrong number of operands"))
    }

    // everything after the opcode of a constant expression of type `ty`
    fn parse_const_expr(&mut self, ty: Type, op: Opcode, pos: SourcePos) -> ParseResult<ConstExpr> {
        let mismatch = |message: String| ParseError::mismatch(pos, message);

        if let Some(bop) = op.as_binary() {
            let flags = self.parse_wrap_flags(bop)?;
            let [lhs, rhs] = self.parse_const_operands::<2>()?;
            let types = self.module.types();

            if lhs.ty != rhs.ty || !types.compatible(ty, lhs.ty) {
                return Err(mismatch("operands of a constant expression must have the same type".into()));
            }

            checks::binary(types, bop, lhs.ty).map_err(mismatch)?;

            return Ok(ConstExpr::Binary { op: bop, flags, lhs, rhs });
        }

        if let Some(cast) = op.as_cast() {
            self.expect(Token::LParen, "'('")?;

            let value = self.parse_typed_const()?;

            self.expect_word("to")?;

            let to = self.parse_type()?;

            self.expect(Token::RParen, "')'")?;

            let types = self.module.types();

            checks::cast(types, cast, value.ty, to).map_err(mismatch)?;

            if !types.compatible(ty, to) {
                return Err(mismatch("cast result doesn't match the constant's type".into()));
            }

            return Ok(ConstExpr::Cast { op: cast, value, to });
        }

        let expr = match op {
            Opcode::FNeg => {
                let [operand] = self.parse_const_operands::<1>()?;
                let types = self.module.types();

                if !types.is_fp_or_fp_vector(operand.ty) || !types.compatible(ty, operand.ty) {
                    return Err(mismatch("invalid operand for fneg".into()));
                }

                ConstExpr::FNeg(operand)
            }
            Opcode::GetElementPtr => {
                let inbounds = self.eat_word("inbounds")?;

                self.expect(Token::LParen, "'('")?;

                let source = self.parse_type()?;

                self.expect(Token::Comma, "','")?;

                let base = self.parse_typed_const()?;
                let mut indices = Vec::new();

                while self.eat(Token::Comma)? {
                    self.eat_word("inrange")?;

                    indices.push(self.parse_typed_const()?);
                }

                self.expect(Token::RParen, "')'")?;

                let operands: Vec<_> = indices.iter().map(|c| (c.ty, const_int(&c.value))).collect();
                let result = checks::gep_operands(self.types(), source, base.ty, &operands).map_err(mismatch)?;

                if !self.module.types().compatible(ty, result) {
                    return Err(mismatch("getelementptr result doesn't match the constant's type".into()));
                }

                ConstExpr::GetElementPtr {
                    inbounds,
                    source,
                    base,
                    indices,
                }
            }
            Opcode::ICmp => {
                let pred = self.expect_keyword(ICmpPred::from_keyword, "an integer comparison predicate")?;
                let [lhs, rhs] = self.parse_const_operands::<2>()?;
                let result = checks::icmp(self.types(), lhs.ty, rhs.ty).map_err(mismatch)?;

                if result != ty {
                    return Err(mismatch("comparison result must be 'i1' or a vector of 'i1'".into()));
                }

                ConstExpr::ICmp { pred, lhs, rhs }
            }
            Opcode::FCmp => {
                let pred = self.expect_keyword(FCmpPred::from_keyword, "a floating point comparison predicate")?;
                let [lhs, rhs] = self.parse_const_operands::<2>()?;
                let result = checks::fcmp(self.types(), lhs.ty, rhs.ty).map_err(mismatch)?;

                if result != ty {
                    return Err(mismatch("comparison result must be 'i1' or a vector of 'i1'".into()));
                }

                ConstExpr::FCmp { pred, lhs, rhs }
            }
            Opcode::Select => {
                let [cond, on_true, on_false] = self.parse_const_operands::<3>()?;
                let types = self.module.types();

                checks::select(types, cond.ty, on_true.ty, on_false.ty).map_err(mismatch)?;

                if !types.compatible(ty, on_true.ty) {
                    return Err(mismatch("select result doesn't match the constant's type".into()));
                }

                ConstExpr::Select {
                    cond,
                    on_true,
                    on_false,
                }
            }
            Opcode::ExtractElement => {
                let [vector, index] = self.parse_const_operands::<2>()?;
                let elem = checks::extract_element(self.module.types(), vector.ty, index.ty).map_err(mismatch)?;

                if !self.module.types().compatible(ty, elem) {
                    return Err(mismatch("extractelement result doesn't match the constant's type".into()));
                }

                ConstExpr::ExtractElement { vector, index }
            }
            Opcode::InsertElement => {
                let [vector, elem, index] = self.parse_const_operands::<3>()?;
                let types = self.module.types();

                checks::insert_element(types, vector.ty, elem.ty, index.ty).map_err(mismatch)?;

                if !types.compatible(ty, vector.ty) {
                    return Err(mismatch("insertelement result doesn't match the constant's type".into()));
                }

                ConstExpr::InsertElement { vector, elem, index }
            }
            Opcode::ShuffleVector => {
                let [lhs, rhs, mask] = self.parse_const_operands::<3>()?;
                let result = checks::shuffle_vector(self.types(), lhs.ty, rhs.ty, mask.ty).map_err(mismatch)?;

                if !self.module.types().compatible(ty, result) {
                    return Err(mismatch("shufflevector result doesn't match the constant's type".into()));
                }

                ConstExpr::ShuffleVector { lhs, rhs, mask }
            }
            Opcode::ExtractValue => {
                self.expect(Token::LParen, "'('")?;

                let aggregate = self.parse_typed_const()?;
                let indices = self.parse_const_indices()?;

                self.expect(Token::RParen, "')'")?;

                let member = checks::member_path(self.module.types(), aggregate.ty, &indices).map_err(mismatch)?;

                if !self.module.types().compatible(ty, member) {
                    return Err(mismatch("extractvalue result doesn't match the constant's type".into()));
                }

                ConstExpr::ExtractValue { aggregate, indices }
            }
            Opcode::InsertValue => {
                self.expect(Token::LParen, "'('")?;

                let aggregate = self.parse_typed_const()?;

                self.expect(Token::Comma, "','")?;

                let elem = self.parse_typed_const()?;
                let indices = self.parse_const_indices()?;

                self.expect(Token::RParen, "')'")?;

                let types = self.module.types();
                let member = checks::member_path(types, aggregate.ty, &indices).map_err(mismatch)?;

                if !types.compatible(member, elem.ty) || !types.compatible(ty, aggregate.ty) {
                    return Err(mismatch("insertvalue operand and field disagree in type".into()));
                }

                ConstExpr::InsertValue {
                    aggregate,
                    elem,
                    indices,
                }
            }
            _ => {
                return Err(ParseError::syntax(
                    pos,
                    "a constant expression",
                    format!("opcode '{}'", op.keyword()),
                ))
            }
        };

        Ok(expr)
    }

    // `, i, j, ...` for extractvalue/insertvalue, at least one index
    pub(super) fn parse_const_indices(&mut self) -> ParseResult<Vec<u32>> {
        let mut indices = Vec::new();

        loop {
            let index = self.speculate(|p| {
                if !p.eat(Token::Comma)? || !matches!(p.peek_tok()?, Some(Token::Int(_))) {
                    return Ok(None);
                }

                p.parse_u32("an aggregate index").map(Some)
            })?;

            match index {
                Some(index) => indices.push(index),
                None => break,
            }
        }

        if indices.is_empty() {
            return self.unexpected("an aggregate index");
        }

        Ok(indices)
    }

    /// `nuw`, `nsw`, `exact`, whichever the operator allows.
    pub(super) fn parse_wrap_flags(&mut self, op: BinaryOp) -> ParseResult<WrapFlags> {
        let mut flags = WrapFlags::default();

        loop {
            match self.peek_keyword()? {
                Some("nuw") if op.allows_wrap_flags() => flags.nuw = true,
                Some("nsw") if op.allows_wrap_flags() => flags.nsw = true,
                Some("exact") if op.allows_exact() => flags.exact = true,
                _ => return Ok(flags),
            }

            self.bump()?;
        }
    }

    /// Parses an operand of type `ty`. `func` is the function whose locals
    /// are visible, `None` outside of function bodies.
    pub(super) fn parse_value(&mut self, ty: Type, func: Option<Global>) -> ParseResult<Value> {
        if self.module.types().is_metadata(ty) {
            return self.parse_md_operand(func).map(|md| Value::Metadata(Box::new(md)));
        }

        let pos = self.position();

        match self.peek_tok()? {
            Some(Token::Local(name)) => {
                let func = match func {
                    Some(func) => func,
                    None => return self.unexpected("a constant"),
                };

                self.bump()?;

                let ident = self.ident(name, pos)?;
                let placeholder = self.register(Scope::Function(func), ident, pos, Some(ty));

                Ok(Value::Placeholder(placeholder))
            }
            Some(Token::Global(name)) => {
                self.bump()?;

                let ident = self.ident(name, pos)?;
                let placeholder = self.register(Scope::Module, ident, pos, Some(ty));

                Ok(Value::Placeholder(placeholder))
            }
            Some(Token::Word("asm")) => {
                self.bump()?;
                self.parse_inline_asm().map(|asm| Value::InlineAsm(Box::new(asm)))
            }
            _ => self.parse_const(ty).map(Value::constant),
        }
    }

    /// `T v`
    pub(super) fn parse_typed_value(&mut self, func: Option<Global>) -> ParseResult<TypedValue> {
        let ty = self.parse_type()?;
        let value = self.parse_value(ty, func)?;

        Ok(TypedValue::new(ty, value))
    }

    // everything after `asm`
    fn parse_inline_asm(&mut self) -> ParseResult<InlineAsm> {
        let side_effect = self.eat_word("sideeffect")?;
        let align_stack = self.eat_word("alignstack")?;
        let intel_dialect = self.eat_word("inteldialect")?;
        let unwind = self.eat_word("unwind")?;
        let template = self.parse_string("an assembly string")?;

        self.expect(Token::Comma, "','")?;

        let constraints = self.parse_string("a constraint string")?;

        Ok(InlineAsm {
            side_effect,
            align_stack,
            intel_dialect,
            unwind,
            template,
            constraints,
        })
    }
}

/// The value of an integer constant, for the checks that need to know it.
pub(super) fn const_int(value: &Constant) -> Option<i128> {
    match value {
        Constant::Int(v) => i128::try_from(v).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse::tests::{parse_error, parse_unresolved};

    fn init_of(source: &str) -> Constant {
        let parsed = parse_unresolved(source);
        let (_, global) = parsed.module.globals().next().unwrap();

        global.as_variable().unwrap().init.clone().unwrap()
    }

    #[test]
    fn float_exactness() {
        assert!(fits_float(0.5));
        assert!(!fits_float(0.1));
        assert!(fits_half(65504.0));
        assert!(!fits_half(65520.0));
        assert!(fits_half(2f64.powi(-24)));
        assert!(!fits_half(2f64.powi(-25)));
        assert!(fits_bfloat(1.5));
        assert!(!fits_bfloat(1.0 + 2f64.powi(-10)));
    }

    #[test]
    fn integers_are_normalized() {
        let int = |value: i128| Constant::Int(BigInt::from(value));

        assert_eq!(init_of("@x = global i8 255"), int(-1));
        assert_eq!(init_of("@x = global i1 true"), int(-1));
        assert_eq!(init_of("@x = global i16 u0xFFFF"), int(-1));
        assert_eq!(init_of("@x = global i32 s0x80000000"), int(i128::from(i32::MIN)));
    }

    #[test]
    fn integers_wider_than_128_bits() {
        assert_eq!(
            init_of("@x = global i128 u0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF"),
            Constant::Int(BigInt::from(-1))
        );
        assert_eq!(
            init_of("@x = global i256 340282366920938463463374607431768211456"),
            Constant::Int(BigInt::from(1) << 128)
        );
        assert_eq!(
            init_of("@x = global i256 -340282366920938463463374607431768211457"),
            Constant::Int(-(BigInt::from(1) << 128u32) - 1)
        );
        assert!(matches!(
            parse_error("@x = global i128 u0x1FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF"),
            ParseError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn integer_range_is_checked() {
        assert!(matches!(parse_error("@x = global i8 256"), ParseError::TypeMismatch { .. }));
        assert!(matches!(parse_error("@x = global i8 -129"), ParseError::TypeMismatch { .. }));
        assert!(matches!(parse_error("@x = global float 1"), ParseError::TypeMismatch { .. }));
    }

    #[test]
    fn float_literals() {
        assert_eq!(init_of("@x = global double 1.5"), Constant::Float(FloatValue::from_f64(1.5)));
        assert_eq!(init_of("@x = global half 0xH3C00"), Constant::Float(FloatValue::Half(0x3C00)));
        assert_eq!(init_of("@x = global half 1.0"), init_of("@x = global half 0xH3C00"));
        assert_eq!(
            init_of("@x = global x86_fp80 0x3FF0000000000000"),
            Constant::Float(FloatValue::X86Fp80(0x3FFF8000000000000000))
        );
        assert_eq!(init_of("@x = global bfloat 1.5"), Constant::Float(FloatValue::BFloat(0x3FC0)));
        assert_eq!(
            init_of("@x = global float 0x3FB99999A0000000"),
            Constant::Float(FloatValue::Double(0x3FB99999A0000000))
        );

        assert!(matches!(parse_error("@x = global float 0.1"), ParseError::TypeMismatch { .. }));
        assert!(matches!(parse_error("@x = global double 0xH3C00"), ParseError::TypeMismatch { .. }));
    }

    #[test]
    fn aggregates() {
        let init = init_of("@x = global { i32, [2 x i8] } { i32 1, [2 x i8] c\"hi\" }");

        match init {
            Constant::Struct(fields) => {
                assert_eq!(fields[0].value, Constant::Int(BigInt::from(1)));
                assert_eq!(fields[1].value, Constant::Bytes(b"hi".to_vec()));
            }
            other => panic!("expected a struct, got {other:?}"),
        }

        assert!(matches!(
            parse_error("@x = global [2 x i32] [i32 1]"),
            ParseError::TypeMismatch { .. }
        ));
        assert!(matches!(
            parse_error("@x = global [3 x i8] c\"hi\""),
            ParseError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn constant_expressions() {
        let init = init_of("@x = global i64 ptrtoint (i32* getelementptr (i32, i32* null, i64 1) to i64)");

        match init {
            Constant::Expr(expr) => match *expr {
                ConstExpr::Cast { op, value, .. } => {
                    assert_eq!(op, CastOp::PtrToInt);
                    assert!(matches!(value.value, Constant::Expr(_)));
                }
                other => panic!("expected a cast, got {other:?}"),
            },
            other => panic!("expected an expression, got {other:?}"),
        }

        assert!(matches!(
            parse_error("@x = global i32 add (i32 1, i64 2)"),
            ParseError::TypeMismatch { .. }
        ));
        assert!(matches!(
            parse_error("@x = global i64 bitcast (i32 1 to i64)"),
            ParseError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn globals_stay_pending() {
        let parsed = parse_unresolved("@x = global i32* @y");

        assert_eq!(parsed.pending.len(), 1);
    }
}
