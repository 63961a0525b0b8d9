//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use super::Parser;
use crate::ir::{FloatKind, Type, TypeData};
use crate::reader::resolve::Site;
use crate::reader::{ParseError, ParseResult, SourcePos, Token};
use smallvec::SmallVec;

/// The widest integer type that can be written, `i8388607`.
pub(crate) const MAX_INT_BITS: u32 = (1 << 23) - 1;

impl<'a> Parser<'a> {
    /// Parses a full type: a base type followed by any number of `*`,
    /// `addrspace(N)*` and `(params)` suffixes.
    pub(super) fn parse_type(&mut self) -> ParseResult<Type> {
        let pos = self.position();
        let mut ty = self.parse_base_type()?;

        loop {
            match self.peek_tok()? {
                Some(Token::Star) => {
                    self.bump()?;

                    ty = self.pointer_to(ty, 0, pos)?;
                }
                Some(Token::Word("addrspace")) => {
                    let space = self.parse_opt_addrspace()?.unwrap_or(0);

                    self.expect(Token::Star, "'*' after an address space")?;

                    ty = self.pointer_to(ty, space, pos)?;
                }
                Some(Token::LParen) => ty = self.parse_function_type(ty, pos)?,
                _ => return Ok(ty),
            }
        }
    }

    fn parse_base_type(&mut self) -> ParseResult<Type> {
        let pair = self.next_pair("a type")?;

        match pair.tok {
            Token::IntType(width) if (1..=MAX_INT_BITS).contains(&width) => Ok(self.types().int(width)),
            Token::Word(word) => self.parse_keyword_type(word, pair.pos),
            Token::Local(name) => {
                let ident = self.ident(name, pair.pos)?;
                let named = self.types().named_entry(ident);

                self.record(Site::TypeUse(named), pair.pos);

                Ok(self.types().intern(TypeData::Named(named)))
            }
            Token::LBracket => {
                let len = self.parse_u64("an array length")?;

                self.expect_word("x")?;

                let elem_pos = self.position();
                let elem = self.parse_type()?;

                self.check_element(elem, elem_pos)?;
                self.expect(Token::RBracket, "']'")?;

                Ok(self.types().array(len, elem))
            }
            Token::LBrace => {
                let fields = self.parse_struct_body()?;

                Ok(self.types().structure(&fields, false))
            }
            Token::Less => {
                if self.eat(Token::LBrace)? {
                    let fields = self.parse_struct_body()?;

                    self.expect(Token::Greater, "'>'")?;

                    return Ok(self.types().structure(&fields, true));
                }

                let scalable = self.eat_word("vscale")?;

                if scalable {
                    self.expect_word("x")?;
                }

                let len_pos = self.position();
                let len = self.parse_u64("a vector length")?;

                if len == 0 {
                    return Err(ParseError::mismatch(len_pos, "zero element vector is illegal"));
                }

                self.expect_word("x")?;

                let elem_pos = self.position();
                let elem = self.parse_type()?;
                let valid = {
                    let types = self.types();

                    types.int_width(elem).is_some()
                        || types.float_kind(elem).is_some()
                        || types.is_pointer(elem)
                };

                if !valid {
                    return Err(ParseError::mismatch(elem_pos, "invalid vector element type"));
                }

                self.expect(Token::Greater, "'>'")?;

                Ok(self.types().vector(len, elem, scalable))
            }
            _ => Err(ParseError::syntax(pair.pos, "a type", pair.tok.describe())),
        }
    }

    fn parse_keyword_type(&mut self, word: &str, pos: SourcePos) -> ParseResult<Type> {
        let ty = match word {
            "void" => self.types().void(),
            "label" => self.types().label(),
            "metadata" => self.types().metadata(),
            "token" => self.types().token(),
            "x86_mmx" => self.types().intern(TypeData::X86Mmx),
            "ptr" => {
                let space = self.parse_opt_addrspace()?.unwrap_or(0);

                self.types().pointer(None, space)
            }
            _ => match FloatKind::from_keyword(word) {
                Some(kind) => self.types().float(kind),
                None => return Err(ParseError::syntax(pos, "a type", format!("keyword '{word}'"))),
            },
        };

        Ok(ty)
    }

    // everything after the opening `{` of a struct, up to and including the `}`
    fn parse_struct_body(&mut self) -> ParseResult<SmallVec<[Type; 4]>> {
        let mut fields = SmallVec::new();

        if self.eat(Token::RBrace)? {
            return Ok(fields);
        }

        loop {
            let pos = self.position();
            let field = self.parse_type()?;

            self.check_element(field, pos)?;
            fields.push(field);

            if !self.eat(Token::Comma)? {
                break;
            }
        }

        self.expect(Token::RBrace, "'}'")?;

        Ok(fields)
    }

    // everything after the return type of a function type, `(params)`
    fn parse_function_type(&mut self, ret: Type, pos: SourcePos) -> ParseResult<Type> {
        {
            let types = self.types();

            if types.is_label(ret) || types.is_metadata(ret) {
                return Err(ParseError::mismatch(pos, "invalid function return type"));
            }
        }

        self.expect(Token::LParen, "'('")?;

        let mut params = SmallVec::<[Type; 4]>::new();
        let mut vararg = false;

        if !self.eat(Token::RParen)? {
            loop {
                if self.eat(Token::Ellipsis)? {
                    vararg = true;

                    break;
                }

                let param_pos = self.position();
                let param = self.parse_type()?;

                if self.types().is_void(param) {
                    return Err(ParseError::mismatch(param_pos, "argument can not have void type"));
                }

                params.push(param);

                if !self.eat(Token::Comma)? {
                    break;
                }
            }

            self.expect(Token::RParen, "')'")?;
        }

        Ok(self.types().function(ret, &params, vararg))
    }

    fn pointer_to(&mut self, pointee: Type, space: u32, pos: SourcePos) -> ParseResult<Type> {
        let types = self.types();

        if types.is_void(pointee) || types.is_label(pointee) || types.is_metadata(pointee) {
            return Err(ParseError::mismatch(pos, "pointer to this type is invalid, use i8* instead"));
        }

        Ok(types.pointer(Some(pointee), space))
    }

    // members of arrays and structs have to have a size
    fn check_element(&mut self, ty: Type, pos: SourcePos) -> ParseResult<()> {
        let invalid = {
            let types = self.types();

            types.is_void(ty)
                || types.is_label(ty)
                || types.is_metadata(ty)
                || types.function_info(ty).is_some()
        };

        if invalid {
            return Err(ParseError::mismatch(pos, "invalid element type"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Ident;
    use crate::reader::parse::tests::parse_error;
    use crate::reader::parse::ParsedModule;

    fn parse_ty(text: &str) -> (ParsedModule, Type) {
        let mut parser = Parser::new(text);
        let ty = parser.parse_type().expect("type failed to parse");

        assert!(parser.peek().unwrap().is_none(), "leftover tokens in '{text}'");

        let parsed = ParsedModule {
            module: parser.module,
            pending: parser.pending,
            sites: parser.sites,
        };

        (parsed, ty)
    }

    #[test]
    fn primitives() {
        let (parsed, ty) = parse_ty("i32");

        assert_eq!(parsed.module.types().int_width(ty), Some(32));

        let (parsed, ty) = parse_ty("x86_fp80");

        assert_eq!(parsed.module.types().float_kind(ty), Some(FloatKind::X86Fp80));
    }

    #[test]
    fn pointer_suffixes() {
        let (parsed, ty) = parse_ty("i8 addrspace(3)**");
        let types = parsed.module.types();
        let inner = types.pointee(ty).unwrap();

        assert_eq!(types.addrspace(ty), Some(0));
        assert_eq!(types.addrspace(inner), Some(3));
        assert_eq!(types.int_width(types.pointee(inner).unwrap()), Some(8));
    }

    #[test]
    fn opaque_pointers() {
        let (parsed, ty) = parse_ty("ptr addrspace(1)");
        let types = parsed.module.types();

        assert_eq!(types.pointee(ty), None);
        assert_eq!(types.addrspace(ty), Some(1));
    }

    #[test]
    fn function_types() {
        let (parsed, ty) = parse_ty("i32 (i8*, ...)*");
        let types = parsed.module.types();
        let func = types.pointee(ty).unwrap();
        let (ret, params, vararg) = types.function_info(func).unwrap();

        assert_eq!(types.int_width(ret), Some(32));
        assert_eq!(params.len(), 1);
        assert!(vararg);
    }

    #[test]
    fn aggregates() {
        let (parsed, ty) = parse_ty("{ [4 x <2 x float>], <{ i8, i16 }>, <vscale x 4 x i32> }");
        let types = parsed.module.types();

        match types.data(ty) {
            TypeData::Struct { fields, packed } => {
                assert!(!packed);
                assert_eq!(fields.len(), 3);
                assert!(matches!(types.data(fields[0]), TypeData::Array { len: 4, .. }));
                assert!(matches!(types.data(fields[1]), TypeData::Struct { packed: true, .. }));
                assert!(matches!(
                    types.data(fields[2]),
                    TypeData::Vector {
                        len: 4,
                        scalable: true,
                        ..
                    }
                ));
            }
            other => panic!("expected a struct, got {other:?}"),
        }
    }

    #[test]
    fn named_types_record_first_use() {
        let (parsed, ty) = parse_ty("%\"my type\"*");
        let types = parsed.module.types();
        let named = types.find_named(&Ident::Name("my type".into())).unwrap();

        assert!(types.is_pointer(ty));
        assert_eq!(parsed.sites.get(Site::TypeUse(named)), SourcePos::start());
    }

    #[test]
    fn invalid_types() {
        assert!(matches!(parse_error("@x = global void* null"), ParseError::TypeMismatch { .. }));
        assert!(matches!(parse_error("@x = global <0 x i32> zeroinitializer"), ParseError::TypeMismatch { .. }));
        assert!(matches!(parse_error("@x = global [2 x label] zeroinitializer"), ParseError::TypeMismatch { .. }));
    }
}
