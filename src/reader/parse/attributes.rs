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
use crate::ir::*;
use crate::reader::resolve::{Scope, Site};
use crate::reader::{ParseError, ParseResult, Token};

/// Where an attribute list is being parsed. This decides which spellings
/// are accepted and what ends the list.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum AttrContext {
    /// Parameter, argument or return attributes
    Param,
    /// Function attributes after a parameter list, where `#N` is allowed and
    /// `align N` belongs to the function header instead
    Function,
    /// The inside of an `attributes #N = { ... }` group
    Group,
}

impl<'a> Parser<'a> {
    /// Parses attributes until something that isn't one shows up.
    pub(super) fn parse_attrs(&mut self, ctx: AttrContext) -> ParseResult<Vec<Attribute>> {
        let mut attrs = Vec::new();

        while let Some(attr) = self.parse_attr(ctx)? {
            attrs.push(attr);
        }

        Ok(attrs)
    }

    fn parse_attr(&mut self, ctx: AttrContext) -> ParseResult<Option<Attribute>> {
        let pos = self.position();
        let tok = match self.peek_tok()? {
            Some(tok) => tok,
            None => return Ok(None),
        };

        let word = match tok {
            Token::Str(key) => {
                self.bump()?;

                let key = self.decode(key, pos)?;
                let value = if self.eat(Token::Equal)? {
                    Some(self.parse_string("an attribute value")?)
                } else {
                    None
                };

                return Ok(Some(Attribute::String { key, value }));
            }
            Token::AttrGroupId(id) if ctx == AttrContext::Function => {
                self.bump()?;

                let placeholder = self.register(Scope::AttrGroup, Ident::Id(id), pos, None);

                return Ok(Some(Attribute::Group(Ref::Pending(placeholder))));
            }
            Token::Word(word) => word,
            _ => return Ok(None),
        };

        let followed_by_paren = self.peek_nth_tok(1)? == Some(Token::LParen);

        if let Some(kind) = TypeAttrKind::from_keyword(word).filter(|_| followed_by_paren) {
            self.bump()?;
            self.expect(Token::LParen, "'('")?;

            let ty = self.parse_type()?;

            self.expect(Token::RParen, "')'")?;

            return Ok(Some(Attribute::Type(kind, ty)));
        }

        if let Some(kind) = IntAttrKind::from_keyword(word) {
            if kind == IntAttrKind::Align && ctx == AttrContext::Function {
                return Ok(None);
            }

            self.bump()?;

            let value = if self.eat(Token::LParen)? {
                let value = self.parse_u64("an integer")?;

                self.expect(Token::RParen, "')'")?;

                value
            } else if self.eat(Token::Equal)? || kind == IntAttrKind::Align {
                self.parse_u64("an integer")?
            } else {
                return self.unexpected("'('");
            };

            return Ok(Some(Attribute::Int(kind, value)));
        }

        if word == "allocsize" {
            self.bump()?;
            self.expect(Token::LParen, "'('")?;

            let elem_size = self.parse_u32("an argument index")?;
            let count = if self.eat(Token::Comma)? {
                Some(self.parse_u32("an argument index")?)
            } else {
                None
            };

            self.expect(Token::RParen, "')'")?;

            return Ok(Some(Attribute::AllocSize(elem_size, count)));
        }

        match AttrKind::from_keyword(word) {
            Some(kind) => {
                self.bump()?;

                Ok(Some(Attribute::Enum(kind)))
            }
            None if ctx == AttrContext::Group => Err(ParseError::syntax(
                pos,
                "an attribute",
                format!("keyword '{word}'"),
            )),
            None => Ok(None),
        }
    }

    /// `attributes #N = { ... }`
    pub(super) fn parse_attr_group(&mut self) -> ParseResult<()> {
        self.expect_word("attributes")?;

        let pair = self.next_pair("an attribute group id")?;
        let id = match pair.tok {
            Token::AttrGroupId(id) => id,
            _ => return Err(ParseError::syntax(pair.pos, "an attribute group id", pair.tok.describe())),
        };

        self.expect(Token::Equal, "'='")?;
        self.expect(Token::LBrace, "'{'")?;

        let attrs = self.parse_attrs(AttrContext::Group)?;

        self.expect(Token::RBrace, "'}'")?;

        let key = self.module.push_attr_group(AttrGroupDef { id, attrs });

        self.record(Site::AttrGroup(key), pair.pos);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse::tests::{parse_error, parse_unresolved};

    #[test]
    fn group_spellings() {
        let parsed = parse_unresolved(
            "attributes #0 = { nounwind align=16 alignstack(8) \"frame-pointer\"=\"all\" \"flag\" allocsize(0, 1) }",
        );
        let group = parsed.module.attr_groups.values().next().unwrap();

        assert_eq!(group.id, 0);
        assert_eq!(
            group.attrs,
            vec![
                Attribute::Enum(AttrKind::NoUnwind),
                Attribute::Int(IntAttrKind::Align, 16),
                Attribute::Int(IntAttrKind::AlignStack, 8),
                Attribute::String {
                    key: b"frame-pointer".to_vec(),
                    value: Some(b"all".to_vec()),
                },
                Attribute::String {
                    key: b"flag".to_vec(),
                    value: None,
                },
                Attribute::AllocSize(0, Some(1)),
            ]
        );
    }

    #[test]
    fn unknown_attribute_in_group() {
        let err = parse_error("attributes #0 = { bogus }");

        assert!(matches!(err, ParseError::Syntax { found, .. } if found == "keyword 'bogus'"));
    }

    #[test]
    fn param_attributes() {
        let parsed = parse_unresolved("declare void @f(i8* byval(i8) align 4 nonnull, i32 zeroext) #0");
        let (_, func) = parsed.module.functions().next().unwrap();
        let params: Vec<_> = func.params.values().collect();

        assert_eq!(params[0].attrs.len(), 3);
        assert!(matches!(params[0].attrs[0], Attribute::Type(TypeAttrKind::ByVal, _)));
        assert_eq!(params[0].attrs[1], Attribute::Int(IntAttrKind::Align, 4));
        assert_eq!(params[1].attrs, vec![Attribute::Enum(AttrKind::ZExt)]);
        assert!(matches!(func.fn_attrs[0], Attribute::Group(Ref::Pending(_))));
    }
}
