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

impl<'a> Parser<'a> {
    /// Parses one metadata operand: `!N`, `!"str"`, `!{...}`, `!DIFoo(...)`,
    /// `null` or a typed value.
    pub(super) fn parse_md_operand(&mut self, func: Option<Global>) -> ParseResult<Metadata> {
        let pos = self.position();

        match self.peek_tok()? {
            Some(Token::MetaId(id)) => {
                self.bump()?;

                let placeholder = self.register(Scope::Metadata, Ident::Id(id), pos, None);

                Ok(Metadata::Node(Ref::Pending(placeholder)))
            }
            Some(Token::MetaString(body)) => {
                self.bump()?;
                self.decode(body, pos).map(Metadata::String)
            }
            Some(Token::Word("null")) => {
                self.bump()?;

                Ok(Metadata::Null)
            }
            Some(Token::Word("distinct")) | Some(Token::Exclaim) | Some(Token::MetaName(_)) => {
                let node = self.parse_md_node(func)?;

                Ok(Metadata::Inline(Box::new(node)))
            }
            _ => self.parse_typed_value(func).map(Metadata::Value),
        }
    }

    // `[distinct] !{...}` or `[distinct] !Name(...)`
    fn parse_md_node(&mut self, func: Option<Global>) -> ParseResult<MdNodeData> {
        let distinct = self.eat_word("distinct")?;
        let pair = self.next_pair("a metadata node")?;

        let kind = match pair.tok {
            Token::Exclaim => {
                self.expect(Token::LBrace, "'{'")?;

                MdNodeKind::Tuple(self.parse_md_tuple(func)?)
            }
            Token::MetaName(name) => {
                let name = self.decode_name(name, pair.pos)?;

                self.expect(Token::LParen, "'('")?;

                let fields = self.parse_md_fields(func)?;

                MdNodeKind::Specialized { name, fields }
            }
            _ => return Err(ParseError::syntax(pair.pos, "a metadata node", pair.tok.describe())),
        };

        Ok(MdNodeData { distinct, kind })
    }

    // everything after `!{`
    fn parse_md_tuple(&mut self, func: Option<Global>) -> ParseResult<Vec<Metadata>> {
        let mut elems = Vec::new();

        if self.eat(Token::RBrace)? {
            return Ok(elems);
        }

        loop {
            elems.push(self.parse_md_operand(func)?);

            if !self.eat(Token::Comma)? {
                break;
            }
        }

        self.expect(Token::RBrace, "'}'")?;

        Ok(elems)
    }

    // everything after `!Name(`
    fn parse_md_fields(&mut self, func: Option<Global>) -> ParseResult<Vec<MdField>> {
        let mut fields = Vec::new();

        if self.eat(Token::RParen)? {
            return Ok(fields);
        }

        loop {
            let name = match self.peek()? {
                Some(pair) => match pair.tok {
                    Token::Label(name) => {
                        self.bump()?;

                        match self.ident(name, pair.pos)? {
                            Ident::Name(name) => Some(name),
                            Ident::Id(id) => Some(id.to_string()),
                        }
                    }
                    _ => None,
                },
                None => None,
            };

            let value = self.parse_md_field_value(func)?;

            fields.push(MdField { name, value });

            if !self.eat(Token::Comma)? {
                break;
            }
        }

        self.expect(Token::RParen, "')'")?;

        Ok(fields)
    }

    fn parse_md_field_value(&mut self, func: Option<Global>) -> ParseResult<MdFieldValue> {
        let pos = self.position();
        let pair = match self.peek()? {
            Some(pair) => pair,
            None => return self.unexpected("a metadata field"),
        };

        let value = match pair.tok {
            Token::Int(text) => {
                self.bump()?;

                let value = text
                    .parse()
                    .map_err(|_| ParseError::syntax(pos, "a metadata integer", pair.tok.describe()))?;

                MdFieldValue::Int(value)
            }
            Token::Str(body) => {
                self.bump()?;

                MdFieldValue::Str(self.decode(body, pos)?)
            }
            Token::Word("true") | Token::Word("false") => {
                self.bump()?;

                MdFieldValue::Bool(pair.tok == Token::Word("true"))
            }
            Token::Word("null") => {
                self.bump()?;

                MdFieldValue::Metadata(Metadata::Null)
            }
            Token::Word("distinct") => MdFieldValue::Metadata(self.parse_md_operand(func)?),
            Token::Word(word) => {
                self.bump()?;

                if self.peek_tok()? != Some(Token::Bar) {
                    return Ok(MdFieldValue::Word(word.to_owned()));
                }

                let mut flags = vec![word.to_owned()];

                while self.eat(Token::Bar)? {
                    let flag_pair = self.next_pair("a flag")?;

                    match flag_pair.tok {
                        Token::Word(flag) => flags.push(flag.to_owned()),
                        Token::Int(flag) => flags.push(flag.to_owned()),
                        _ => return Err(ParseError::syntax(flag_pair.pos, "a flag", flag_pair.tok.describe())),
                    }
                }

                MdFieldValue::Flags(flags)
            }
            _ => MdFieldValue::Metadata(self.parse_md_operand(func)?),
        };

        Ok(value)
    }

    /// `!N = [distinct] node`
    pub(super) fn parse_metadata_def(&mut self) -> ParseResult<()> {
        let pair = self.next_pair("a metadata id")?;
        let id = match pair.tok {
            Token::MetaId(id) => id,
            _ => return Err(ParseError::syntax(pair.pos, "a metadata id", pair.tok.describe())),
        };

        self.expect(Token::Equal, "'='")?;

        let node = self.parse_md_node(None)?;
        let key = self.module.push_metadata(MetadataDef { id, node });

        self.record(Site::Metadata(key), pair.pos);

        Ok(())
    }

    /// `!name = !{!0, !1, ...}`
    pub(super) fn parse_named_metadata(&mut self) -> ParseResult<()> {
        let pair = self.next_pair("a metadata name")?;
        let name = match pair.tok {
            Token::MetaName(name) => self.decode_name(name, pair.pos)?,
            _ => return Err(ParseError::syntax(pair.pos, "a metadata name", pair.tok.describe())),
        };

        self.expect(Token::Equal, "'='")?;
        self.expect(Token::Exclaim, "'!'")?;
        self.expect(Token::LBrace, "'{'")?;

        let mut nodes = Vec::new();

        if !self.eat(Token::RBrace)? {
            loop {
                let node_pair = self.next_pair("a metadata id")?;

                match node_pair.tok {
                    Token::MetaId(id) => {
                        let placeholder = self.register(Scope::Metadata, Ident::Id(id), node_pair.pos, None);

                        nodes.push(Ref::Pending(placeholder));
                    }
                    _ => {
                        return Err(ParseError::syntax(
                            node_pair.pos,
                            "a metadata id",
                            node_pair.tok.describe(),
                        ))
                    }
                }

                if !self.eat(Token::Comma)? {
                    break;
                }
            }

            self.expect(Token::RBrace, "'}'")?;
        }

        self.module.push_named_metadata(NamedMetadata { name, nodes });

        Ok(())
    }

    /// `!kind !N`, one metadata attachment
    pub(super) fn parse_attachment(&mut self, func: Option<Global>) -> ParseResult<Attachment> {
        let pair = self.next_pair("a metadata attachment")?;
        let kind = match pair.tok {
            Token::MetaName(kind) => self.decode_name(kind, pair.pos)?,
            _ => return Err(ParseError::syntax(pair.pos, "a metadata attachment", pair.tok.describe())),
        };

        let node = match self.peek_tok()? {
            Some(Token::MetaId(_) | Token::Exclaim | Token::MetaName(_) | Token::Word("distinct")) => {
                self.parse_md_operand(func)?
            }
            _ => return self.unexpected("a metadata node"),
        };

        Ok(Attachment { kind, node })
    }

    // `, !kind !N` repeated, after an instruction or global
    pub(super) fn parse_trailing_attachments(&mut self, func: Option<Global>) -> ParseResult<Vec<Attachment>> {
        let mut attachments = Vec::new();

        while self.at_attachment()? {
            self.bump()?;

            attachments.push(self.parse_attachment(func)?);
        }

        Ok(attachments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse::tests::{parse_error, parse_unresolved};

    #[test]
    fn tuples_and_strings() {
        let parsed = parse_unresolved("!0 = !{!\"a\\00b\", null, i32 7, !1}\n!1 = distinct !{}\n");
        let (_, def) = parsed.module.metadata_nodes().next().unwrap();

        assert_eq!(def.id, 0);
        assert!(!def.node.distinct);

        match &def.node.kind {
            MdNodeKind::Tuple(elems) => {
                assert_eq!(elems.len(), 4);
                assert_eq!(elems[0], Metadata::String(b"a\0b".to_vec()));
                assert_eq!(elems[1], Metadata::Null);
                assert!(matches!(elems[2], Metadata::Value(_)));
                assert!(matches!(elems[3], Metadata::Node(Ref::Pending(_))));
            }
            other => panic!("expected a tuple, got {other:?}"),
        }
    }

    #[test]
    fn specialized_nodes() {
        let parsed = parse_unresolved(
            "!0 = !DIBasicType(name: \"int\", size: 32, encoding: DW_ATE_signed, flags: DIFlagA | DIFlagB)\n\
             !1 = !DIExpression(DW_OP_plus_uconst, 8)\n",
        );

        let defs: Vec<_> = parsed.module.metadata_nodes().map(|(_, def)| def.clone()).collect();

        match &defs[0].node.kind {
            MdNodeKind::Specialized { name, fields } => {
                assert_eq!(name, "DIBasicType");
                assert_eq!(fields[0].name.as_deref(), Some("name"));
                assert_eq!(fields[1].value, MdFieldValue::Int(32));
                assert_eq!(fields[2].value, MdFieldValue::Word("DW_ATE_signed".into()));
                assert_eq!(
                    fields[3].value,
                    MdFieldValue::Flags(vec!["DIFlagA".into(), "DIFlagB".into()])
                );
            }
            other => panic!("expected a specialized node, got {other:?}"),
        }

        match &defs[1].node.kind {
            MdNodeKind::Specialized { fields, .. } => {
                assert!(fields.iter().all(|f| f.name.is_none()));
                assert_eq!(fields[1].value, MdFieldValue::Int(8));
            }
            other => panic!("expected a specialized node, got {other:?}"),
        }
    }

    #[test]
    fn named_metadata() {
        let parsed = parse_unresolved("!llvm.ident = !{!0, !1}\n!0 = !{}\n!1 = !{}\n");

        assert_eq!(parsed.module.named_metadata()[0].name, "llvm.ident");
        assert_eq!(parsed.module.named_metadata()[0].nodes.len(), 2);
    }

    #[test]
    fn named_metadata_only_holds_nodes() {
        assert!(matches!(
            parse_error("!named = !{!\"str\"}"),
            ParseError::Syntax { .. }
        ));
    }
}
