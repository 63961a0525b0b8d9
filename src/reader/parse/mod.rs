//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! The recursive-descent grammar. Every category of syntax gets its own
//! file with its own `impl Parser` block.

mod attributes;
mod checks;
mod constants;
mod functions;
mod globals;
mod instructions;
mod metadata;
mod terminators;
mod types;

pub(crate) use attributes::AttrContext;

use crate::ir::{Ident, Module, Placeholder, SlotCounter, Type, TypeContext};
use crate::reader::resolve::{PendingRefs, Scope, Site, Sites};
use crate::reader::{Cursor, Name, ParseError, ParseResult, SourcePos, TokPair, Token};
use crate::utility::unescape;

/// Everything the parser hands to the resolver.
#[derive(Debug)]
pub(crate) struct ParsedModule {
    pub(crate) module: Module,
    pub(crate) pending: PendingRefs,
    pub(crate) sites: Sites,
}

/// Parses a stream of tokens into a module with unresolved references.
#[derive(Debug)]
pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    module: Module,
    pending: PendingRefs,
    sites: Sites,
    global_slots: SlotCounter,
    type_slots: SlotCounter,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            module: Module::new(),
            pending: PendingRefs::default(),
            sites: Sites::default(),
            global_slots: SlotCounter::new(),
            type_slots: SlotCounter::new(),
        }
    }

    /// Parses top-level entities until the source runs out.
    pub(crate) fn parse(mut self) -> ParseResult<ParsedModule> {
        while let Some(pair) = self.peek()? {
            match pair.tok {
                Token::Word("source_filename" | "target" | "module") => self.parse_directive()?,
                Token::Word("define") => self.parse_function(true)?,
                Token::Word("declare") => self.parse_function(false)?,
                Token::Word("attributes") => self.parse_attr_group()?,
                Token::Local(_) => self.parse_type_def()?,
                Token::Global(_) => self.parse_global()?,
                Token::Comdat(_) => self.parse_comdat()?,
                Token::MetaId(_) => self.parse_metadata_def()?,
                Token::MetaName(_) => self.parse_named_metadata()?,
                _ => return self.unexpected("a top-level entity"),
            }
        }

        Ok(ParsedModule {
            module: self.module,
            pending: self.pending,
            sites: self.sites,
        })
    }

    fn types(&mut self) -> &mut TypeContext {
        self.module.types_mut()
    }

    fn peek(&mut self) -> ParseResult<Option<TokPair<'a>>> {
        Ok(self.cursor.peek()?)
    }

    fn peek_tok(&mut self) -> ParseResult<Option<Token<'a>>> {
        Ok(self.cursor.peek()?.map(|pair| pair.tok))
    }

    fn peek_nth_tok(&mut self, k: usize) -> ParseResult<Option<Token<'a>>> {
        Ok(self.cursor.peek_nth(k)?.map(|pair| pair.tok))
    }

    // the keyword text of the next token, for both plain words and opcodes
    fn peek_keyword(&mut self) -> ParseResult<Option<&'a str>> {
        Ok(self.peek_tok()?.and_then(Token::keyword))
    }

    fn position(&mut self) -> SourcePos {
        self.cursor.position()
    }

    fn bump(&mut self) -> ParseResult<()> {
        self.cursor.next()?;

        Ok(())
    }

    // consumes the next token, failing at the end of the source
    fn next_pair(&mut self, expected: &str) -> ParseResult<TokPair<'a>> {
        match self.cursor.next()? {
            Some(pair) => Ok(pair),
            None => Err(ParseError::syntax(
                self.cursor.position(),
                expected,
                "end of input",
            )),
        }
    }

    fn unexpected<T>(&mut self, expected: &str) -> ParseResult<T> {
        let pos = self.position();
        let found = match self.peek()? {
            Some(pair) => pair.tok.describe(),
            None => "end of input".to_owned(),
        };

        Err(ParseError::syntax(pos, expected, found))
    }

    fn eat(&mut self, tok: Token<'_>) -> ParseResult<bool> {
        if self.peek_tok()? == Some(tok) {
            self.bump()?;

            return Ok(true);
        }

        Ok(false)
    }

    fn expect(&mut self, tok: Token<'_>, expected: &str) -> ParseResult<SourcePos> {
        let pos = self.position();

        if self.eat(tok)? {
            Ok(pos)
        } else {
            self.unexpected(expected)
        }
    }

    fn eat_word(&mut self, word: &str) -> ParseResult<bool> {
        if self.peek_keyword()? == Some(word) {
            self.bump()?;

            return Ok(true);
        }

        Ok(false)
    }

    fn expect_word(&mut self, word: &str) -> ParseResult<()> {
        if self.eat_word(word)? {
            Ok(())
        } else {
            self.unexpected(&format!("'{word}'"))
        }
    }

    // consumes the next token if it spells a keyword of some keyword enum
    fn eat_keyword<K>(&mut self, lookup: impl Fn(&str) -> Option<K>) -> ParseResult<Option<K>> {
        let found = self.peek_keyword()?.and_then(lookup);

        if found.is_some() {
            self.bump()?;
        }

        Ok(found)
    }

    fn expect_keyword<K>(
        &mut self,
        lookup: impl Fn(&str) -> Option<K>,
        expected: &str,
    ) -> ParseResult<K> {
        match self.eat_keyword(lookup)? {
            Some(k) => Ok(k),
            None => self.unexpected(expected),
        }
    }

    // runs `rule` speculatively: what it reads stays consumed only if it
    // returns `Some`, otherwise the cursor rewinds to where it started.
    // `rule` must not build anything before it knows it matches
    fn speculate<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> ParseResult<Option<T>>,
    ) -> ParseResult<Option<T>> {
        let cp = self.cursor.checkpoint();

        match rule(self) {
            Ok(None) => {
                self.cursor.restore(cp);

                Ok(None)
            }
            result => {
                self.cursor.commit(cp);

                result
            }
        }
    }

    // `, word`, consuming both tokens only if both are there
    fn eat_comma_word(&mut self, word: &str) -> ParseResult<bool> {
        let found = self.speculate(|p| Ok((p.eat(Token::Comma)? && p.eat_word(word)?).then_some(())))?;

        Ok(found.is_some())
    }

    // `, !kind` starts the trailing metadata attachments of an instruction
    // or global, which every comma-separated list has to stop in front of
    fn at_attachment(&mut self) -> ParseResult<bool> {
        Ok(self.peek_tok()? == Some(Token::Comma)
            && matches!(self.peek_nth_tok(1)?, Some(Token::MetaName(_))))
    }

    fn parse_u64(&mut self, expected: &str) -> ParseResult<u64> {
        let pair = self.next_pair(expected)?;

        match pair.tok {
            Token::Int(text) => text
                .parse()
                .map_err(|_| ParseError::syntax(pair.pos, expected, pair.tok.describe())),
            _ => Err(ParseError::syntax(pair.pos, expected, pair.tok.describe())),
        }
    }

    fn parse_u32(&mut self, expected: &str) -> ParseResult<u32> {
        let pos = self.position();
        let value = self.parse_u64(expected)?;

        u32::try_from(value).map_err(|_| ParseError::syntax(pos, expected, value.to_string()))
    }

    fn parse_string(&mut self, expected: &str) -> ParseResult<Vec<u8>> {
        let pair = self.next_pair(expected)?;

        match pair.tok {
            Token::Str(body) => self.decode(body, pair.pos),
            _ => Err(ParseError::syntax(pair.pos, expected, pair.tok.describe())),
        }
    }

    // the lexer has already validated every escape, this only fails on
    // text that didn't come from the lexer
    fn decode(&self, body: &str, pos: SourcePos) -> ParseResult<Vec<u8>> {
        unescape(body).map_err(|_| ParseError::syntax(pos, "a valid escape sequence", body))
    }

    fn decode_name(&self, body: &str, pos: SourcePos) -> ParseResult<String> {
        let bytes = self.decode(body, pos)?;

        String::from_utf8(bytes)
            .map_err(|_| ParseError::syntax(pos, "a UTF-8 name", format!("\"{body}\"")))
    }

    fn ident(&self, name: Name<'_>, pos: SourcePos) -> ParseResult<Ident> {
        match name {
            Name::Bare(text) => Ok(Ident::Name(text.to_owned())),
            Name::Quoted(body) => self.decode_name(body, pos).map(Ident::Name),
            Name::Id(id) => Ok(Ident::Id(id)),
        }
    }

    // a numbered definition has to be the next number of its scope
    fn check_slot(slots: &mut SlotCounter, ident: &Ident, sigil: char, pos: SourcePos) -> ParseResult<()> {
        if let Ident::Id(id) = ident {
            let next = slots.peek();

            if *id != next {
                return Err(ParseError::syntax(
                    pos,
                    format!("'{sigil}{next}'"),
                    format!("'{sigil}{id}'"),
                ));
            }

            slots.take();
        }

        Ok(())
    }

    fn register(&mut self, scope: Scope, ident: Ident, pos: SourcePos, expected: Option<Type>) -> Placeholder {
        self.pending.register(scope, ident, pos, expected)
    }

    fn record(&mut self, site: Site, pos: SourcePos) {
        self.sites.record(site, pos);
    }

    // `addrspace(N)`, if it's there
    fn parse_opt_addrspace(&mut self) -> ParseResult<Option<u32>> {
        if !self.eat_word("addrspace")? {
            return Ok(None);
        }

        self.expect(Token::LParen, "'('")?;

        let space = self.parse_u32("an address space")?;

        self.expect(Token::RParen, "')'")?;

        Ok(Some(space))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn parse_unresolved(source: &str) -> ParsedModule {
        Parser::new(source).parse().expect("parse failed")
    }

    pub(crate) fn parse_error(source: &str) -> ParseError {
        Parser::new(source).parse().expect_err("parse succeeded")
    }

    #[test]
    fn empty_source_is_an_empty_module() {
        let parsed = parse_unresolved("; nothing here\n\n");

        assert!(parsed.module.entities().is_empty());
        assert_eq!(parsed.pending.len(), 0);
    }

    #[test]
    fn failed_speculation_rewinds() {
        let mut parser = Parser::new(", align 4 , 7");

        assert!(!parser.eat_comma_word("section").unwrap());
        assert_eq!(parser.position().col, 1);
        assert!(parser.eat_comma_word("align").unwrap());
        assert_eq!(parser.peek_tok().unwrap(), Some(Token::Int("4")));

        parser.bump().unwrap();

        assert_eq!(parser.parse_const_indices().unwrap(), vec![7]);
        assert_eq!(parser.peek_tok().unwrap(), None);
    }

    #[test]
    fn indices_stop_in_front_of_attachments() {
        let mut parser = Parser::new(", 1, 2, !dbg !0");

        assert_eq!(parser.parse_const_indices().unwrap(), vec![1, 2]);
        assert_eq!(parser.peek_tok().unwrap(), Some(Token::Comma));
        assert!(parser.at_attachment().unwrap());
    }

    #[test]
    fn quoted_names_must_decode_to_utf8() {
        let parsed = parse_unresolved("@\"\\C3\\A9\" = global i32 0\n");
        let (_, global) = parsed.module.globals().next().unwrap();

        assert_eq!(global.name(), &Ident::Name("\u{e9}".into()));

        match parse_error("@\"\\FF\" = global i32 0\n") {
            ParseError::Syntax { pos, expected, found } => {
                assert_eq!((pos.line, pos.col), (1, 1));
                assert_eq!(expected, "a UTF-8 name");
                assert_eq!(found, "\"\\FF\"");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_top_level_entity() {
        let err = parse_error("foo bar");

        assert_eq!(
            err,
            ParseError::Syntax {
                pos: SourcePos::start(),
                expected: "a top-level entity".into(),
                found: "keyword 'foo'".into(),
            }
        );
    }

    #[test]
    fn numbered_globals_must_be_sequential() {
        let err = parse_error("@0 = global i32 0\n@2 = global i32 1\n");

        match err {
            ParseError::Syntax { expected, found, pos } => {
                assert_eq!(expected, "'@1'");
                assert_eq!(found, "'@2'");
                assert_eq!(pos.line, 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
