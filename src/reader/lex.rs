//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::ir::Opcode;
use std::fmt;
use thiserror::Error;

/// A position inside of the source text.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct SourcePos {
    /// Byte offset from the start of the source
    pub offset: u32,
    /// 1-based line number
    pub line: u32,
    /// 1-based column, in bytes
    pub col: u32,
}

impl SourcePos {
    /// The position of the first byte of a source.
    pub const fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            col: 1,
        }
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// The identifier following a sigil. Quoted names are kept escaped, the
/// parser decodes them.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum Name<'a> {
    /// `%foo`
    Bare(&'a str),
    /// `%"foo bar"`, the text between the quotes
    Quoted(&'a str),
    /// `%12`
    Id(u32),
}

/// A single lex token.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum Token<'a> {
    /// `%name`
    Local(Name<'a>),
    /// `@name`
    Global(Name<'a>),
    /// `$name`
    Comdat(Name<'a>),
    /// `name:`, `12:` or `"name":`
    Label(Name<'a>),
    /// `!name`, kept escaped
    MetaName(&'a str),
    /// `!12`
    MetaId(u32),
    /// `!"..."`, the text between the quotes
    MetaString(&'a str),
    /// `#12`
    AttrGroupId(u32),
    /// `iN`
    IntType(u32),
    /// An instruction opcode
    Opcode(Opcode),
    /// Any other keyword
    Word(&'a str),
    /// A decimal integer, possibly signed
    Int(&'a str),
    /// `s0x...` or `u0x...`
    HexInt(&'a str),
    /// A decimal floating-point number
    Float(&'a str),
    /// `0x...`, `0xK...`, `0xL...`, `0xM...`, `0xH...` or `0xR...`
    HexFloat(&'a str),
    /// `"..."`, the text between the quotes
    Str(&'a str),
    /// `c"..."`, the text between the quotes
    CStr(&'a str),
    /// `=`
    Equal,
    /// `,`
    Comma,
    /// `*`
    Star,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `|`
    Bar,
    /// `!` on its own, as in `!{`
    Exclaim,
    /// `...`
    Ellipsis,
}

static_assertions::const_assert!(std::mem::size_of::<Token<'static>>() <= 32);

impl<'a> Token<'a> {
    /// Gets the text of a keyword, whether it was classified as an opcode or not.
    pub fn keyword(self) -> Option<&'a str> {
        match self {
            Token::Word(word) => Some(word),
            Token::Opcode(op) => Some(op.keyword()),
            _ => None,
        }
    }

    /// A short human-readable description, used in diagnostics.
    pub fn describe(self) -> String {
        match self {
            Token::Local(name) => format!("local '%{}'", describe_name(name)),
            Token::Global(name) => format!("global '@{}'", describe_name(name)),
            Token::Comdat(name) => format!("comdat '${}'", describe_name(name)),
            Token::Label(name) => format!("label '{}:'", describe_name(name)),
            Token::MetaName(name) => format!("metadata name '!{name}'"),
            Token::MetaId(id) => format!("metadata '!{id}'"),
            Token::MetaString(_) => "metadata string".into(),
            Token::AttrGroupId(id) => format!("attribute group '#{id}'"),
            Token::IntType(width) => format!("type 'i{width}'"),
            Token::Opcode(op) => format!("opcode '{}'", op.keyword()),
            Token::Word(word) => format!("keyword '{word}'"),
            Token::Int(text) | Token::HexInt(text) => format!("integer '{text}'"),
            Token::Float(text) | Token::HexFloat(text) => format!("float '{text}'"),
            Token::Str(_) => "string".into(),
            Token::CStr(_) => "c-string".into(),
            Token::Equal => "'='".into(),
            Token::Comma => "','".into(),
            Token::Star => "'*'".into(),
            Token::LParen => "'('".into(),
            Token::RParen => "')'".into(),
            Token::LBracket => "'['".into(),
            Token::RBracket => "']'".into(),
            Token::LBrace => "'{'".into(),
            Token::RBrace => "'}'".into(),
            Token::Less => "'<'".into(),
            Token::Greater => "'>'".into(),
            Token::Bar => "'|'".into(),
            Token::Exclaim => "'!'".into(),
            Token::Ellipsis => "'...'".into(),
        }
    }
}

fn describe_name(name: Name<'_>) -> String {
    match name {
        Name::Bare(text) => text.into(),
        Name::Quoted(text) => format!("\"{text}\""),
        Name::Id(id) => id.to_string(),
    }
}

/// A token yielded by the lexer, along with where it came from.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct TokPair<'a> {
    /// The raw token data
    pub tok: Token<'a>,
    /// Where the token starts
    pub pos: SourcePos,
    /// The length of the token in bytes
    pub len: u32,
}

/// The different ways lexing can fail.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum LexErrorKind {
    /// A string hit the end of the source before its closing quote
    #[error("unterminated string")]
    UnterminatedString,
    /// A `\` that isn't followed by `\` or two hex digits
    #[error("invalid escape sequence")]
    InvalidEscape,
    /// A byte that can't start any token
    #[error("unexpected character")]
    UnexpectedByte,
    /// A sigil (`%`, `@`, `$`, `#`) not followed by a name or number
    #[error("expected a name or number after '{0}'")]
    MissingName(char),
    /// A numbered identifier or an integer type that doesn't fit in 32 bits
    #[error("number is too large")]
    NumberTooLarge,
}

/// The byte the lexer gave up on.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Found(pub Option<u8>);

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => write!(f, "end of input"),
            Some(b) if b.is_ascii_graphic() => write!(f, "'{}'", b as char),
            Some(b) => write!(f, "byte 0x{b:02X}"),
        }
    }
}

/// An error from the lexer, with the position and the offending byte.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[error("{kind}, found {found}")]
pub struct LexError {
    /// Where the error was detected
    pub pos: SourcePos,
    /// The byte that couldn't be lexed
    pub found: Found,
    /// What went wrong
    pub kind: LexErrorKind,
}

// implements lexicographic string comparisons at compile time
//
// this is equivalent to `Ord<str, str>`, just written in a way that
// is actually usable inside `const` functions
const fn less_than(left: &'static str, right: &'static str) -> bool {
    let left = left.as_bytes();
    let right = right.as_bytes();
    let mut i = 0;
    let min_length = if left.len() > right.len() {
        right.len()
    } else {
        left.len()
    };

    while i < min_length {
        if left[i] != right[i] {
            return left[i] < right[i];
        }

        i += 1;
    }

    left.len() < right.len()
}

const OPCODE_COUNT: usize = Opcode::ALL.len();

// builds the opcode table out of `Opcode::ALL` and insertion-sorts it at
// compile time, which lets the lexer binary-search it
const fn opcode_table() -> [(&'static str, Opcode); OPCODE_COUNT] {
    let mut arr = [("", Opcode::Ret); OPCODE_COUNT];
    let mut i = 0;

    while i < OPCODE_COUNT {
        arr[i] = (Opcode::ALL[i].keyword(), Opcode::ALL[i]);
        i += 1;
    }

    let mut i = 1;

    while i < OPCODE_COUNT {
        let mut j = i;

        while j > 0 && !less_than(arr[j - 1].0, arr[j].0) {
            let tmp = arr[j - 1];
            arr[j - 1] = arr[j];
            arr[j] = tmp;
            j -= 1;
        }

        i += 1;
    }

    arr
}

const SORTED_OPCODES: [(&str, Opcode); OPCODE_COUNT] = opcode_table();

#[inline]
fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'-' | b'$' | b'.' | b'_')
}

#[inline]
fn is_name_char(b: u8) -> bool {
    is_name_start(b) || b.is_ascii_digit()
}

#[inline]
fn is_word_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'_' | b'.' | b'$')
}

/// A lexer that lazily produces tokens. Lexing can be restarted from any
/// position that a previous token started at with [`Lex::resume`].
#[derive(Clone, Debug)]
pub struct Lex<'a> {
    source: &'a str,
    bytes: &'a [u8],
    current: usize,
    line: u32,
    col: u32,
}

impl<'a> Lex<'a> {
    /// Creates a lexer for the beginning of `source`.
    pub fn new(source: &'a str) -> Self {
        Self::resume(source, SourcePos::start())
    }

    /// Creates a lexer that starts at `pos` inside of `source`.
    pub fn resume(source: &'a str, pos: SourcePos) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            current: pos.offset as usize,
            line: pos.line,
            col: pos.col,
        }
    }

    /// The position of the next byte to be lexed.
    pub fn source_pos(&self) -> SourcePos {
        SourcePos {
            offset: self.current as u32,
            line: self.line,
            col: self.col,
        }
    }

    /// Produces the next token. `Ok(None)` means the end of the source has been reached.
    pub fn next_token(&mut self) -> Result<Option<TokPair<'a>>, LexError> {
        self.skip_trivia();

        let pos = self.source_pos();
        let ch = match self.consume_next() {
            Some(ch) => ch,
            None => return Ok(None),
        };

        let tok = match ch {
            b'%' => Token::Local(self.lex_sigiled(b'%', pos)?),
            b'@' => Token::Global(self.lex_sigiled(b'@', pos)?),
            b'$' => Token::Comdat(self.lex_sigiled(b'$', pos)?),
            b'!' => self.lex_metadata(pos)?,
            b'#' => match self.peek_next() {
                Some(b) if b.is_ascii_digit() => Token::AttrGroupId(self.lex_id(pos)?),
                _ => return Err(self.error(LexErrorKind::MissingName('#'))),
            },
            b'"' => {
                let body = self.lex_string_body(pos)?;

                if self.peek_next() == Some(b':') {
                    self.consume_next();

                    Token::Label(Name::Quoted(body))
                } else {
                    Token::Str(body)
                }
            }
            b'c' if self.peek_next() == Some(b'"') => {
                self.consume_next();

                Token::CStr(self.lex_string_body(pos)?)
            }
            b's' | b'u' if self.peek_at(0) == Some(b'0') && self.peek_at(1) == Some(b'x') => {
                self.consume_next();
                self.consume_next();
                self.consume_while(|b| b.is_ascii_hexdigit());

                Token::HexInt(&self.source[pos.offset as usize..self.current])
            }
            b'.' if self.peek_at(0) == Some(b'.') && self.peek_at(1) == Some(b'.') => {
                self.consume_next();
                self.consume_next();

                Token::Ellipsis
            }
            b'0'..=b'9' | b'-' | b'+' => self.lex_number(ch, pos)?,
            b if is_word_start(b) => self.lex_word(pos)?,
            b'=' => Token::Equal,
            b',' => Token::Comma,
            b'*' => Token::Star,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'[' => Token::LBracket,
            b']' => Token::RBracket,
            b'{' => Token::LBrace,
            b'}' => Token::RBrace,
            b'<' => Token::Less,
            b'>' => Token::Greater,
            b'|' => Token::Bar,
            _ => {
                return Err(LexError {
                    pos,
                    found: Found(Some(ch)),
                    kind: LexErrorKind::UnexpectedByte,
                })
            }
        };

        Ok(Some(TokPair {
            tok,
            pos,
            len: (self.current - pos.offset as usize) as u32,
        }))
    }

    // lexes whatever follows `%`, `@` or `$`, the sigil has already been consumed
    fn lex_sigiled(&mut self, sigil: u8, start: SourcePos) -> Result<Name<'a>, LexError> {
        match self.peek_next() {
            Some(b'"') => {
                self.consume_next();

                Ok(Name::Quoted(self.lex_string_body(start)?))
            }
            Some(b) if b.is_ascii_digit() => Ok(Name::Id(self.lex_id(start)?)),
            Some(b) if is_name_start(b) => {
                let begin = self.current;

                self.consume_while(is_name_char);

                Ok(Name::Bare(&self.source[begin..self.current]))
            }
            _ => Err(self.error(LexErrorKind::MissingName(sigil as char))),
        }
    }

    // lexes whatever follows `!`
    fn lex_metadata(&mut self, start: SourcePos) -> Result<Token<'a>, LexError> {
        match self.peek_next() {
            Some(b'"') => {
                self.consume_next();

                Ok(Token::MetaString(self.lex_string_body(start)?))
            }
            Some(b) if b.is_ascii_digit() => Ok(Token::MetaId(self.lex_id(start)?)),
            Some(b) if is_name_start(b) || b == b'\\' => {
                let begin = self.current;

                self.consume_while(|b| is_name_char(b) || b == b'\\');

                Ok(Token::MetaName(&self.source[begin..self.current]))
            }
            _ => Ok(Token::Exclaim),
        }
    }

    // lexes a run of digits into a `u32`
    fn lex_id(&mut self, start: SourcePos) -> Result<u32, LexError> {
        let begin = self.current;

        self.consume_while(|b| b.is_ascii_digit());

        self.source[begin..self.current]
            .parse()
            .map_err(|_| LexError {
                pos: start,
                found: Found(self.bytes.get(begin).copied()),
                kind: LexErrorKind::NumberTooLarge,
            })
    }

    // lexes the body of a string, where the opening quote has been consumed.
    // escapes are validated but not decoded
    fn lex_string_body(&mut self, start: SourcePos) -> Result<&'a str, LexError> {
        let begin = self.current;

        loop {
            match self.peek_next() {
                None => {
                    return Err(LexError {
                        pos: start,
                        found: Found(None),
                        kind: LexErrorKind::UnterminatedString,
                    })
                }
                Some(b'"') => break,
                Some(b'\\') => {
                    let escape = self.source_pos();

                    self.consume_next();

                    match (self.peek_at(0), self.peek_at(1)) {
                        (Some(b'\\'), _) => {
                            self.consume_next();
                        }
                        (Some(hi), Some(lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                            self.consume_next();
                            self.consume_next();
                        }
                        (found, _) => {
                            return Err(LexError {
                                pos: escape,
                                found: Found(found),
                                kind: LexErrorKind::InvalidEscape,
                            })
                        }
                    }
                }
                Some(_) => {
                    self.consume_next();
                }
            }
        }

        let body = &self.source[begin..self.current];

        // closing quote
        self.consume_next();

        Ok(body)
    }

    // lexes integers, floats and numbered labels. the first character has already been consumed
    fn lex_number(&mut self, first: u8, start: SourcePos) -> Result<Token<'a>, LexError> {
        let begin = start.offset as usize;

        if first == b'0' && self.peek_next() == Some(b'x') {
            self.consume_next();

            if let Some(b'K' | b'L' | b'M' | b'H' | b'R') = self.peek_next() {
                self.consume_next();
            }

            if !self.peek_next().map_or(false, |b| b.is_ascii_hexdigit()) {
                return Err(self.error(LexErrorKind::UnexpectedByte));
            }

            self.consume_while(|b| b.is_ascii_hexdigit());

            return Ok(Token::HexFloat(&self.source[begin..self.current]));
        }

        if matches!(first, b'-' | b'+') && !self.peek_next().map_or(false, |b| b.is_ascii_digit()) {
            return Err(LexError {
                pos: start,
                found: Found(Some(first)),
                kind: LexErrorKind::UnexpectedByte,
            });
        }

        self.consume_while(|b| b.is_ascii_digit());

        if self.peek_next() == Some(b'.') {
            self.consume_next();
            self.consume_while(|b| b.is_ascii_digit());

            if let Some(b'e' | b'E') = self.peek_next() {
                let sign = matches!(self.peek_at(1), Some(b'-' | b'+')) as usize;

                if self.peek_at(1 + sign).map_or(false, |b| b.is_ascii_digit()) {
                    for _ in 0..=sign {
                        self.consume_next();
                    }

                    self.consume_while(|b| b.is_ascii_digit());
                }
            }

            return Ok(Token::Float(&self.source[begin..self.current]));
        }

        if first.is_ascii_digit() && self.peek_next() == Some(b':') {
            let text = &self.source[begin..self.current];
            let id = text.parse().map_err(|_| LexError {
                pos: start,
                found: Found(Some(first)),
                kind: LexErrorKind::NumberTooLarge,
            })?;

            self.consume_next();

            return Ok(Token::Label(Name::Id(id)));
        }

        Ok(Token::Int(&self.source[begin..self.current]))
    }

    // lexes keywords, integer types and bare labels, the first character has already been consumed
    fn lex_word(&mut self, start: SourcePos) -> Result<Token<'a>, LexError> {
        let begin = start.offset as usize;

        self.consume_while(is_name_char);

        let full = &self.source[begin..self.current];

        if self.peek_next() == Some(b':') {
            self.consume_next();

            return Ok(Token::Label(Name::Bare(full)));
        }

        if let Some(digits) = full.strip_prefix('i') {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                return digits.parse().map(Token::IntType).map_err(|_| LexError {
                    pos: start,
                    found: Found(Some(b'i')),
                    kind: LexErrorKind::NumberTooLarge,
                });
            }
        }

        // we binary-search the array we sorted at compile time, and use that as our fast
        // lookup for "is this identifier actually an opcode?"
        match SORTED_OPCODES.binary_search_by_key(&full, |(s, _)| *s) {
            Ok(idx) => Ok(Token::Opcode(SORTED_OPCODES[idx].1)),
            Err(_) => Ok(Token::Word(full)),
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(b) = self.peek_next() {
            if b.is_ascii_whitespace() {
                self.consume_next();
            } else if b == b';' {
                // this covers both LF and CRLF
                self.consume_while(|b| b != b'\n');
            } else {
                return;
            }
        }
    }

    fn error(&self, kind: LexErrorKind) -> LexError {
        LexError {
            pos: self.source_pos(),
            found: Found(self.peek_next()),
            kind,
        }
    }

    fn consume_next(&mut self) -> Option<u8> {
        let b = self.bytes.get(self.current).copied()?;

        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }

        self.current += 1;

        Some(b)
    }

    fn consume_while(&mut self, f: impl Fn(u8) -> bool) {
        while let Some(b) = self.peek_next() {
            if f(b) {
                self.consume_next();
            } else {
                return;
            }
        }
    }

    #[inline]
    fn peek_next(&self) -> Option<u8> {
        self.peek_at(0)
    }

    #[inline]
    fn peek_at(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.current + n).copied()
    }
}

impl<'a> Iterator for Lex<'a> {
    type Item = Result<TokPair<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token<'_>> {
        Lex::new(source)
            .map(|pair| pair.expect("lex error").tok)
            .collect()
    }

    fn lex_error(source: &str) -> LexError {
        Lex::new(source)
            .find_map(|pair| pair.err())
            .expect("expected a lex error")
    }

    #[test]
    fn opcode_table_is_sorted() {
        for pair in SORTED_OPCODES.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} >= {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn sigiled_names() {
        assert_eq!(
            tokens(r#"%x @main $c %0 @"a b" %.tmp-1"#),
            [
                Token::Local(Name::Bare("x")),
                Token::Global(Name::Bare("main")),
                Token::Comdat(Name::Bare("c")),
                Token::Local(Name::Id(0)),
                Token::Global(Name::Quoted("a b")),
                Token::Local(Name::Bare(".tmp-1")),
            ]
        );
    }

    #[test]
    fn metadata_tokens() {
        assert_eq!(
            tokens(r#"!0 !dbg !"str" !{ !DILocation !llvm.module.flags"#),
            [
                Token::MetaId(0),
                Token::MetaName("dbg"),
                Token::MetaString("str"),
                Token::Exclaim,
                Token::LBrace,
                Token::MetaName("DILocation"),
                Token::MetaName("llvm.module.flags"),
            ]
        );
    }

    #[test]
    fn labels() {
        assert_eq!(
            tokens(r#"entry: 12: "odd name": for.body:"#),
            [
                Token::Label(Name::Bare("entry")),
                Token::Label(Name::Id(12)),
                Token::Label(Name::Quoted("odd name")),
                Token::Label(Name::Bare("for.body")),
            ]
        );
    }

    #[test]
    fn keywords_opcodes_and_types() {
        assert_eq!(
            tokens("define i32 add x86_fp80 i1 getelementptr inbounds"),
            [
                Token::Word("define"),
                Token::IntType(32),
                Token::Opcode(Opcode::Add),
                Token::Word("x86_fp80"),
                Token::IntType(1),
                Token::Opcode(Opcode::GetElementPtr),
                Token::Word("inbounds"),
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            tokens("42 -7 1.5 -2.5e-3 1.0E10 0x3FF0000000000000 0xK4000 s0x1F u0xff +3"),
            [
                Token::Int("42"),
                Token::Int("-7"),
                Token::Float("1.5"),
                Token::Float("-2.5e-3"),
                Token::Float("1.0E10"),
                Token::HexFloat("0x3FF0000000000000"),
                Token::HexFloat("0xK4000"),
                Token::HexInt("s0x1F"),
                Token::HexInt("u0xff"),
                Token::Int("+3"),
            ]
        );
    }

    #[test]
    fn strings_and_punctuation() {
        assert_eq!(
            tokens(r#"c"hi\0A\00" "a\\b" = , * ( ) [ ] { } < > | ..."#),
            [
                Token::CStr(r"hi\0A\00"),
                Token::Str(r"a\\b"),
                Token::Equal,
                Token::Comma,
                Token::Star,
                Token::LParen,
                Token::RParen,
                Token::LBracket,
                Token::RBracket,
                Token::LBrace,
                Token::RBrace,
                Token::Less,
                Token::Greater,
                Token::Bar,
                Token::Ellipsis,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            tokens("; a comment\nret ; another\n; last"),
            [Token::Opcode(Opcode::Ret)]
        );
    }

    #[test]
    fn positions() {
        let pairs: Vec<_> = Lex::new("define\n  i32 @f").map(|p| p.unwrap()).collect();

        assert_eq!(pairs[0].pos, SourcePos { offset: 0, line: 1, col: 1 });
        assert_eq!(pairs[1].pos, SourcePos { offset: 9, line: 2, col: 3 });
        assert_eq!(pairs[2].pos, SourcePos { offset: 13, line: 2, col: 7 });
        assert_eq!(pairs[2].len, 2);
    }

    #[test]
    fn source_pos_follows_the_last_token() {
        let mut lex = Lex::new("ret\n  void");

        assert_eq!(lex.source_pos(), SourcePos { offset: 0, line: 1, col: 1 });

        lex.next_token().unwrap();
        assert_eq!(lex.source_pos(), SourcePos { offset: 3, line: 1, col: 4 });

        lex.next_token().unwrap();
        assert_eq!(lex.source_pos(), SourcePos { offset: 10, line: 2, col: 7 });
        assert_eq!(lex.next_token(), Ok(None));
    }

    #[test]
    fn resume_continues_from_a_token() {
        let source = "add i32 %x, 1";
        let pairs: Vec<_> = Lex::new(source).map(|p| p.unwrap()).collect();
        let resumed: Vec<_> = Lex::resume(source, pairs[2].pos)
            .map(|p| p.unwrap())
            .collect();

        assert_eq!(resumed, &pairs[2..]);
    }

    #[test]
    fn errors() {
        let err = lex_error(r#"@x = "abc"#);
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.pos.col, 6);

        let err = lex_error(r#""bad \q escape""#);
        assert_eq!(err.kind, LexErrorKind::InvalidEscape);
        assert_eq!(err.pos.col, 6);
        assert_eq!(err.found, Found(Some(b'q')));

        let err = lex_error("ret ^");
        assert_eq!(err.kind, LexErrorKind::UnexpectedByte);
        assert_eq!(err.found, Found(Some(b'^')));

        let err = lex_error("% x");
        assert_eq!(err.kind, LexErrorKind::MissingName('%'));

        let err = lex_error("%99999999999");
        assert_eq!(err.kind, LexErrorKind::NumberTooLarge);
    }

    #[test]
    fn errors_render() {
        let err = lex_error("ret ^");

        assert_eq!(err.to_string(), "unexpected character, found '^'");
    }
}
