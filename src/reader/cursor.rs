//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::reader::{Lex, LexError, SourcePos, TokPair};

/// A saved read position, see [`Cursor::checkpoint`].
#[must_use = "a checkpoint must be restored or committed"]
#[derive(Debug)]
pub struct Checkpoint {
    index: usize,
}

/// A buffered view of the token stream with arbitrary lookahead and the
/// ability to rewind to a saved position.
///
/// Tokens are lexed on demand. While no checkpoint is outstanding, tokens
/// that have already been read are dropped from the buffer.
///
/// ```
/// # use llasm::reader::{Cursor, Token};
/// let mut cursor = Cursor::new("add i32 1, 2");
/// let cp = cursor.checkpoint();
///
/// cursor.next().unwrap();
/// assert_eq!(cursor.peek().unwrap().unwrap().tok, Token::IntType(32));
///
/// cursor.restore(cp);
/// assert_eq!(cursor.peek_nth(3).unwrap().unwrap().tok, Token::Comma);
/// ```
#[derive(Debug)]
pub struct Cursor<'a> {
    lex: Lex<'a>,
    buffer: Vec<TokPair<'a>>,
    // absolute index of `buffer[0]`
    base: usize,
    // absolute index of the next token to be read
    index: usize,
    pinned: usize,
    prev: SourcePos,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            lex: Lex::new(source),
            buffer: Vec::new(),
            base: 0,
            index: 0,
            pinned: 0,
            prev: SourcePos::start(),
        }
    }

    /// Looks at the next token without consuming it.
    pub fn peek(&mut self) -> Result<Option<TokPair<'a>>, LexError> {
        self.peek_nth(0)
    }

    /// Looks `k` tokens ahead without consuming anything, `peek_nth(0)` is [`Self::peek`].
    pub fn peek_nth(&mut self, k: usize) -> Result<Option<TokPair<'a>>, LexError> {
        self.fill(k)?;

        Ok(self.buffer.get(self.index - self.base + k).copied())
    }

    /// Consumes the next token.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<TokPair<'a>>, LexError> {
        let tok = self.peek()?;

        if let Some(pair) = tok {
            self.index += 1;
            self.prev = pair.pos;
            self.compact();
        }

        Ok(tok)
    }

    /// Saves the current read position. Every checkpoint has to be given back
    /// through [`Self::restore`] or [`Self::commit`].
    pub fn checkpoint(&mut self) -> Checkpoint {
        self.pinned += 1;

        Checkpoint { index: self.index }
    }

    /// Rewinds to a saved position.
    pub fn restore(&mut self, cp: Checkpoint) {
        self.index = cp.index;
        self.pinned -= 1;

        let prev = self
            .index
            .checked_sub(self.base + 1)
            .and_then(|i| self.buffer.get(i));

        if let Some(pair) = prev {
            self.prev = pair.pos;
        }
    }

    /// Discards a saved position, keeping everything read since.
    pub fn commit(&mut self, cp: Checkpoint) {
        debug_assert!(cp.index <= self.index);

        self.pinned -= 1;
        self.compact();
    }

    /// The position of the next token, or the end of the source.
    pub fn position(&mut self) -> SourcePos {
        match self.peek() {
            Ok(Some(pair)) => pair.pos,
            _ => self.lex.source_pos(),
        }
    }

    /// The position of the most recently consumed token.
    pub fn prev_position(&self) -> SourcePos {
        self.prev
    }

    fn fill(&mut self, k: usize) -> Result<(), LexError> {
        while self.base + self.buffer.len() <= self.index + k {
            match self.lex.next_token()? {
                Some(pair) => self.buffer.push(pair),
                None => break,
            }
        }

        Ok(())
    }

    fn compact(&mut self) {
        // tokens before `index` can only be revisited through a checkpoint
        if self.pinned == 0 && self.index - self.base >= 64 {
            self.buffer.drain(..self.index - self.base);
            self.base = self.index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{Name, Token};

    #[test]
    fn peek_does_not_consume() {
        let mut cursor = Cursor::new("%x = add");

        assert_eq!(cursor.peek().unwrap().unwrap().tok, Token::Local(Name::Bare("x")));
        assert_eq!(cursor.peek_nth(1).unwrap().unwrap().tok, Token::Equal);
        assert_eq!(cursor.next().unwrap().unwrap().tok, Token::Local(Name::Bare("x")));
        assert_eq!(cursor.next().unwrap().unwrap().tok, Token::Equal);
        assert!(cursor.peek_nth(1).unwrap().is_none());
    }

    #[test]
    fn restore_rewinds_past_compaction() {
        let source = "ret ".repeat(200);
        let mut cursor = Cursor::new(&source);
        let cp = cursor.checkpoint();

        for _ in 0..150 {
            cursor.next().unwrap();
        }

        cursor.restore(cp);

        let mut count = 0;

        while cursor.next().unwrap().is_some() {
            count += 1;
        }

        assert_eq!(count, 200);
    }

    #[test]
    fn commit_keeps_progress() {
        let mut cursor = Cursor::new("a b c");
        let cp = cursor.checkpoint();

        cursor.next().unwrap();
        cursor.commit(cp);

        assert_eq!(cursor.next().unwrap().unwrap().tok, Token::Word("b"));
        assert_eq!(cursor.prev_position().col, 3);
    }

    #[test]
    fn end_position() {
        let mut cursor = Cursor::new("a\n");

        cursor.next().unwrap();

        assert_eq!(cursor.position(), SourcePos { offset: 2, line: 2, col: 1 });
    }

    #[test]
    fn lex_errors_surface_on_peek() {
        let mut cursor = Cursor::new("a ^");

        assert!(cursor.peek_nth(1).is_err());
        assert_eq!(cursor.next().unwrap().unwrap().tok, Token::Word("a"));
    }
}
