use std::fmt::Debug;

use crate::lexeme::Lexicon;
use crate::scanner::Scanner;
use crate::token::{Span, Token};
use crate::LexerError;

/// Per-format tokenizing strategy.
///
/// A format supplies its lexicon and decides, one token at a time, which
/// scanner read to use. Returning `Ok(None)` ends the stream.
pub trait TokenRules {
    type Kind: Copy + PartialEq + Debug;
    type Lexicon: Lexicon;

    /// The lexicon the scanner should classify characters with.
    fn lexicon(&self) -> Self::Lexicon;

    /// Produce the next token, or `None` once the input is exhausted.
    fn next_token(
        &mut self,
        scanner: &mut Scanner<Self::Lexicon>,
    ) -> Result<Option<Token<Self::Kind>>, LexerError>;
}

/// Drives a [`TokenRules`] strategy over a [`Scanner`].
///
/// Yields tokens in source order. Stops for good after the rules report the
/// end or after the first error; build a new tokenizer to scan again.
pub struct Tokenizer<R: TokenRules> {
    scanner: Scanner<R::Lexicon>,
    rules: R,
    finished: bool,
}

impl<R: TokenRules> Tokenizer<R> {
    pub fn new(source: &str, rules: R) -> Self {
        Self {
            scanner: Scanner::new(source, rules.lexicon()),
            rules,
            finished: false,
        }
    }

    /// Empty span at the end of the input, for synthetic terminal tokens.
    pub fn end_span(&self) -> Span {
        let end = self.scanner.position() + self.scanner.remaining();
        let (line, column) = self.scanner.location(end);
        Span::new(end, end, line, column)
    }

    /// Collect every token.
    ///
    /// When `eof_token` is given it is appended unless the last token already
    /// has its kind, so the sequence always ends with a terminal token.
    pub fn tokenize(
        mut self,
        eof_token: Option<Token<R::Kind>>,
        reserve_hint: usize,
    ) -> Result<Vec<Token<R::Kind>>, LexerError> {
        let mut tokens = Vec::with_capacity(reserve_hint);
        for token in self.by_ref() {
            tokens.push(token?);
        }

        if let Some(eof) = eof_token {
            if tokens.last().map_or(true, |last| last.kind != eof.kind) {
                tokens.push(eof);
            }
        }

        tracing::debug!(count = tokens.len(), "tokenized input");
        Ok(tokens)
    }
}

impl<R: TokenRules> Iterator for Tokenizer<R> {
    type Item = Result<Token<R::Kind>, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.rules.next_token(&mut self.scanner) {
            Ok(Some(token)) => {
                tracing::trace!(kind = ?token.kind, start = token.span.start, "token");
                Some(Ok(token))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
