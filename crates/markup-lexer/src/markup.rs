//! Tokenizing rules for XML-shaped markup.
//!
//! Every `<...>` run becomes one token (tag, processing instructions or
//! comment), and the text between runs becomes `Value` or `Whitespace`
//! tokens. The rules are lexical only: tag syntax is checked by the parser.

use crate::lexeme::{Lexeme, MarkupLexicon};
use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};
use crate::tokenizer::{TokenRules, Tokenizer};
use crate::{LexErrorKind, LexerError};

/// Lexemes that end a run of text content.
const TEXT_STOP: &[Lexeme] = &[Lexeme::AngleOpen, Lexeme::AngleClose, Lexeme::None];

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Tokenize markup source. The result always ends with an `Eof` token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
    let tokenizer = Tokenizer::new(source, MarkupRules::new());
    let eof = Token::eof(tokenizer.end_span());
    // Rough guess: one token per eight characters.
    tokenizer.tokenize(Some(eof), source.len() / 8)
}

/// [`TokenRules`] for markup documents.
#[derive(Debug, Default)]
pub struct MarkupRules {
    emitted_eof: bool,
}

impl MarkupRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a `<...>` run starting at the cursor.
    fn scan_angle(
        &self,
        scanner: &mut Scanner<MarkupLexicon>,
        start: usize,
    ) -> Result<(TokenKind, String), LexerError> {
        if scanner.starts_with(COMMENT_OPEN) {
            return Ok((TokenKind::Comment, self.scan_comment(scanner, start)?));
        }

        // A `<` before the run's first `>` is a stray bracket, not nesting.
        let mut offset = 1;
        while let Some(c) = scanner.peek_at(offset) {
            match scanner.lexeme_of(c) {
                Lexeme::AngleClose => break,
                Lexeme::AngleOpen => {
                    let tag: String = (0..offset).filter_map(|i| scanner.peek_at(i)).collect();
                    return Err(scanner.error_at(
                        start,
                        LexErrorKind::IllegalTagContent { tag, found: c },
                    ));
                }
                _ => offset += 1,
            }
        }

        let text = scanner.read_balanced(Lexeme::AngleOpen, Lexeme::AngleClose, true)?;

        // Both delimiters are single-byte, so the interior is a plain slice.
        let inner = &text[1..text.len() - 1];
        let kind = match inner.chars().next().map(|c| scanner.lexeme_of(c)) {
            Some(Lexeme::Question) => TokenKind::ProcessingInstructions,
            Some(Lexeme::Bang) => TokenKind::Comment,
            _ => TokenKind::Tag,
        };
        Ok((kind, text))
    }

    /// Scan `<!-- ... -->`. The body may contain `>`.
    fn scan_comment(
        &self,
        scanner: &mut Scanner<MarkupLexicon>,
        start: usize,
    ) -> Result<String, LexerError> {
        let mut text = String::new();
        loop {
            let chunk = scanner.read_until('>', true).map_err(|_| {
                scanner.error_at(start, LexErrorKind::UnbalancedDelimiters { depth: 1 })
            })?;
            text.push_str(&chunk);
            text.push('>');
            if text.len() >= COMMENT_OPEN.len() + COMMENT_CLOSE.len()
                && text.ends_with(COMMENT_CLOSE)
            {
                return Ok(text);
            }
        }
    }

    /// Scan text content up to the next bracket or unrecognized character.
    fn scan_text(&self, scanner: &mut Scanner<MarkupLexicon>) -> (TokenKind, String) {
        let mut text = scanner.read_while_lexeme_in(&[Lexeme::Whitespace]);
        if TEXT_STOP.contains(&scanner.peek_lexeme_or(Lexeme::Eof))
            || scanner.is_at_end()
        {
            return (TokenKind::Whitespace, text);
        }
        text.push_str(&scanner.read_while_lexeme_not_in(TEXT_STOP));
        (TokenKind::Value, text)
    }
}

impl TokenRules for MarkupRules {
    type Kind = TokenKind;
    type Lexicon = MarkupLexicon;

    fn lexicon(&self) -> MarkupLexicon {
        MarkupLexicon
    }

    fn next_token(
        &mut self,
        scanner: &mut Scanner<MarkupLexicon>,
    ) -> Result<Option<Token>, LexerError> {
        let start = scanner.position();

        let (kind, text) = match scanner.peek_lexeme_or(Lexeme::Eof) {
            Lexeme::Eof => {
                if self.emitted_eof {
                    return Ok(None);
                }
                self.emitted_eof = true;
                return Ok(Some(Token::eof(scanner.span_from(start))));
            }
            Lexeme::AngleOpen => self.scan_angle(scanner, start)?,
            Lexeme::AngleClose => {
                return Err(scanner.error(LexErrorKind::UnmatchedClosingBracket));
            }
            Lexeme::None => (TokenKind::None, scanner.next_char(true)?.to_string()),
            _ => self.scan_text(scanner),
        };

        Ok(Some(Token::new(kind, text, scanner.span_from(start))))
    }
}
