use crate::lexeme::{Lexeme, Lexicon, MarkupLexicon};
use crate::token::Span;
use crate::{LexErrorKind, LexerError};

/// Escape character honored by [`Scanner::read_until_unescaped`].
const ESCAPE: char = '\\';

/// Cursor over a fully buffered character stream.
///
/// Format-agnostic: characters are classified through the lexicon `L`.
/// Follows the usual hand-written lexer layout:
/// - `Vec<char>` source for index-based navigation
/// - a single checkpoint for one level of backtracking
/// - line starts computed once so spans are cheap to build
pub struct Scanner<L = MarkupLexicon> {
    chars: Vec<char>,
    pos: usize,
    checkpoint: usize,
    line_starts: Vec<usize>,
    lexicon: L,
}

impl<L: Lexicon> Scanner<L> {
    /// Create a new scanner over `source`.
    pub fn new(source: &str, lexicon: L) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let line_starts = std::iter::once(0)
            .chain(
                chars
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| **c == '\n')
                    .map(|(i, _)| i + 1),
            )
            .collect();

        Self {
            chars,
            pos: 0,
            checkpoint: 0,
            line_starts,
            lexicon,
        }
    }

    // --- Lookahead ---

    /// The next character, without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// The character `offset` places past the cursor.
    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    /// Lexeme of the next character. Fails with `EndOfInput` when exhausted.
    pub fn peek_lexeme(&self) -> Result<Lexeme, LexerError> {
        self.peek()
            .map(|c| self.lexicon.lexeme(c))
            .ok_or_else(|| self.error(LexErrorKind::EndOfInput))
    }

    /// Lexeme of the next character, or `fallback` when exhausted.
    pub fn peek_lexeme_or(&self, fallback: Lexeme) -> Lexeme {
        self.peek().map_or(fallback, |c| self.lexicon.lexeme(c))
    }

    /// Classify an arbitrary character with this scanner's lexicon.
    pub fn lexeme_of(&self, ch: char) -> Lexeme {
        self.lexicon.lexeme(ch)
    }

    /// Whether the upcoming characters spell `text`.
    pub fn starts_with(&self, text: &str) -> bool {
        let mut rest = self.chars[self.pos..].iter();
        text.chars().all(|c| rest.next() == Some(&c))
    }

    // --- Consumption ---

    /// Consume and return the next character.
    ///
    /// Checkpoints the cursor first, so a following [`rollback`](Self::rollback)
    /// also restores any whitespace skipped here. With `allow_whitespace`
    /// false, leading whitespace is skipped.
    pub fn next_char(&mut self, allow_whitespace: bool) -> Result<char, LexerError> {
        self.checkpoint = self.pos;
        if !allow_whitespace {
            self.skip_whitespace();
        }
        let ch = self
            .peek()
            .ok_or_else(|| self.error(LexErrorKind::EndOfInput))?;
        self.pos += 1;
        Ok(ch)
    }

    /// Skip a run of whitespace, returning how many characters were skipped.
    pub fn skip_whitespace(&mut self) -> usize {
        self.read_while(|l| l == Lexeme::Whitespace).chars().count()
    }

    // --- Backtracking ---

    /// Remember the current position.
    pub fn checkpoint(&mut self) {
        self.checkpoint = self.pos;
    }

    /// Return to the last checkpoint. Yields the position before the rollback.
    pub fn rollback(&mut self) -> usize {
        let prior = self.pos;
        self.pos = self.checkpoint;
        prior
    }

    /// Return to the start of the stream and checkpoint there.
    pub fn rollback_to_start(&mut self) {
        self.pos = 0;
        self.checkpoint = 0;
    }

    // --- Reads ---

    /// Read up to `delimiter`. The delimiter is never part of the result; it
    /// is consumed only when `consume_delimiter` is set.
    pub fn read_until(
        &mut self,
        delimiter: char,
        consume_delimiter: bool,
    ) -> Result<String, LexerError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == delimiter {
                let text = self.slice(start, self.pos);
                if consume_delimiter {
                    self.pos += 1;
                }
                return Ok(text);
            }
            self.pos += 1;
        }
        Err(self.error(LexErrorKind::EndOfInput))
    }

    /// Read up to a `delimiter` not preceded by `\`, consuming the delimiter.
    /// Escape sequences are kept verbatim in the result.
    pub fn read_until_unescaped(&mut self, delimiter: char) -> Result<String, LexerError> {
        let start = self.pos;
        let mut escaped = false;
        while let Some(c) = self.peek() {
            if escaped {
                escaped = false;
            } else if c == ESCAPE {
                escaped = true;
            } else if c == delimiter {
                let text = self.slice(start, self.pos);
                self.pos += 1;
                return Ok(text);
            }
            self.pos += 1;
        }
        Err(self.error(LexErrorKind::EndOfInput))
    }

    /// Read the maximal run whose lexemes are all in `set`.
    pub fn read_while_lexeme_in(&mut self, set: &[Lexeme]) -> String {
        self.read_while(|l| set.contains(&l))
    }

    /// Read the maximal run whose lexemes are all outside `set`.
    pub fn read_while_lexeme_not_in(&mut self, set: &[Lexeme]) -> String {
        self.read_while(|l| !set.contains(&l))
    }

    /// Read from an `open` delimiter to the `close` that brings the nesting
    /// depth back to zero.
    ///
    /// When `open` and `close` are the same lexeme (a quote pair), the run
    /// ends at the next occurrence; such pairs cannot nest.
    ///
    /// Nothing between the delimiters is validated. Fails with
    /// `UnbalancedDelimiters` if the next character is not `open` or the
    /// input ends first.
    pub fn read_balanced(
        &mut self,
        open: Lexeme,
        close: Lexeme,
        include_delimiters: bool,
    ) -> Result<String, LexerError> {
        let start = self.pos;
        if self.peek_lexeme_or(Lexeme::Eof) != open {
            return Err(self.error(LexErrorKind::UnbalancedDelimiters { depth: 0 }));
        }

        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            let lexeme = self.lexicon.lexeme(c);
            self.pos += 1;
            if lexeme == close && depth > 0 {
                depth -= 1;
                if depth == 0 {
                    return Ok(if include_delimiters {
                        self.slice(start, self.pos)
                    } else {
                        self.slice(start + 1, self.pos - 1)
                    });
                }
            } else if lexeme == open {
                depth += 1;
            }
        }

        Err(self.error_at(start, LexErrorKind::UnbalancedDelimiters { depth }))
    }

    // --- Positions ---

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Number of characters left to read.
    pub fn remaining(&self) -> usize {
        self.chars.len().saturating_sub(self.pos)
    }

    /// 1-based line and column of a character offset.
    pub fn location(&self, pos: usize) -> (usize, usize) {
        let line = self.line_starts.partition_point(|&s| s <= pos);
        let column = pos - self.line_starts[line - 1] + 1;
        (line, column)
    }

    /// Span from `start` to the cursor.
    pub fn span_from(&self, start: usize) -> Span {
        let (line, column) = self.location(start);
        Span::new(start, self.pos, line, column)
    }

    /// Build an error located at the cursor.
    pub fn error(&self, kind: LexErrorKind) -> LexerError {
        self.error_at(self.pos, kind)
    }

    /// Build an error located at `pos`.
    pub fn error_at(&self, pos: usize, kind: LexErrorKind) -> LexerError {
        let (line, column) = self.location(pos);
        LexerError { kind, line, column }
    }

    // --- Helpers ---

    fn read_while(&mut self, mut accept: impl FnMut(Lexeme) -> bool) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !accept(self.lexicon.lexeme(c)) {
                break;
            }
            self.pos += 1;
        }
        self.slice(start, self.pos)
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner(source: &str) -> Scanner {
        Scanner::new(source, MarkupLexicon)
    }

    // =========================================================================
    // Lookahead
    // =========================================================================

    #[test]
    fn test_peek_does_not_consume() {
        let s = scanner("ab");
        assert_eq!(s.peek(), Some('a'));
        assert_eq!(s.peek(), Some('a'));
        assert_eq!(s.peek_at(1), Some('b'));
        assert_eq!(s.peek_at(2), None);
    }

    #[test]
    fn test_peek_lexeme_at_end_fails() {
        let s = scanner("");
        let err = s.peek_lexeme().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::EndOfInput);
    }

    #[test]
    fn test_peek_lexeme_or_never_fails() {
        let s = scanner("");
        assert_eq!(s.peek_lexeme_or(Lexeme::Eof), Lexeme::Eof);
        let s = scanner("<");
        assert_eq!(s.peek_lexeme_or(Lexeme::Eof), Lexeme::AngleOpen);
    }

    #[test]
    fn test_starts_with() {
        let s = scanner("<!-- x -->");
        assert!(s.starts_with("<!--"));
        assert!(!s.starts_with("<?"));
        assert!(!scanner("<!").starts_with("<!--"));
    }

    // =========================================================================
    // next_char and backtracking
    // =========================================================================

    #[test]
    fn test_next_char_skips_whitespace() {
        let mut s = scanner("   x");
        assert_eq!(s.next_char(false).unwrap(), 'x');
        assert!(s.is_at_end());
    }

    #[test]
    fn test_next_char_keeps_whitespace() {
        let mut s = scanner(" x");
        assert_eq!(s.next_char(true).unwrap(), ' ');
    }

    #[test]
    fn test_rollback_restores_skipped_whitespace() {
        let mut s = scanner("a  b");
        s.next_char(false).unwrap();
        assert_eq!(s.next_char(false).unwrap(), 'b');
        let prior = s.rollback();
        assert_eq!(prior, 4);
        assert_eq!(s.position(), 1);
        assert_eq!(s.peek(), Some(' '));
    }

    #[test]
    fn test_rollback_to_explicit_checkpoint() {
        let mut s = scanner("abcdef");
        s.next_char(true).unwrap();
        s.checkpoint();
        s.read_while_lexeme_in(&[Lexeme::Alpha]);
        assert!(s.is_at_end());
        s.rollback();
        assert_eq!(s.peek(), Some('b'));
    }

    #[test]
    fn test_rollback_to_start() {
        let mut s = scanner("abc");
        s.next_char(true).unwrap();
        s.next_char(true).unwrap();
        s.rollback_to_start();
        assert_eq!(s.position(), 0);
        s.next_char(true).unwrap();
        s.rollback();
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn test_next_char_at_end_fails() {
        let mut s = scanner("  ");
        let err = s.next_char(false).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::EndOfInput);
    }

    // =========================================================================
    // Delimited reads
    // =========================================================================

    #[test]
    fn test_read_until_consumes_delimiter() {
        let mut s = scanner("key=value");
        assert_eq!(s.read_until('=', true).unwrap(), "key");
        assert_eq!(s.peek(), Some('v'));
    }

    #[test]
    fn test_read_until_leaves_delimiter() {
        let mut s = scanner("key=value");
        assert_eq!(s.read_until('=', false).unwrap(), "key");
        assert_eq!(s.peek(), Some('='));
    }

    #[test]
    fn test_read_until_missing_delimiter() {
        let mut s = scanner("no delimiter");
        let err = s.read_until('"', true).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::EndOfInput);
    }

    #[test]
    fn test_read_until_unescaped() {
        let mut s = scanner(r#"say \"hi\" now" rest"#);
        assert_eq!(s.read_until_unescaped('"').unwrap(), r#"say \"hi\" now"#);
        assert_eq!(s.peek(), Some(' '));
    }

    #[test]
    fn test_read_until_unescaped_escaped_backslash() {
        let mut s = scanner(r#"a\\"b"#);
        assert_eq!(s.read_until_unescaped('"').unwrap(), r"a\\");
        assert_eq!(s.peek(), Some('b'));
    }

    // =========================================================================
    // Lexeme runs
    // =========================================================================

    #[test]
    fn test_read_while_lexeme_in_stops_before_mismatch() {
        let mut s = scanner("abc123 rest");
        assert_eq!(
            s.read_while_lexeme_in(&[Lexeme::Alpha, Lexeme::Digit]),
            "abc123"
        );
        assert_eq!(s.peek(), Some(' '));
    }

    #[test]
    fn test_read_while_lexeme_not_in() {
        let mut s = scanner("text here<tag>");
        assert_eq!(
            s.read_while_lexeme_not_in(&[Lexeme::AngleOpen, Lexeme::AngleClose]),
            "text here"
        );
        assert_eq!(s.peek(), Some('<'));
    }

    #[test]
    fn test_read_while_empty_run() {
        let mut s = scanner("<");
        assert_eq!(s.read_while_lexeme_in(&[Lexeme::Alpha]), "");
        assert_eq!(s.position(), 0);
    }

    // =========================================================================
    // Balanced reads
    // =========================================================================

    #[test]
    fn test_read_balanced_flat() {
        let mut s = scanner("<a>rest");
        let text = s
            .read_balanced(Lexeme::AngleOpen, Lexeme::AngleClose, true)
            .unwrap();
        assert_eq!(text, "<a>");
        assert_eq!(s.peek(), Some('r'));
    }

    #[test]
    fn test_read_balanced_nested() {
        let mut s = scanner("{a{b}c}d");
        let text = s
            .read_balanced(Lexeme::BraceOpen, Lexeme::BraceClose, false)
            .unwrap();
        assert_eq!(text, "a{b}c");
        assert_eq!(s.peek(), Some('d'));
    }

    #[test]
    fn test_read_balanced_unterminated() {
        let mut s = scanner("[a[b]");
        let err = s
            .read_balanced(Lexeme::BracketOpen, Lexeme::BracketClose, true)
            .unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnbalancedDelimiters { depth: 1 });
        assert_eq!((err.line, err.column), (1, 1));
    }

    #[test]
    fn test_read_balanced_same_delimiter() {
        let mut s = scanner("'a b' rest");
        let text = s.read_balanced(Lexeme::Quote, Lexeme::Quote, true).unwrap();
        assert_eq!(text, "'a b'");
        assert_eq!(s.peek(), Some(' '));

        let mut s = scanner("\"x\"");
        assert_eq!(
            s.read_balanced(Lexeme::Quote, Lexeme::Quote, false).unwrap(),
            "x"
        );
    }

    #[test]
    fn test_read_balanced_same_delimiter_unterminated() {
        let mut s = scanner("'open");
        let err = s
            .read_balanced(Lexeme::Quote, Lexeme::Quote, true)
            .unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnbalancedDelimiters { depth: 1 });
    }

    #[test]
    fn test_read_balanced_requires_opener() {
        let mut s = scanner("a>");
        let err = s
            .read_balanced(Lexeme::AngleOpen, Lexeme::AngleClose, true)
            .unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnbalancedDelimiters { depth: 0 });
    }

    // =========================================================================
    // Positions
    // =========================================================================

    #[test]
    fn test_location_tracks_lines() {
        let s = scanner("ab\ncd\n\nef");
        assert_eq!(s.location(0), (1, 1));
        assert_eq!(s.location(1), (1, 2));
        assert_eq!(s.location(3), (2, 1));
        assert_eq!(s.location(6), (3, 1));
        assert_eq!(s.location(8), (4, 2));
    }

    #[test]
    fn test_span_from() {
        let mut s = scanner("x\n<a>");
        s.next_char(true).unwrap();
        s.next_char(true).unwrap();
        let start = s.position();
        s.read_balanced(Lexeme::AngleOpen, Lexeme::AngleClose, true)
            .unwrap();
        assert_eq!(s.span_from(start), Span::new(2, 5, 2, 1));
    }

    #[test]
    fn test_error_location_at_cursor() {
        let mut s = scanner("a\nb");
        s.read_until('b', false).unwrap();
        let err = s.error(LexErrorKind::UnmatchedClosingBracket);
        assert_eq!((err.line, err.column), (2, 1));
    }

    #[test]
    fn test_remaining() {
        let mut s = scanner("abc");
        assert_eq!(s.remaining(), 3);
        s.next_char(true).unwrap();
        assert_eq!(s.remaining(), 2);
    }
}
