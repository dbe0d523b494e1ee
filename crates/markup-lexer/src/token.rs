/// A position in source text, tracking line and column for error reporting.
///
/// `start` and `end` are character offsets into the scanned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// Token classification for markup source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Unrecognized input, kept so callers can detect it.
    None,
    /// End of input.
    Eof,
    /// A run made only of whitespace between tags.
    Whitespace,
    /// `<name ...>`, `</name>` or `<name .../>`.
    Tag,
    /// Text content between tags.
    Value,
    /// `<?target ...?>`
    ProcessingInstructions,
    /// `<!-- ... -->` and other `<!` declarations.
    Comment,
}

/// A token: a kind plus the exact text it was recognized from.
///
/// Generic over the kind so other formats can reuse the tokenizer; markup
/// tokens use the default [`TokenKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct Token<K = TokenKind> {
    pub kind: K,
    pub text: String,
    pub span: Span,
}

impl<K> Token<K> {
    pub fn new(kind: K, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

impl Token {
    /// Synthetic end-of-stream token.
    pub fn eof(span: Span) -> Self {
        Self::new(TokenKind::Eof, String::new(), span)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Tokens the tree builder skips over.
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::None | TokenKind::Whitespace | TokenKind::Comment
        )
    }
}
