//! Markup Parser
//!
//! Builds a [`Document`] tree from the token stream produced by
//! `markup-lexer`. Nesting is tracked with an explicit stack of open
//! elements, so deeply nested input cannot exhaust the call stack.
//!
//! # Example
//!
//! ```
//! use markup_parser::Parser;
//!
//! let doc = Parser::parse_document("<a x=\"1\"><b>hi</b></a>").unwrap();
//! assert_eq!(doc.root.name, "a");
//! assert_eq!(doc.root.attribute("x"), Some("1"));
//! assert_eq!(doc.root.children()[0].text(), Some("hi"));
//! ```

pub mod document;
pub mod options;
pub mod parser;
pub mod tag;

pub use document::{Attributes, Document, Element, ElementValue, ProcessingInstructions};
pub use options::ParseOptions;
pub use parser::Parser;

use markup_lexer::{LexErrorKind, LexerError, Span};

/// Parser error with position information.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Parse error at line {line}, column {column}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn at(span: Span, kind: ParseErrorKind) -> Self {
        Self {
            kind,
            line: span.line,
            column: span.column,
        }
    }
}

impl From<LexerError> for ParseError {
    fn from(e: LexerError) -> Self {
        Self {
            kind: ParseErrorKind::Lex(e.kind),
            line: e.line,
            column: e.column,
        }
    }
}

/// What made the document invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error(transparent)]
    Lex(LexErrorKind),

    #[error("duplicate processing instructions `{target}`")]
    DuplicateInstructions { target: String },

    #[error("processing instructions `{target}` must come before the root element")]
    MisplacedInstructions { target: String },

    #[error("element `{element}` cannot mix text and child elements")]
    MixedContent { element: String },

    #[error("closing tag `{found}` does not match open element `{expected}` (depth {depth})")]
    MismatchedTag {
        expected: String,
        found: String,
        depth: usize,
    },

    #[error("closing tag `{name}` has no open element")]
    UnexpectedClosingTag { name: String },

    #[error("{remaining} unexpected token(s) after the root element")]
    TrailingContent { remaining: usize },

    #[error("element `{name}` follows the root element; a document has exactly one root")]
    MultipleRootElements { name: String },

    #[error("duplicate attribute `{attribute}` on `{element}`")]
    DuplicateAttribute { element: String, attribute: String },

    #[error("{count} unclosed tag(s): {}", .names.join(", "))]
    UnclosedTags { count: usize, names: Vec<String> },

    #[error("malformed tag `{tag}`: {reason}")]
    MalformedTag { tag: String, reason: &'static str },

    #[error("text outside the root element")]
    TextOutsideRoot,

    #[error("nesting depth exceeds the limit of {limit}")]
    DepthLimitExceeded { limit: usize },
}
