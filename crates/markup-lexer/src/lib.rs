//! Markup Lexer
//!
//! Format-agnostic lexing pipeline plus its markup instantiation.
//! A [`Lexicon`] classifies characters into [`Lexeme`]s, the [`Scanner`]
//! offers cursor-based reads with checkpoint/rollback, and a [`Tokenizer`]
//! drives a [`TokenRules`] strategy over the scanner to produce [`Token`]s.
//!
//! # Example
//!
//! ```
//! use markup_lexer::TokenKind;
//!
//! let tokens = markup_lexer::tokenize("<a>hi</a>").unwrap();
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     vec![TokenKind::Tag, TokenKind::Value, TokenKind::Tag, TokenKind::Eof]
//! );
//! ```

pub mod lexeme;
pub mod markup;
pub mod scanner;
pub mod token;
pub mod tokenizer;

pub use lexeme::{Lexeme, Lexicon, MarkupLexicon};
pub use markup::{tokenize, MarkupRules};
pub use scanner::Scanner;
pub use token::{Span, Token, TokenKind};
pub use tokenizer::{TokenRules, Tokenizer};

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Lexer error at line {line}, column {column}: {kind}")]
pub struct LexerError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub column: usize,
}

/// What went wrong while scanning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("unexpected end of input")]
    EndOfInput,

    #[error("unbalanced delimiters (input ended at nesting depth {depth})")]
    UnbalancedDelimiters { depth: usize },

    #[error("'>' without a matching '<'")]
    UnmatchedClosingBracket,

    #[error("illegal character '{found}' inside tag `{tag}`")]
    IllegalTagContent { tag: String, found: char },
}
