//! Markup Writer
//!
//! Re-emits markup from a parsed [`Document`]. Output parses back into an
//! equal tree.
//!
//! ```text
//! Document → to_string() / to_string_pretty() → markup text
//! ```

pub mod writer;

use markup_parser::Document;

pub use writer::Writer;

/// Output layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    /// Indentation per nesting level. `None` writes everything on one line.
    pub indent: Option<usize>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self { indent: Some(2) }
    }
}

impl WriterOptions {
    pub fn compact() -> Self {
        Self { indent: None }
    }

    pub fn indented(width: usize) -> Self {
        Self {
            indent: Some(width),
        }
    }
}

/// A document that cannot be written back as markup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    #[error("attribute `{attribute}` on `{element}` contains both quote characters")]
    UnquotableAttribute { element: String, attribute: String },

    #[error("text of `{element}` contains '<' or '>'")]
    BracketInText { element: String },
}

/// Write a document on a single line.
pub fn to_string(doc: &Document) -> Result<String, WriteError> {
    Writer::new(WriterOptions::compact()).write(doc)
}

/// Write a document with one element per line.
pub fn to_string_pretty(doc: &Document, options: &WriterOptions) -> Result<String, WriteError> {
    Writer::new(options.clone()).write(doc)
}
