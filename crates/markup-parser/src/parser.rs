//! Document parser for markup.
//!
//! Consumes the flat token sequence from `markup-lexer` left to right and
//! builds the element tree bottom-up. Open elements live on an explicit
//! stack; when an element closes it is moved into its parent's children,
//! or becomes the root when the stack empties.

use markup_lexer::{LexErrorKind, MarkupRules, Span, Token, TokenKind, Tokenizer};

use crate::document::{Document, Element, ElementValue, ProcessingInstructions};
use crate::options::ParseOptions;
use crate::tag::{parse_tag, Tag, TagShape};
use crate::{ParseError, ParseErrorKind};

/// Markup document parser.
///
/// Single use: [`parse`](Self::parse) consumes the parser.
pub struct Parser {
    tokens: Vec<Token>,
    options: ParseOptions,
    stack: Vec<Element>,
    root: Option<Element>,
    instructions: Option<ProcessingInstructions>,
    opened_any: bool,
}

impl Parser {
    /// Create a new parser for the given tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_options(tokens, ParseOptions::default())
    }

    pub fn with_options(tokens: Vec<Token>, options: ParseOptions) -> Self {
        Self {
            tokens,
            options,
            stack: Vec::new(),
            root: None,
            instructions: None,
            opened_any: false,
        }
    }

    /// Tokenize and parse source text.
    pub fn parse_document(source: &str) -> Result<Document, ParseError> {
        Self::parse_document_with(source, &ParseOptions::default())
    }

    /// Tokenize and parse source text with explicit options.
    pub fn parse_document_with(
        source: &str,
        options: &ParseOptions,
    ) -> Result<Document, ParseError> {
        let tokenizer = Tokenizer::new(source, MarkupRules::new());
        let eof = Token::eof(tokenizer.end_span());
        let reserve = options.token_reserve.unwrap_or(source.len() / 8);
        let tokens = tokenizer.tokenize(Some(eof), reserve)?;

        Parser::with_options(tokens, options.clone()).parse()
    }

    /// Build the document. Fails on the first validation error; no partial
    /// tree is ever returned.
    pub fn parse(mut self) -> Result<Document, ParseError> {
        let tokens = std::mem::take(&mut self.tokens);
        let mut end = tokens.last().map(|t| t.span).unwrap_or_default();

        for (index, token) in tokens.iter().enumerate() {
            if self.root.is_some() {
                if token.is_ignorable() {
                    continue;
                }
                if token.is_eof() {
                    end = token.span;
                    break;
                }
                return Err(self.after_root(token, &tokens[index..]));
            }

            match token.kind {
                TokenKind::Eof => {
                    end = token.span;
                    break;
                }
                TokenKind::ProcessingInstructions => self.instructions(token)?,
                TokenKind::Tag => self.tag(token)?,
                TokenKind::Value => self.value(token)?,
                TokenKind::Comment | TokenKind::Whitespace | TokenKind::None => {}
            }
        }

        self.finish(end)
    }

    // =========================================================================
    // Token handlers
    // =========================================================================

    fn instructions(&mut self, token: &Token) -> Result<(), ParseError> {
        let tag = self.parse_tag(token)?;
        if tag.shape != TagShape::Instructions {
            return Err(ParseError::at(
                token.span,
                ParseErrorKind::MalformedTag {
                    tag: token.text.clone(),
                    reason: "expected processing instructions",
                },
            ));
        }
        self.set_instructions(tag, token.span)
    }

    fn tag(&mut self, token: &Token) -> Result<(), ParseError> {
        let tag = self.parse_tag(token)?;
        match tag.shape {
            TagShape::Open => self.open(Element::from(tag), token.span),
            TagShape::SelfClose => {
                let name = tag.name.clone();
                self.open(Element::from(tag), token.span)?;
                self.close(&name, token.span)
            }
            TagShape::Close => self.close(&tag.name, token.span),
            TagShape::Instructions => self.set_instructions(tag, token.span),
        }
    }

    fn value(&mut self, token: &Token) -> Result<(), ParseError> {
        let text = token.text.as_str();
        if text.is_empty() {
            return Ok(());
        }

        let Some(top) = self.stack.last_mut() else {
            return Err(ParseError::at(token.span, ParseErrorKind::TextOutsideRoot));
        };

        match top.value {
            ElementValue::Empty => top.value = ElementValue::Text(text.to_string()),
            // Text split across tokens (e.g. around an unrecognized character).
            ElementValue::Text(ref mut existing) => existing.push_str(text),
            ElementValue::Children(_) => {
                return Err(ParseError::at(
                    token.span,
                    ParseErrorKind::MixedContent {
                        element: top.name.clone(),
                    },
                ));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Stack operations
    // =========================================================================

    fn open(&mut self, element: Element, span: Span) -> Result<(), ParseError> {
        if let Some(limit) = self.options.max_depth {
            if self.stack.len() >= limit {
                return Err(ParseError::at(
                    span,
                    ParseErrorKind::DepthLimitExceeded { limit },
                ));
            }
        }

        if let Some(parent) = self.stack.last_mut() {
            match parent.value {
                ElementValue::Empty => parent.value = ElementValue::Children(Vec::new()),
                ElementValue::Children(_) => {}
                ElementValue::Text(_) => {
                    return Err(ParseError::at(
                        span,
                        ParseErrorKind::MixedContent {
                            element: parent.name.clone(),
                        },
                    ));
                }
            }
        }

        tracing::trace!(name = %element.name, depth = self.stack.len(), "open element");
        self.opened_any = true;
        self.stack.push(element);
        Ok(())
    }

    fn close(&mut self, name: &str, span: Span) -> Result<(), ParseError> {
        let depth = self.stack.len();
        let Some(mut element) = self.stack.pop() else {
            return Err(ParseError::at(
                span,
                ParseErrorKind::UnexpectedClosingTag {
                    name: name.to_string(),
                },
            ));
        };

        if element.name != name {
            return Err(ParseError::at(
                span,
                ParseErrorKind::MismatchedTag {
                    expected: element.name.clone(),
                    found: name.to_string(),
                    depth,
                },
            ));
        }

        if self.options.trim_text {
            trim_value(&mut element.value);
        }

        tracing::trace!(name, depth = self.stack.len(), "close element");
        match self.stack.last_mut() {
            Some(parent) => match parent.value {
                ElementValue::Children(ref mut children) => children.push(element),
                // `open` turned the parent into `Children` already.
                _ => parent.value = ElementValue::Children(vec![element]),
            },
            None => {
                tracing::debug!(root = %element.name, "root element closed");
                self.root = Some(element);
            }
        }
        Ok(())
    }

    fn set_instructions(&mut self, tag: Tag, span: Span) -> Result<(), ParseError> {
        if self.opened_any {
            return Err(ParseError::at(
                span,
                ParseErrorKind::MisplacedInstructions { target: tag.name },
            ));
        }
        if self.instructions.is_some() {
            return Err(ParseError::at(
                span,
                ParseErrorKind::DuplicateInstructions { target: tag.name },
            ));
        }

        self.instructions = Some(ProcessingInstructions {
            target: tag.name,
            attributes: tag.attributes,
        });
        Ok(())
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// Error for a significant token after the root element closed.
    fn after_root(&self, token: &Token, rest: &[Token]) -> ParseError {
        if token.kind == TokenKind::Tag {
            if let Ok(tag) = parse_tag(&token.text) {
                if matches!(tag.shape, TagShape::Open | TagShape::SelfClose) {
                    return ParseError::at(
                        token.span,
                        ParseErrorKind::MultipleRootElements { name: tag.name },
                    );
                }
            }
        }

        let remaining = rest
            .iter()
            .filter(|t| !t.is_ignorable() && !t.is_eof())
            .count();
        ParseError::at(token.span, ParseErrorKind::TrailingContent { remaining })
    }

    fn finish(self, end: Span) -> Result<Document, ParseError> {
        if let Some(root) = self.root {
            return Ok(Document {
                root,
                instructions: self.instructions.unwrap_or_default(),
            });
        }

        if self.stack.is_empty() {
            return Err(ParseError::at(
                end,
                ParseErrorKind::Lex(LexErrorKind::EndOfInput),
            ));
        }

        let names: Vec<String> = self.stack.iter().map(|e| e.name.clone()).collect();
        Err(ParseError::at(
            end,
            ParseErrorKind::UnclosedTags {
                count: names.len(),
                names,
            },
        ))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn parse_tag(&self, token: &Token) -> Result<Tag, ParseError> {
        parse_tag(&token.text).map_err(|kind| ParseError::at(token.span, kind))
    }
}

/// Trim a complete text value; text that trims to nothing becomes `Empty`.
fn trim_value(value: &mut ElementValue) {
    if let ElementValue::Text(text) = value {
        let trimmed = text.trim().to_string();
        if trimmed.is_empty() {
            *value = ElementValue::Empty;
        } else {
            *text = trimmed;
        }
    }
}

impl From<Tag> for Element {
    fn from(tag: Tag) -> Self {
        Self {
            name: tag.name,
            attributes: tag.attributes,
            value: ElementValue::Empty,
        }
    }
}
