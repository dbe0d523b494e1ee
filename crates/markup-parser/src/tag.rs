//! Tag mini-grammar.
//!
//! ```text
//! <[/?]?NAME (ATTR="VALUE")* [/?]?>
//! ```
//!
//! Runs over the text of a single `Tag` or `ProcessingInstructions` token
//! with the same scanner the tokenizer uses.

use markup_lexer::{Lexeme, MarkupLexicon, Scanner};

use crate::document::Attributes;
use crate::ParseErrorKind;

/// Lexemes a name may be made of. Finer checks happen in [`is_valid_name`].
const NAME_LEXEMES: &[Lexeme] = &[
    Lexeme::Alpha,
    Lexeme::Digit,
    Lexeme::Minus,
    Lexeme::Colon,
    Lexeme::Dot,
];

/// How a tag affects nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagShape {
    /// `<name ...>`
    Open,
    /// `</name>`
    Close,
    /// `<name .../>`
    SelfClose,
    /// `<?target ...?>`
    Instructions,
}

/// A tag broken into its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub shape: TagShape,
    pub name: String,
    pub attributes: Attributes,
}

/// Parse the full text of a tag, delimiters included.
pub fn parse_tag(text: &str) -> Result<Tag, ParseErrorKind> {
    let malformed = |reason: &'static str| ParseErrorKind::MalformedTag {
        tag: text.to_string(),
        reason,
    };

    let mut scanner = Scanner::new(text, MarkupLexicon);
    if scanner.peek_lexeme_or(Lexeme::Eof) != Lexeme::AngleOpen {
        return Err(malformed("expected '<'"));
    }
    scanner.next_char(true).map_err(|_| malformed("expected '<'"))?;

    let mut shape = match scanner.peek_lexeme_or(Lexeme::Eof) {
        Lexeme::Slash => TagShape::Close,
        Lexeme::Question => TagShape::Instructions,
        Lexeme::Bang => return Err(malformed("declarations are not tags")),
        _ => TagShape::Open,
    };
    if shape != TagShape::Open {
        scanner.next_char(true).map_err(|_| malformed("missing name"))?;
    }

    let name = read_name(&mut scanner).ok_or_else(|| malformed("missing or invalid name"))?;
    let mut attributes = Attributes::new();

    loop {
        let separated = scanner.skip_whitespace() > 0;

        match scanner.peek_lexeme_or(Lexeme::Eof) {
            Lexeme::AngleClose => {
                if shape == TagShape::Instructions {
                    return Err(malformed("processing instructions must end with '?>'"));
                }
                scanner.next_char(true).map_err(|_| malformed("missing '>'"))?;
                break;
            }
            Lexeme::Slash => {
                if shape != TagShape::Open {
                    return Err(malformed("unexpected '/'"));
                }
                scanner.next_char(true).map_err(|_| malformed("missing '>'"))?;
                expect_close(&mut scanner).ok_or_else(|| malformed("expected '>' after '/'"))?;
                shape = TagShape::SelfClose;
                break;
            }
            Lexeme::Question => {
                if shape != TagShape::Instructions {
                    return Err(malformed("unexpected '?'"));
                }
                scanner.next_char(true).map_err(|_| malformed("missing '>'"))?;
                expect_close(&mut scanner).ok_or_else(|| malformed("expected '>' after '?'"))?;
                break;
            }
            Lexeme::Alpha => {
                if shape == TagShape::Close {
                    return Err(malformed("closing tags cannot have attributes"));
                }
                if !separated {
                    return Err(malformed("attributes must be separated by whitespace"));
                }
                let (key, value) = read_attribute(&mut scanner).map_err(malformed)?;
                if attributes.contains_key(&key) {
                    return Err(ParseErrorKind::DuplicateAttribute {
                        element: name,
                        attribute: key,
                    });
                }
                attributes.insert(key, value);
            }
            Lexeme::Eof => return Err(malformed("missing '>'")),
            _ => return Err(malformed("unexpected character")),
        }
    }

    if !scanner.is_at_end() {
        return Err(malformed("content after '>'"));
    }

    Ok(Tag {
        shape,
        name,
        attributes,
    })
}

/// `key = "value"` with optional whitespace around `=`, single or double quotes.
fn read_attribute(
    scanner: &mut Scanner<MarkupLexicon>,
) -> Result<(String, String), &'static str> {
    let key = read_name(scanner).ok_or("invalid attribute name")?;

    scanner.skip_whitespace();
    if scanner.peek_lexeme_or(Lexeme::Eof) != Lexeme::Equals {
        return Err("attribute without '=\"value\"'");
    }
    scanner.next_char(true).map_err(|_| "missing '='")?;
    scanner.skip_whitespace();

    if scanner.peek_lexeme_or(Lexeme::Eof) != Lexeme::Quote {
        return Err("attribute value must be quoted");
    }
    let quote = scanner.next_char(true).map_err(|_| "missing quote")?;
    let value = scanner
        .read_until(quote, true)
        .map_err(|_| "unterminated attribute value")?;

    Ok((key, value))
}

fn read_name(scanner: &mut Scanner<MarkupLexicon>) -> Option<String> {
    scanner.checkpoint();
    let name = scanner.read_while_lexeme_in(NAME_LEXEMES);
    if is_valid_name(&name) {
        Some(name)
    } else {
        scanner.rollback();
        None
    }
}

/// Names start with a letter or `_` and continue with letters, digits,
/// `_`, `-` and the scope separators.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.'))
}

fn expect_close(scanner: &mut Scanner<MarkupLexicon>) -> Option<()> {
    match scanner.next_char(true) {
        Ok('>') => Some(()),
        _ => None,
    }
}
