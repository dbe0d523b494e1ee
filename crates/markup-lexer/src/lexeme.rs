/// Classification of a single input character.
///
/// The set is closed and shared by every format; a [`Lexicon`] decides which
/// characters map to which lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lexeme {
    Whitespace,
    Alpha,
    Digit,

    // Brackets
    AngleOpen,
    AngleClose,
    BraceOpen,
    BraceClose,
    BracketOpen,
    BracketClose,

    // Punctuation
    Slash,
    Backslash,
    Equals,
    Quote,
    Question,
    Bang,
    Colon,
    Dot,
    Minus,

    /// End of the character stream.
    Eof,
    /// Character the lexicon does not recognize.
    None,
}

/// Per-format character classification strategy.
pub trait Lexicon {
    /// Classify one character.
    fn lexeme(&self, ch: char) -> Lexeme;
}

impl<F> Lexicon for F
where
    F: Fn(char) -> Lexeme,
{
    fn lexeme(&self, ch: char) -> Lexeme {
        self(ch)
    }
}

/// Lexicon for XML-shaped markup.
///
/// `_` counts as [`Lexeme::Alpha`] so it can start and continue names.
/// Control characters other than whitespace map to [`Lexeme::None`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkupLexicon;

impl Lexicon for MarkupLexicon {
    fn lexeme(&self, ch: char) -> Lexeme {
        match ch {
            ' ' | '\t' | '\n' | '\r' => Lexeme::Whitespace,
            '<' => Lexeme::AngleOpen,
            '>' => Lexeme::AngleClose,
            '{' => Lexeme::BraceOpen,
            '}' => Lexeme::BraceClose,
            '[' => Lexeme::BracketOpen,
            ']' => Lexeme::BracketClose,
            '/' => Lexeme::Slash,
            '\\' => Lexeme::Backslash,
            '=' => Lexeme::Equals,
            '"' | '\'' => Lexeme::Quote,
            '?' => Lexeme::Question,
            '!' => Lexeme::Bang,
            ':' => Lexeme::Colon,
            '.' => Lexeme::Dot,
            '-' => Lexeme::Minus,
            '_' => Lexeme::Alpha,
            c if c.is_ascii_digit() => Lexeme::Digit,
            c if c.is_alphabetic() => Lexeme::Alpha,
            c if c.is_whitespace() => Lexeme::Whitespace,
            c if c.is_control() => Lexeme::None,
            // Remaining punctuation and symbols are plain text content.
            _ => Lexeme::Alpha,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_brackets() {
        let lex = MarkupLexicon;
        assert_eq!(lex.lexeme('<'), Lexeme::AngleOpen);
        assert_eq!(lex.lexeme('>'), Lexeme::AngleClose);
        assert_eq!(lex.lexeme('['), Lexeme::BracketOpen);
        assert_eq!(lex.lexeme('}'), Lexeme::BraceClose);
    }

    #[test]
    fn test_markup_letters_and_digits() {
        let lex = MarkupLexicon;
        assert_eq!(lex.lexeme('a'), Lexeme::Alpha);
        assert_eq!(lex.lexeme('Z'), Lexeme::Alpha);
        assert_eq!(lex.lexeme('é'), Lexeme::Alpha);
        assert_eq!(lex.lexeme('_'), Lexeme::Alpha);
        assert_eq!(lex.lexeme('7'), Lexeme::Digit);
    }

    #[test]
    fn test_markup_whitespace() {
        let lex = MarkupLexicon;
        for c in [' ', '\t', '\n', '\r', '\u{a0}'] {
            assert_eq!(lex.lexeme(c), Lexeme::Whitespace, "{c:?}");
        }
    }

    #[test]
    fn test_both_quote_styles() {
        assert_eq!(MarkupLexicon.lexeme('"'), Lexeme::Quote);
        assert_eq!(MarkupLexicon.lexeme('\''), Lexeme::Quote);
    }

    #[test]
    fn test_control_is_none() {
        assert_eq!(MarkupLexicon.lexeme('\u{1}'), Lexeme::None);
    }

    #[test]
    fn test_closure_lexicon() {
        let digits_only = |c: char| {
            if c.is_ascii_digit() {
                Lexeme::Digit
            } else {
                Lexeme::None
            }
        };
        assert_eq!(digits_only.lexeme('4'), Lexeme::Digit);
        assert_eq!(digits_only.lexeme('x'), Lexeme::None);
    }
}
