//! Token types for the Cascada stylesheet dialect.

use std::fmt;

use winnow::stream::Location;

use cascada_core::node::QuoteStyle;

use crate::span::Span;

/// One lexed token.
///
/// Whitespace and block comments are kept as trivia tokens: the parser
/// needs whitespace to separate space-joined values and attaches comments
/// to the construct that follows them (so comment conventions like
/// `/* @noflip */` survive into the tree).
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    /// An identifier, including dashed CSS idents and `$loop` variables.
    Ident(&'src str),
    /// `@name`.
    AtKeyword(&'src str),
    /// `#name` - an id refiner or a hex color, depending on context.
    Hash(&'src str),
    /// A quoted string with its quoting style.
    Str { value: String, quote: QuoteStyle },
    /// A unitless number.
    Number { repr: &'src str, value: f64 },
    /// A number with a dimension unit, e.g. `12px`.
    Dimension {
        repr: &'src str,
        value: f64,
        unit: &'src str,
    },
    /// A percentage, e.g. `50%`.
    Percentage { repr: &'src str, value: f64 },

    // Punctuation
    Colon,        // :
    DoubleColon,  // ::
    Semicolon,    // ;
    Comma,        // ,
    Dot,          // .
    Greater,      // >
    Plus,         // +
    Tilde,        // ~
    Star,         // *
    Slash,        // /
    Bang,         // !
    Equals,       // =
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]

    /// A block comment, delimiters stripped.
    Comment(&'src str),
    /// A run of whitespace.
    Whitespace,
}

impl Token<'_> {
    /// Whether this token is trivia (whitespace or a comment).
    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::Whitespace | Token::Comment(_))
    }
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl<'src> AsRef<Token<'src>> for PositionedToken<'src> {
    fn as_ref(&self) -> &Token<'src> {
        &self.token
    }
}

impl Location for PositionedToken<'_> {
    fn previous_token_end(&self) -> usize {
        self.span.end()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "{name}"),
            Token::AtKeyword(name) => write!(f, "@{name}"),
            Token::Hash(name) => write!(f, "#{name}"),
            Token::Str { value, quote } => {
                let q = quote.char();
                write!(f, "{q}{value}{q}")
            }
            Token::Number { repr, .. } => write!(f, "{repr}"),
            Token::Dimension { repr, unit, .. } => write!(f, "{repr}{unit}"),
            Token::Percentage { repr, .. } => write!(f, "{repr}%"),

            Token::Colon => write!(f, ":"),
            Token::DoubleColon => write!(f, "::"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Greater => write!(f, ">"),
            Token::Plus => write!(f, "+"),
            Token::Tilde => write!(f, "~"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Bang => write!(f, "!"),
            Token::Equals => write!(f, "="),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),

            Token::Comment(text) => write!(f, "/*{text}*/"),
            Token::Whitespace => write!(f, " "),
        }
    }
}
