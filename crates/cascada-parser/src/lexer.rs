//! Lexical analyzer for Cascada source text.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! Whitespace and block comments are emitted as trivia tokens rather than
//! discarded: the parser uses whitespace to separate space-joined values
//! and attaches comments to the construct that follows them.
//!
//! The public entry point is [`tokenize`].

use winnow::{
    Parser as _,
    ascii::{digit1, multispace1},
    combinator::{alt, opt},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location as _, Stream as _},
    token::{any, one_of, take_until, take_while},
};

use cascada_core::diagnostics::ErrorCode;
use cascada_core::node::QuoteStyle;

use crate::span::Span;
use crate::tokens::{PositionedToken, Token};

/// A fatal lexer error, before it is turned into a [`Diagnostic`] by the
/// caller (which owns the source unit needed for line/column resolution).
///
/// [`Diagnostic`]: cascada_core::diagnostics::Diagnostic
#[derive(Debug, Clone)]
pub struct LexError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

type Input<'a> = LocatingSlice<&'a str>;

/// Lex a whole source unit into positioned tokens.
///
/// # Errors
///
/// Fails on the first unterminated string (`E001`), unterminated comment
/// (`E002`), or character that cannot start any token (`E003`).
pub fn tokenize(source: &str) -> Result<Vec<PositionedToken<'_>>, LexError> {
    let mut input = LocatingSlice::new(source);
    let mut tokens = Vec::new();

    while input.eof_offset() > 0 {
        let start = input.current_token_start();
        match next_token(&mut input) {
            Ok((token, range)) => {
                tokens.push(PositionedToken::new(token, Span::new(range)));
            }
            Err(_) => return Err(classify_failure(source, start)),
        }
    }
    Ok(tokens)
}

/// Decide which lexer error to report for a failure at `start`.
fn classify_failure(source: &str, start: usize) -> LexError {
    let rest = &source[start..];
    if rest.starts_with("/*") {
        LexError {
            code: ErrorCode::E002,
            message: "unterminated comment".into(),
            span: Span::new(start..source.len()),
        }
    } else if rest.starts_with('"') || rest.starts_with('\'') {
        LexError {
            code: ErrorCode::E001,
            message: "unterminated string literal".into(),
            span: Span::new(start..source.len()),
        }
    } else {
        let found = rest.chars().next();
        let end = start + found.map_or(1, char::len_utf8);
        let found = found.map(String::from).unwrap_or_default();
        LexError {
            code: ErrorCode::E003,
            message: format!("unexpected character `{found}`"),
            span: Span::new(start..end.min(source.len())),
        }
    }
}

fn next_token<'a>(input: &mut Input<'a>) -> ModalResult<(Token<'a>, std::ops::Range<usize>)> {
    token.with_span().parse_next(input)
}

fn token<'a>(input: &mut Input<'a>) -> ModalResult<Token<'a>> {
    // Number must come before ident so `-5px` lexes as a negative
    // dimension while `-webkit-box` backtracks into an identifier;
    // comment before punctuation so `/*` never lexes as a bare slash.
    alt((
        multispace1.map(|_| Token::Whitespace),
        comment,
        |input: &mut Input<'a>| string(QuoteStyle::Double, input),
        |input: &mut Input<'a>| string(QuoteStyle::Single, input),
        at_keyword,
        hash,
        number,
        ident_str.map(Token::Ident),
        punctuation,
    ))
    .parse_next(input)
}

fn comment<'a>(input: &mut Input<'a>) -> ModalResult<Token<'a>> {
    let _ = "/*".parse_next(input)?;
    let text = take_until(0.., "*/").parse_next(input).map_err(cut)?;
    let _ = "*/".parse_next(input).map_err(cut)?;
    Ok(Token::Comment(text))
}

fn string<'a>(quote: QuoteStyle, input: &mut Input<'a>) -> ModalResult<Token<'a>> {
    let _ = quote.char().parse_next(input)?;
    let mut value = String::new();
    loop {
        let c = any.parse_next(input).map_err(cut)?;
        if c == quote.char() {
            return Ok(Token::Str { value, quote });
        }
        match c {
            '\n' => return Err(ErrMode::Cut(ContextError::new())),
            '\\' => {
                let escaped = any.parse_next(input).map_err(cut)?;
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    '\\' | '"' | '\'' => value.push(escaped),
                    // Unknown escapes are kept verbatim; CSS treats the
                    // backslash as part of the value.
                    other => {
                        value.push('\\');
                        value.push(other);
                    }
                }
            }
            other => value.push(other),
        }
    }
}

fn ident_str<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    (
        opt('-'),
        one_of(|c: char| c.is_ascii_alphabetic() || matches!(c, '_' | '$')),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '$')
        }),
    )
        .take()
        .parse_next(input)
}

fn at_keyword<'a>(input: &mut Input<'a>) -> ModalResult<Token<'a>> {
    let _ = '@'.parse_next(input)?;
    let name = ident_str.parse_next(input).map_err(cut)?;
    Ok(Token::AtKeyword(name))
}

fn hash<'a>(input: &mut Input<'a>) -> ModalResult<Token<'a>> {
    let _ = '#'.parse_next(input)?;
    let name = take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-')
    })
    .parse_next(input)
    .map_err(cut)?;
    Ok(Token::Hash(name))
}

fn number<'a>(input: &mut Input<'a>) -> ModalResult<Token<'a>> {
    let repr = (
        opt(one_of(['+', '-'])),
        alt((
            (digit1, opt(('.', digit1))).void(),
            ('.', digit1).void(),
        )),
    )
        .take()
        .parse_next(input)?;
    let value: f64 = repr.parse().map_err(|_| ErrMode::Cut(ContextError::new()))?;

    if opt('%').parse_next(input)?.is_some() {
        Ok(Token::Percentage { repr, value })
    } else if let Some(unit) = opt(ident_str).parse_next(input)? {
        Ok(Token::Dimension { repr, value, unit })
    } else {
        Ok(Token::Number { repr, value })
    }
}

fn punctuation<'a>(input: &mut Input<'a>) -> ModalResult<Token<'a>> {
    if opt("::").parse_next(input)?.is_some() {
        return Ok(Token::DoubleColon);
    }
    let c = any.parse_next(input)?;
    let token = match c {
        ':' => Token::Colon,
        ';' => Token::Semicolon,
        ',' => Token::Comma,
        '.' => Token::Dot,
        '>' => Token::Greater,
        '+' => Token::Plus,
        '~' => Token::Tilde,
        '*' => Token::Star,
        '/' => Token::Slash,
        '!' => Token::Bang,
        '=' => Token::Equals,
        '{' => Token::LeftBrace,
        '}' => Token::RightBrace,
        '(' => Token::LeftParen,
        ')' => Token::RightParen,
        '[' => Token::LeftBracket,
        ']' => Token::RightBracket,
        _ => return Err(ErrMode::Backtrack(ContextError::new())),
    };
    Ok(token)
}

fn cut(err: ErrMode<ContextError>) -> ErrMode<ContextError> {
    err.cut()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token<'_>> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .filter(|t| !t.is_trivia())
            .collect()
    }

    #[test]
    fn test_simple_ruleset_tokens() {
        let tokens = kinds(".menu { color: red; }");
        assert_eq!(
            tokens,
            vec![
                Token::Dot,
                Token::Ident("menu"),
                Token::LeftBrace,
                Token::Ident("color"),
                Token::Colon,
                Token::Ident("red"),
                Token::Semicolon,
                Token::RightBrace,
            ]
        );
    }

    #[test]
    fn test_numbers_and_units() {
        let tokens = kinds("margin: -5px 50% 2.5em 0;");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("margin"),
                Token::Colon,
                Token::Dimension {
                    repr: "-5",
                    value: -5.0,
                    unit: "px"
                },
                Token::Percentage {
                    repr: "50",
                    value: 50.0
                },
                Token::Dimension {
                    repr: "2.5",
                    value: 2.5,
                    unit: "em"
                },
                Token::Number {
                    repr: "0",
                    value: 0.0
                },
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_vendor_ident_is_not_a_number() {
        assert_eq!(
            kinds("-webkit-box"),
            vec![Token::Ident("-webkit-box")]
        );
    }

    #[test]
    fn test_at_keyword_and_loop_variable() {
        assert_eq!(
            kinds("@for $i"),
            vec![Token::AtKeyword("for"), Token::Ident("$i")]
        );
    }

    #[test]
    fn test_comment_kept_as_trivia() {
        let tokens = tokenize("a /* @noflip */ b").unwrap();
        let comment = tokens
            .iter()
            .find(|t| matches!(t.token, Token::Comment(_)))
            .expect("comment token");
        assert_eq!(comment.token, Token::Comment(" @noflip "));
    }

    #[test]
    fn test_string_quote_styles_and_escapes() {
        assert_eq!(
            kinds(r#""a\"b" 'c'"#),
            vec![
                Token::Str {
                    value: "a\"b".into(),
                    quote: QuoteStyle::Double
                },
                Token::Str {
                    value: "c".into(),
                    quote: QuoteStyle::Single
                },
            ]
        );
    }

    #[test]
    fn test_pseudo_element_double_colon() {
        assert_eq!(
            kinds("a::after"),
            vec![Token::Ident("a"), Token::DoubleColon, Token::Ident("after")]
        );
    }

    #[test]
    fn test_unterminated_comment_is_e002() {
        let err = tokenize("a { /* never closed").unwrap_err();
        assert_eq!(err.code, ErrorCode::E002);
    }

    #[test]
    fn test_unterminated_string_is_e001() {
        let err = tokenize("content: \"oops").unwrap_err();
        assert_eq!(err.code, ErrorCode::E001);
    }

    #[test]
    fn test_spans_cover_the_source() {
        let tokens = tokenize(".a{b:c}").unwrap();
        assert_eq!(tokens.first().unwrap().span.start(), 0);
        assert_eq!(tokens.last().unwrap().span.end(), 7);
    }
}
