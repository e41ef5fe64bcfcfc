//! Parser for Cascada source tokens.
//!
//! Transforms a token stream from the [`lexer`](crate::lexer) into the
//! parsed records in [`parser_types`](crate::parser_types). The parser
//! knows standard CSS shapes only: every extended at-rule (`@def`, `@if`,
//! `@defmixin`, ...) is parsed as a generic at-rule with parameter values
//! and an optional block, and classified later by compiler passes.
//!
//! The public entry point is [`build_sheet`].
//!
//! Values are modeled the way the rest of the compiler expects them:
//! a declaration's values (and an at-rule's parameters) are a
//! space-separated list of terms, where a comma folds the surrounding
//! terms into one comma-composite (`arial, serif` is one value), and a
//! parenthesized group is a name-less function call (`(max-width: 600px)`
//! keeps its parentheses through printing).

use winnow::{
    Parser as _,
    error::{ContextError, ErrMode},
    stream::{Stream as _, TokenSlice},
    token::any,
};

use cascada_core::diagnostics::ErrorCode;
use cascada_core::node::Combinator;

use crate::parser_types::{
    AtRuleP, BlockP, DeclarationP, EntryP, RefinerP, RulesetP, SelectorP, Sheet, StatementP,
    TermP, ValueP,
};
use crate::span::Span;
use crate::tokens::{PositionedToken, Token};

/// Context attached to parser errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// What was being parsed when the error occurred.
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) at the error position; the
    /// offending token index is `tokens.len() - start_offset`.
    StartOffset(usize),
}

type Input<'t, 'src> = TokenSlice<'t, PositionedToken<'src>>;
type IResult<O> = Result<O, ErrMode<ContextError<Context>>>;

/// A fatal syntax error with the best-known location.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

/// Parse a lexed token stream into a [`Sheet`].
///
/// # Errors
///
/// Fails with a [`SyntaxError`] on the first construct that cannot be
/// parsed; parse errors are fatal to producing a tree at all.
pub fn build_sheet(
    tokens: &[PositionedToken<'_>],
    source_len: usize,
) -> Result<Sheet, SyntaxError> {
    let mut input = TokenSlice::new(tokens);
    sheet(&mut input).map_err(|err| explain(err, tokens, source_len))
}

/// Turn a winnow error into a [`SyntaxError`] using the contexts pushed by
/// the failing parser.
fn explain(
    err: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken<'_>],
    source_len: usize,
) -> SyntaxError {
    let end_span = Span::new(source_len..source_len);
    let inner = match err {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
        ErrMode::Incomplete(_) => {
            return SyntaxError {
                code: ErrorCode::E101,
                message: "input ended unexpectedly".into(),
                span: end_span,
            };
        }
    };

    let mut label = None;
    let mut span = None;
    for context in inner.context() {
        match context {
            Context::Label(l) => label = label.or(Some(*l)),
            Context::StartOffset(remaining) => {
                if span.is_none() {
                    let index = tokens.len() - remaining;
                    span = Some(tokens.get(index).map_or(end_span, |t| t.span));
                }
            }
        }
    }

    let (code, message) = match label {
        Some("unclosed block") => (ErrorCode::E102, "unclosed block".to_owned()),
        Some(l) => (ErrorCode::E100, format!("expected {l}")),
        None => (ErrorCode::E100, "unexpected token".to_owned()),
    };
    SyntaxError {
        code,
        message,
        span: span.unwrap_or(end_span),
    }
}

/// Build a cut error carrying a label and the current position.
fn cut_label(input: &Input<'_, '_>, label: &'static str) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Label(label));
    e.push(Context::StartOffset(input.eof_offset()));
    ErrMode::Cut(e)
}

// =========================================================================
// Trivia
// =========================================================================

/// Skip whitespace and comments, collecting comment text.
fn skip_trivia(input: &mut Input<'_, '_>, comments: &mut Vec<String>) {
    loop {
        let checkpoint = input.checkpoint();
        match any::<_, ErrMode<ContextError<Context>>>.parse_next(input) {
            Ok(tok) => match &tok.token {
                Token::Whitespace => {}
                Token::Comment(text) => comments.push((*text).to_owned()),
                _ => {
                    input.reset(&checkpoint);
                    return;
                }
            },
            Err(_) => {
                input.reset(&checkpoint);
                return;
            }
        }
    }
}

/// Peek the next non-trivia token without consuming anything.
fn peek_significant<'src>(input: &mut Input<'_, 'src>) -> Option<Token<'src>> {
    let checkpoint = input.checkpoint();
    let mut scratch = Vec::new();
    skip_trivia(input, &mut scratch);
    let token = next_span_token(input).ok().map(|(token, _)| token);
    input.reset(&checkpoint);
    token
}

/// Whether the next tokens are `! important`, which ends a value list.
fn bang_is_important(input: &mut Input<'_, '_>) -> bool {
    let checkpoint = input.checkpoint();
    let mut scratch = Vec::new();
    skip_trivia(input, &mut scratch);
    let mut result = false;
    if eat_if(input, |t| matches!(t, Token::Bang)).is_some() {
        skip_trivia(input, &mut scratch);
        if let Ok((Token::Ident(word), _)) = next_span_token(input) {
            result = word.eq_ignore_ascii_case("important");
        }
    }
    input.reset(&checkpoint);
    result
}

/// Consume the next token, returning it with its span.
fn next_span_token<'src>(input: &mut Input<'_, 'src>) -> IResult<(Token<'src>, Span)> {
    let tok = any::<_, ErrMode<ContextError<Context>>>.parse_next(input)?;
    Ok((tok.token.clone(), tok.span))
}

/// Consume the next token if `matches` accepts it.
fn eat_if(
    input: &mut Input<'_, '_>,
    matches: impl Fn(&Token<'_>) -> bool,
) -> Option<Span> {
    let checkpoint = input.checkpoint();
    match any::<_, ErrMode<ContextError<Context>>>.parse_next(input) {
        Ok(tok) if matches(&tok.token) => Some(tok.span),
        _ => {
            input.reset(&checkpoint);
            None
        }
    }
}

// =========================================================================
// Stylesheet structure
// =========================================================================

/// Parse a whole sheet: statements to end of input, then sort the leading
/// `@charset`/`@import` run into their root slots.
fn sheet(input: &mut Input<'_, '_>) -> IResult<Sheet> {
    let mut statements = Vec::new();
    loop {
        let mut comments = Vec::new();
        skip_trivia(input, &mut comments);
        if input.eof_offset() == 0 {
            break;
        }
        statements.push(statement(input, comments)?);
    }

    let mut sheet = Sheet::default();
    let mut rest = statements.into_iter().peekable();
    if let Some(StatementP::AtRule(at)) = rest.peek() {
        if at.name.eq_ignore_ascii_case("charset") && at.block.is_none() {
            let Some(StatementP::AtRule(charset)) = rest.next() else {
                unreachable!()
            };
            sheet.charset = Some(charset);
        }
    }
    while let Some(StatementP::AtRule(at)) = rest.peek() {
        if at.name.eq_ignore_ascii_case("import") && at.block.is_none() {
            let Some(StatementP::AtRule(import)) = rest.next() else {
                unreachable!()
            };
            sheet.imports.push(import);
        } else {
            break;
        }
    }
    sheet.statements = rest.collect();
    Ok(sheet)
}

/// Parse one statement: an at-rule or a ruleset.
fn statement(input: &mut Input<'_, '_>, comments: Vec<String>) -> IResult<StatementP> {
    match peek_significant(input) {
        Some(Token::AtKeyword(_)) => Ok(StatementP::AtRule(at_rule(input, comments)?)),
        _ => Ok(StatementP::Ruleset(ruleset(input, comments)?)),
    }
}

/// Parse `@name params... ;` or `@name params... { ... }`.
fn at_rule(input: &mut Input<'_, '_>, mut comments: Vec<String>) -> IResult<AtRuleP> {
    skip_trivia(input, &mut comments);
    let (token, start) = next_span_token(input)?;
    let Token::AtKeyword(name) = token else {
        return Err(cut_label(input, "at-rule"));
    };
    let name = name.to_owned();

    let params = value_list(input, &mut comments)?;
    skip_trivia(input, &mut comments);

    let checkpoint = input.checkpoint();
    let (terminator, end) = match next_span_token(input) {
        Ok(pair) => pair,
        Err(_) => return Err(cut_label(input, "`;` or `{` after at-rule")),
    };
    match terminator {
        Token::Semicolon => Ok(AtRuleP {
            name,
            params,
            block: None,
            comments,
            span: start.union(end),
        }),
        Token::LeftBrace => {
            let block = at_rule_block(input, &name)?;
            let end = expect_right_brace(input)?;
            Ok(AtRuleP {
                name,
                params,
                block: Some(block),
                comments,
                span: start.union(end),
            })
        }
        _ => {
            input.reset(&checkpoint);
            Err(cut_label(input, "`;` or `{` after at-rule"))
        }
    }
}

/// Decide whether an at-rule body holds declarations or statements, then
/// parse it accordingly. `@media` always holds statements and
/// `@font-face`/`@page` always hold declarations; the extended at-rules
/// are decided by lookahead, because `@if` holds declarations inside a
/// ruleset but rulesets at the top level.
fn at_rule_block(input: &mut Input<'_, '_>, name: &str) -> IResult<BlockP> {
    let declarations = if name.eq_ignore_ascii_case("media") {
        false
    } else if name.eq_ignore_ascii_case("font-face") || name.eq_ignore_ascii_case("page") {
        true
    } else {
        looks_like_declarations(input, name)
    };
    if declarations {
        Ok(BlockP::Declarations(entries_until_brace(input)?))
    } else {
        Ok(BlockP::Statements(statements_until_brace(input)?))
    }
}

/// Lookahead: `ident :` or `@mixin` means a declaration body.
fn looks_like_declarations(input: &mut Input<'_, '_>, name: &str) -> bool {
    let checkpoint = input.checkpoint();
    let mut scratch = Vec::new();
    skip_trivia(input, &mut scratch);
    let result = match next_span_token(input) {
        Ok((Token::Ident(_), _)) => {
            skip_trivia(input, &mut scratch);
            matches!(next_span_token(input), Ok((Token::Colon, _)))
        }
        Ok((Token::AtKeyword(inner), _)) => inner.eq_ignore_ascii_case("mixin"),
        Ok((Token::RightBrace, _)) | Err(_) => name.eq_ignore_ascii_case("defmixin"),
        _ => false,
    };
    input.reset(&checkpoint);
    result
}

/// Parse statements until the closing brace (exclusive).
fn statements_until_brace(input: &mut Input<'_, '_>) -> IResult<Vec<StatementP>> {
    let mut statements = Vec::new();
    loop {
        let mut comments = Vec::new();
        skip_trivia(input, &mut comments);
        match peek_significant(input) {
            Some(Token::RightBrace) => return Ok(statements),
            None => return Err(cut_label(input, "unclosed block")),
            _ => statements.push(statement(input, comments)?),
        }
    }
}

/// Parse declaration-block entries until the closing brace (exclusive).
fn entries_until_brace(input: &mut Input<'_, '_>) -> IResult<Vec<EntryP>> {
    let mut entries = Vec::new();
    loop {
        let mut comments = Vec::new();
        skip_trivia(input, &mut comments);
        match peek_significant(input) {
            Some(Token::RightBrace) => return Ok(entries),
            Some(Token::AtKeyword(_)) => {
                entries.push(EntryP::AtRule(at_rule(input, comments)?));
            }
            Some(Token::Semicolon) => {
                // Stray semicolons between declarations are legal.
                let _ = eat_if(input, |t| matches!(t, Token::Semicolon));
            }
            None => return Err(cut_label(input, "unclosed block")),
            _ => entries.push(EntryP::Declaration(declaration(input, comments)?)),
        }
    }
}

fn expect_right_brace(input: &mut Input<'_, '_>) -> IResult<Span> {
    let mut scratch = Vec::new();
    skip_trivia(input, &mut scratch);
    eat_if(input, |t| matches!(t, Token::RightBrace))
        .ok_or_else(|| cut_label(input, "unclosed block"))
}

// =========================================================================
// Rulesets and declarations
// =========================================================================

/// Parse `selector, selector { entries }`.
fn ruleset(input: &mut Input<'_, '_>, mut comments: Vec<String>) -> IResult<RulesetP> {
    skip_trivia(input, &mut comments);
    let first = selector(input)?;
    let start = first.span;
    let mut selectors = vec![first];
    loop {
        skip_trivia(input, &mut comments);
        if eat_if(input, |t| matches!(t, Token::Comma)).is_none() {
            break;
        }
        skip_trivia(input, &mut comments);
        selectors.push(selector(input)?);
    }

    skip_trivia(input, &mut comments);
    if eat_if(input, |t| matches!(t, Token::LeftBrace)).is_none() {
        return Err(cut_label(input, "`{` after selector"));
    }
    let entries = entries_until_brace(input)?;
    let end = expect_right_brace(input)?;

    Ok(RulesetP {
        selectors,
        entries,
        comments,
        span: start.union(end),
    })
}

/// Parse `property: values [!important] ;?`.
fn declaration(input: &mut Input<'_, '_>, mut comments: Vec<String>) -> IResult<DeclarationP> {
    skip_trivia(input, &mut comments);
    let (token, start) = next_span_token(input)?;
    let Token::Ident(property) = token else {
        return Err(cut_label(input, "property name"));
    };
    let property = property.to_owned();

    skip_trivia(input, &mut comments);
    if eat_if(input, |t| matches!(t, Token::Colon)).is_none() {
        return Err(cut_label(input, "`:` after property name"));
    }

    let values = value_list(input, &mut comments)?;
    if values.is_empty() {
        return Err(cut_label(input, "declaration value"));
    }

    skip_trivia(input, &mut comments);
    let mut important = false;
    if eat_if(input, |t| matches!(t, Token::Bang)).is_some() {
        skip_trivia(input, &mut comments);
        let (token, _) = next_span_token(input)?;
        match token {
            Token::Ident(word) if word.eq_ignore_ascii_case("important") => important = true,
            _ => return Err(cut_label(input, "`important` after `!`")),
        }
    }

    skip_trivia(input, &mut comments);
    let end = eat_if(input, |t| matches!(t, Token::Semicolon))
        .or_else(|| values.last().map(|v| v.span))
        .unwrap_or(start);

    Ok(DeclarationP {
        property,
        values,
        important,
        comments,
        span: start.union(end),
    })
}

// =========================================================================
// Values
// =========================================================================

/// Whether a token can start a value term.
fn starts_term(token: &Token<'_>) -> bool {
    matches!(
        token,
        Token::Ident(_)
            | Token::Number { .. }
            | Token::Dimension { .. }
            | Token::Percentage { .. }
            | Token::Str { .. }
            | Token::Hash(_)
            | Token::Bang
            | Token::Slash
            | Token::LeftParen
    )
}

/// Parse a space-separated value list. A comma folds the surrounding terms
/// into a single comma-composite value.
fn value_list(input: &mut Input<'_, '_>, comments: &mut Vec<String>) -> IResult<Vec<ValueP>> {
    let mut values: Vec<ValueP> = Vec::new();
    loop {
        skip_trivia(input, comments);
        if bang_is_important(input) {
            return Ok(values);
        }
        match peek_significant(input) {
            Some(token) if starts_term(&token) => {}
            Some(Token::Comma) if !values.is_empty() => {
                // Fold `prev , next...` into one comma-composite.
                let _ = eat_if(input, |t| matches!(t, Token::Comma));
                skip_trivia(input, comments);
                let next = term(input, comments)?;
                let prev = values.pop().expect("checked non-empty");
                let composite = match prev.term {
                    TermP::Comma(mut items) => {
                        let span = prev.span.union(next.span);
                        items.push(next);
                        ValueP {
                            term: TermP::Comma(items),
                            span,
                        }
                    }
                    _ => {
                        let span = prev.span.union(next.span);
                        ValueP {
                            term: TermP::Comma(vec![prev, next]),
                            span,
                        }
                    }
                };
                values.push(composite);
                continue;
            }
            _ => return Ok(values),
        }
        values.push(term(input, comments)?);
    }
}

/// Parse one value term.
fn term(input: &mut Input<'_, '_>, comments: &mut Vec<String>) -> IResult<ValueP> {
    skip_trivia(input, comments);
    let (token, span) = next_span_token(input)?;
    match token {
        Token::Ident(name) => {
            if let Some(variable) = name.strip_prefix('$') {
                return Ok(ValueP {
                    term: TermP::LoopVariable(variable.to_owned()),
                    span,
                });
            }
            // A function call only when `(` follows with no whitespace.
            if eat_if(input, |t| matches!(t, Token::LeftParen)).is_some() {
                let args = function_args(input, comments)?;
                let end = eat_if(input, |t| matches!(t, Token::RightParen))
                    .ok_or_else(|| cut_label(input, "`)` to close the argument list"))?;
                return Ok(ValueP {
                    term: TermP::Function {
                        name: name.to_owned(),
                        args,
                    },
                    span: span.union(end),
                });
            }
            // Fold dotted names (`ui.menu`) into one literal; the dot must
            // abut both identifiers.
            let mut text = name.to_owned();
            let mut span = span;
            loop {
                let checkpoint = input.checkpoint();
                if eat_if(input, |t| matches!(t, Token::Dot)).is_none() {
                    break;
                }
                match next_span_token(input) {
                    Ok((Token::Ident(part), end)) => {
                        text.push('.');
                        text.push_str(part);
                        span = span.union(end);
                    }
                    _ => {
                        input.reset(&checkpoint);
                        break;
                    }
                }
            }
            Ok(ValueP {
                term: TermP::Literal(text),
                span,
            })
        }
        Token::Number { repr, value } => Ok(ValueP {
            term: TermP::Numeric {
                repr: repr.to_owned(),
                value,
                unit: String::new(),
            },
            span,
        }),
        Token::Dimension { repr, value, unit } => Ok(ValueP {
            term: TermP::Numeric {
                repr: repr.to_owned(),
                value,
                unit: unit.to_owned(),
            },
            span,
        }),
        Token::Percentage { repr, value } => Ok(ValueP {
            term: TermP::Numeric {
                repr: repr.to_owned(),
                value,
                unit: "%".to_owned(),
            },
            span,
        }),
        Token::Str { value, quote } => Ok(ValueP {
            term: TermP::Str { value, quote },
            span,
        }),
        Token::Hash(name) => Ok(ValueP {
            term: TermP::Literal(format!("#{name}")),
            span,
        }),
        Token::Bang => {
            // `!NAME` - a negated condition name in `@if` parameters.
            let (token, end) = next_span_token(input)?;
            let Token::Ident(name) = token else {
                return Err(cut_label(input, "name after `!`"));
            };
            Ok(ValueP {
                term: TermP::Literal(format!("!{name}")),
                span: span.union(end),
            })
        }
        Token::Slash => Ok(ValueP {
            term: TermP::Literal("/".to_owned()),
            span,
        }),
        Token::LeftParen => {
            let inner = paren_contents(input, comments)?;
            let end = eat_if(input, |t| matches!(t, Token::RightParen))
                .ok_or_else(|| cut_label(input, "`)` to close the group"))?;
            Ok(ValueP {
                term: TermP::Paren(inner),
                span: span.union(end),
            })
        }
        _ => Err(cut_label(input, "value")),
    }
}

/// Parse comma-separated function arguments; each argument is one term or
/// a space-composite of terms.
fn function_args(input: &mut Input<'_, '_>, comments: &mut Vec<String>) -> IResult<Vec<ValueP>> {
    let mut args = Vec::new();
    loop {
        skip_trivia(input, comments);
        match peek_significant(input) {
            Some(Token::RightParen) => return Ok(args),
            None => return Err(cut_label(input, "`)` to close the argument list")),
            _ => {}
        }
        let mut terms = vec![term(input, comments)?];
        loop {
            skip_trivia(input, comments);
            match peek_significant(input) {
                Some(token) if starts_term(&token) => terms.push(term(input, comments)?),
                _ => break,
            }
        }
        args.push(collapse_space(terms));
        skip_trivia(input, comments);
        if eat_if(input, |t| matches!(t, Token::Comma)).is_none() {
            return Ok(args);
        }
    }
}

/// Parse the inside of a parenthesized group: terms, allowing a
/// `feature: value` colon as in media expressions.
fn paren_contents(
    input: &mut Input<'_, '_>,
    comments: &mut Vec<String>,
) -> IResult<Vec<ValueP>> {
    let mut inner = Vec::new();
    loop {
        skip_trivia(input, comments);
        match peek_significant(input) {
            Some(Token::RightParen) => return Ok(inner),
            Some(Token::Colon) => {
                let span = eat_if(input, |t| matches!(t, Token::Colon)).expect("peeked colon");
                // Fold `feature :` into `feature:` so the group prints
                // back the way media expressions are written.
                match inner.last_mut() {
                    Some(ValueP {
                        term: TermP::Literal(text),
                        span: prev,
                    }) => {
                        text.push(':');
                        *prev = prev.union(span);
                    }
                    _ => inner.push(ValueP {
                        term: TermP::Literal(":".to_owned()),
                        span,
                    }),
                }
            }
            Some(token) if starts_term(&token) => inner.push(term(input, comments)?),
            _ => return Err(cut_label(input, "`)` to close the group")),
        }
    }
}

/// One term stays itself; several become a space-composite.
fn collapse_space(mut terms: Vec<ValueP>) -> ValueP {
    if terms.len() == 1 {
        terms.pop().expect("len checked")
    } else {
        let span = terms
            .iter()
            .skip(1)
            .fold(terms[0].span, |acc, v| acc.union(v.span));
        ValueP {
            term: TermP::Space(terms),
            span,
        }
    }
}

// =========================================================================
// Selectors
// =========================================================================

/// Whether a token can start a compound selector.
fn starts_compound(token: &Token<'_>) -> bool {
    matches!(
        token,
        Token::Ident(_)
            | Token::Star
            | Token::Dot
            | Token::Hash(_)
            | Token::Colon
            | Token::DoubleColon
            | Token::LeftBracket
    )
}

/// Parse a selector chain: compounds separated by combinators, where bare
/// whitespace is the descendant combinator.
fn selector(input: &mut Input<'_, '_>) -> IResult<SelectorP> {
    let mut links = vec![(None::<Combinator>, compound(input)?)];
    loop {
        let mut scratch = Vec::new();
        let checkpoint = input.checkpoint();
        skip_trivia(input, &mut scratch);
        let combinator = if eat_if(input, |t| matches!(t, Token::Greater)).is_some() {
            Combinator::Child
        } else if eat_if(input, |t| matches!(t, Token::Plus)).is_some() {
            Combinator::Adjacent
        } else if eat_if(input, |t| matches!(t, Token::Tilde)).is_some() {
            Combinator::Sibling
        } else {
            match peek_significant(input) {
                Some(token) if starts_compound(&token) => Combinator::Descendant,
                _ => {
                    input.reset(&checkpoint);
                    break;
                }
            }
        };
        skip_trivia(input, &mut scratch);
        links.push((Some(combinator), compound(input)?));
    }

    // Fold the chain right-to-left into nested links.
    let mut chain: Option<(Combinator, Box<SelectorP>)> = None;
    for (combinator, mut link) in links.drain(..).rev() {
        link.next = chain.take();
        match combinator {
            Some(combinator) => chain = Some((combinator, Box::new(link))),
            None => return Ok(link),
        }
    }
    unreachable!("first link has no combinator")
}

/// Parse one compound selector: optional element plus refiners.
fn compound(input: &mut Input<'_, '_>) -> IResult<SelectorP> {
    let checkpoint = input.checkpoint();
    let mut element = None;
    let mut span: Option<Span> = None;

    if let Ok((token, tok_span)) = next_span_token(input) {
        match token {
            Token::Ident(name) => {
                element = Some(name.to_owned());
                span = Some(tok_span);
            }
            Token::Star => {
                element = Some("*".to_owned());
                span = Some(tok_span);
            }
            _ => input.reset(&checkpoint),
        }
    }

    let mut refiners = Vec::new();
    loop {
        let checkpoint = input.checkpoint();
        let Ok((token, tok_span)) = next_span_token(input) else {
            break;
        };
        let refiner = match token {
            Token::Dot => {
                let (token, end) = next_span_token(input)?;
                let Token::Ident(name) = token else {
                    return Err(cut_label(input, "class name after `.`"));
                };
                span = Some(span.map_or(tok_span, |s| s.union(end)));
                RefinerP::Class(name.to_owned())
            }
            Token::Hash(name) => {
                span = Some(span.map_or(tok_span, |s| s.union(tok_span)));
                RefinerP::Id(name.to_owned())
            }
            Token::Colon => {
                let (token, end) = next_span_token(input)?;
                let Token::Ident(name) = token else {
                    return Err(cut_label(input, "pseudo-class name after `:`"));
                };
                let mut name = name.to_owned();
                let mut argument = None;
                let mut end = end;
                if eat_if(input, |t| matches!(t, Token::LeftParen)).is_some() {
                    if name.eq_ignore_ascii_case("not") {
                        let inner = compound(input)?;
                        argument = Some(Box::new(inner));
                    } else {
                        // Other functional pseudo-classes keep their
                        // argument textually, e.g. `nth-child(2n)`.
                        name.push('(');
                        loop {
                            let (token, _) = next_span_token(input)
                                .map_err(|_| cut_label(input, "`)` to close the pseudo-class"))?;
                            if matches!(token, Token::RightParen) {
                                break;
                            }
                            name.push_str(&token.to_string());
                        }
                        name.push(')');
                    }
                    if argument.is_some() {
                        end = eat_if(input, |t| matches!(t, Token::RightParen))
                            .ok_or_else(|| cut_label(input, "`)` to close the pseudo-class"))?;
                    }
                }
                span = Some(span.map_or(tok_span, |s| s.union(end)));
                RefinerP::PseudoClass { name, argument }
            }
            Token::DoubleColon => {
                let (token, end) = next_span_token(input)?;
                let Token::Ident(name) = token else {
                    return Err(cut_label(input, "pseudo-element name after `::`"));
                };
                span = Some(span.map_or(tok_span, |s| s.union(end)));
                RefinerP::PseudoElement(name.to_owned())
            }
            Token::LeftBracket => {
                let mut expr = String::new();
                let end;
                loop {
                    let (token, tok_span) = next_span_token(input)
                        .map_err(|_| cut_label(input, "`]` to close the attribute"))?;
                    if matches!(token, Token::RightBracket) {
                        end = tok_span;
                        break;
                    }
                    expr.push_str(&token.to_string());
                }
                span = Some(span.map_or(tok_span, |s| s.union(end)));
                RefinerP::Attribute(expr)
            }
            _ => {
                input.reset(&checkpoint);
                break;
            }
        };
        refiners.push(refiner);
    }

    let Some(span) = span else {
        return Err(cut_label(input, "selector"));
    };
    if element.is_none() && refiners.is_empty() {
        return Err(cut_label(input, "selector"));
    }
    Ok(SelectorP {
        element,
        refiners,
        next: None,
        span,
    })
}
