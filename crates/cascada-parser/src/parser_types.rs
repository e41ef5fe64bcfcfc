//! Parsed-but-not-yet-lowered stylesheet types.
//!
//! The parser builds these lightweight records first; `lower` then turns
//! them into an arena [`Tree`](cascada_core::tree::Tree). Keeping the two
//! steps separate keeps the winnow grammar free of arena bookkeeping and
//! gives the lowering step one place to resolve spans into source
//! locations.

use cascada_core::node::{Combinator, QuoteStyle};

use crate::span::Span;

/// One parsed source unit.
#[derive(Debug, Default)]
pub struct Sheet {
    /// `@charset "...";` - only legal as the first construct.
    pub charset: Option<AtRuleP>,
    /// Leading `@import` rules.
    pub imports: Vec<AtRuleP>,
    /// Everything else, in source order.
    pub statements: Vec<StatementP>,
}

/// A top-level or block-level statement.
#[derive(Debug)]
pub enum StatementP {
    Ruleset(RulesetP),
    AtRule(AtRuleP),
}

/// A parsed ruleset.
#[derive(Debug)]
pub struct RulesetP {
    pub selectors: Vec<SelectorP>,
    pub entries: Vec<EntryP>,
    pub comments: Vec<String>,
    pub span: Span,
}

/// An entry in a declaration block: a declaration or a nested at-rule
/// (`@mixin` calls and conditionals live between declarations).
#[derive(Debug)]
pub enum EntryP {
    Declaration(DeclarationP),
    AtRule(AtRuleP),
}

/// A parsed declaration.
#[derive(Debug)]
pub struct DeclarationP {
    pub property: String,
    pub values: Vec<ValueP>,
    pub important: bool,
    pub comments: Vec<String>,
    pub span: Span,
}

/// A parsed at-rule: written name, parameter values, optional block.
#[derive(Debug)]
pub struct AtRuleP {
    pub name: String,
    pub params: Vec<ValueP>,
    pub block: Option<BlockP>,
    pub comments: Vec<String>,
    pub span: Span,
}

/// The body of an at-rule, classified by what it contains.
#[derive(Debug)]
pub enum BlockP {
    /// Rulesets and nested at-rules (`@media`, `@if`, `@for`, ...).
    Statements(Vec<StatementP>),
    /// Declarations (`@font-face`, `@page`).
    Declarations(Vec<EntryP>),
}

/// A parsed value term.
#[derive(Debug, Clone)]
pub struct ValueP {
    pub term: TermP,
    pub span: Span,
}

/// The shape of one value term.
#[derive(Debug, Clone)]
pub enum TermP {
    /// An identifier-ish literal, including hex colors (`#fff`).
    Literal(String),
    /// A number with its source representation and (possibly empty) unit.
    Numeric {
        repr: String,
        value: f64,
        unit: String,
    },
    /// A quoted string.
    Str { value: String, quote: QuoteStyle },
    /// A function call with comma-separated arguments.
    Function { name: String, args: Vec<ValueP> },
    /// Space-joined terms (`1px solid` as one function argument).
    Space(Vec<ValueP>),
    /// Comma-joined terms (`arial, serif` as one value).
    Comma(Vec<ValueP>),
    /// A parenthesized group (`(max-width: 600px)`), parentheses kept.
    Paren(Vec<ValueP>),
    /// A `$var` loop-variable reference.
    LoopVariable(String),
}

/// A parsed selector link.
#[derive(Debug)]
pub struct SelectorP {
    /// Element name; `None` when the selector starts with a refiner.
    pub element: Option<String>,
    pub refiners: Vec<RefinerP>,
    /// Combinator to the next link in the chain.
    pub next: Option<(Combinator, Box<SelectorP>)>,
    pub span: Span,
}

/// A parsed selector refiner.
#[derive(Debug)]
pub enum RefinerP {
    /// `.class`
    Class(String),
    /// `#id`
    Id(String),
    /// `:name` or `:not(selector)`
    PseudoClass {
        name: String,
        argument: Option<Box<SelectorP>>,
    },
    /// `::name`
    PseudoElement(String),
    /// `[expr]`, expression kept textual.
    Attribute(String),
}
