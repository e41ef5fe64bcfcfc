//! Cascada parser - lexer and parser for the Cascada GSS stylesheet
//! dialect.
//!
//! The parser front end turns one or more named source units into one
//! [`Tree`], or fails with a structured [`ParseError`]. It understands
//! standard CSS shapes; extended at-rules (`@def`, `@if`, `@for`,
//! `@defmixin`, `@component`, ...) are produced as *unknown* at-rule nodes
//! that the compiler passes classify and restructure.
//!
//! # Example
//!
//! ```
//! use cascada_parser::parse;
//!
//! let tree = parse("demo.gss", ".menu { color: red }").unwrap();
//! let body = tree.body();
//! assert_eq!(tree.render(body), "[[.menu]{[color:[red]]}]");
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod parser_types;
pub mod span;
pub mod tokens;

mod lower;


use std::sync::Arc;

use log::debug;

use cascada_core::diagnostics::Diagnostic;
use cascada_core::location::SourceUnit;
use cascada_core::tree::Tree;

pub use error::ParseError;
pub use span::{Span, Spanned};

/// Parse a single named source text into a tree.
///
/// # Errors
///
/// Returns a [`ParseError`] carrying located diagnostics when the source
/// cannot be lexed or parsed.
pub fn parse(name: &str, text: &str) -> Result<Tree, ParseError> {
    let unit = SourceUnit::new(name, text);
    parse_units(&[unit])
}

/// Parse several source units into one combined tree.
///
/// Units are lowered in order: the first unit's `@charset` wins, imports
/// concatenate, bodies concatenate. Per-unit provenance is preserved on
/// every node's source location.
///
/// # Errors
///
/// Returns a [`ParseError`] for the first unit that cannot be lexed or
/// parsed; parse errors are fatal to producing a tree at all.
pub fn parse_units(units: &[Arc<SourceUnit>]) -> Result<Tree, ParseError> {
    let mut tree = Tree::new();
    for unit in units {
        debug!(unit = unit.name(), bytes = unit.contents().len(); "parsing source unit");

        let tokens = lexer::tokenize(unit.contents()).map_err(|err| {
            Diagnostic::error(err.message)
                .with_code(err.code)
                .with_label(
                    unit.location(err.span.start(), err.span.end()),
                    "while lexing this",
                )
        })?;

        let sheet = parser::build_sheet(&tokens, unit.contents().len()).map_err(|err| {
            Diagnostic::error(err.message)
                .with_code(err.code)
                .with_label(unit.location(err.span.start(), err.span.end()), "here")
        })?;

        lower::lower_sheet(&mut tree, unit, sheet);
    }
    if let Some(first) = units.first() {
        tree.set_source(Arc::clone(first));
    }

    debug_assert!(tree.check_consistency().is_ok());
    Ok(tree)
}
