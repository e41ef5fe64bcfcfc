//! Error codes for the Cascada diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors
//! - `E2xx` - Pass/structure errors
//! - `E3xx` - Custom-function and arithmetic errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A string was opened with a quote but never closed on the same line.
    E001,

    /// Unterminated block comment.
    ///
    /// A `/*` comment was opened but `*/` was never found.
    E002,

    /// Unexpected character.
    ///
    /// A character was encountered that is not valid in a stylesheet.
    E003,

    /// Malformed number.
    ///
    /// A numeric literal could not be read as a decimal number.
    E004,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser encountered a token it did not expect at this position.
    E100,

    /// Incomplete input.
    ///
    /// The input ended before a complete construct was parsed.
    E101,

    /// Unbalanced braces.
    ///
    /// A block was opened with `{` but never closed.
    E102,

    /// Misplaced charset.
    ///
    /// `@charset` is only allowed as the very first construct of a unit.
    E103,

    // =========================================================================
    // Pass / Structure Errors (E2xx)
    // =========================================================================
    /// Malformed at-rule.
    ///
    /// An extended at-rule (`@def`, `@for`, `@defmixin`, ...) does not match
    /// its required parameter or block shape.
    E200,

    /// Broken conditional chain.
    ///
    /// An `@elseif` or `@else` appeared without a preceding `@if` in the
    /// same block, or after a terminal `@else`.
    E201,

    /// Undefined constant reference.
    ///
    /// A constant-style identifier was referenced but never bound by `@def`
    /// and the job does not allow undefined constants.
    E202,

    /// Unknown mixin.
    ///
    /// A `@mixin` call names a mixin with no `@defmixin` definition.
    E203,

    /// Mixin arity mismatch.
    ///
    /// A `@mixin` call passes a different number of arguments than the
    /// definition declares.
    E204,

    /// Component structure error.
    ///
    /// A component was nested inside another component, or extends an
    /// unknown component.
    E205,

    /// Dependency error.
    ///
    /// A `@provide` was duplicated or a `@require` names an unprovided
    /// namespace.
    E206,

    // =========================================================================
    // Function / Arithmetic Errors (E3xx)
    // =========================================================================
    /// Wrong number of arguments to a custom function.
    E300,

    /// Argument has the wrong type for a custom function.
    E301,

    /// Incompatible units in arithmetic.
    ///
    /// Two different non-empty units were mixed in one arithmetic call.
    E302,

    /// Division by zero in arithmetic folding.
    E303,

    /// Malformed color argument to a color function.
    E304,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
