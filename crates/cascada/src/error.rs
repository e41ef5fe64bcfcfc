//! Error types for Cascada operations.

use std::io;

use thiserror::Error;

use cascada_parser::ParseError;

/// The main error type for Cascada operations.
///
/// Pass-level problems are not errors in this sense: they are collected
/// as diagnostics on the [`Compilation`](crate::Compilation) and the job
/// still produces best-effort output. `CascadaError` covers the failures
/// that prevent a compilation from producing anything at all.
#[derive(Debug, Error)]
pub enum CascadaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source could not be parsed. Carries the source text so
    /// callers can render the diagnostics against it.
    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CascadaError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
