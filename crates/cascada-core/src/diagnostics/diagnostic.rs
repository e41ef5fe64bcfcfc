//! The core diagnostic type.

use std::fmt;

use crate::diagnostics::{ErrorCode, Label, Severity};
use crate::location::SourceLocation;

/// A single error or warning with location information.
///
/// # Example
///
/// ```
/// use cascada_core::diagnostics::{Diagnostic, ErrorCode};
/// use cascada_core::location::SourceUnit;
///
/// let unit = SourceUnit::new("app.gss", "@def;");
/// let diag = Diagnostic::error("@def requires a name and a value")
///     .with_code(ErrorCode::E200)
///     .with_label(unit.location(0, 4), "nothing follows the at-rule name")
///     .with_help("write `@def NAME value;`");
///
/// assert_eq!(diag.message(), "@def requires a name and a value");
/// assert_eq!(diag.code(), Some(ErrorCode::E200));
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// The severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// The primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// All labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// The location of the primary label, if one was attached.
    pub fn primary_location(&self) -> Option<&SourceLocation> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::location)
    }

    /// The help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label.
    pub fn with_label(mut self, location: SourceLocation, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(location, message));
        self
    }

    /// Add a primary label if `location` is present.
    ///
    /// Nodes synthesized by passes may have no location; this keeps call
    /// sites free of the `Option` dance.
    pub fn with_label_opt(
        mut self,
        location: Option<&SourceLocation>,
        message: impl Into<String>,
    ) -> Self {
        if let Some(location) = location {
            self.labels.push(Label::primary(location.clone(), message));
        }
        self
    }

    /// Add a secondary label.
    pub fn with_secondary_label(
        mut self,
        location: SourceLocation,
        message: impl Into<String>,
    ) -> Self {
        self.labels.push(Label::secondary(location, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}[{}]: {}", self.severity, code, self.message)?,
            None => write!(f, "{}: {}", self.severity, self.message)?,
        }
        if let Some(location) = self.primary_location() {
            write!(f, " at {location}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::SourceUnit;

    #[test]
    fn test_display_with_code_and_location() {
        let unit = SourceUnit::new("m.gss", "@else {}");
        let diag = Diagnostic::error("@else without previous @if")
            .with_code(ErrorCode::E201)
            .with_label(unit.location(0, 5), "orphan branch");

        assert_eq!(
            diag.to_string(),
            "error[E201]: @else without previous @if at m.gss:1:1"
        );
    }

    #[test]
    fn test_display_without_code() {
        let diag = Diagnostic::warning("unused definition");
        assert_eq!(diag.to_string(), "warning: unused definition");
    }

    #[test]
    fn test_primary_location_skips_secondary() {
        let unit = SourceUnit::new("m.gss", "a b");
        let diag = Diagnostic::error("duplicate")
            .with_secondary_label(unit.location(0, 1), "first")
            .with_label(unit.location(2, 3), "second");

        assert_eq!(diag.primary_location().unwrap().begin().index, 2);
    }
}
