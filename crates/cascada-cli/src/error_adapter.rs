//! Bridge from Cascada diagnostics to miette's rich rendering.
//!
//! Parse errors and pass diagnostics carry [`SourceLocation`]s into
//! shared source units; the adapter exposes them to miette as labeled
//! spans over the owning unit's text, so every diagnostic renders with a
//! source snippet.
//!
//! [`SourceLocation`]: cascada_core::location::SourceLocation

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use cascada::CascadaError;
use cascada_core::diagnostics::Diagnostic;
use cascada_core::location::SourceUnit;

/// Adapter for one located Cascada diagnostic.
pub struct DiagnosticAdapter {
    diag: Diagnostic,
    /// The source unit of the primary label, kept alive for snippet
    /// rendering.
    unit: Option<Arc<SourceUnit>>,
    /// The primary unit's text, owned so it can be handed to miette as a
    /// sized [`miette::SourceCode`].
    source: Option<String>,
}

impl DiagnosticAdapter {
    /// Wrap a diagnostic for rendering.
    pub fn new(diag: Diagnostic) -> Self {
        let unit = diag
            .primary_location()
            .map(|location| Arc::clone(location.unit()));
        let source = unit.as_ref().map(|unit| unit.contents().to_owned());
        Self { diag, unit, source }
    }
}

impl fmt::Debug for DiagnosticAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter {}

impl MietteDiagnostic for DiagnosticAdapter {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h.to_owned()) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.diag.severity() {
            cascada::Severity::Error => miette::Severity::Error,
            cascada::Severity::Warning => miette::Severity::Warning,
        })
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source
            .as_ref()
            .map(|source| source as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let unit = self.unit.as_ref()?;
        // Labels from other units cannot be rendered against this unit's
        // text; keep the ones that match.
        let labels: Vec<LabeledSpan> = self
            .diag
            .labels()
            .iter()
            .filter(|label| Arc::ptr_eq(label.location().unit(), unit))
            .map(|label| {
                let location = label.location();
                let span = miette::SourceSpan::new(
                    location.begin().index.into(),
                    location.len(),
                );
                let message = Some(label.message().to_owned());
                if label.is_primary() {
                    LabeledSpan::new_primary_with_span(message, span)
                } else {
                    LabeledSpan::new_with_span(message, span)
                }
            })
            .collect();
        if labels.is_empty() {
            return None;
        }
        Some(Box::new(labels.into_iter()))
    }
}

/// Adapter for [`CascadaError`] variants without located diagnostics.
pub struct ErrorAdapter<'a>(pub &'a CascadaError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            CascadaError::Io(_) => "cascada::io",
            CascadaError::Parse { .. } => return None,
            CascadaError::Config(_) => "cascada::config",
        };
        Some(Box::new(code))
    }
}

/// A reportable error miette can render: a located diagnostic or a plain
/// error.
#[derive(Debug)]
pub enum Reportable<'a> {
    Diagnostic(DiagnosticAdapter),
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a fatal [`CascadaError`] into reportables: one per parse
/// diagnostic, or a single plain error.
pub fn to_reportables(err: &CascadaError) -> Vec<Reportable<'_>> {
    match err {
        CascadaError::Parse { err: parse_err, .. } => parse_err
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d.clone())))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascada_core::diagnostics::ErrorCode;
    use cascada_core::location::SourceUnit;

    fn located_diagnostic() -> Diagnostic {
        let unit = SourceUnit::new("t.gss", "@else { a { b: c } }");
        Diagnostic::error("@else without previous @if")
            .with_code(ErrorCode::E201)
            .with_label(unit.location(0, 5), "orphan branch")
            .with_help("start the chain with @if")
    }

    #[test]
    fn test_adapter_exposes_code_help_and_labels() {
        let adapter = DiagnosticAdapter::new(located_diagnostic());
        assert_eq!(adapter.to_string(), "@else without previous @if");
        assert_eq!(adapter.code().unwrap().to_string(), "E201");
        assert_eq!(adapter.help().unwrap().to_string(), "start the chain with @if");

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].primary());
        assert_eq!(labels[0].offset(), 0);
        assert_eq!(labels[0].len(), 5);
    }

    #[test]
    fn test_unlocated_diagnostic_has_no_labels() {
        let adapter = DiagnosticAdapter::new(Diagnostic::error("no location"));
        assert!(adapter.labels().is_none());
        assert!(adapter.source_code().is_none());
    }

    #[test]
    fn test_parse_error_fans_out() {
        let parse_err = cascada::ParseError::new(vec![
            located_diagnostic(),
            Diagnostic::error("second"),
        ]);
        let err = CascadaError::new_parse_error(parse_err, "src");
        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 2);
    }

    #[test]
    fn test_config_error_is_a_plain_reportable() {
        let err = CascadaError::Config("bad flag".into());
        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        assert_eq!(
            reportables[0].code().unwrap().to_string(),
            "cascada::config"
        );
    }
}
