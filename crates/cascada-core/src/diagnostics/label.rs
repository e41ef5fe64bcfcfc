//! Labeled source locations for diagnostic messages.

use crate::location::SourceLocation;

/// A labeled location in source code.
///
/// Labels attach messages to specific places in a source unit. A diagnostic
/// typically has one primary label marking the offending construct, plus any
/// number of secondary labels giving context ("first defined here").
#[derive(Debug, Clone)]
pub struct Label {
    location: SourceLocation,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(location: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(location: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
            is_primary: false,
        }
    }

    /// The location this label points at.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// The label message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this is the primary label of its diagnostic.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::SourceUnit;

    #[test]
    fn test_primary_and_secondary() {
        let unit = SourceUnit::new("a.gss", "a { b: c }");
        let primary = Label::primary(unit.location(0, 1), "here");
        let secondary = Label::secondary(unit.location(4, 8), "context");

        assert!(primary.is_primary());
        assert!(!secondary.is_primary());
        assert_eq!(primary.message(), "here");
        assert_eq!(secondary.location().begin().index, 4);
    }
}
