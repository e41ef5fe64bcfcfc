//! Source units and source locations.
//!
//! A [`SourceUnit`] is one named input stylesheet (name plus full text). A
//! [`SourceLocation`] ties an AST node back to a character range inside one
//! unit. Locations are immutable value types created by the parser and
//! consumed by diagnostics; the only operations are comparison and
//! [`merge`](SourceLocation::merge)/[`merge_all`](SourceLocation::merge_all).
//!
//! Merging is deliberately strict: a merged location must span a contiguous,
//! ordered list of constituents from the same unit. Merging out-of-order or
//! cross-unit locations signals a compiler bug and fails with
//! [`LocationError::IncompatibleLocations`].

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Errors produced by location arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// Two locations could not be combined because they come from different
    /// source units or are not in ascending order.
    #[error("incompatible locations: {0}")]
    IncompatibleLocations(String),
}

/// One named input stylesheet: a name and its full text.
///
/// Units are shared immutably (via [`Arc`]) between every location that
/// references them, so cloning a location never copies source text. Line
/// start offsets are computed once at construction so that
/// [`point`](SourceUnit::point) is cheap.
#[derive(Debug)]
pub struct SourceUnit {
    name: String,
    contents: String,
    line_starts: Vec<usize>,
}

impl SourceUnit {
    /// Create a new source unit from a name and its full text.
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Arc<Self> {
        let contents = contents.into();
        let mut line_starts = vec![0];
        for (idx, byte) in contents.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Arc::new(Self {
            name: name.into(),
            contents,
            line_starts,
        })
    }

    /// The unit's name (usually a file name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unit's full source text.
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Resolve a character offset to a [`SourcePoint`] with 1-based line and
    /// column numbers.
    pub fn point(&self, offset: usize) -> SourcePoint {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert - 1,
        };
        SourcePoint {
            index: offset,
            line: line + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }

    /// Build a [`SourceLocation`] for the half-open offset range
    /// `start..end` within this unit.
    pub fn location(self: &Arc<Self>, start: usize, end: usize) -> SourceLocation {
        debug_assert!(start <= end, "location range reversed: {start}..{end}");
        SourceLocation {
            unit: Arc::clone(self),
            begin: self.point(start),
            end: self.point(end),
        }
    }
}

/// A single position inside a source unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourcePoint {
    /// Character offset from the start of the unit.
    pub index: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

/// An immutable span tying an AST node back to its original text.
///
/// Invariant: `begin <= end`, both within the same source unit.
#[derive(Debug, Clone)]
pub struct SourceLocation {
    unit: Arc<SourceUnit>,
    begin: SourcePoint,
    end: SourcePoint,
}

impl SourceLocation {
    /// The source unit this location points into.
    pub fn unit(&self) -> &Arc<SourceUnit> {
        &self.unit
    }

    /// The (inclusive) begin point.
    pub fn begin(&self) -> SourcePoint {
        self.begin
    }

    /// The (exclusive) end point.
    pub fn end(&self) -> SourcePoint {
        self.end
    }

    /// The length of the span in characters.
    pub fn len(&self) -> usize {
        self.end.index - self.begin.index
    }

    /// Whether the span is empty.
    pub fn is_empty(&self) -> bool {
        self.begin.index == self.end.index
    }

    /// Whether two locations point into the same source unit.
    pub fn same_unit(&self, other: &SourceLocation) -> bool {
        Arc::ptr_eq(&self.unit, &other.unit)
    }

    /// Merge two locations into one spanning both.
    ///
    /// # Errors
    ///
    /// Fails with [`LocationError::IncompatibleLocations`] if the locations
    /// come from different units or `other` starts before `self` ends.
    pub fn merge(&self, other: &SourceLocation) -> Result<SourceLocation, LocationError> {
        if !self.same_unit(other) {
            return Err(LocationError::IncompatibleLocations(format!(
                "cannot merge a location in `{}` with a location in `{}`",
                self.unit.name(),
                other.unit.name()
            )));
        }
        if other.begin.index < self.end.index {
            return Err(LocationError::IncompatibleLocations(format!(
                "locations out of order: {} before {}",
                other.begin.index, self.end.index
            )));
        }
        Ok(SourceLocation {
            unit: Arc::clone(&self.unit),
            begin: self.begin,
            end: other.end,
        })
    }

    /// Merge an ordered, contiguous sequence of locations into one.
    ///
    /// # Errors
    ///
    /// Fails if the iterator is empty or any adjacent pair fails
    /// [`merge`](SourceLocation::merge).
    pub fn merge_all<'a, I>(locations: I) -> Result<SourceLocation, LocationError>
    where
        I: IntoIterator<Item = &'a SourceLocation>,
    {
        let mut iter = locations.into_iter();
        let first = iter.next().ok_or_else(|| {
            LocationError::IncompatibleLocations("cannot merge an empty location list".into())
        })?;
        let mut merged = first.clone();
        for next in iter {
            merged = merged.merge(next)?;
        }
        Ok(merged)
    }
}

impl PartialEq for SourceLocation {
    fn eq(&self, other: &Self) -> bool {
        self.same_unit(other) && self.begin == other.begin && self.end == other.end
    }
}

impl Eq for SourceLocation {}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.unit.name(),
            self.begin.line,
            self.begin.column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Arc<SourceUnit> {
        SourceUnit::new("test.gss", "a { b: c }\n.d { e: f }\n")
    }

    #[test]
    fn test_point_line_and_column() {
        let unit = unit();
        assert_eq!(
            unit.point(0),
            SourcePoint {
                index: 0,
                line: 1,
                column: 1
            }
        );
        // First character after the newline starts line 2.
        assert_eq!(
            unit.point(11),
            SourcePoint {
                index: 11,
                line: 2,
                column: 1
            }
        );
        assert_eq!(unit.point(13).line, 2);
        assert_eq!(unit.point(13).column, 3);
    }

    #[test]
    fn test_merge_ordered() {
        let unit = unit();
        let a = unit.location(0, 4);
        let b = unit.location(4, 10);
        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.begin().index, 0);
        assert_eq!(merged.end().index, 10);
    }

    #[test]
    fn test_merge_out_of_order_fails() {
        let unit = unit();
        let a = unit.location(4, 10);
        let b = unit.location(0, 4);
        assert!(matches!(
            a.merge(&b),
            Err(LocationError::IncompatibleLocations(_))
        ));
    }

    #[test]
    fn test_merge_cross_unit_fails() {
        let a = unit().location(0, 4);
        let b = SourceUnit::new("other.gss", "x { y: z }").location(0, 4);
        assert!(matches!(
            a.merge(&b),
            Err(LocationError::IncompatibleLocations(_))
        ));
    }

    #[test]
    fn test_merge_all_spans_constituents() {
        let unit = unit();
        let parts = [unit.location(0, 2), unit.location(2, 5), unit.location(6, 9)];
        let merged = SourceLocation::merge_all(parts.iter()).unwrap();
        assert_eq!(merged.begin().index, 0);
        assert_eq!(merged.end().index, 9);
    }

    #[test]
    fn test_merge_all_empty_fails() {
        assert!(SourceLocation::merge_all([].iter()).is_err());
    }

    #[test]
    fn test_display_is_name_line_column() {
        let unit = unit();
        let loc = unit.location(11, 13);
        assert_eq!(loc.to_string(), "test.gss:2:1");
    }
}
