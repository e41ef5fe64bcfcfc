//! CSS property names and their derived metadata.
//!
//! A [`Property`] is the canonical lower-cased name of a CSS property plus
//! the metadata passes need: which shorthand properties cover it, the
//! partition key used for conflict analysis, and whether its value is a
//! positional list (top/right/bottom/left) that directional flipping must
//! rotate.

use crate::ident::Name;

/// Shorthand property names. A longhand like `border-left-color` is covered
/// by every entry here that is a dash-prefix of its name.
const SHORTHANDS: &[&str] = &[
    "background",
    "border",
    "border-bottom",
    "border-color",
    "border-left",
    "border-right",
    "border-style",
    "border-top",
    "border-width",
    "font",
    "list-style",
    "margin",
    "outline",
    "padding",
    "transition",
];

/// Properties whose value is a positional top/right/bottom/left list.
const POSITIONAL: &[&str] = &[
    "border-color",
    "border-style",
    "border-width",
    "margin",
    "padding",
];

/// A CSS property: canonical name plus derived metadata.
///
/// # Examples
///
/// ```
/// use cascada_core::property::Property;
///
/// let p = Property::new("Border-Left-Color");
/// assert_eq!(p.name().to_string(), "border-left-color");
/// assert_eq!(p.partition().to_string(), "border");
/// let shorthands: Vec<String> =
///     p.shorthands().iter().map(|s| s.to_string()).collect();
/// assert_eq!(shorthands, ["border", "border-color", "border-left"]);
///
/// let margin = Property::new("margin");
/// assert!(margin.has_positional_parameters());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Property {
    name: Name,
    partition: Name,
    shorthands: Vec<Name>,
    has_positional_parameters: bool,
}

impl Property {
    /// Build a property from its (possibly mixed-case) source name.
    pub fn new(name: &str) -> Self {
        let canonical = name.to_ascii_lowercase();
        let partition = canonical
            .split('-')
            .next()
            .unwrap_or(canonical.as_str())
            .to_owned();

        let mut shorthands: Vec<Name> = SHORTHANDS
            .iter()
            .filter(|&&shorthand| {
                shorthand != canonical
                    && canonical.starts_with(shorthand)
                    && canonical.as_bytes().get(shorthand.len()) == Some(&b'-')
            })
            .map(|&shorthand| Name::new(shorthand))
            .collect();

        // `border-left-color` is also covered by `border-color`, which is
        // not a textual prefix. Cross the positional shorthands with the
        // trailing segment.
        if let Some((head, tail)) = canonical.rsplit_once('-') {
            for &positional in POSITIONAL {
                if let Some((base, _)) = positional.rsplit_once('-') {
                    let crossed = format!("{base}-{tail}");
                    if crossed == positional && head.starts_with(base) && crossed != canonical {
                        let crossed = Name::new(&crossed);
                        if !shorthands.contains(&crossed) {
                            shorthands.push(crossed);
                        }
                    }
                }
            }
        }
        shorthands.sort_by_key(Name::resolve);

        let has_positional_parameters = POSITIONAL.contains(&canonical.as_str());

        Self {
            name: Name::new(&canonical),
            partition: Name::new(&partition),
            shorthands,
            has_positional_parameters,
        }
    }

    /// The canonical lower-cased property name.
    pub fn name(&self) -> Name {
        self.name
    }

    /// The partition key used for conflict analysis: the first dash
    /// component of the name (`border` for `border-left-color`).
    pub fn partition(&self) -> Name {
        self.partition
    }

    /// Shorthand properties that cover this one, sorted by name.
    pub fn shorthands(&self) -> &[Name] {
        &self.shorthands
    }

    /// Whether the property's value is a positional top/right/bottom/left
    /// list.
    pub fn has_positional_parameters(&self) -> bool {
        self.has_positional_parameters
    }
}
