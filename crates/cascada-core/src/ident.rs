//! Interned identifier storage for class and property names.
//!
//! Class names and property names are compared constantly (renaming maps,
//! shorthand lookups, flip tables) and duplicated across thousands of nodes
//! in a large stylesheet, so they are stored as interned [`Name`] symbols.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner backing [`Name`].
///
/// Guarded by a `Mutex` so trees can be built from multiple threads, even
/// though a single compilation job is strictly single-threaded.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> &'static Mutex<DefaultStringInterner> {
    INTERNER.get_or_init(|| Mutex::new(DefaultStringInterner::new()))
}

/// An interned identifier: cheap to copy, cheap to compare.
///
/// # Examples
///
/// ```
/// use cascada_core::ident::Name;
///
/// let a = Name::new("goog-menu");
/// let b = Name::new("goog-menu");
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "goog-menu");
///
/// // Property names are canonicalized to lower case.
/// let p = Name::new_lowercase("Border-Left");
/// assert_eq!(p.to_string(), "border-left");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Name(DefaultSymbol);

impl Name {
    /// Intern `name` as-is.
    pub fn new(name: &str) -> Self {
        let mut interner = interner().lock().expect("interner lock poisoned");
        Self(interner.get_or_intern(name))
    }

    /// Intern the lower-cased form of `name`.
    ///
    /// Used for property names and at-rule names, which are
    /// case-insensitive in CSS and stored canonically lower-cased.
    pub fn new_lowercase(name: &str) -> Self {
        if name.chars().any(|c| c.is_ascii_uppercase()) {
            Self::new(&name.to_ascii_lowercase())
        } else {
            Self::new(name)
        }
    }

    /// Resolve the interned string.
    ///
    /// Returns an owned copy because the interner is shared behind a lock.
    pub fn resolve(&self) -> String {
        let interner = interner().lock().expect("interner lock poisoned");
        interner
            .resolve(self.0)
            .expect("Name symbol missing from interner")
            .to_owned()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resolve())
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.resolve() == *other
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_string_same_symbol() {
        assert_eq!(Name::new("alpha"), Name::new("alpha"));
        assert_ne!(Name::new("alpha"), Name::new("beta"));
    }

    #[test]
    fn test_lowercase_canonicalization() {
        assert_eq!(Name::new_lowercase("COLOR"), Name::new("color"));
        assert_eq!(Name::new_lowercase("color"), Name::new("color"));
    }

    #[test]
    fn test_str_comparison() {
        let name = Name::new("margin-left");
        assert_eq!(name, "margin-left");
    }
}
