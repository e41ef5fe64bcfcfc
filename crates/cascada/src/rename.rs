//! Class-renaming substitution maps.
//!
//! The compiler core only depends on the [`SubstitutionMap`] contract:
//! given a class-name string, return its replacement, deterministically
//! and repeatably for the same input within one job. Everything else -
//! minimal-name generation, prefixing, splitting compound names,
//! recording for persistence - is a swappable strategy layered on that
//! contract.

use indexmap::IndexMap;
use std::collections::HashSet;

/// The class-renaming contract consumed by the rename pass.
///
/// Implementations may be stateful (the minimal map hands out names in
/// call order), but must be referentially transparent given their call
/// history: the same name always maps to the same replacement within one
/// job.
pub trait SubstitutionMap {
    /// The replacement for `class`.
    fn get(&mut self, class: &str) -> String;
}

impl SubstitutionMap for Box<dyn SubstitutionMap> {
    fn get(&mut self, class: &str) -> String {
        (**self).get(class)
    }
}

/// Leaves every class name unchanged.
#[derive(Debug, Default)]
pub struct IdentitySubstitutionMap;

impl SubstitutionMap for IdentitySubstitutionMap {
    fn get(&mut self, class: &str) -> String {
        class.to_owned()
    }
}

/// Prepends a fixed prefix to every class name.
#[derive(Debug)]
pub struct PrefixingSubstitutionMap {
    prefix: String,
}

impl PrefixingSubstitutionMap {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl SubstitutionMap for PrefixingSubstitutionMap {
    fn get(&mut self, class: &str) -> String {
        format!("{}{}", self.prefix, class)
    }
}

/// Appends a fixed suffix to every class name; layered under the
/// splitting map it gives the debug renaming mode its `menu_-open_`
/// shape, which keeps renamed output readable while still exposing code
/// that depends on unrenamed names.
#[derive(Debug)]
pub struct SuffixingSubstitutionMap {
    suffix: String,
}

impl SuffixingSubstitutionMap {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl SubstitutionMap for SuffixingSubstitutionMap {
    fn get(&mut self, class: &str) -> String {
        format!("{}{}", class, self.suffix)
    }
}

/// Hands out the shortest unused names in first-seen order: `a`..`z`,
/// then `a0`..`zz`, and so on, skipping an excluded set (names that would
/// collide with markup the job cannot touch).
#[derive(Debug, Default)]
pub struct MinimalSubstitutionMap {
    assigned: IndexMap<String, String>,
    excluded: HashSet<String>,
    next: usize,
}

const ALPHABET_HEAD: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const ALPHABET_TAIL: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

impl MinimalSubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A minimal map that never hands out a name in `excluded`.
    pub fn with_excluded(excluded: HashSet<String>) -> Self {
        Self {
            excluded,
            ..Self::default()
        }
    }

    /// The `index`-th generated name: a bijective base-26 head character
    /// followed by base-36 tail characters.
    fn nth_name(mut index: usize) -> String {
        let head = ALPHABET_HEAD[index % ALPHABET_HEAD.len()] as char;
        index /= ALPHABET_HEAD.len();
        let mut name = String::new();
        name.push(head);
        while index > 0 {
            index -= 1;
            name.push(ALPHABET_TAIL[index % ALPHABET_TAIL.len()] as char);
            index /= ALPHABET_TAIL.len();
        }
        name
    }
}

impl SubstitutionMap for MinimalSubstitutionMap {
    fn get(&mut self, class: &str) -> String {
        if let Some(existing) = self.assigned.get(class) {
            return existing.clone();
        }
        let generated = loop {
            let candidate = Self::nth_name(self.next);
            self.next += 1;
            if !self.excluded.contains(&candidate) {
                break candidate;
            }
        };
        self.assigned.insert(class.to_owned(), generated.clone());
        generated
    }
}

/// Splits compound dash-joined names, substitutes each fragment through
/// the wrapped map independently, and rejoins.
pub struct SplittingSubstitutionMap<M> {
    inner: M,
}

impl<M: SubstitutionMap> SplittingSubstitutionMap<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }

    /// The wrapped map.
    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<M: SubstitutionMap> SubstitutionMap for SplittingSubstitutionMap<M> {
    fn get(&mut self, class: &str) -> String {
        class
            .split('-')
            .map(|fragment| {
                if fragment.is_empty() {
                    String::new()
                } else {
                    self.inner.get(fragment)
                }
            })
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Records every substitution the wrapped map performs, for persistence.
///
/// The recorded mappings are sufficient to reconstruct identical
/// substitutions in a later job; the wire format itself is owned by the
/// caller that serializes [`mappings`](RecordingSubstitutionMap::mappings).
pub struct RecordingSubstitutionMap<M> {
    inner: M,
    recorded: IndexMap<String, String>,
}

impl<M: SubstitutionMap> RecordingSubstitutionMap<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            recorded: IndexMap::new(),
        }
    }

    /// The recorded mappings, in first-use order.
    pub fn mappings(&self) -> &IndexMap<String, String> {
        &self.recorded
    }

    /// Consume the recorder, returning the recorded mappings.
    pub fn into_mappings(self) -> IndexMap<String, String> {
        self.recorded
    }
}

impl<M: SubstitutionMap> SubstitutionMap for RecordingSubstitutionMap<M> {
    fn get(&mut self, class: &str) -> String {
        let replacement = self.inner.get(class);
        self.recorded
            .insert(class.to_owned(), replacement.clone());
        replacement
    }
}

/// A map replaying previously recorded substitutions, falling back to the
/// wrapped map for unseen names.
pub struct ReplayingSubstitutionMap<M> {
    recorded: IndexMap<String, String>,
    inner: M,
}

impl<M: SubstitutionMap> ReplayingSubstitutionMap<M> {
    pub fn new(recorded: IndexMap<String, String>, inner: M) -> Self {
        Self { recorded, inner }
    }
}

impl<M: SubstitutionMap> SubstitutionMap for ReplayingSubstitutionMap<M> {
    fn get(&mut self, class: &str) -> String {
        match self.recorded.get(class) {
            Some(replacement) => replacement.clone(),
            None => self.inner.get(class),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let mut map = IdentitySubstitutionMap;
        assert_eq!(map.get("goog-menu"), "goog-menu");
    }

    #[test]
    fn test_prefixing() {
        let mut map = PrefixingSubstitutionMap::new("x-");
        assert_eq!(map.get("menu"), "x-menu");
    }

    #[test]
    fn test_minimal_is_repeatable_within_a_job() {
        let mut map = MinimalSubstitutionMap::new();
        let first = map.get("menu");
        let second = map.get("button");
        assert_eq!(first, "a");
        assert_eq!(second, "b");
        // Same input, same answer.
        assert_eq!(map.get("menu"), first);
    }

    #[test]
    fn test_minimal_name_sequence_grows() {
        assert_eq!(MinimalSubstitutionMap::nth_name(0), "a");
        assert_eq!(MinimalSubstitutionMap::nth_name(25), "z");
        assert_eq!(MinimalSubstitutionMap::nth_name(26), "a0");
        assert_eq!(MinimalSubstitutionMap::nth_name(27), "b0");
    }

    #[test]
    fn test_minimal_skips_excluded_names() {
        let excluded = HashSet::from(["a".to_owned(), "b".to_owned()]);
        let mut map = MinimalSubstitutionMap::with_excluded(excluded);
        assert_eq!(map.get("menu"), "c");
    }

    #[test]
    fn test_splitting_substitutes_fragments() {
        let mut map = SplittingSubstitutionMap::new(MinimalSubstitutionMap::new());
        assert_eq!(map.get("goog-menu"), "a-b");
        // The shared fragment reuses its substitution.
        assert_eq!(map.get("goog-button"), "a-c");
    }

    #[test]
    fn test_recording_captures_mappings() {
        let mut map = RecordingSubstitutionMap::new(MinimalSubstitutionMap::new());
        map.get("menu");
        map.get("button");
        let mappings = map.mappings();
        assert_eq!(mappings.get("menu").map(String::as_str), Some("a"));
        assert_eq!(mappings.get("button").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_replaying_prefers_recorded() {
        let recorded = IndexMap::from([("menu".to_owned(), "zz".to_owned())]);
        let mut map = ReplayingSubstitutionMap::new(recorded, MinimalSubstitutionMap::new());
        assert_eq!(map.get("menu"), "zz");
        assert_eq!(map.get("fresh"), "a");
    }
}
