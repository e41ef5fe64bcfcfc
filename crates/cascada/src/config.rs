//! Job configuration.
//!
//! Everything a compilation job can vary on lives in [`JobConfig`]: the
//! output mode, the renaming strategy, the truth set for conditionals,
//! compile-time constants, and the flipping switch. All types implement
//! [`serde::Deserialize`] so a job can be loaded from an external source
//! (the CLI reads TOML). There is no ambient/static configuration:
//! several jobs with different configurations can run in one process
//! without interfering.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

/// Output text shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable, indented.
    #[default]
    Pretty,
    /// Minimal whitespace.
    Compact,
}

/// Class-renaming strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenameMode {
    /// Leave class names alone.
    #[default]
    None,
    /// Append `_` to each dash-separated fragment; readable output that
    /// still catches code depending on unrenamed names.
    Debug,
    /// Substitute each dash-separated fragment with a minimal generated
    /// name.
    Minimal,
}

/// Configuration for one compilation job.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct JobConfig {
    /// Output text shape.
    pub output: OutputFormat,

    /// Strip quotes from string values that read as plain identifiers
    /// (pretty output only).
    pub strip_quotes: bool,

    /// Class-renaming strategy.
    pub rename: RenameMode,

    /// Names the minimal renamer must never hand out.
    pub excluded_class_names: Vec<String>,

    /// Condition names that evaluate true in `@if`/`@elseif`.
    pub true_conditions: Vec<String>,

    /// Compile-time constants substituted into loop bounds and
    /// definition values.
    pub compile_constants: BTreeMap<String, f64>,

    /// Leave unresolvable constant-style references alone instead of
    /// reporting them.
    pub allow_undefined_constants: bool,

    /// Flip left/right-sensitive rules for RTL output.
    pub flip: bool,
}

impl JobConfig {
    /// The truth set as passes consume it.
    pub(crate) fn truth_set(&self) -> HashSet<String> {
        self.true_conditions.iter().cloned().collect()
    }

    /// The excluded-name set as the minimal renamer consumes it.
    pub(crate) fn excluded_set(&self) -> HashSet<String> {
        self.excluded_class_names.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = JobConfig::default();
        assert_eq!(config.output, OutputFormat::Pretty);
        assert_eq!(config.rename, RenameMode::None);
        assert!(!config.flip);
        assert!(!config.allow_undefined_constants);
    }

    #[test]
    fn test_deserialize_from_toml_shape() {
        let config: JobConfig = serde_json::from_value(serde_json::json!({
            "output": "compact",
            "rename": "minimal",
            "true-conditions": ["IE"],
            "compile-constants": { "COLUMNS": 12.0 },
            "flip": true,
        }))
        .unwrap();
        assert_eq!(config.output, OutputFormat::Compact);
        assert_eq!(config.rename, RenameMode::Minimal);
        assert!(config.truth_set().contains("IE"));
        assert_eq!(config.compile_constants.get("COLUMNS"), Some(&12.0));
        assert!(config.flip);
    }
}
