//! Cascada - a source-to-source compiler for the GSS stylesheet dialect.
//!
//! Cascada parses an extended CSS grammar (variables, conditionals,
//! loops, mixins, components, custom functions, compile-time arithmetic)
//! into a mutable tree, runs an ordered pipeline of semantic passes over
//! it, and re-emits standard CSS, pretty-printed or compacted.
//!
//! # Examples
//!
//! ```
//! use cascada::{Compiler, config::JobConfig};
//!
//! let source = "
//!     @def BG_COLOR #fff;
//!     .menu { background: BG_COLOR; width: add(30%, 20%) }
//! ";
//!
//! let compiler = Compiler::new(JobConfig::default());
//! let compilation = compiler.compile_source("demo.gss", source).unwrap();
//! assert!(!compilation.has_errors());
//! assert_eq!(
//!     compilation.css,
//!     ".menu {\n  background: #fff;\n  width: 50%;\n}\n"
//! );
//! ```

pub mod config;
pub mod functions;
pub mod passes;
pub mod printer;
pub mod rename;

mod error;
mod pipeline;

use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info};

use cascada_core::diagnostics::{Diagnostic, ErrorManager};
use cascada_core::location::SourceUnit;
use cascada_core::tree::Tree;

use config::{JobConfig, OutputFormat, RenameMode};
use functions::{FunctionRegistry, default_registry};
use printer::{CompactPrinter, PrettyPrinter};
use rename::{
    MinimalSubstitutionMap, RecordingSubstitutionMap, SplittingSubstitutionMap, SubstitutionMap,
    SuffixingSubstitutionMap,
};

pub use cascada_core::diagnostics::Severity;
pub use cascada_parser::ParseError;
pub use error::CascadaError;

/// The result of one compilation job: best-effort CSS output, the
/// collected diagnostics, and the recorded renaming map when renaming
/// was enabled.
#[derive(Debug)]
pub struct Compilation {
    /// The emitted CSS. Produced even when there are errors, for
    /// diagnostics and tooling use.
    pub css: String,
    /// Every problem the passes reported, in report order.
    pub diagnostics: Vec<Diagnostic>,
    /// Recorded class-name substitutions, in first-use order.
    pub renaming: Option<IndexMap<String, String>>,
}

impl Compilation {
    /// Whether any error-severity diagnostic was reported. A job with
    /// zero errors is expected to have produced valid output.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity() == Severity::Error)
    }
}

/// A configured compiler, reusable across source sets.
///
/// Both the configuration and the custom-function registry are explicit
/// per-compiler state: several compilers with different setups can
/// coexist in one process.
pub struct Compiler {
    config: JobConfig,
    registry: FunctionRegistry,
}

impl Compiler {
    /// A compiler with the given job configuration and the stock
    /// function set.
    pub fn new(config: JobConfig) -> Self {
        Self {
            config,
            registry: default_registry(),
        }
    }

    /// Replace the custom-function registry.
    pub fn with_functions(mut self, registry: FunctionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Compile a single named source text.
    ///
    /// # Errors
    ///
    /// Returns [`CascadaError::Parse`] when the source cannot be parsed;
    /// pass-level problems land on the returned [`Compilation`] instead.
    pub fn compile_source(&self, name: &str, text: &str) -> Result<Compilation, CascadaError> {
        let unit = SourceUnit::new(name, text);
        self.compile_units(&[unit])
    }

    /// Compile several source units into one output.
    ///
    /// # Errors
    ///
    /// Returns [`CascadaError::Parse`] for the first unit that cannot be
    /// parsed.
    pub fn compile_units(&self, units: &[Arc<SourceUnit>]) -> Result<Compilation, CascadaError> {
        info!(units = units.len(); "compilation started");

        let mut tree = cascada_parser::parse_units(units).map_err(|err| {
            let src = units
                .first()
                .map(|u| u.contents().to_owned())
                .unwrap_or_default();
            CascadaError::new_parse_error(err, src)
        })?;

        let mut errors = ErrorManager::new();
        let mut recorder = self.substitution_map();
        pipeline::run_passes(
            &mut tree,
            &mut errors,
            &self.config,
            &self.registry,
            recorder.as_mut().map(|r| r as &mut dyn SubstitutionMap),
        );

        let css = self.print(&mut tree);
        let renaming = recorder.map(RecordingSubstitutionMap::into_mappings);

        info!(errors = errors.error_count(), bytes = css.len(); "compilation finished");
        Ok(Compilation {
            css,
            diagnostics: errors.into_diagnostics(),
            renaming,
        })
    }

    fn substitution_map(
        &self,
    ) -> Option<RecordingSubstitutionMap<Box<dyn SubstitutionMap>>> {
        let inner: Box<dyn SubstitutionMap> = match self.config.rename {
            RenameMode::None => return None,
            RenameMode::Debug => Box::new(SplittingSubstitutionMap::new(
                SuffixingSubstitutionMap::new("_"),
            )),
            RenameMode::Minimal => Box::new(SplittingSubstitutionMap::new(
                MinimalSubstitutionMap::with_excluded(self.config.excluded_set()),
            )),
        };
        Some(RecordingSubstitutionMap::new(inner))
    }

    fn print(&self, tree: &mut Tree) -> String {
        match self.config.output {
            OutputFormat::Pretty => {
                let mut printer = PrettyPrinter::new();
                if self.config.strip_quotes {
                    printer = printer.with_quote_stripping();
                }
                printer.print(tree)
            }
            OutputFormat::Compact => {
                debug!("using compact printer");
                CompactPrinter::new().print(tree)
            }
        }
    }
}
