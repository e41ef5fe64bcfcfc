//! CLI logic for the Cascada stylesheet compiler.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{info, warn};

use cascada::{CascadaError, Compiler};
use cascada_core::location::SourceUnit;

use error_adapter::DiagnosticAdapter;

/// Run the Cascada CLI application.
///
/// Compiles the input files together through the pass pipeline and
/// writes the resulting CSS (and, when requested, the renaming map).
/// Returns the number of error-severity diagnostics the job collected;
/// the caller decides the exit code.
///
/// # Errors
///
/// Returns `CascadaError` for file I/O problems, configuration problems,
/// and fatal parse errors.
pub fn run(args: &Args) -> Result<usize, CascadaError> {
    info!(
        inputs = args.inputs.len(),
        output_path = args.output;
        "compiling stylesheets"
    );

    let job_config = config::load_config(args.config.as_ref())?;
    let job_config = config::apply_args(job_config, args)?;

    let mut units = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        let text = fs::read_to_string(input)?;
        units.push(SourceUnit::new(input.clone(), text));
    }

    let compiler = Compiler::new(job_config);
    let compilation = compiler.compile_units(&units)?;

    // Pass diagnostics are collected, not fatal: render them all, then
    // write the best-effort output either way.
    let reporter = miette::GraphicalReportHandler::new();
    for diagnostic in &compilation.diagnostics {
        let mut rendered = String::new();
        reporter
            .render_report(
                &mut rendered,
                &DiagnosticAdapter::new(diagnostic.clone()),
            )
            .expect("writing to a String buffer is infallible");
        warn!("{rendered}");
    }

    fs::write(&args.output, &compilation.css)?;
    info!(output_file = args.output, bytes = compilation.css.len(); "CSS written");

    if let Some(map_path) = &args.rename_map {
        let mappings = compilation.renaming.unwrap_or_default();
        let json = serde_json::to_string_pretty(&mappings)
            .expect("a string map serializes to JSON");
        fs::write(map_path, json)?;
        info!(map_file = map_path, entries = mappings.len(); "renaming map written");
    }

    let error_count = compilation
        .diagnostics
        .iter()
        .filter(|d| d.severity().is_error())
        .count();
    Ok(error_count)
}
