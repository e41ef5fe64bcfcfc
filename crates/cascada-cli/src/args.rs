//! Command-line argument definitions for the Cascada CLI.

use clap::Parser;

/// Command-line arguments for the Cascada stylesheet compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input GSS files, compiled together in order
    #[arg(required = true, help = "Paths to the input files")]
    pub inputs: Vec<String>,

    /// Path to the output CSS file
    #[arg(short, long, default_value = "out.css")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Emit compact (minimal whitespace) output
    #[arg(long)]
    pub compact: bool,

    /// Flip left/right-sensitive rules for RTL output
    #[arg(long)]
    pub flip: bool,

    /// Class-renaming mode (none, debug, minimal)
    #[arg(long)]
    pub rename: Option<String>,

    /// Write the recorded renaming map to this JSON file
    #[arg(long)]
    pub rename_map: Option<String>,

    /// Condition names treated as true in @if/@elseif
    #[arg(long = "define", value_name = "NAME")]
    pub defines: Vec<String>,

    /// Compile-time constants as NAME=VALUE
    #[arg(long = "const", value_name = "NAME=VALUE")]
    pub constants: Vec<String>,

    /// Leave undefined constant references alone instead of reporting
    #[arg(long)]
    pub allow_undefined_constants: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
