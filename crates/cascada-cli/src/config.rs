//! Configuration file loading for the CLI.
//!
//! Finds and loads a TOML [`JobConfig`] from an explicit path, the local
//! project directory, or the platform config directory, then lets
//! command-line flags override what the file said.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use cascada::CascadaError;
use cascada::config::{JobConfig, OutputFormat, RenameMode};

use crate::args::Args;

/// Configuration-related errors for the CLI.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("invalid option: {0}")]
    Invalid(String),
}

impl From<ConfigError> for CascadaError {
    fn from(err: ConfigError) -> Self {
        CascadaError::Config(err.to_string())
    }
}

/// Find and load the job configuration.
///
/// Search order: the explicit `--config` path, `cascada/config.toml` in
/// the working directory, the platform config directory, then defaults.
///
/// # Errors
///
/// Fails when an explicit path is missing or any found file cannot be
/// parsed.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<JobConfig, CascadaError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("cascada/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("dev", "cascada", "cascada") {
        let system_config = proj_dirs.config_dir().join("config.toml");
        if system_config.exists() {
            info!(path = system_config.display().to_string(); "loading configuration from system path");
            return load_config_file(system_config);
        }
        debug!(path = system_config.display().to_string(); "system configuration file not found");
    }

    debug!("no configuration file found, using defaults");
    Ok(JobConfig::default())
}

fn load_config_file(path: impl AsRef<Path>) -> Result<JobConfig, CascadaError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }
    let content = fs::read_to_string(path)?;
    let config: JobConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    Ok(config)
}

/// Apply command-line flags on top of the loaded configuration; flags
/// win over the file.
pub fn apply_args(mut config: JobConfig, args: &Args) -> Result<JobConfig, CascadaError> {
    if args.compact {
        config.output = OutputFormat::Compact;
    }
    if args.flip {
        config.flip = true;
    }
    if args.allow_undefined_constants {
        config.allow_undefined_constants = true;
    }
    if let Some(mode) = &args.rename {
        config.rename = match mode.as_str() {
            "none" => RenameMode::None,
            "debug" => RenameMode::Debug,
            "minimal" => RenameMode::Minimal,
            other => {
                return Err(
                    ConfigError::Invalid(format!("unknown rename mode `{other}`")).into(),
                );
            }
        };
    }
    config.true_conditions.extend(args.defines.iter().cloned());
    for entry in &args.constants {
        let Some((name, value)) = entry.split_once('=') else {
            return Err(ConfigError::Invalid(format!(
                "expected NAME=VALUE for --const, got `{entry}`"
            ))
            .into());
        };
        let value: f64 = value.parse().map_err(|_| {
            ConfigError::Invalid(format!("`{value}` is not a number in --const {entry}"))
        })?;
        config.compile_constants.insert(name.to_owned(), value);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser as _;

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("cascada").chain(argv.iter().copied()))
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = args(&["in.gss", "--compact", "--flip", "--define", "IE"]);
        let config = apply_args(JobConfig::default(), &args).unwrap();
        assert_eq!(config.output, OutputFormat::Compact);
        assert!(config.flip);
        assert_eq!(config.true_conditions, ["IE"]);
    }

    #[test]
    fn test_constants_parse() {
        let args = args(&["in.gss", "--const", "COLS=12", "--const", "SCALE=1.5"]);
        let config = apply_args(JobConfig::default(), &args).unwrap();
        assert_eq!(config.compile_constants.get("COLS"), Some(&12.0));
        assert_eq!(config.compile_constants.get("SCALE"), Some(&1.5));
    }

    #[test]
    fn test_bad_constant_rejected() {
        let args = args(&["in.gss", "--const", "COLS"]);
        assert!(apply_args(JobConfig::default(), &args).is_err());
    }

    #[test]
    fn test_bad_rename_mode_rejected() {
        let args = args(&["in.gss", "--rename", "bogus"]);
        assert!(apply_args(JobConfig::default(), &args).is_err());
    }
}
