//! Configuration for the indexer CLI.
//!
//! Handles:
//! - Command-line argument parsing
//! - Splitting the job path into a storage root and a job name

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::parser::ErrorPolicy;

/// Command-line arguments for the layer indexer
#[derive(Debug, Parser)]
#[command(name = "gcode-index")]
#[command(about = "Build a layer index for a G-code file in one streaming pass")]
#[command(version)]
pub struct Args {
    /// G-code file to index
    pub file: PathBuf,

    /// What to do when a line fails to scan or decode
    #[arg(long, value_enum, default_value_t = ErrorPolicy::Abort)]
    pub on_error: ErrorPolicy,

    /// Emit the resulting index as JSON instead of a plain summary
    #[arg(long)]
    pub json: bool,

    /// Log every decoded command at debug level
    #[arg(long)]
    pub explain: bool,

    /// Log level for the indexer
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Resolved configuration for one indexing run
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory standing in for the storage medium
    pub storage_root: PathBuf,
    /// Job name relative to the storage root
    pub job_name: String,
    /// Line-failure policy
    pub on_error: ErrorPolicy,
    /// JSON output instead of the plain summary
    pub json: bool,
    /// Per-command explanations at debug level
    pub explain: bool,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        let job_name = args
            .file
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .with_context(|| format!("{} has no file name", args.file.display()))?;
        let storage_root = match args.file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(Config {
            storage_root,
            job_name,
            on_error: args.on_error,
            json: args.json,
            explain: args.explain,
            log_level: args.log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(file: &str) -> Args {
        Args {
            file: PathBuf::from(file),
            on_error: ErrorPolicy::Abort,
            json: false,
            explain: false,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn splits_path_into_root_and_name() {
        let config = Config::from_args(args("/media/card/job.gcode")).expect("config");
        assert_eq!(config.storage_root, PathBuf::from("/media/card"));
        assert_eq!(config.job_name, "job.gcode");
    }

    #[test]
    fn bare_file_name_uses_current_directory() {
        let config = Config::from_args(args("job.gcode")).expect("config");
        assert_eq!(config.storage_root, PathBuf::from("."));
        assert_eq!(config.job_name, "job.gcode");
    }
}
