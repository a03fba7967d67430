pub mod check;
pub mod fmt;

use std::path::{Path, PathBuf};
use std::process;

use clap::Args;
use lea::{ConfigError, FormatConfig, SyntaxError};
use thiserror::Error;

/// Source file extension picked up when walking a directory.
const SOURCE_EXTENSION: &str = "lea";

/// Failure to process one input file. Reported against that file; the
/// remaining files are still processed.
#[derive(Debug, Error)]
pub enum FmtError {
    #[error("cannot read '{}': {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write '{}': {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot parse '{}': {}", .path.display(), .error)]
    Syntax {
        path: PathBuf,
        text: String,
        #[source]
        error: SyntaxError,
    },
}

impl FmtError {
    /// Print the error to stderr; syntax errors get positioned diagnostics.
    pub fn report(&self) {
        match self {
            FmtError::Syntax { path, text, error } => {
                error.render(&path.to_string_lossy(), text);
            }
            other => eprintln!("error: {}", other),
        }
    }
}

/// Read a source file, mapping the I/O failure to a [`FmtError`].
pub fn read_source(path: &Path) -> Result<String, FmtError> {
    std::fs::read_to_string(path).map_err(|source| FmtError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Command-line overrides for the `[format]` section of `lea.toml`.
#[derive(Args, Default)]
pub struct FormatOverrides {
    /// Config file to use instead of searching for lea.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Spaces per indentation level
    #[arg(long)]
    pub indent_size: Option<usize>,
    /// Target maximum line width
    #[arg(long)]
    pub print_width: Option<usize>,
    /// Omit trailing commas in multi-line lists, records and calls
    #[arg(long)]
    pub no_trailing_commas: bool,
    /// Keep long pipe chains on one line
    #[arg(long)]
    pub no_break_pipes: bool,
    /// Minimum number of stages before a long pipe chain is broken
    #[arg(long, value_name = "STAGES")]
    pub pipe_threshold: Option<usize>,
}

impl FormatOverrides {
    /// The explicit config file or the one discovered from `input`, with
    /// command-line flags applied on top.
    pub fn resolve(&self, input: &Path) -> Result<FormatConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => FormatConfig::load(path)?,
            None => FormatConfig::resolve(input)?,
        };
        if let Some(indent_size) = self.indent_size {
            config.indent_size = indent_size;
        }
        if let Some(print_width) = self.print_width {
            config.print_width = print_width;
        }
        if self.no_trailing_commas {
            config.trailing_commas = false;
        }
        if self.no_break_pipes {
            config.break_pipe_chains = false;
        }
        if let Some(threshold) = self.pipe_threshold {
            config.pipe_chain_break_threshold = threshold;
        }
        Ok(config)
    }
}

/// Resolve an input path to the `.lea` files it names, sorted.
pub fn resolve_lea_files(input: &Path) -> Vec<PathBuf> {
    if input.is_dir() {
        collect_lea_files(input)
    } else if !input.exists() {
        eprintln!("error: '{}' does not exist", input.display());
        process::exit(1);
    } else if input.extension().is_some_and(|e| e == SOURCE_EXTENSION) {
        vec![input.to_path_buf()]
    } else {
        eprintln!("error: input must be a .lea file or directory");
        process::exit(1);
    }
}

fn collect_lea_files(dir: &Path) -> Vec<PathBuf> {
    let mut result = Vec::new();
    collect_lea_files_recursive(dir, &mut result);
    result.sort();
    result
}

fn collect_lea_files_recursive(dir: &Path, result: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!("skipping '{}': {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();
        let name_str = name.to_string_lossy();

        // Skip hidden directories and target/
        if name_str.starts_with('.') || name_str == "target" {
            continue;
        }

        if path.is_dir() {
            collect_lea_files_recursive(&path, result);
        } else if path.extension().is_some_and(|e| e == SOURCE_EXTENSION) {
            result.push(path);
        }
    }
}
