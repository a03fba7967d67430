//! Formatter configuration, read from the `[format]` section of `lea.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Name of the project configuration file looked up by the driver.
pub const CONFIG_FILE_NAME: &str = "lea.toml";

/// Layout knobs for the formatter.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    /// Spaces per indentation level.
    #[serde(alias = "indentSize")]
    pub indent_size: usize,
    /// Target maximum line width, including indentation.
    #[serde(alias = "printWidth")]
    pub print_width: usize,
    /// Emit a trailing comma in multi-line lists, records and call arguments.
    #[serde(alias = "trailingCommas")]
    pub trailing_commas: bool,
    /// Break long pipe chains one stage per line.
    #[serde(alias = "breakPipeChains")]
    pub break_pipe_chains: bool,
    /// Minimum number of stages before a long chain is broken.
    #[serde(alias = "pipeChainBreakThreshold")]
    pub pipe_chain_break_threshold: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_size: 2,
            print_width: 80,
            trailing_commas: true,
            break_pipe_chains: true,
            pipe_chain_break_threshold: 3,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    format: FormatConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{}': {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl FormatConfig {
    /// Parse the contents of a `lea.toml` file. A missing `[format]`
    /// section yields the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.format)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Nearest `lea.toml` in `start` or one of its ancestors.
    pub fn discover(start: &Path) -> Option<PathBuf> {
        let start = if start.is_file() {
            start.parent()?
        } else {
            start
        };
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// The configuration that applies to `start`: the discovered file, or
    /// the defaults when there is none.
    pub fn resolve(start: &Path) -> Result<Self, ConfigError> {
        match Self::discover(start) {
            Some(path) => {
                tracing::debug!(config = %path.display(), "using formatter config");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub(crate) fn indent(&self, level: usize) -> String {
        " ".repeat(self.indent_size * level)
    }
}
