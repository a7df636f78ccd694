//! Settings shared by the library helpers and the `fname` binary.
//!
//! ```toml
//! max_depth = 64
//! keep_invalid_characters = false
//!
//! [counter]
//! start = 1
//! step = 1
//! width = 3
//! ```

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};

use crate::parser::{DEFAULT_MAX_DEPTH, MAX_DEPTH_CEILING};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("max_depth must be between 1 and {MAX_DEPTH_CEILING}, got {0}")]
    MaxDepth(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Maximum nesting of functions and keywords
    pub max_depth: usize,
    /// Keep characters that are not allowed in file names
    pub keep_invalid_characters: bool,
    pub counter: CounterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: DEFAULT_MAX_DEPTH,
            keep_invalid_characters: false,
            counter: CounterConfig::default(),
        }
    }
}

/// How batch runs number their items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CounterConfig {
    pub start: u64,
    pub step: u64,
    /// Default zero-padding of `{counter}`
    pub width: usize,
}

impl Default for CounterConfig {
    fn default() -> Self {
        CounterConfig {
            start: 1,
            step: 1,
            width: 0,
        }
    }
}

impl CounterConfig {
    /// Counter value of the item at `index` in a batch
    pub fn value_at(&self, index: usize) -> u64 {
        self.start
            .saturating_add(self.step.saturating_mul(index as u64))
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        if config.max_depth == 0 || config.max_depth > MAX_DEPTH_CEILING {
            return Err(ConfigError::MaxDepth(config.max_depth));
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "configuration loaded");
        Ok(config)
    }
}
