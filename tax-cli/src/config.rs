//! Optional TOML configuration for `regime-compare`.
//!
//! ```toml
//! year = "2025-2026"
//! age_band = "general"
//! log_level = "info"
//! log_file = "regime-compare.log"
//! slabs = "custom_slabs.csv"
//! rules = "custom_rules.toml"
//! ```
//!
//! Every key is optional and command-line flags take precedence. Relative
//! paths are resolved against the directory holding the config file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, de};
use tax_core::{AgeBand, TaxYear};
use thiserror::Error;
use tracing::{debug, info};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "regime-compare.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub year: Option<TaxYear>,
    #[serde(deserialize_with = "deserialize_age_band")]
    pub age_band: Option<AgeBand>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    /// Slab tables CSV overlaid on the built-in rules.
    pub slabs: Option<PathBuf>,
    /// Regime rules TOML overlaid on the built-in rules.
    pub rules: Option<PathBuf>,
}

/// Same spellings as `--age-band`: `super-senior`, `super_senior` and
/// `superSenior` all work.
fn deserialize_age_band<'de, D>(deserializer: D) -> Result<Option<AgeBand>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    AgeBand::parse(&value)
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("unknown age band '{value}'")))
}

impl AppConfig {
    pub fn from_toml(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    /// Loads `path`, or [`DEFAULT_CONFIG_FILE`] if it exists when `path` is
    /// `None`. A missing default file is not an error; a missing explicit
    /// one is.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), "loaded config");
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolve_paths(base))
    }

    /// Makes relative file paths relative to `base`.
    pub fn resolve_paths(
        mut self,
        base: &Path,
    ) -> Self {
        for path in [&mut self.log_file, &mut self.slabs, &mut self.rules]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }
}
