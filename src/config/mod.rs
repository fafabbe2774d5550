//! Configuration management for `minwatch.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── bundler    # [bundler]
//! │   ├── minify     # [minify]
//! │   └── watch      # [watch]
//! ├── error          # ConfigError
//! ├── util           # config file discovery
//! └── mod.rs         # Config (this file)
//! ```
//!
//! The file is optional: without it every section uses its defaults.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{BundlerConfig, MinifyConfig, WatchConfig};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use util::find_config_file;

/// Root configuration structure representing minwatch.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Absolute path of the loaded file, `None` when running on defaults
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Bundler command and esbuild options
    pub bundler: BundlerConfig,

    /// Plain-asset minification switches
    pub minify: MinifyConfig,

    /// Development watch settings
    pub watch: WatchConfig,
}

impl Config {
    /// Load configuration for the CLI invocation.
    ///
    /// Searches upward from cwd for the config file name. A missing file is
    /// fine unless the user pointed at a specific absolute path.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let config = match find_config_file(&cli.config) {
            Some(path) => Self::from_path(&path)?,
            None if cli.config.is_absolute() => {
                return Err(ConfigError::Io(
                    cli.config.clone(),
                    std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
                ));
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_owned(), e))?;
        let mut config = Self::from_str(&content)?;
        config.config_path = Some(path.to_owned());
        Ok(config)
    }

    /// Parse config from TOML text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Check field values. Problems that only matter for some inputs are
    /// logged as warnings instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bundler.validate()?;
        self.watch.validate()?;
        Ok(())
    }
}
