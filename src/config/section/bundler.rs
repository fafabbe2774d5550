//! `[bundler]` section configuration.
//!
//! Command and options for the external bundler used by modules and
//! stylesheets.
//!
//! # Example
//!
//! ```toml
//! [bundler]
//! command = ["npx", "esbuild"]     # program + leading args
//! format = "iife"
//! platform = "browser"
//! target = ["es2020", "safari14"]
//! legal_comments = "linked"
//! asset_names = "assets/[ext]/[name]"
//!
//! [bundler.loaders]
//! ".png" = "file"
//! ".svg" = "dataurl"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Extensions emitted as separate files next to the bundle by default.
const FILE_LOADER_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".webp", ".svg", ".gif", ".otf", ".ttf", ".woff", ".woff2", ".eot",
];

/// External bundler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundlerConfig {
    /// Bundler command (e.g., `["esbuild"]` or `["npx", "esbuild"]`).
    pub command: Vec<String>,
    /// Output format (`iife`, `esm`, `cjs`).
    pub format: String,
    /// Target platform (`browser`, `node`, `neutral`).
    pub platform: String,
    /// Language targets; empty lets the bundler choose.
    pub target: Vec<String>,
    /// Legal comment placement.
    pub legal_comments: String,
    /// Naming template for files emitted by `file` loaders.
    pub asset_names: String,
    /// Extension → loader overrides.
    pub loaders: BTreeMap<String, String>,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            command: vec!["esbuild".into()],
            format: "iife".into(),
            platform: "browser".into(),
            target: Vec::new(),
            legal_comments: "linked".into(),
            asset_names: "assets/[ext]/[name]".into(),
            loaders: FILE_LOADER_EXTENSIONS
                .iter()
                .map(|ext| ((*ext).to_string(), "file".to_string()))
                .collect(),
        }
    }
}

impl BundlerConfig {
    /// Validate bundler configuration.
    ///
    /// # Checks
    /// - `command` must not be empty
    /// - every loader key must start with `.`
    /// - `command[0]` not on PATH only warns: plain assets never need it
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some(program) = self.command.first() else {
            return Err(ConfigError::validation(
                "bundler.command",
                "must not be empty",
            ));
        };

        if let Some(ext) = self.loaders.keys().find(|ext| !ext.starts_with('.')) {
            return Err(ConfigError::validation(
                "bundler.loaders",
                format!("`{ext}` must start with a dot, e.g. `.{ext}`"),
            ));
        }

        if which::which(program).is_err() {
            crate::log!(
                "warning";
                "bundler `{}` not found in PATH, modules and stylesheets will fail to build",
                program
            );
        }

        Ok(())
    }
}
