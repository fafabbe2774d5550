//! `[minify]` section configuration.
//!
//! Applies to plain assets in production and to bundles (`--drop:*`).
//!
//! ```toml
//! [minify]
//! drop_console = true
//! drop_debugger = true
//! mangle = false
//! ```

use serde::{Deserialize, Serialize};

/// Minification switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinifyConfig {
    /// Remove `console.*` calls.
    pub drop_console: bool,
    /// Remove `debugger` statements.
    pub drop_debugger: bool,
    /// Rename local identifiers in plain scripts.
    pub mangle: bool,
}

impl Default for MinifyConfig {
    fn default() -> Self {
        Self {
            drop_console: true,
            drop_debugger: true,
            mangle: false,
        }
    }
}
