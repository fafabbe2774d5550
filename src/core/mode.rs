//! Build mode for production/development passes.

/// Which pipeline flavor a dispatch runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// One-shot pass: minify, tree-shake, drop console/debugger.
    Production,
    /// Watch pass: unminified bundles, plain assets copied through.
    Development,
}

impl BuildMode {
    /// Check if this is production mode.
    #[inline]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Display label for logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}
