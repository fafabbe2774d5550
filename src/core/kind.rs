//! File kind definitions.

use std::path::PathBuf;

/// How a source file is treated, derived fresh on every classification.
///
/// Precedence when several apply: `Module` > `Stylesheet` > `Asset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Carries the `// @MODULE` marker: dependency graph is bundled.
    Module,
    /// `.css` file without the marker: handed to the bundler as well.
    Stylesheet,
    /// Everything else: minified alone (production) or copied (development).
    Asset,
}

impl FileKind {
    /// Display name for this kind.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Stylesheet => "stylesheet",
            Self::Asset => "asset",
        }
    }
}

/// Result of one classification call. Consumed right away, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFile {
    pub path: PathBuf,
    pub kind: FileKind,
    pub output: PathBuf,
}
