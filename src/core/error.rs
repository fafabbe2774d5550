//! Error types for dispatch and watch sessions.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// File-scoped failure. Always recovered locally: logged, result marked
/// failed, other files and later events keep going.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Source could not be probed or read (missing, permission, not text).
    #[error("could not read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Bundler or minifier reported a compile/transform error.
    #[error("{detail}")]
    Backend { path: PathBuf, detail: String },

    /// Output could not be written or measured.
    #[error("could not write `{}`: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn backend(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::Backend {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Short category label for log lines.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Read { .. } => "read failed",
            Self::Backend { .. } => "build failed",
            Self::Write { .. } => "write failed",
        }
    }
}

/// Session-scoped failure of the change-notification primitive.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("watcher failed: {0}")]
    Notify(#[from] notify::Error),
}
