//! Transformation backends.
//!
//! Two seams, both opaque to the dispatch core:
//!
//! ```text
//! Bundler   (module, stylesheet) → external esbuild process
//! Minifier  (plain asset)        → oxc (scripts) / lightningcss (stylesheets)
//! ```

mod esbuild;
mod minify;

pub use esbuild::EsbuildBundler;
pub use minify::NativeMinifier;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::BuildError;

// =============================================================================
// Bundler
// =============================================================================

/// Per-call bundler switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BundleOptions {
    pub minify: bool,
    pub source_map: bool,
    pub tree_shaking: bool,
    pub drop_console: bool,
    pub drop_debugger: bool,
}

/// One bundler invocation: entry point, output file, switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    pub source: PathBuf,
    pub output: PathBuf,
    pub options: BundleOptions,
}

/// Invoked by a bundler watch after every rebuild.
pub type RebuildCallback = Arc<dyn Fn(Result<(), BuildError>) + Send + Sync>;

/// Keeps a bundler's own incremental watch alive.
///
/// Dropping or cancelling the handle tears the watch down; no rebuild
/// callback fires afterwards.
pub struct RebuildHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl RebuildHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop the watch now.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for RebuildHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for RebuildHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RebuildHandle")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Bundles an entry point and its dependency graph into one output file.
pub trait Bundler: Send + Sync + 'static {
    /// Display name for logs.
    fn name(&self) -> &'static str;

    /// Build once. Writes `request.output` (plus `.map` when requested) on
    /// success and nothing on failure.
    fn bundle(&self, request: BundleRequest)
    -> impl Future<Output = Result<(), BuildError>> + Send;

    /// Start an incremental watch keyed on `request.source`.
    ///
    /// Every later rebuild overwrites `request.output` and reports through
    /// `on_rebuild`. The watch lives as long as the returned handle.
    fn watch(
        &self,
        request: BundleRequest,
        on_rebuild: RebuildCallback,
    ) -> Result<RebuildHandle, BuildError>;
}

// =============================================================================
// Minifier
// =============================================================================

/// Per-call minifier switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinifyOptions {
    pub drop_console: bool,
    pub drop_debugger: bool,
    pub mangle: bool,
    pub source_map: bool,
}

/// Minifier output: code plus an optional JSON source map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minified {
    pub code: String,
    pub map: Option<String>,
}

/// Whole-file text minifier. CPU-bound and synchronous; callers move it off
/// the async scheduler.
pub trait Minifier: Send + Sync + 'static {
    /// Minify `source`, which was read from `path` (used for language
    /// detection and source map naming).
    fn minify(
        &self,
        path: &Path,
        source: &str,
        options: &MinifyOptions,
    ) -> Result<Minified, BuildError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_rebuild_handle_cancels_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let handle = RebuildHandle::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        handle.cancel();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rebuild_handle_cancels_on_drop() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        {
            let _handle = RebuildHandle::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
