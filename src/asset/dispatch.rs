//! Backend dispatch.
//!
//! One call per file: classify, pick the pipeline, write the output, measure.
//!
//! ```text
//! Module | Stylesheet      → Bundler::bundle
//! Asset  + production     → Minifier::minify → write out (+ .map)
//! Asset  + development    → copy
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::classify::classify;
use crate::backend::{BundleOptions, BundleRequest, Bundler, Minifier, MinifyOptions};
use crate::config::MinifyConfig;
use crate::core::path::{output_path_of, source_map_path_of};
use crate::core::{BuildError, BuildMode, ClassifiedFile, FileKind};

/// Byte sizes of a finished source/output pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSizes {
    pub source: u64,
    pub output: u64,
}

impl FileSizes {
    /// `(output - source) / source`, undefined for an empty source.
    pub fn ratio(&self) -> Option<f64> {
        (self.source > 0).then(|| (self.output as f64 - self.source as f64) / self.source as f64)
    }
}

/// Outcome of one dispatch.
#[derive(Debug)]
pub struct BuildResult {
    pub source: PathBuf,
    pub output: PathBuf,
    /// `None` when classification itself failed.
    pub kind: Option<FileKind>,
    pub outcome: Result<FileSizes, BuildError>,
}

impl BuildResult {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&BuildError> {
        self.outcome.as_ref().err()
    }
}

/// Routes classified files to the bundler or minifier.
pub struct Dispatcher<B, M> {
    bundler: Arc<B>,
    minifier: Arc<M>,
    minify: MinifyConfig,
}

impl<B: Bundler, M: Minifier> Dispatcher<B, M> {
    pub fn new(bundler: B, minifier: M, minify: MinifyConfig) -> Self {
        Self {
            bundler: Arc::new(bundler),
            minifier: Arc::new(minifier),
            minify,
        }
    }

    pub fn bundler(&self) -> &B {
        &self.bundler
    }

    /// Bundler switches for a kind that goes through the bundler.
    pub fn bundle_options(&self, mode: BuildMode, source_map: bool) -> BundleOptions {
        let prod = mode.is_production();
        BundleOptions {
            minify: prod,
            source_map,
            tree_shaking: prod,
            drop_console: prod && self.minify.drop_console,
            drop_debugger: prod && self.minify.drop_debugger,
        }
    }

    /// Classify `path` and dispatch it.
    pub async fn process(&self, path: &Path, mode: BuildMode, source_map: bool) -> BuildResult {
        match classify(path).await {
            Ok(file) => self.dispatch(file, mode, source_map).await,
            Err(e) => BuildResult {
                source: path.to_owned(),
                output: output_path_of(path),
                kind: None,
                outcome: Err(e),
            },
        }
    }

    /// Run the pipeline for an already classified file.
    pub async fn dispatch(
        &self,
        file: ClassifiedFile,
        mode: BuildMode,
        source_map: bool,
    ) -> BuildResult {
        let ClassifiedFile { path, kind, output } = file;
        crate::debug!("dispatch"; "{} {} ({})", kind.name(), path.display(), mode.label());

        let written = if output == path {
            crate::debug!("dispatch"; "{} has no extension, leaving it in place", path.display());
            Ok(())
        } else {
            self.write_output(kind, &path, &output, mode, source_map).await
        };

        let outcome = match written {
            Ok(()) => measure(&path, &output).await,
            Err(e) => Err(e),
        };

        BuildResult {
            source: path,
            output,
            kind: Some(kind),
            outcome,
        }
    }

    async fn write_output(
        &self,
        kind: FileKind,
        path: &Path,
        output: &Path,
        mode: BuildMode,
        source_map: bool,
    ) -> Result<(), BuildError> {
        match kind {
            FileKind::Module | FileKind::Stylesheet => {
                let request = BundleRequest {
                    source: path.to_owned(),
                    output: output.to_owned(),
                    options: self.bundle_options(mode, source_map),
                };
                self.bundler.bundle(request).await
            }
            FileKind::Asset if mode.is_production() => {
                self.minify_asset(path, output, source_map).await
            }
            FileKind::Asset => tokio::fs::copy(path, output)
                .await
                .map(|_| ())
                .map_err(|e| copy_error(path, output, e)),
        }
    }

    async fn minify_asset(
        &self,
        path: &Path,
        output: &Path,
        source_map: bool,
    ) -> Result<(), BuildError> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BuildError::read(path, e))?;

        let options = MinifyOptions {
            drop_console: self.minify.drop_console,
            drop_debugger: self.minify.drop_debugger,
            mangle: self.minify.mangle,
            source_map,
        };
        let minifier = Arc::clone(&self.minifier);
        let owned = path.to_owned();
        let minified = tokio::task::spawn_blocking(move || minifier.minify(&owned, &source, &options))
            .await
            .map_err(|e| BuildError::backend(path, format!("minifier task failed: {e}")))??;

        let code = tokio::fs::write(output, minified.code)
            .await
            .map_err(|e| BuildError::write(output, e));

        // The map is written even when the code write failed.
        if let Some(map) = minified.map {
            let map_path = source_map_path_of(output);
            if let Err(e) = tokio::fs::write(&map_path, map).await {
                crate::log!("error"; "{}", BuildError::write(&map_path, e));
            }
        }

        code
    }
}

/// Copy failures on the source side are read errors, everything else is a write error.
fn copy_error(path: &Path, output: &Path, e: std::io::Error) -> BuildError {
    if path.exists() {
        BuildError::write(output, e)
    } else {
        BuildError::read(path, e)
    }
}

async fn measure(path: &Path, output: &Path) -> Result<FileSizes, BuildError> {
    let source = tokio::fs::metadata(path)
        .await
        .map_err(|e| BuildError::read(path, e))?
        .len();
    let output_len = tokio::fs::metadata(output)
        .await
        .map_err(|e| BuildError::write(output, e))?
        .len();
    Ok(FileSizes {
        source,
        output: output_len,
    })
}
