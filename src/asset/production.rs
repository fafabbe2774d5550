//! One-shot production pass.
//!
//! Every path is dispatched concurrently; results are recorded as they
//! complete and the batch summary is printed once the last one arrives.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinSet;

use super::dispatch::{BuildResult, Dispatcher};
use super::stats::{BatchSummary, StatsAggregator, file_report_line};
use crate::backend::{Bundler, Minifier};
use crate::core::BuildMode;
use crate::logger::BatchProgress;

/// Everything a finished batch produced, in completion order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<BuildResult>,
    /// `None` for an empty batch.
    pub summary: Option<BatchSummary>,
    /// Tasks that panicked before producing a result.
    pub lost: usize,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.is_ok()).count() + self.lost
    }
}

/// Runs a production batch over a shared dispatcher.
pub struct ProductionRunner<B, M> {
    dispatcher: Arc<Dispatcher<B, M>>,
}

impl<B: Bundler, M: Minifier> ProductionRunner<B, M> {
    pub fn new(dispatcher: Arc<Dispatcher<B, M>>) -> Self {
        Self { dispatcher }
    }

    pub async fn run(&self, paths: Vec<PathBuf>, source_map: bool) -> BatchReport {
        if paths.is_empty() {
            crate::log!("build"; "nothing to build");
            return BatchReport::default();
        }

        let mut stats = StatsAggregator::new(paths.len());
        let mut report = BatchReport::default();
        let progress = BatchProgress::new(paths.len());

        let mut tasks = JoinSet::new();
        for path in paths {
            let dispatcher = Arc::clone(&self.dispatcher);
            tasks.spawn(async move {
                dispatcher
                    .process(&path, BuildMode::Production, source_map)
                    .await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            progress.inc();
            let summary = match joined {
                Ok(result) => {
                    log_result(&result);
                    let summary = stats.record(&result);
                    report.results.push(result);
                    summary
                }
                Err(e) => {
                    crate::log!("error"; "build task failed: {}", e);
                    report.lost += 1;
                    stats.record_lost()
                }
            };
            if summary.is_some() {
                report.summary = summary;
            }
        }
        progress.finish();

        if let Some(summary) = &report.summary {
            crate::log!("build"; "{}", summary.report_line());
        }
        report
    }
}

fn log_result(result: &BuildResult) {
    match result.error() {
        None => {
            if let Some(line) = file_report_line(result) {
                crate::log!("build"; "{}", line);
            }
        }
        Some(e) => {
            crate::log!("error"; "{}: {}\n{}", result.source.display(), e.label(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        BundleRequest, Minified, MinifyOptions, RebuildCallback, RebuildHandle,
    };
    use crate::config::MinifyConfig;
    use crate::core::BuildError;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Writes half of the source, fails on a `fail` marker.
    struct HalvingBundler;

    impl Bundler for HalvingBundler {
        fn name(&self) -> &'static str {
            "halving"
        }

        async fn bundle(&self, request: BundleRequest) -> Result<(), BuildError> {
            let source = tokio::fs::read_to_string(&request.source)
                .await
                .map_err(|e| BuildError::read(&request.source, e))?;
            if source.contains("fail") {
                return Err(BuildError::backend(&request.source, "Could not resolve"));
            }
            let half = &source[..source.len() / 2];
            tokio::fs::write(&request.output, half)
                .await
                .map_err(|e| BuildError::write(&request.output, e))
        }

        fn watch(
            &self,
            _request: BundleRequest,
            _on_rebuild: RebuildCallback,
        ) -> Result<RebuildHandle, BuildError> {
            Ok(RebuildHandle::new(|| {}))
        }
    }

    struct IdentityMinifier;

    impl Minifier for IdentityMinifier {
        fn minify(
            &self,
            _path: &Path,
            source: &str,
            _options: &MinifyOptions,
        ) -> Result<Minified, BuildError> {
            Ok(Minified {
                code: source.to_owned(),
                map: None,
            })
        }
    }

    fn runner() -> ProductionRunner<HalvingBundler, IdentityMinifier> {
        let dispatcher = Dispatcher::new(HalvingBundler, IdentityMinifier, MinifyConfig::default());
        ProductionRunner::new(Arc::new(dispatcher))
    }

    #[tokio::test]
    async fn test_batch_totals() {
        let dir = TempDir::new().unwrap();
        let module = dir.path().join("app.js");
        fs::write(&module, format!("// @MODULE\n{}", "x".repeat(989))).unwrap();
        let asset = dir.path().join("util.js");
        fs::write(&asset, "y".repeat(1000)).unwrap();

        let report = runner().run(vec![module, asset], false).await;

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.failed(), 0);
        let summary = report.summary.unwrap();
        assert_eq!(summary.files, 2);
        assert_eq!(summary.source_bytes, 2000);
        assert_eq!(summary.output_bytes, 1500);
        assert_eq!(summary.ratio(), Some(-0.25));
    }

    #[tokio::test]
    async fn test_failures_still_complete_batch() {
        let dir = TempDir::new().unwrap();
        let broken = dir.path().join("broken.js");
        fs::write(&broken, "// @MODULE fail").unwrap();
        let missing = dir.path().join("missing.js");

        let report = runner().run(vec![broken, missing], false).await;

        assert_eq!(report.failed(), 2);
        let summary = report.summary.unwrap();
        assert_eq!(summary.files, 2);
        assert_eq!(summary.source_bytes, 0);
        assert_eq!(summary.ratio(), None);
    }

    #[tokio::test]
    async fn test_empty_batch_returns_immediately() {
        let report = runner().run(Vec::new(), false).await;
        assert!(report.results.is_empty());
        assert!(report.summary.is_none());
    }
}
