//! Batch size statistics.
//!
//! One aggregator per production batch. Every recorded result counts toward
//! completion (failures included) so the batch always terminates; only
//! successes contribute bytes.

use std::path::PathBuf;

use rustc_hash::FxHashSet;

use super::dispatch::BuildResult;
use crate::utils::format::{format_bytes, format_kilobytes, format_percent, plural_count};

/// Width the path column is padded or truncated to in per-file lines.
const PATH_COLUMN: usize = 60;

/// Cross-file totals with a completion barrier.
#[derive(Debug)]
pub struct StatsAggregator {
    batch_size: usize,
    source_bytes: u64,
    output_bytes: u64,
    completed: usize,
    recorded: FxHashSet<PathBuf>,
}

/// Totals of a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub files: usize,
    pub source_bytes: u64,
    pub output_bytes: u64,
}

impl StatsAggregator {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            source_bytes: 0,
            output_bytes: 0,
            completed: 0,
            recorded: FxHashSet::default(),
        }
    }

    /// Record one result. Returns the summary exactly when the last expected
    /// result arrives; duplicates of an already recorded path are ignored.
    pub fn record(&mut self, result: &BuildResult) -> Option<BatchSummary> {
        if self.is_complete() || !self.recorded.insert(result.source.clone()) {
            return None;
        }

        if let Ok(sizes) = &result.outcome {
            self.source_bytes += sizes.source;
            self.output_bytes += sizes.output;
        }
        self.complete_one()
    }

    /// Count a result that never came back (panicked task) as a failure.
    pub fn record_lost(&mut self) -> Option<BatchSummary> {
        if self.is_complete() {
            return None;
        }
        self.complete_one()
    }

    fn complete_one(&mut self) -> Option<BatchSummary> {
        self.completed += 1;
        self.is_complete().then(|| self.summary())
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.completed == self.batch_size
    }

    fn summary(&self) -> BatchSummary {
        BatchSummary {
            files: self.batch_size,
            source_bytes: self.source_bytes,
            output_bytes: self.output_bytes,
        }
    }
}

impl BatchSummary {
    /// `(output - source) / source`, undefined when nothing was measured.
    pub fn ratio(&self) -> Option<f64> {
        (self.source_bytes > 0).then(|| self.delta() as f64 / self.source_bytes as f64)
    }

    /// Signed byte difference `output - source`.
    pub fn delta(&self) -> i128 {
        self.output_bytes as i128 - self.source_bytes as i128
    }

    /// `Total (3 files): 12.5 kB > 6.1 kB (-51.2% / -6.4 kB)`
    pub fn report_line(&self) -> String {
        format!(
            "Total ({}): {} > {} ({} / {})",
            plural_count(self.files, "file"),
            format_kilobytes(self.source_bytes as i128, false),
            format_kilobytes(self.output_bytes as i128, false),
            format_percent(self.ratio()),
            format_kilobytes(self.delta(), true),
        )
    }
}

/// `path/to/file.js: 1,000 bytes > 500 bytes (-50%)`, `None` for failures.
pub fn file_report_line(result: &BuildResult) -> Option<String> {
    let sizes = result.outcome.as_ref().ok()?;
    Some(format!(
        "{}: {} > {} ({})",
        path_column(&result.source.display().to_string()),
        format_bytes(sizes.source),
        format_bytes(sizes.output),
        format_percent(sizes.ratio()),
    ))
}

/// Pad to the column width, or keep the tail with a leading `…`.
fn path_column(path: &str) -> String {
    let len = path.chars().count();
    if len <= PATH_COLUMN {
        return format!("{path:<PATH_COLUMN$}");
    }
    let tail: String = path.chars().skip(len - (PATH_COLUMN - 1)).collect();
    format!("…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::dispatch::FileSizes;
    use crate::core::{BuildError, FileKind};

    fn ok(path: &str, source: u64, output: u64) -> BuildResult {
        BuildResult {
            source: PathBuf::from(path),
            output: PathBuf::from(path),
            kind: Some(FileKind::Asset),
            outcome: Ok(FileSizes { source, output }),
        }
    }

    fn failed(path: &str) -> BuildResult {
        BuildResult {
            source: PathBuf::from(path),
            output: PathBuf::from(path),
            kind: Some(FileKind::Module),
            outcome: Err(BuildError::backend(path, "boom")),
        }
    }

    #[test]
    fn test_unchanged_size_is_zero_percent() {
        let mut stats = StatsAggregator::new(1);
        let summary = stats.record(&ok("a.js", 1000, 1000)).unwrap();
        assert_eq!(summary.ratio(), Some(0.0));
        assert_eq!(summary.delta(), 0);
        assert_eq!(format_percent(summary.ratio()), "0%");
    }

    #[test]
    fn test_halved_batch() {
        let mut stats = StatsAggregator::new(2);
        assert!(stats.record(&ok("a.js", 600, 300)).is_none());
        let summary = stats.record(&ok("b.js", 400, 200)).unwrap();
        assert_eq!(summary.ratio(), Some(-0.5));
        assert_eq!(summary.delta(), -500);
        assert_eq!(
            summary.report_line(),
            "Total (2 files): 1 kB > 0.5 kB (-50% / -0.5 kB)"
        );
    }

    #[test]
    fn test_failure_counts_without_bytes() {
        let mut stats = StatsAggregator::new(2);
        assert!(stats.record(&failed("a.js")).is_none());
        let summary = stats.record(&ok("b.js", 100, 50)).unwrap();
        assert_eq!(summary.source_bytes, 100);
        assert_eq!(summary.output_bytes, 50);
        assert_eq!(summary.files, 2);
    }

    #[test]
    fn test_duplicate_path_ignored() {
        let mut stats = StatsAggregator::new(2);
        assert!(stats.record(&ok("a.js", 100, 50)).is_none());
        assert!(stats.record(&ok("a.js", 100, 50)).is_none());
        assert!(!stats.is_complete());
        let summary = stats.record(&ok("b.js", 100, 50)).unwrap();
        assert_eq!(summary.source_bytes, 200);
    }

    #[test]
    fn test_completion_fires_once() {
        let mut stats = StatsAggregator::new(1);
        assert!(stats.record(&ok("a.js", 1, 1)).is_some());
        assert!(stats.record(&ok("b.js", 1, 1)).is_none());
        assert!(stats.record_lost().is_none());
        assert!(stats.is_complete());
    }

    #[test]
    fn test_lost_result_completes_batch() {
        let mut stats = StatsAggregator::new(2);
        stats.record(&ok("a.js", 10, 5));
        let summary = stats.record_lost().unwrap();
        assert_eq!(summary.source_bytes, 10);
    }

    #[test]
    fn test_empty_batch_is_complete() {
        let stats = StatsAggregator::new(0);
        assert!(stats.is_complete());
        let summary = BatchSummary {
            files: 0,
            source_bytes: 0,
            output_bytes: 0,
        };
        assert_eq!(summary.ratio(), None);
    }

    #[test]
    fn test_file_report_line() {
        let line = file_report_line(&ok("a.js", 1000, 500)).unwrap();
        assert!(line.starts_with("a.js "));
        assert!(line.ends_with(": 1,000 bytes > 500 bytes (-50%)"));
        assert!(file_report_line(&failed("b.js")).is_none());

        let empty = file_report_line(&ok("e.js", 0, 0)).unwrap();
        assert!(empty.ends_with("(n/a)"));
    }

    #[test]
    fn test_long_path_keeps_tail() {
        let long = format!("{}/file.js", "d".repeat(80));
        let column = path_column(&long);
        assert_eq!(column.chars().count(), PATH_COLUMN);
        assert!(column.starts_with('…'));
        assert!(column.ends_with("/file.js"));
    }
}
