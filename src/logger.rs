//! Logging utilities with colored output and progress display.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro, only printed with `--verbose`
//! - timestamped status lines for watch mode
//! - `BatchProgress` for the single-line production counter
//!
//! # Example
//!
//! ```ignore
//! log!("build"; "processing {} files", count);
//!
//! let progress = BatchProgress::new(12);
//! progress.inc();
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Whether a progress line currently occupies the last terminal row
static PROGRESS_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut stdout = stdout().lock();

    // Progress line lives on the current row; wipe it, print, redraw below.
    execute!(
        stdout,
        cursor::MoveToColumn(0),
        Clear(ClearType::UntilNewLine)
    )
    .ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
    drop(stdout);

    if PROGRESS_ACTIVE.load(Ordering::SeqCst) {
        PROGRESS.lock().redraw();
    }
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "watch" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        "bundle" => prefix.bright_blue().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Watch Status (timestamped lines)
// ============================================================================

/// Current UTC wall-clock time as HH:MM:SS
fn now() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format_clock(secs)
}

fn format_clock(secs: u64) -> String {
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Watch mode: success line (✓ prefix, green).
pub fn status_success(message: &str) {
    status_line(format!("{}", "✓".green()), message);
}

/// Watch mode: failure line (✗ prefix, red) with optional detail below.
pub fn status_error(summary: &str, detail: &str) {
    let message = if detail.is_empty() {
        summary.to_string()
    } else {
        format!("{summary}\n{detail}")
    };
    status_line(format!("{}", "✗".red()), &message);
}

/// Watch mode: informational line (no symbol, dimmed).
pub fn status_info(message: &str) {
    status_line(String::new(), &format!("{}", message.dimmed()));
}

fn status_line(symbol: String, message: &str) {
    let timestamp = format!("[{}]", now()).dimmed().to_string();
    let line = if symbol.is_empty() {
        format!("{timestamp} {message}")
    } else {
        format!("{timestamp} {symbol} {message}")
    };

    let mut stdout = stdout().lock();
    writeln!(stdout, "{line}").ok();
    stdout.flush().ok();
}

// ============================================================================
// Batch Progress (single-line counter)
// ============================================================================

static PROGRESS: Mutex<ProgressState> = Mutex::new(ProgressState { done: 0, total: 0 });

struct ProgressState {
    done: usize,
    total: usize,
}

impl ProgressState {
    fn redraw(&self) {
        let mut stdout = stdout().lock();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        write!(
            stdout,
            "{} {}/{} files",
            colorize_prefix("build"),
            self.done,
            self.total
        )
        .ok();
        stdout.flush().ok();
    }
}

/// Single-line production progress: `[build] 3/10 files`
///
/// `log!` output scrolls above the line while it is active.
pub struct BatchProgress {
    done: AtomicUsize,
}

impl BatchProgress {
    /// Start a progress line for `total` files.
    pub fn new(total: usize) -> Self {
        {
            let mut state = PROGRESS.lock();
            state.done = 0;
            state.total = total;
            state.redraw();
        }
        PROGRESS_ACTIVE.store(true, Ordering::SeqCst);
        Self {
            done: AtomicUsize::new(0),
        }
    }

    /// Count one more finished file.
    pub fn inc(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let mut state = PROGRESS.lock();
        state.done = done;
        state.redraw();
    }

    /// Keep the final line and move to the next row.
    pub fn finish(self) {
        PROGRESS_ACTIVE.store(false, Ordering::SeqCst);
        PROGRESS.lock().redraw();
        let mut stdout = stdout().lock();
        writeln!(stdout).ok();
        stdout.flush().ok();
        std::mem::forget(self); // Prevent Drop from clearing
    }
}

impl Drop for BatchProgress {
    fn drop(&mut self) {
        PROGRESS_ACTIVE.store(false, Ordering::SeqCst);

        let mut stdout = stdout().lock();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        stdout.flush().ok();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock_wraps_days() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(3661), "01:01:01");
        assert_eq!(format_clock(86400 + 59), "00:00:59");
    }

    #[test]
    fn test_verbose_flag_roundtrip() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }
}
