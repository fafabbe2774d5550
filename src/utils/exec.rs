//! External command execution.
//!
//! Builder-based API around `tokio::process` for the bundler backend.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // One-shot, collect output
//! let output = Cmd::from_slice(&["npx", "esbuild"])
//!     .arg("app.js")
//!     .args(["--bundle", "--outfile=app.min.js"])
//!     .output()
//!     .await?;
//!
//! // Long-running child, stderr piped for line reading
//! let child = Cmd::new("esbuild").arg("--watch=forever").spawn_piped()?;
//! ```

use std::ffi::{OsStr, OsString};
use std::io;
use std::process::{Output, Stdio};

use tokio::process::{Child, Command};

/// Command builder for external process execution.
#[derive(Debug, Default, Clone)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["esbuild"]` or `["npx", "esbuild"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let mut this = iter.next().map(Self::new).unwrap_or_default();
        this.args = iter.map(|s| s.as_ref().to_owned()).collect();
        this
    }

    /// Add a single argument (empty arguments are skipped).
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Program name for error messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Arguments as passed to the process.
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdin(Stdio::null());
        cmd
    }

    /// Run to completion, capturing stdout and stderr.
    pub async fn output(&self) -> io::Result<Output> {
        let mut cmd = self.command();
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        cmd.output().await
    }

    /// Spawn a long-running child with stderr piped and stdout discarded.
    ///
    /// The child is killed when its handle is dropped.
    pub fn spawn_piped(&self) -> io::Result<Child> {
        let mut cmd = self.command();
        cmd.stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd.spawn()
    }
}

/// Failure text of a finished process: trimmed stderr, else stdout, else status.
pub fn failure_detail(name: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }
    format!("`{name}` exited with {}", output.status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_splits_program_and_args() {
        let cmd = Cmd::from_slice(&["npx", "esbuild"]).arg("a.js").arg("");
        assert_eq!(cmd.program_name(), "npx");
        assert_eq!(cmd.get_args(), &[OsString::from("esbuild"), OsString::from("a.js")]);
    }

    #[test]
    fn test_from_empty_slice() {
        let cmd = Cmd::from_slice::<&str>(&[]);
        assert_eq!(cmd.program_name(), "");
        assert!(cmd.get_args().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_and_failure_detail() {
        let output = Cmd::new("sh")
            .args(["-c", "echo oops >&2; exit 3"])
            .output()
            .await
            .unwrap();
        assert!(!output.status.success());
        assert_eq!(failure_detail("sh", &output), "oops");
    }
}
