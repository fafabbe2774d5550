//! esbuild bundler backend.
//!
//! Runs the configured esbuild command as a child process:
//!
//! ```text
//! bundle: esbuild <entry> --bundle --outfile=<out> [options]      (one shot)
//! watch:  esbuild <entry> --bundle --outfile=<out> --watch=forever (child per entry)
//! ```

use std::ffi::OsString;

use tokio::io::{AsyncBufReadExt, BufReader};

use super::{BundleOptions, BundleRequest, Bundler, RebuildCallback, RebuildHandle};
use crate::config::BundlerConfig;
use crate::core::BuildError;
use crate::utils::exec::{Cmd, failure_detail};

/// Bundler backed by the esbuild CLI.
#[derive(Debug, Clone)]
pub struct EsbuildBundler {
    config: BundlerConfig,
}

impl EsbuildBundler {
    pub fn new(config: BundlerConfig) -> Self {
        Self { config }
    }

    /// Full command line for one request (without watch flags).
    fn command(&self, request: &BundleRequest) -> Cmd {
        let BundleOptions {
            minify,
            source_map,
            tree_shaking,
            drop_console,
            drop_debugger,
        } = request.options;
        let config = &self.config;

        let mut args: Vec<OsString> = vec![
            request.source.clone().into_os_string(),
            "--bundle".into(),
            prefixed("--outfile=", request.output.as_os_str()),
            format!("--format={}", config.format).into(),
            format!("--platform={}", config.platform).into(),
            format!("--legal-comments={}", config.legal_comments).into(),
            format!("--asset-names={}", config.asset_names).into(),
            format!("--tree-shaking={tree_shaking}").into(),
        ];
        if !config.target.is_empty() {
            args.push(format!("--target={}", config.target.join(",")).into());
        }
        for (ext, loader) in &config.loaders {
            args.push(format!("--loader:{ext}={loader}").into());
        }
        if minify {
            args.push("--minify".into());
        }
        if source_map {
            args.push("--sourcemap".into());
        }
        if drop_console {
            args.push("--drop:console".into());
        }
        if drop_debugger {
            args.push("--drop:debugger".into());
        }

        Cmd::from_slice(&self.config.command).args(args)
    }
}

fn prefixed(prefix: &str, value: &std::ffi::OsStr) -> OsString {
    let mut arg = OsString::from(prefix);
    arg.push(value);
    arg
}

impl Bundler for EsbuildBundler {
    fn name(&self) -> &'static str {
        "esbuild"
    }

    async fn bundle(&self, request: BundleRequest) -> Result<(), BuildError> {
        let cmd = self.command(&request).arg("--log-level=warning");
        let name = cmd.program_name();
        crate::debug!("bundle"; "{} {:?}", name, cmd.get_args());

        let output = cmd
            .output()
            .await
            .map_err(|e| BuildError::backend(&request.source, format!("failed to run `{name}`: {e}")))?;

        if !output.status.success() {
            return Err(BuildError::backend(
                &request.source,
                failure_detail(&name, &output),
            ));
        }

        // Warnings on a successful build are worth surfacing once.
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if !stderr.is_empty() {
            crate::log!("bundle"; "{}\n{}", request.source.display(), stderr);
        }
        Ok(())
    }

    fn watch(
        &self,
        request: BundleRequest,
        on_rebuild: RebuildCallback,
    ) -> Result<RebuildHandle, BuildError> {
        let cmd = self
            .command(&request)
            .args(["--watch=forever", "--log-level=info"]);
        let name = cmd.program_name();
        crate::debug!("bundle"; "watch: {} {:?}", name, cmd.get_args());

        let mut child = cmd
            .spawn_piped()
            .map_err(|e| BuildError::backend(&request.source, format!("failed to run `{name}`: {e}")))?;
        let Some(stderr) = child.stderr.take() else {
            return Err(BuildError::backend(
                &request.source,
                format!("`{name}` stderr unavailable"),
            ));
        };

        let source = request.source;
        let task = tokio::spawn(async move {
            // Owned here so aborting the task drops (and kills) the child.
            let _child = child;
            let mut lines = BufReader::new(stderr).lines();
            let mut report = RebuildReport::default();

            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(result) = report.feed(&line) {
                    on_rebuild(result.map_err(|detail| BuildError::backend(&source, detail)));
                }
            }
            crate::debug!("bundle"; "watch ended: {}", source.display());
        });

        let abort = task.abort_handle();
        Ok(RebuildHandle::new(move || abort.abort()))
    }
}

/// Turns esbuild `--watch` log lines into per-rebuild outcomes.
///
/// The first finished build is skipped: the dispatcher already reported
/// the initial output.
#[derive(Debug, Default)]
struct RebuildReport {
    builds_seen: usize,
    errors: Vec<String>,
}

impl RebuildReport {
    fn feed(&mut self, line: &str) -> Option<Result<(), String>> {
        let line = line.trim_end();
        if line.contains("[ERROR]") {
            self.errors.push(line.trim_start_matches(['✘', ' ']).to_string());
            return None;
        }
        if !line.contains("build finished") {
            if !self.errors.is_empty() && !line.trim().is_empty() && !line.contains("[watch]") {
                // Location/context lines that follow an error header.
                if let Some(last) = self.errors.last_mut() {
                    last.push('\n');
                    last.push_str(line);
                }
            }
            return None;
        }

        self.builds_seen += 1;
        let errors = std::mem::take(&mut self.errors);
        if self.builds_seen == 1 {
            return None;
        }
        if errors.is_empty() {
            Some(Ok(()))
        } else {
            Some(Err(errors.join("\n")))
        }
    }
}
