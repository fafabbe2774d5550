//! Development session lifecycle.
//!
//! initial pass → register for Ctrl+C → attach watcher → handle events → shutdown

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use super::{FsWatcher, WatchCoordinator, WatchFilter, WatchRoot};
use crate::asset::Dispatcher;
use crate::backend::{Bundler, Minifier};
use crate::config::WatchConfig;
use crate::core::{register_session, shutdown_signal};
use crate::utils::format::plural_count;

/// Run `minwatch dev` until Ctrl+C.
pub async fn run_session<B: Bundler, M: Minifier>(
    dispatcher: Arc<Dispatcher<B, M>>,
    files: Vec<PathBuf>,
    roots: Vec<WatchRoot>,
    config: WatchConfig,
    source_map: bool,
) -> Result<()> {
    let filter = Arc::new(WatchFilter::new(roots));
    let coordinator = WatchCoordinator::new(dispatcher, Arc::clone(&filter), source_map);

    coordinator.initial_pass(files).await;
    register_session();

    let watcher = FsWatcher::new(filter, config.debounce()).context("failed to start watcher")?;
    let (tx, rx) = mpsc::unbounded_channel();
    let fs_task = tokio::spawn(watcher.run(tx));

    crate::log!(
        "watch";
        "watching {} for changes (ctrl+c to stop)",
        plural_count(coordinator.tracked(), "file")
    );

    tokio::select! {
        _ = coordinator.run(rx) => {
            crate::log!("error"; "watcher stopped");
        }
        _ = shutdown_signal() => {}
    }

    fs_task.abort();
    coordinator.shutdown();
    Ok(())
}
