//! Development watch.
//!
//! Per-path state machine, owned by [`WatchCoordinator`]:
//!
//! ```text
//! Unwatched ──initial/Added──▶ SelfWatched ──gains marker──▶ HandedOff
//!                                   │                            │
//!                                   └──────────Removed───────────┴──▶ (dropped)
//! ```
//!
//! A `SelfWatched` path is rebuilt by the coordinator on every change. A
//! `HandedOff` path belongs to the bundler's own incremental watch; the
//! coordinator only listens for its removal.

mod debouncer;
mod filter;
mod fs;
mod session;


pub use filter::{Interest, WatchFilter, WatchRoot, is_source};
pub use fs::FsWatcher;
pub use session::run_session;

use std::collections::hash_map::Entry;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::asset::{BuildResult, Dispatcher, classify};
use crate::backend::{BundleRequest, Bundler, Minifier, RebuildCallback, RebuildHandle};
use crate::core::path::{output_path_of, source_map_path_of};
use crate::core::{BuildError, BuildMode, ClassifiedFile, FileKind};
use crate::logger::{status_error, status_info, status_success};

/// A debounced, filtered file-system change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Added(PathBuf),
    Changed(PathBuf),
    Removed(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::Added(p) | Self::Changed(p) | Self::Removed(p) => p,
        }
    }
}

/// Who rebuilds a tracked path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    SelfWatched,
    HandedOff,
}

#[derive(Debug)]
struct WatchEntry {
    ownership: Ownership,
    rebuild: Option<RebuildHandle>,
}

impl WatchEntry {
    fn self_watched() -> Self {
        Self {
            ownership: Ownership::SelfWatched,
            rebuild: None,
        }
    }
}

struct Shared<B, M> {
    dispatcher: Arc<Dispatcher<B, M>>,
    filter: Arc<WatchFilter>,
    table: Mutex<FxHashMap<PathBuf, WatchEntry>>,
    source_map: bool,
}

/// Tracks every watched path and routes its events.
pub struct WatchCoordinator<B, M> {
    shared: Arc<Shared<B, M>>,
}

impl<B, M> Clone for WatchCoordinator<B, M> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<B: Bundler, M: Minifier> WatchCoordinator<B, M> {
    pub fn new(dispatcher: Arc<Dispatcher<B, M>>, filter: Arc<WatchFilter>, source_map: bool) -> Self {
        Self {
            shared: Arc::new(Shared {
                dispatcher,
                filter,
                table: Mutex::default(),
                source_map,
            }),
        }
    }

    /// Build every path once (development mode), then track them all.
    ///
    /// Modules go straight to the bundler watch so that edits to their
    /// imports rebuild them without touching the entry first.
    pub async fn initial_pass(&self, paths: Vec<PathBuf>) {
        let mut tasks = JoinSet::new();
        for path in paths.iter().cloned() {
            let this = self.clone();
            tasks.spawn(async move {
                this.shared
                    .dispatcher
                    .process(&path, BuildMode::Development, this.shared.source_map)
                    .await
            });
        }

        let mut modules = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    report(&result);
                    if result.kind == Some(FileKind::Module) && result.output != result.source {
                        modules.push((result.source, result.output));
                    }
                }
                Err(e) => crate::log!("error"; "build task failed: {}", e),
            }
        }

        {
            let mut table = self.shared.table.lock();
            for path in paths {
                table.entry(path).or_insert_with(WatchEntry::self_watched);
            }
        }
        for (path, output) in modules {
            self.start_bundler_watch(&path, output);
        }
    }

    pub fn tracked(&self) -> usize {
        self.shared.table.lock().len()
    }

    /// Consume events until the channel closes.
    ///
    /// Each path gets its own lane, so one path's events run strictly in
    /// order while different paths proceed independently.
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<WatchEvent>) {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        let mut lanes = Lanes::new(self.clone(), done_tx);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => lanes.send(event),
                    None => break,
                },
                Some(path) = done_rx.recv() => lanes.settle(&path),
            }
        }

        lanes.close().await;
    }

    /// Handle one event. Callers serialize events per path.
    pub async fn handle(&self, event: WatchEvent) {
        match event {
            WatchEvent::Added(path) => self.on_added_or_changed(path, true).await,
            WatchEvent::Changed(path) => self.on_added_or_changed(path, false).await,
            WatchEvent::Removed(path) => self.on_removed(&path).await,
        }
    }

    async fn on_added_or_changed(&self, path: PathBuf, added: bool) {
        {
            let mut table = self.shared.table.lock();
            match table.get(&path).map(|e| e.ownership) {
                Some(Ownership::HandedOff) => return,
                Some(Ownership::SelfWatched) => {}
                None if added => {
                    table.insert(path.clone(), WatchEntry::self_watched());
                }
                None => {
                    crate::debug!("watch"; "ignoring change to untracked {}", path.display());
                    return;
                }
            }
        }

        let file = match classify(&path).await {
            Ok(file) => file,
            Err(e) => {
                report_error(&path, &e);
                return;
            }
        };

        if file.kind == FileKind::Module && file.output != file.path {
            self.hand_off(file).await;
        } else {
            let result = self
                .shared
                .dispatcher
                .dispatch(file, BuildMode::Development, self.shared.source_map)
                .await;
            report(&result);
        }
    }

    /// Build `file` once, then give it to the bundler's own watch.
    async fn hand_off(&self, file: ClassifiedFile) {
        let path = file.path.clone();
        let output = file.output.clone();
        let result = self
            .shared
            .dispatcher
            .dispatch(file, BuildMode::Development, self.shared.source_map)
            .await;
        report(&result);
        self.start_bundler_watch(&path, output);
    }

    /// Commit the `HandedOff` transition only once the bundler watch runs.
    /// On failure the entry stays `SelfWatched` and the next event retries.
    fn start_bundler_watch(&self, path: &Path, output: PathBuf) {
        let request = BundleRequest {
            source: path.to_owned(),
            output,
            options: self
                .shared
                .dispatcher
                .bundle_options(BuildMode::Development, self.shared.source_map),
        };
        let handle = match self
            .shared
            .dispatcher
            .bundler()
            .watch(request, rebuild_logger(path.to_owned()))
        {
            Ok(handle) => handle,
            Err(e) => {
                report_error(path, &e);
                return;
            }
        };

        let mut table = self.shared.table.lock();
        let Some(entry) = table.get_mut(path) else {
            // Removed meanwhile; dropping `handle` ends the watch.
            crate::debug!("watch"; "{} removed during hand-off", path.display());
            return;
        };
        entry.ownership = Ownership::HandedOff;
        entry.rebuild = Some(handle);
        self.shared.filter.release(path);
        drop(table);

        status_info(&format!(
            "{} is a module, handed off to {}",
            path.display(),
            self.shared.dispatcher.bundler().name()
        ));
    }

    async fn on_removed(&self, path: &Path) {
        let entry = self.shared.table.lock().remove(path);
        if let Some(entry) = entry
            && let Some(handle) = entry.rebuild
        {
            handle.cancel();
        }
        self.shared.filter.restore(path);

        let output = output_path_of(path);
        if output != path {
            match tokio::fs::remove_file(&output).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    status_error(
                        &format!("could not delete {}", output.display()),
                        &e.to_string(),
                    );
                }
            }
            let _ = tokio::fs::remove_file(source_map_path_of(&output)).await;
        }
        status_info(&format!("removed {}", path.display()));
    }

    /// Drop every entry, stopping all bundler watches.
    pub fn shutdown(&self) {
        let entries: Vec<_> = self.shared.table.lock().drain().collect();
        crate::debug!("watch"; "releasing {} entries", entries.len());
        drop(entries);
    }
}

struct Lane {
    tx: mpsc::UnboundedSender<WatchEvent>,
    /// Events sent but not yet handled.
    pending: usize,
    /// Whether the last event sent was a removal.
    removed: bool,
}

/// Per-path workers. A worker acknowledges every handled event on `done`;
/// a lane whose last event was a removal is dropped once it goes idle.
struct Lanes<B, M> {
    coordinator: WatchCoordinator<B, M>,
    lanes: FxHashMap<PathBuf, Lane>,
    done: mpsc::UnboundedSender<PathBuf>,
    workers: JoinSet<()>,
}

impl<B: Bundler, M: Minifier> Lanes<B, M> {
    fn new(coordinator: WatchCoordinator<B, M>, done: mpsc::UnboundedSender<PathBuf>) -> Self {
        Self {
            coordinator,
            lanes: FxHashMap::default(),
            done,
            workers: JoinSet::new(),
        }
    }

    fn send(&mut self, event: WatchEvent) {
        let removed = matches!(event, WatchEvent::Removed(_));
        let lane = match self.lanes.entry(event.path().to_owned()) {
            Entry::Occupied(lane) => lane.into_mut(),
            Entry::Vacant(slot) => {
                let (tx, mut rx) = mpsc::unbounded_channel::<WatchEvent>();
                let coordinator = self.coordinator.clone();
                let done = self.done.clone();
                self.workers.spawn(async move {
                    while let Some(event) = rx.recv().await {
                        let path = event.path().to_owned();
                        coordinator.handle(event).await;
                        let _ = done.send(path);
                    }
                });
                slot.insert(Lane {
                    tx,
                    pending: 0,
                    removed: false,
                })
            }
        };

        lane.pending += 1;
        lane.removed = removed;
        if lane.tx.send(event).is_err() {
            crate::log!("error"; "watch lane closed unexpectedly");
        }
    }

    /// Record one handled event for `path`.
    fn settle(&mut self, path: &Path) {
        let Some(lane) = self.lanes.get_mut(path) else {
            return;
        };
        lane.pending = lane.pending.saturating_sub(1);
        if lane.pending == 0 && lane.removed {
            // Dropping the sender ends the idle worker.
            self.lanes.remove(path);
        }
    }

    fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Let every worker drain its lane, then wait for all of them.
    async fn close(mut self) {
        self.lanes.clear();
        while self.workers.join_next().await.is_some() {}
    }
}

fn rebuild_logger(path: PathBuf) -> RebuildCallback {
    Arc::new(move |result: Result<(), BuildError>| match result {
        Ok(()) => status_success(&format!("rebuilt {}", path.display())),
        Err(e) => report_error(&path, &e),
    })
}

fn report(result: &BuildResult) {
    match &result.outcome {
        Ok(_) => {
            let kind = result.kind.map(FileKind::name).unwrap_or("file");
            status_success(&format!(
                "{} {} → {}",
                kind,
                result.source.display(),
                result.output.display()
            ));
        }
        Err(e) => report_error(&result.source, e),
    }
}

fn report_error(path: &Path, e: &BuildError) {
    status_error(&format!("{}: {}", path.display(), e.label()), &e.to_string());
}
