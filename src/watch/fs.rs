//! notify bridge.
//!
//! ```text
//! notify (thread) → Debouncer → existence check → WatchFilter → WatchEvent
//! ```
//!
//! The watcher is attached before the caller starts consuming, so nothing
//! that happens between the initial pass and the first `recv` is lost.

use std::sync::Arc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use tokio::sync::mpsc;

use super::WatchEvent;
use super::debouncer::{ChangeKind, Debouncer, correct_by_existence};
use super::filter::WatchFilter;
use crate::core::WatchError;

/// Watches the filter's roots and emits debounced, filtered events.
pub struct FsWatcher {
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    watcher: RecommendedWatcher,
    debouncer: Debouncer,
    filter: Arc<WatchFilter>,
}

impl FsWatcher {
    pub fn new(filter: Arc<WatchFilter>, debounce: Duration) -> Result<Self, WatchError> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        // A file root shares its parent with siblings; attach each directory once.
        let mut attached = FxHashSet::default();
        for root in filter.roots() {
            let (dir, recursive) = root.attach_point();
            if !attached.insert((dir.to_owned(), recursive)) {
                continue;
            }
            let mode = if recursive {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            watcher.watch(dir, mode)?;
            crate::debug!("watch"; "attached {} ({:?})", dir.display(), mode);
        }

        Ok(Self {
            notify_rx,
            watcher,
            debouncer: Debouncer::new(debounce),
            filter,
        })
    }

    /// Forward events until `events` is closed.
    pub async fn run(self, events: mpsc::UnboundedSender<WatchEvent>) {
        let Self {
            notify_rx,
            watcher,
            mut debouncer,
            filter,
        } = self;
        // Dropping the watcher stops notify.
        let _watcher = watcher;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("error"; "{}", WatchError::from(e)),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                _ = events.closed() => break,
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    let Some(mut changes) = debouncer.take_if_ready() else {
                        continue;
                    };
                    correct_by_existence(&mut changes);
                    for (path, kind) in changes {
                        let event = match kind {
                            ChangeKind::Created => WatchEvent::Added(path),
                            ChangeKind::Modified => WatchEvent::Changed(path),
                            ChangeKind::Removed => WatchEvent::Removed(path),
                        };
                        if !filter.accepts(&event) {
                            continue;
                        }
                        if events.send(event).is_err() {
                            return;
                        }
                    }
                }
            }
        }
    }
}
