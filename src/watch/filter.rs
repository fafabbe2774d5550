//! Which file-system events reach the coordinator.
//!
//! A path passes when it lies under a watch root and is a buildable
//! source. Handed-off paths are narrowed to removals until restored.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rustc_hash::FxHashSet;

use super::WatchEvent;
use crate::core::path::is_minified;

/// A place the notify watcher is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WatchRoot {
    /// Walked directory: any `.js`/`.css` source below it counts.
    Dir(PathBuf),
    /// Explicitly named file, watched through its parent directory.
    File(PathBuf),
}

impl WatchRoot {
    /// Directory the watcher attaches to, and whether recursively.
    pub fn attach_point(&self) -> (&Path, bool) {
        match self {
            Self::Dir(dir) => (dir, true),
            Self::File(file) => (file.parent().unwrap_or(Path::new(".")), false),
        }
    }

    fn contains(&self, path: &Path) -> bool {
        match self {
            Self::File(file) => file == path,
            Self::Dir(dir) => path
                .strip_prefix(dir)
                .is_ok_and(|rel| !is_skipped(rel) && is_source(path)),
        }
    }
}

/// Interest currently held for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    All,
    RemovalOnly,
}

/// Shared between the notify bridge (reads) and the coordinator (writes).
#[derive(Debug, Default)]
pub struct WatchFilter {
    roots: Vec<WatchRoot>,
    released: RwLock<FxHashSet<PathBuf>>,
}

impl WatchFilter {
    pub fn new(roots: Vec<WatchRoot>) -> Self {
        Self {
            roots,
            released: RwLock::default(),
        }
    }

    pub fn roots(&self) -> &[WatchRoot] {
        &self.roots
    }

    /// Forward only removals for `path` from now on.
    pub fn release(&self, path: &Path) {
        self.released.write().insert(path.to_owned());
    }

    /// Forward every event kind for `path` again.
    pub fn restore(&self, path: &Path) {
        self.released.write().remove(path);
    }

    pub fn interest(&self, path: &Path) -> Interest {
        if self.released.read().contains(path) {
            Interest::RemovalOnly
        } else {
            Interest::All
        }
    }

    /// Whether `event` should be delivered.
    pub fn accepts(&self, event: &WatchEvent) -> bool {
        let path = event.path();
        if !self.roots.iter().any(|root| root.contains(path)) {
            return false;
        }
        match self.interest(path) {
            Interest::All => true,
            Interest::RemovalOnly => matches!(event, WatchEvent::Removed(_)),
        }
    }
}

/// Source files picked up from walked directories: `.js`/`.css`, not `.min`.
pub fn is_source(path: &Path) -> bool {
    let is_script_or_style = path
        .extension()
        .is_some_and(|ext| ext == "js" || ext == "css");
    is_script_or_style && !is_minified(path)
}

/// Relative path runs through `node_modules` or a hidden directory.
pub fn is_skipped(rel: &Path) -> bool {
    let mut components = rel.components().peekable();
    while let Some(component) = components.next() {
        // Last component is the file itself.
        if components.peek().is_none() {
            break;
        }
        let name = component.as_os_str().to_string_lossy();
        if name == "node_modules" || name.starts_with('.') {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> WatchFilter {
        WatchFilter::new(vec![
            WatchRoot::Dir(PathBuf::from("/site/js")),
            WatchRoot::File(PathBuf::from("/site/legacy.mjs")),
        ])
    }

    #[test]
    fn test_dir_root_accepts_sources_only() {
        let filter = filter();
        assert!(filter.accepts(&WatchEvent::Added("/site/js/a.js".into())));
        assert!(filter.accepts(&WatchEvent::Changed("/site/js/deep/b.css".into())));
        assert!(!filter.accepts(&WatchEvent::Added("/site/js/a.min.js".into())));
        assert!(!filter.accepts(&WatchEvent::Added("/site/js/a.min.js.map".into())));
        assert!(!filter.accepts(&WatchEvent::Added("/site/js/node_modules/x.js".into())));
        assert!(!filter.accepts(&WatchEvent::Added("/site/js/.cache/x.js".into())));
        assert!(!filter.accepts(&WatchEvent::Added("/site/other.js".into())));
    }

    #[test]
    fn test_file_root_matches_exact_path() {
        let filter = filter();
        assert!(filter.accepts(&WatchEvent::Changed("/site/legacy.mjs".into())));
        assert!(!filter.accepts(&WatchEvent::Changed("/site/legacy.min.mjs".into())));
    }

    #[test]
    fn test_released_path_only_forwards_removal() {
        let filter = filter();
        let path = PathBuf::from("/site/js/app.js");
        filter.release(&path);
        assert_eq!(filter.interest(&path), Interest::RemovalOnly);
        assert!(!filter.accepts(&WatchEvent::Changed(path.clone())));
        assert!(!filter.accepts(&WatchEvent::Added(path.clone())));
        assert!(filter.accepts(&WatchEvent::Removed(path.clone())));

        filter.restore(&path);
        assert_eq!(filter.interest(&path), Interest::All);
        assert!(filter.accepts(&WatchEvent::Added(path)));
    }

    #[test]
    fn test_attach_points() {
        assert_eq!(
            WatchRoot::Dir("/a".into()).attach_point(),
            (Path::new("/a"), true)
        );
        assert_eq!(
            WatchRoot::File("/a/b.js".into()).attach_point(),
            (Path::new("/a"), false)
        );
    }
}
