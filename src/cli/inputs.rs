//! Input resolution: command-line paths → source files and watch roots.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use rustc_hash::FxHashSet;

use crate::core::path::is_minified;
use crate::utils::path::normalize_path;
use crate::watch::{WatchRoot, is_source};

/// Resolved inputs: files to build (ordered, unique) and where to watch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Inputs {
    pub files: Vec<PathBuf>,
    pub roots: Vec<WatchRoot>,
}

/// Resolve `paths`; an empty list means the current directory.
pub fn resolve_inputs(paths: &[PathBuf]) -> Inputs {
    if paths.is_empty() {
        return resolve_inputs(&[PathBuf::from(".")]);
    }

    let mut inputs = Inputs::default();
    let mut seen = FxHashSet::default();
    let mut keep = |path: &Path| {
        if is_minified(path) {
            crate::debug!("input"; "skipping minified {}", path.display());
            return false;
        }
        seen.insert(path.to_owned())
    };

    for path in paths {
        if path.is_dir() {
            let dir = normalize_path(path);
            inputs
                .files
                .extend(walk_sources(&dir).into_iter().filter(|f| keep(f)));
            let root = WatchRoot::Dir(dir);
            if !inputs.roots.contains(&root) {
                inputs.roots.push(root);
            }
        } else if path.is_file() {
            let file = normalize_path(path);
            if keep(&file) {
                inputs.files.push(file.clone());
                inputs.roots.push(WatchRoot::File(file));
            }
        } else {
            crate::log!("error"; "no such file or directory: {}", path.display());
        }
    }

    inputs
}

/// `.js`/`.css` sources below `dir`, skipping `node_modules` and hidden entries.
fn walk_sources(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort(true)
        .process_read_dir(|_depth, _path, _state, children| {
            children.retain(|entry| {
                entry
                    .as_ref()
                    .map(|e| e.file_name() != "node_modules")
                    .unwrap_or(true)
            });
        })
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| is_source(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn test_directory_walk_filters_sources() {
        let temp = TempDir::new().unwrap();
        let root = normalize_path(temp.path());
        touch(&root, "js/app.js");
        touch(&root, "js/app.min.js");
        touch(&root, "css/site.css");
        touch(&root, "css/site.min.css");
        touch(&root, "img/logo.png");
        touch(&root, "node_modules/lib/index.js");
        touch(&root, ".cache/tmp.js");

        let inputs = resolve_inputs(&[root.clone()]);

        assert_eq!(
            inputs.files,
            vec![root.join("css/site.css"), root.join("js/app.js")]
        );
        assert_eq!(inputs.roots, vec![WatchRoot::Dir(root)]);
    }

    #[test]
    fn test_explicit_files_keep_order_and_dedup() {
        let temp = TempDir::new().unwrap();
        let root = normalize_path(temp.path());
        let b = touch(&root, "b.js");
        let a = touch(&root, "a.mjs");

        let inputs = resolve_inputs(&[b.clone(), a.clone(), b.clone(), root.join("missing.js")]);

        assert_eq!(inputs.files, vec![b.clone(), a.clone()]);
        assert_eq!(
            inputs.roots,
            vec![WatchRoot::File(b), WatchRoot::File(a)]
        );
    }

    #[test]
    fn test_explicit_minified_file_dropped() {
        let temp = TempDir::new().unwrap();
        let min = touch(temp.path(), "x.min.js");
        assert!(resolve_inputs(&[min]).files.is_empty());
    }
}
