//! Output path mapping.
//!
//! Pure functions, no filesystem access.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Map a source path to its minified sibling.
///
/// `.min` goes in front of the last extension of the file name:
///
/// ```text
/// a/b.c.js        → a/b.c.min.js
/// archive.tar.gz  → archive.tar.min.gz
/// README          → README        (no extension, unchanged)
/// name.           → name.         (empty extension, unchanged)
/// ```
///
/// A trailing dot counts as no extension, so `name.` is left alone rather
/// than becoming `name.min.` as it would if `.` were taken as the extension.
///
/// Not idempotent: `app.min.js` maps to `app.min.min.js`. Already-minified
/// inputs are filtered out before they reach the pipeline.
pub fn output_path_of(path: &Path) -> PathBuf {
    let (Some(stem), Some(ext)) = (path.file_stem(), path.extension()) else {
        return path.to_path_buf();
    };
    if ext.is_empty() {
        return path.to_path_buf();
    }

    let mut name = OsString::with_capacity(stem.len() + ext.len() + 5);
    name.push(stem);
    name.push(".min.");
    name.push(ext);
    path.with_file_name(name)
}

/// Source map sibling of an output file (`x.min.js` → `x.min.js.map`).
pub fn source_map_path_of(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".map");
    PathBuf::from(name)
}

/// Case-sensitive `.css` suffix test on the whole path.
#[inline]
pub fn is_stylesheet(path: &Path) -> bool {
    path.as_os_str().as_encoded_bytes().ends_with(b".css")
}

/// Whether the file stem already marks a minified file (`x.min.js`).
pub fn is_minified(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.ends_with(".min"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out(p: &str) -> PathBuf {
        output_path_of(Path::new(p))
    }

    #[test]
    fn test_output_path_inserts_before_last_extension() {
        assert_eq!(out("index.js"), PathBuf::from("index.min.js"));
        assert_eq!(out("styles.css"), PathBuf::from("styles.min.css"));
        assert_eq!(out("a/b.c.js"), PathBuf::from("a/b.c.min.js"));
        assert_eq!(out("archive.tar.gz"), PathBuf::from("archive.tar.min.gz"));
    }

    #[test]
    fn test_output_path_without_extension_is_identity() {
        assert_eq!(out("README"), PathBuf::from("README"));
        assert_eq!(out("dir/Makefile"), PathBuf::from("dir/Makefile"));
        assert_eq!(out(".bashrc"), PathBuf::from(".bashrc"));
        assert_eq!(out("name."), PathBuf::from("name."));
        assert_eq!(out(""), PathBuf::from(""));
        assert_eq!(out(".."), PathBuf::from(".."));
    }

    #[test]
    fn test_output_path_ends_with_min_plus_extension() {
        for p in ["x.js", "deep/dir/y.mjs", "z.tar.gz", "w.css"] {
            let source = Path::new(p);
            let ext = source.extension().unwrap().to_str().unwrap();
            let mapped = output_path_of(source);
            assert!(
                mapped.to_str().unwrap().ends_with(&format!(".min.{ext}")),
                "{p} -> {}",
                mapped.display()
            );
        }
    }

    #[test]
    fn test_output_path_is_not_idempotent() {
        let once = out("app.js");
        let twice = output_path_of(&once);
        assert_eq!(once, PathBuf::from("app.min.js"));
        assert_eq!(twice, PathBuf::from("app.min.min.js"));
    }

    #[test]
    fn test_output_path_is_deterministic() {
        assert_eq!(out("src/site.js"), out("src/site.js"));
    }

    #[test]
    fn test_source_map_path() {
        assert_eq!(
            source_map_path_of(Path::new("a/x.min.js")),
            PathBuf::from("a/x.min.js.map")
        );
    }

    #[test]
    fn test_is_stylesheet() {
        assert!(is_stylesheet(Path::new("styles.css")));
        assert!(is_stylesheet(Path::new("a/b/theme.min.css")));
        assert!(!is_stylesheet(Path::new("style.css.backup")));
        assert!(!is_stylesheet(Path::new("style.css.bak")));
        assert!(!is_stylesheet(Path::new("x.csso")));
        assert!(!is_stylesheet(Path::new("archive.tar.gz")));
        assert!(!is_stylesheet(Path::new("LOUD.CSS")));
    }

    #[test]
    fn test_is_minified() {
        assert!(is_minified(Path::new("a.min.js")));
        assert!(!is_minified(Path::new("a.js")));
        assert!(!is_minified(Path::new("admin.js")));
    }
}
