//! File classification.
//!
//! Decides per source file which pipeline it takes:
//!
//! | Test | Kind |
//! |------|------|
//! | first chunk contains `// @MODULE` | `Module` |
//! | name ends in `.css` | `Stylesheet` |
//! | otherwise | `Asset` |

use std::io;
use std::path::Path;

use tokio::io::AsyncReadExt;

use crate::core::path::{is_stylesheet, output_path_of};
use crate::core::{BuildError, ClassifiedFile, FileKind};

/// Marker comment that opts a script into bundling.
pub const MODULE_MARKER: &str = "// @MODULE";

/// Size of the single probe read.
const PROBE_CHUNK: usize = 64 * 1024;

/// Whether the file's first chunk contains [`MODULE_MARKER`].
///
/// Reads at most one chunk and closes the file right after.
pub async fn is_module(path: &Path) -> Result<bool, BuildError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| BuildError::read(path, e))?;

    let mut buf = vec![0u8; PROBE_CHUNK];
    let n = file
        .read(&mut buf)
        .await
        .map_err(|e| BuildError::read(path, e))?;
    drop(file);
    buf.truncate(n);

    let text = decode_chunk(&buf).map_err(|e| BuildError::read(path, e))?;
    Ok(text.contains(MODULE_MARKER))
}

/// UTF-8 decode that tolerates a multi-byte sequence cut at the chunk end.
fn decode_chunk(bytes: &[u8]) -> io::Result<&str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text),
        // `error_len() == None` means the input ended mid-sequence.
        Err(e) if e.error_len().is_none() => {
            Ok(std::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default())
        }
        Err(e) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
    }
}

/// Classify `path`. Priority: `Module` > `Stylesheet` > `Asset`.
pub async fn classify(path: &Path) -> Result<ClassifiedFile, BuildError> {
    let kind = if is_module(path).await? {
        FileKind::Module
    } else if is_stylesheet(path) {
        FileKind::Stylesheet
    } else {
        FileKind::Asset
    };

    Ok(ClassifiedFile {
        path: path.to_owned(),
        kind,
        output: output_path_of(path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_marker_makes_module() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "app.js", b"// @MODULE\nimport x from './x.js';\n");
        assert!(is_module(&path).await.unwrap());

        let file = classify(&path).await.unwrap();
        assert_eq!(file.kind, FileKind::Module);
        assert_eq!(file.output, dir.path().join("app.min.js"));
    }

    #[tokio::test]
    async fn test_marker_anywhere_in_chunk() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.js", b"const a = 1;\nfoo(); // @MODULE-ish\n");
        assert!(is_module(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_file_is_not_module() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "empty.js", b"");
        assert!(!is_module(&path).await.unwrap());
        assert_eq!(classify(&path).await.unwrap().kind, FileKind::Asset);
    }

    #[tokio::test]
    async fn test_marker_beyond_first_chunk_ignored() {
        let dir = TempDir::new().unwrap();
        let mut content = vec![b' '; PROBE_CHUNK];
        content.extend_from_slice(MODULE_MARKER.as_bytes());
        let path = write(&dir, "late.js", &content);
        assert!(!is_module(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_module_marker_beats_stylesheet() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "theme.css", b"/* x */\n// @MODULE\n");
        assert_eq!(classify(&path).await.unwrap().kind, FileKind::Module);

        let plain = write(&dir, "plain.css", b".a { color: red }");
        assert_eq!(classify(&plain).await.unwrap().kind, FileKind::Stylesheet);
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = classify(&dir.path().join("gone.js")).await.unwrap_err();
        match err {
            BuildError::Read { source, .. } => assert_eq!(source.kind(), io::ErrorKind::NotFound),
            other => panic!("expected read error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_read_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bin.js", &[0x61, 0xff, 0x62]);
        let err = is_module(&path).await.unwrap_err();
        assert!(matches!(err, BuildError::Read { .. }));
    }

    #[test]
    fn test_decode_tolerates_cut_sequence() {
        // "é" is 0xC3 0xA9; keep only the lead byte.
        assert_eq!(decode_chunk(&[b'o', b'k', 0xC3]).unwrap(), "ok");
        assert!(decode_chunk(&[0xC3, b'x']).is_err());
    }
}
