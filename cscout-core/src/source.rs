//! Source provider: reads C files for the engine, which never touches disk itself.
//!
//! Sources are decoded as UTF-8; invalid sequences are replaced with U+FFFD
//! and reported, since a stray Latin-1 comment should not block analysis.

use crate::error::CoreError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions treated as C sources.
pub const C_EXTENSIONS: &[&str] = &["c", "h"];

/// Read a source file as text.
pub fn read_source(path: &Path) -> Result<String, CoreError> {
    let bytes = std::fs::read(path)?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                "Source is not valid UTF-8, replacing invalid sequences"
            );
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

/// Whether a path looks like a C source or header.
pub fn is_c_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| C_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Collect C sources under `root`, sorted for stable output.
///
/// A file path is returned as-is regardless of extension; directories are
/// walked recursively and filtered by extension.
pub fn discover_sources(root: &Path) -> Result<Vec<PathBuf>, CoreError> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.exists() {
        return Err(CoreError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", root.display()),
        )));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_c_source(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_c_source() {
        assert!(is_c_source(Path::new("main.c")));
        assert!(is_c_source(Path::new("include/list.h")));
        assert!(is_c_source(Path::new("LEGACY.C")));
        assert!(!is_c_source(Path::new("main.rs")));
        assert!(!is_c_source(Path::new("Makefile")));
    }

    #[test]
    fn test_discover_sources_walks_and_sorts() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/util")).unwrap();
        std::fs::write(dir.path().join("src/b.c"), "int b;").unwrap();
        std::fs::write(dir.path().join("src/util/a.h"), "int a;").unwrap();
        std::fs::write(dir.path().join("README.md"), "# readme").unwrap();

        let files = discover_sources(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0] < files[1]);
        assert!(files.iter().all(|f| is_c_source(f)));
    }

    #[test]
    fn test_discover_single_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prog.txt");
        std::fs::write(&path, "int main() { return 0; }").unwrap();
        assert_eq!(discover_sources(&path).unwrap(), vec![path]);
    }

    #[test]
    fn test_discover_missing_root() {
        let dir = TempDir::new().unwrap();
        assert!(discover_sources(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_read_source_replaces_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin1.c");
        std::fs::write(&path, b"/* caf\xe9 */\nint x;\n").unwrap();
        let text = read_source(&path).unwrap();
        assert!(text.contains('\u{FFFD}'));
        assert!(text.contains("int x;"));
    }
}
