//! Utility functions and helpers

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::Glob;
use tracing::debug;
use walkdir::WalkDir;

/// Check if a path is within a directory
pub fn is_subpath(path: &Path, base: &Path) -> bool {
    path.canonicalize()
        .ok()
        .and_then(|p| {
            base.canonicalize()
                .ok()
                .map(|b| p.starts_with(&b))
        })
        .unwrap_or(false)
}

/// `foo.min` + `js` gives `foo.min.js`, unlike [`Path::with_extension`]
pub fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Copy the regular files of `src` into `dst`. Subdirectories are skipped.
/// Returns the number of files copied.
pub fn copy_files(src: &Path, dst: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to read {}", src.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let target = dst.join(entry.file_name());
        fs::copy(entry.path(), &target)
            .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        debug!("Copied {} -> {}", entry.path().display(), target.display());
        copied += 1;
    }
    Ok(copied)
}

/// Names (without extension) of the files in `dir` matching `*.<ext>`,
/// sorted alphabetically
pub fn list_files_with_extension(dir: &Path, ext: &str) -> Result<Vec<String>> {
    let matcher = Glob::new(&format!("*.{}", ext))?.compile_matcher();
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() || !matcher.is_match(entry.file_name()) {
            continue;
        }
        if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_extension() {
        assert_eq!(
            append_extension(Path::new("/a/foo.min"), "js"),
            PathBuf::from("/a/foo.min.js")
        );
        assert_eq!(append_extension(Path::new("bar"), "json"), PathBuf::from("bar.json"));
    }

    #[test]
    fn test_is_subpath() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("inner");
        fs::create_dir(&inner).unwrap();
        fs::write(inner.join("file"), "").unwrap();

        assert!(is_subpath(&inner.join("file"), dir.path()));
        assert!(!is_subpath(dir.path(), &inner));
        assert!(!is_subpath(&dir.path().join("missing"), dir.path()));
    }

    #[test]
    fn test_copy_files_skips_directories() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        fs::write(src.path().join("dongle.conf"), "a=1").unwrap();
        fs::write(src.path().join("sip.conf"), "b=2").unwrap();
        fs::create_dir(src.path().join("nested")).unwrap();
        fs::write(src.path().join("nested/extra.conf"), "c=3").unwrap();

        assert_eq!(copy_files(src.path(), dst.path()).unwrap(), 2);
        assert_eq!(fs::read_to_string(dst.path().join("dongle.conf")).unwrap(), "a=1");
        assert!(!dst.path().join("nested").exists());
    }

    #[test]
    fn test_list_files_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["sip.conf", "dongle.conf", "notes.txt", "dongle.conf.bak"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        assert_eq!(
            list_files_with_extension(dir.path(), "conf").unwrap(),
            vec!["dongle", "sip"]
        );
    }
}
