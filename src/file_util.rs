//! Copy primitives used by the backup runner.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::Result;
use crate::error::Error;

/// Counters collected while copying a directory tree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    pub copied: usize,
    pub excluded: usize,
}

/// Whether a walk entry is hidden (its name starts with a dot).
pub(crate) fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

/// Returns the `*.<ext>` pattern for a file name, if it has an extension.
///
/// Only the text after the last dot counts, so `model.tar.gz` yields `*.gz`.
pub fn extension_pattern(name: &str) -> Option<String> {
    name.rsplit_once('.').map(|(_, ext)| format!("*.{ext}"))
}

/// Collects every distinct extension pattern present under `root`, hidden
/// files and the contents of hidden directories included.
pub fn observed_patterns(root: &Path) -> Result<BTreeSet<String>> {
    let mut patterns = BTreeSet::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(pattern) = entry.file_name().to_str().and_then(extension_pattern) {
            patterns.insert(pattern);
        }
    }
    Ok(patterns)
}

/// Patterns to leave out of a copy of `root`: everything observed there that
/// is not explicitly allowed. Allowed patterns that never occur are ignored.
pub fn excluded_patterns(root: &Path, allowed: &[String]) -> Result<BTreeSet<String>> {
    let observed = observed_patterns(root)?;
    let allowed: BTreeSet<String> = allowed.iter().cloned().collect();
    Ok(observed.difference(&allowed).cloned().collect())
}

/// Glob match limited to the shapes the ignore list holds: `*<suffix>` or a
/// literal name.
pub(crate) fn matches_pattern(name: &str, pattern: &str) -> bool {
    match pattern.strip_prefix('*') {
        Some(suffix) => name.ends_with(suffix),
        None => name == pattern,
    }
}

/// Copies a regular file into `dest_dir` under its own file name,
/// overwriting any file already there.
///
/// # Errors
/// Returns an error if `src` has no file name or the copy fails.
pub fn copy_file(src: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let file_name = src.file_name().ok_or_else(|| {
        Error::invalid(format!("'{}' has no file name", src.display()))
    })?;
    let dest = dest_dir.join(file_name);
    fs::create_dir_all(dest_dir)?;
    fs::copy(src, &dest)?;
    Ok(dest)
}

/// Recursively copies `src` to `dest`, skipping files whose name matches one
/// of the `ignore` patterns. Directories are always recreated.
///
/// If `dest` lives inside `src` it is not walked into, so a snapshot of the
/// current directory does not copy itself.
///
/// # Errors
/// Returns an error if directory traversal or any copy fails.
pub fn copy_tree(src: &Path, dest: &Path, ignore: &BTreeSet<String>) -> Result<TreeStats> {
    fs::create_dir_all(dest)?;
    let dest_canonical = dest.canonicalize()?;
    let mut stats = TreeStats::default();

    let walker = WalkDir::new(src)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            !(e.depth() > 0
                && e.file_type().is_dir()
                && e.path().canonicalize().is_ok_and(|p| p == dest_canonical))
        });

    for entry in walker {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| Error::invalid(format!("'{}' escapes its root", entry.path().display())))?;
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if ignore.iter().any(|pattern| matches_pattern(&name, pattern)) {
            stats.excluded += 1;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        stats.copied += 1;
    }
    Ok(stats)
}
