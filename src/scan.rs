//! Lazy directory scanning with prefix/suffix filtering.
//!
//! ```no_run
//! use snapkit::scan::ScanRequest;
//!
//! for path in ScanRequest::new("configs").suffix(".yaml").recursive(true).scan()? {
//!     println!("{}", path?);
//! }
//! # Ok::<(), snapkit::Error>(())
//! ```

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, FilterEntry, WalkDir};

use crate::Result;
use crate::error::Error;
use crate::file_util::is_hidden;
use crate::job::OneOrMany;
use crate::path::is_filepath;

/// What to scan and which files to report.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub root: PathBuf,
    pub prefix: Option<OneOrMany<String>>,
    pub suffix: Option<OneOrMany<String>>,
    pub recursive: bool,
}

impl ScanRequest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            prefix: None,
            suffix: None,
            recursive: false,
        }
    }

    pub fn prefix(mut self, prefix: impl Into<OneOrMany<String>>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn suffix(mut self, suffix: impl Into<OneOrMany<String>>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Validates the request and starts a fresh walk of the tree.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the root is empty or not a
    /// directory, or if a prefix/suffix list has no entries.
    pub fn scan(self) -> Result<Scan> {
        if !is_filepath(&self.root) {
            return Err(Error::invalid("`root` must be a non-empty path"));
        }
        if !self.root.is_dir() {
            return Err(Error::invalid(format!(
                "`root` must be an existing directory, but got '{}'",
                self.root.display()
            )));
        }
        for (name, affix) in [("prefix", &self.prefix), ("suffix", &self.suffix)] {
            if affix.as_ref().is_some_and(OneOrMany::is_empty) {
                return Err(Error::invalid(format!(
                    "`{name}` must be a string or a non-empty list of strings"
                )));
            }
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(is_visible as fn(&DirEntry) -> bool);

        Ok(Scan {
            walker,
            root: self.root,
            prefix: self.prefix,
            suffix: self.suffix,
        })
    }
}

fn is_visible(entry: &DirEntry) -> bool {
    !is_hidden(entry)
}

/// Iterator over the matching files of a [`ScanRequest`], as paths relative
/// to the scanned root.
///
/// Symbolic links are followed: a link to a file is reported under the link's
/// own name, and a link to a directory is descended into when recursive.
/// Each call to [`ScanRequest::scan`] walks the filesystem again. Changes made
/// to the tree while iterating may or may not be observed.
pub struct Scan {
    walker: FilterEntry<walkdir::IntoIter, fn(&DirEntry) -> bool>,
    root: PathBuf,
    prefix: Option<OneOrMany<String>>,
    suffix: Option<OneOrMany<String>>,
}

impl Scan {
    fn accepts(&self, rel: &str) -> bool {
        let prefix_ok = self
            .prefix
            .as_ref()
            .is_none_or(|p| p.iter().any(|p| rel.starts_with(p.as_str())));
        let suffix_ok = self
            .suffix
            .as_ref()
            .is_none_or(|s| s.iter().any(|s| rel.ends_with(s.as_str())));
        prefix_ok && suffix_ok
    }

    fn relative(&self, path: &Path) -> Result<String> {
        let rel = path.strip_prefix(&self.root).map_err(|_| {
            Error::invalid(format!("'{}' is outside the scanned root", path.display()))
        })?;
        Ok(rel.to_string_lossy().into_owned())
    }
}

impl Iterator for Scan {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = match self.relative(entry.path()) {
                Ok(rel) => rel,
                Err(e) => return Some(Err(e)),
            };
            if self.accepts(&rel) {
                return Some(Ok(rel));
            }
        }
    }
}

/// Scans `root` for non-hidden files, see [`ScanRequest`].
pub fn scandir(
    root: impl Into<PathBuf>,
    prefix: Option<OneOrMany<String>>,
    suffix: Option<OneOrMany<String>>,
    recursive: bool,
) -> Result<Scan> {
    ScanRequest {
        root: root.into(),
        prefix,
        suffix,
        recursive,
    }
    .scan()
}
