//! Snapshotting sources into a backup directory.
//!
//! A run is linear: the destination is wiped and recreated, tool versions are
//! logged, then each source is copied in order. Regular files land directly in
//! the destination under their file name; directories are copied to their
//! relative path below it, keeping only files whose extension pattern is in
//! the job's allow-list.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Error;
use crate::file_util;
use crate::job::{BackupJob, OneOrMany};
use crate::report::{Advisory, BackupReport, Outcome};
use crate::version::Companion;
use crate::Result;

/// Source names that usually hold bulky artefacts rather than code.
pub const DANGEROUS_NAMES: &[&str] = &["data", "log"];

/// Runs backup jobs and logs the versions of the toolkit and its companions.
#[derive(Debug)]
pub struct BackupRunner {
    name: String,
    version: String,
    companions: Vec<Companion>,
}

impl Default for BackupRunner {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

impl BackupRunner {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            companions: vec![],
        }
    }

    /// Adds a companion whose version is logged after the toolkit's own.
    pub fn companion(mut self, companion: Companion) -> Self {
        self.companions.push(companion);
        self
    }

    pub fn companions(mut self, companions: impl IntoIterator<Item = Companion>) -> Self {
        self.companions.extend(companions);
        self
    }

    /// Executes `job`.
    ///
    /// Sources copied before a strict-mode failure stay in place.
    ///
    /// # Errors
    /// Returns [`Error::MissingSource`] for the first missing source of a
    /// strict job, and any I/O error raised while copying.
    pub fn run(&self, job: &BackupJob) -> Result<BackupReport> {
        let dest = job.destination.as_path();
        reset_destination(dest)?;
        self.log_versions();
        info!("backup files at {}", dest.display());

        let mut report = BackupReport::new(dest);
        for source in &job.sources {
            let exists = source.exists();
            if !exists {
                if job.strict {
                    return Err(Error::MissingSource(source.clone()));
                }
                warn!("{} not exist", source.display());
                report.advisories.push(Advisory::Missing(source.clone()));
            }

            if is_dangerous(source) {
                warn!("'{}' may be unsuitable to back up", source.display());
                report.advisories.push(Advisory::Dangerous(source.clone()));
            }

            if !exists {
                report.push(source, Outcome::SkippedMissing);
                continue;
            }

            let outcome = if source.is_file() {
                let copied = file_util::copy_file(source, dest)?;
                debug!("copied {} to {}", source.display(), copied.display());
                Outcome::CopiedFile { dest: copied }
            } else if source.is_dir() {
                let excluded = file_util::excluded_patterns(source, &job.suffixes)?;
                let target = dest.join(tree_destination(source));
                let stats = file_util::copy_tree(source, &target, &excluded)?;
                debug!(
                    "copied {} files of {} to {} ({} excluded)",
                    stats.copied,
                    source.display(),
                    target.display(),
                    stats.excluded
                );
                Outcome::CopiedTree {
                    dest: target,
                    copied: stats.copied,
                    skipped: stats.excluded,
                    excluded: excluded.into_iter().collect(),
                }
            } else {
                warn!("{} is neither a file nor a directory", source.display());
                Outcome::Unsupported
            };
            report.push(source, outcome);
        }
        Ok(report)
    }

    fn log_versions(&self) {
        info!("{} version is {}", self.name, self.version);
        for companion in &self.companions {
            match companion.version() {
                Some(version) => info!("{} version is {}", companion.name(), version),
                None => debug!("{} is not available", companion.name()),
            }
        }
    }
}

/// Backs up `sources` into `destination` with the default runner.
pub fn backup(
    destination: impl Into<PathBuf>,
    sources: impl Into<OneOrMany<PathBuf>>,
    suffixes: impl Into<OneOrMany<String>>,
    strict: bool,
) -> Result<BackupReport> {
    let job = BackupJob::new(destination, sources)
        .suffixes(suffixes)
        .strict(strict);
    BackupRunner::default().run(&job)
}

/// Removes whatever is at `dest` and recreates it as an empty directory.
fn reset_destination(dest: &Path) -> Result<()> {
    match fs::symlink_metadata(dest) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(dest)?,
        Ok(_) => fs::remove_file(dest)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    fs::create_dir_all(dest)?;
    Ok(())
}

fn is_dangerous(source: &Path) -> bool {
    source
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| DANGEROUS_NAMES.contains(&name))
}

/// Relative location of a directory source below the destination: the path
/// as given, without root, prefix, `.` or `..` components.
fn tree_destination(source: &Path) -> PathBuf {
    source
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}
