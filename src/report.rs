use std::path::{Path, PathBuf};

/// What happened to one backup source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A regular file copied to `dest`.
    CopiedFile { dest: PathBuf },
    /// A directory copied to `dest`, minus the files matching `excluded`.
    CopiedTree {
        dest: PathBuf,
        copied: usize,
        skipped: usize,
        excluded: Vec<String>,
    },
    /// The source did not exist and the backup was not strict.
    SkippedMissing,
    /// The source exists but is neither a file nor a directory.
    Unsupported,
}

/// Advisory emitted while backing up. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    Missing(PathBuf),
    Dangerous(PathBuf),
}

/// Per-source results of one backup run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupReport {
    pub destination: PathBuf,
    pub entries: Vec<(PathBuf, Outcome)>,
    pub advisories: Vec<Advisory>,
}

impl BackupReport {
    pub(crate) fn new(destination: &Path) -> Self {
        Self {
            destination: destination.to_path_buf(),
            ..Default::default()
        }
    }

    pub(crate) fn push(&mut self, source: &Path, outcome: Outcome) {
        self.entries.push((source.to_path_buf(), outcome));
    }

    pub fn outcome(&self, source: impl AsRef<Path>) -> Option<&Outcome> {
        let source = source.as_ref();
        self.entries
            .iter()
            .find(|(src, _)| src == source)
            .map(|(_, outcome)| outcome)
    }

    /// Number of files written to the destination.
    pub fn files_copied(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, outcome)| match outcome {
                Outcome::CopiedFile { .. } => 1,
                Outcome::CopiedTree { copied, .. } => *copied,
                Outcome::SkippedMissing | Outcome::Unsupported => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_lookup_and_count() {
        let mut report = BackupReport::new(Path::new("out"));
        report.push(
            Path::new("train.py"),
            Outcome::CopiedFile {
                dest: PathBuf::from("out/train.py"),
            },
        );
        report.push(
            Path::new("lib"),
            Outcome::CopiedTree {
                dest: PathBuf::from("out/lib"),
                copied: 3,
                skipped: 1,
                excluded: vec!["*.txt".into()],
            },
        );
        report.push(Path::new("gone"), Outcome::SkippedMissing);

        assert_eq!(report.files_copied(), 4);
        assert_eq!(report.outcome("gone"), Some(&Outcome::SkippedMissing));
        assert_eq!(report.outcome("nope"), None);
    }
}
