use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Suffix patterns kept when no allow-list is given.
pub const DEFAULT_SUFFIXES: &[&str] = &["*.py"];

/// Either a single value or an ordered list of values.
///
/// Public operations accept this at their boundary and normalise it right
/// away with [`OneOrMany::into_vec`]. In TOML both `sources = "a.py"` and
/// `sources = ["a.py", "lib"]` deserialize into it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            OneOrMany::One(_) => false,
            OneOrMany::Many(values) => values.is_empty(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            OneOrMany::One(value) => std::slice::from_ref(value).iter(),
            OneOrMany::Many(values) => values.iter(),
        }
    }
}

macro_rules! one_or_many_from {
    ($target:ty, $one:ty => $conv:expr) => {
        impl From<$one> for OneOrMany<$target> {
            fn from(value: $one) -> Self {
                OneOrMany::One($conv(value))
            }
        }

        impl From<Vec<$one>> for OneOrMany<$target> {
            fn from(values: Vec<$one>) -> Self {
                OneOrMany::Many(values.into_iter().map($conv).collect())
            }
        }

        impl From<&[$one]> for OneOrMany<$target> {
            fn from(values: &[$one]) -> Self {
                OneOrMany::Many(values.iter().cloned().map($conv).collect())
            }
        }

        impl<const N: usize> From<[$one; N]> for OneOrMany<$target> {
            fn from(values: [$one; N]) -> Self {
                OneOrMany::Many(values.into_iter().map($conv).collect())
            }
        }
    };
}

one_or_many_from!(String, String => |s: String| s);
one_or_many_from!(String, &str => |s: &str| s.to_string());
one_or_many_from!(PathBuf, PathBuf => |p: PathBuf| p);
one_or_many_from!(PathBuf, &Path => |p: &Path| p.to_path_buf());
one_or_many_from!(PathBuf, &str => PathBuf::from);

/// A single backup request: where to snapshot, what to snapshot and how
/// strictly to treat missing sources.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BackupJob {
    /// Destination directory. Its previous contents are discarded.
    pub destination: PathBuf,
    /// Files and directories to snapshot, processed in order.
    pub sources: Vec<PathBuf>,
    /// Glob-style suffix patterns (`*.py`) kept when copying directories.
    pub suffixes: Vec<String>,
    /// Fail on the first missing source instead of warning.
    pub strict: bool,
}

impl BackupJob {
    pub fn new(destination: impl Into<PathBuf>, sources: impl Into<OneOrMany<PathBuf>>) -> Self {
        Self {
            destination: destination.into(),
            sources: sources.into().into_vec(),
            suffixes: default_suffixes(),
            strict: false,
        }
    }

    pub fn suffixes(mut self, suffixes: impl Into<OneOrMany<String>>) -> Self {
        self.suffixes = suffixes.into().into_vec();
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

pub fn default_suffixes() -> Vec<String> {
    DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect()
}
