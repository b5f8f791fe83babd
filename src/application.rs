//! Backup profiles.
//!
//! A profile is a TOML file describing a default backup job, so a training
//! script can call `snapkit backup` without repeating its arguments:
//!
//! ```toml
//! destination = "runs/exp1/backup"
//! sources = ["train.py", "lib"]
//! suffixes = ["*.py", "*.yaml"]
//! strict = false
//! companions = ["git", "python3"]
//! ```

use crate::constants::{CONFIG_NAME, PKG_NAME};
use serde::{Deserialize, Serialize};
use snapkit::job::{OneOrMany, default_suffixes};
use snapkit::{BackupJob, Companion};
use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;

/// Errors raised while loading a profile.
#[derive(Debug, Error)]
pub(crate) enum ProfileError {
    #[error("failed to read profile '{}'", .0.display())]
    Read(PathBuf, #[source] io::Error),
    #[error("failed to parse profile '{}'", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),
}

/// Default backup settings read from a profile file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct Profile {
    /// Destination directory, wiped before every backup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    /// Files and directories to back up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<OneOrMany<PathBuf>>,
    /// Suffix patterns kept when copying directories.
    #[serde(default = "default_suffix_list")]
    pub suffixes: OneOrMany<String>,
    /// Fail on missing sources.
    #[serde(default)]
    pub strict: bool,
    /// Executables whose `--version` is logged with every backup.
    #[serde(default)]
    pub companions: Vec<String>,
}

fn default_suffix_list() -> OneOrMany<String> {
    OneOrMany::Many(default_suffixes())
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            destination: None,
            sources: None,
            suffixes: default_suffix_list(),
            strict: false,
            companions: vec![],
        }
    }
}

/// Command-line values layered over a profile. Unset fields keep the
/// profile's value.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub destination: Option<PathBuf>,
    pub sources: Vec<PathBuf>,
    pub suffixes: Option<Vec<String>>,
    pub strict: bool,
}

impl Profile {
    /// Loads the profile at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, ProfileError> {
        let toml_str =
            fs::read_to_string(path).map_err(|e| ProfileError::Read(path.to_path_buf(), e))?;
        toml::from_str(&toml_str).map_err(|e| ProfileError::Parse(path.to_path_buf(), e))
    }

    /// Loads `explicit` if given, otherwise the default profile when it
    /// exists, otherwise an empty profile.
    pub(crate) fn resolve(explicit: Option<&Path>) -> Result<Self, ProfileError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match config_file() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Builds the job described by this profile and `overrides`.
    ///
    /// Fails with a message when no destination or no source is known.
    pub(crate) fn into_job(self, overrides: Overrides) -> Result<BackupJob, String> {
        let destination = overrides
            .destination
            .or(self.destination)
            .ok_or("no backup destination given, use --dest or set `destination` in the profile")?;
        let sources = if overrides.sources.is_empty() {
            self.sources.map(OneOrMany::into_vec).unwrap_or_default()
        } else {
            overrides.sources
        };
        if sources.is_empty() {
            return Err("no backup sources given".to_string());
        }
        let suffixes = overrides.suffixes.unwrap_or_else(|| self.suffixes.into_vec());
        Ok(BackupJob::new(destination, sources)
            .suffixes(suffixes)
            .strict(overrides.strict || self.strict))
    }

    pub(crate) fn companions(&self) -> impl Iterator<Item = Companion> + '_ {
        self.companions.iter().map(|name| Companion::executable(name.as_str()))
    }
}

/// Returns the absolute path to the default profile file.
pub(crate) fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_NAME))
}

/// Returns the configuration directory for the application, platform-specific.
#[cfg(not(target_os = "macos"))]
fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(PKG_NAME))
}

/// Returns the configuration directory for the application, platform-specific.
#[cfg(target_os = "macos")]
fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join(PKG_NAME))
}
