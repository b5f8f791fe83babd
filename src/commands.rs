//! Command-line interface definition for snapkit.
//!
//! This module defines all CLI commands, their arguments, and the handlers
//! that forward them to the library: backup, scan, link, mkdir, vcs-root and
//! config.

use crate::application::{self, Overrides, Profile, ProfileError};
use crate::constants::{PKG_NAME, PKG_VERSION};
use crate::sysexits;
use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser, Subcommand};
use snapkit::path::{self, DEFAULT_VCS_MARKERS};
use snapkit::{BackupRunner, Outcome, ScanRequest};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Command-line interface definition for snapkit.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// More log output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    pub commands: Option<Commands>,
}

/// Supported snapkit commands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Snapshot files and directories into a fresh backup directory.
    Backup {
        /// Files or directories to back up. Defaults to the profile's sources.
        sources: Vec<PathBuf>,
        /// Backup directory. Its previous contents are removed.
        #[arg(short, long)]
        dest: Option<PathBuf>,
        /// Suffix patterns kept when copying directories, e.g. '*.py,*.yaml'.
        #[arg(short, long, value_delimiter = ',')]
        suffix: Option<Vec<String>>,
        /// Fail if a source does not exist.
        #[arg(long)]
        strict: bool,
        /// Profile file to use instead of the default one.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List non-hidden files under a directory, relative to it.
    Scan {
        /// Directory to scan.
        root: PathBuf,
        /// Only report paths starting with one of these prefixes.
        #[arg(short, long, value_delimiter = ',')]
        prefix: Option<Vec<String>>,
        /// Only report paths ending with one of these suffixes.
        #[arg(short, long, value_delimiter = ',')]
        suffix: Option<Vec<String>>,
        /// Descend into subdirectories.
        #[arg(short, long)]
        recursive: bool,
    },
    /// Create a symbolic link DST pointing to SRC.
    Link {
        src: PathBuf,
        dst: PathBuf,
        /// Fail instead of replacing an existing DST.
        #[arg(long)]
        no_overwrite: bool,
    },
    /// Create a directory and its parents if missing.
    Mkdir { dir: PathBuf },
    /// Print the nearest enclosing directory containing a VCS marker.
    VcsRoot {
        /// Start path. Defaults to the current directory.
        path: Option<PathBuf>,
        /// Marker names, e.g. '.git,.hg'.
        #[arg(short, long, value_delimiter = ',')]
        marker: Option<Vec<String>>,
    },
    /// Display the path of the default profile file.
    Config,
}

/// Bad command-line input detected after parsing.
#[derive(Debug, Error)]
#[error("{0}")]
pub(crate) struct UsageError(String);

/// Nothing was found where something was expected.
#[derive(Debug, Error)]
#[error("{0}")]
pub(crate) struct NotFound(String);

/// Dispatches a parsed command to its handler.
pub(crate) fn execute(commands: Commands) -> Result<()> {
    match commands {
        Commands::Backup {
            sources,
            dest,
            suffix,
            strict,
            config,
        } => backup(
            config,
            Overrides {
                destination: dest,
                sources,
                suffixes: suffix,
                strict,
            },
        ),
        Commands::Scan {
            root,
            prefix,
            suffix,
            recursive,
        } => scan(root, prefix, suffix, recursive),
        Commands::Link {
            src,
            dst,
            no_overwrite,
        } => {
            path::symlink(&src, &dst, !no_overwrite).with_context(|| {
                format!("failed to link '{}' -> '{}'", dst.display(), src.display())
            })?;
            Ok(())
        }
        Commands::Mkdir { dir } => {
            path::mkdir_or_exist(&dir)
                .with_context(|| format!("failed to create '{}'", dir.display()))?;
            Ok(())
        }
        Commands::VcsRoot { path: start, marker } => vcs_root(start, marker),
        Commands::Config => {
            let file = application::config_file().ok_or_else(|| {
                NotFound("could not determine the configuration directory".into())
            })?;
            println!("config file: {}", file.display());
            Ok(())
        }
    }
}

/// Runs a backup built from the profile and the command-line overrides.
///
/// # Errors
/// Returns an error if the profile cannot be loaded, the job is incomplete or
/// the backup itself fails.
pub(crate) fn backup(config: Option<PathBuf>, overrides: Overrides) -> Result<()> {
    let profile = Profile::resolve(config.as_deref())?;
    let runner = BackupRunner::new(PKG_NAME, PKG_VERSION).companions(profile.companions());
    let job = profile.into_job(overrides).map_err(UsageError)?;

    let report = runner.run(&job)?;
    for (source, outcome) in &report.entries {
        if let Outcome::CopiedTree { excluded, .. } = outcome
            && !excluded.is_empty()
        {
            info!("{}: excluded {}", source.display(), excluded.join(", "));
        }
    }
    info!(
        "backed up {} files from {} sources",
        report.files_copied(),
        report.entries.len()
    );
    Ok(())
}

/// Prints every matching file under `root`, one per line.
pub(crate) fn scan(
    root: PathBuf,
    prefix: Option<Vec<String>>,
    suffix: Option<Vec<String>>,
    recursive: bool,
) -> Result<()> {
    let mut request = ScanRequest::new(root).recursive(recursive);
    if let Some(prefix) = prefix {
        request = request.prefix(prefix);
    }
    if let Some(suffix) = suffix {
        request = request.suffix(suffix);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for rel in request.scan()? {
        writeln!(out, "{}", rel?)?;
    }
    Ok(())
}

/// Prints the VCS root enclosing `path` (or the current directory).
pub(crate) fn vcs_root(start: Option<PathBuf>, markers: Option<Vec<String>>) -> Result<()> {
    let start = start.unwrap_or_else(|| PathBuf::from("."));
    let markers = markers
        .unwrap_or_else(|| DEFAULT_VCS_MARKERS.iter().map(|m| m.to_string()).collect());
    match path::find_vcs_root(&start, &markers)? {
        Some(root) => {
            println!("{}", root.display());
            Ok(())
        }
        None => Err(anyhow!(NotFound(format!(
            "no directory containing {} found above '{}'",
            markers.join(" or "),
            start.display()
        )))),
    }
}

/// Maps an error to the sysexits code the process should exit with.
pub(crate) fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<snapkit::Error>() {
        return match e {
            snapkit::Error::InvalidArgument(_) => sysexits::EX_USAGE,
            snapkit::Error::MissingSource(_) | snapkit::Error::FileAccess { .. } => {
                sysexits::EX_NOINPUT
            }
            snapkit::Error::Io(_) | snapkit::Error::Walk(_) => sysexits::EX_IOERR,
        };
    }
    if err.downcast_ref::<ProfileError>().is_some() {
        sysexits::EX_CONFIG
    } else if err.downcast_ref::<UsageError>().is_some() {
        sysexits::EX_USAGE
    } else if err.downcast_ref::<NotFound>().is_some() {
        sysexits::EX_NOINPUT
    } else if err.chain().any(|cause| cause.is::<io::Error>()) {
        sysexits::EX_IOERR
    } else {
        sysexits::EX_SOFTWARE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_parse_backup() {
        let cli = Cli::try_parse_from([
            "snapkit", "backup", "train.py", "lib", "-d", "out", "-s", "*.py,*.yaml", "--strict",
        ])
        .unwrap();
        match cli.commands {
            Some(Commands::Backup {
                sources,
                dest,
                suffix,
                strict,
                config,
            }) => {
                assert_eq!(sources, vec![PathBuf::from("train.py"), PathBuf::from("lib")]);
                assert_eq!(dest.as_deref(), Some(Path::new("out")));
                assert_eq!(suffix, Some(vec!["*.py".to_string(), "*.yaml".to_string()]));
                assert!(strict);
                assert!(config.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["snapkit", "scan", "src", "-r", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        assert!(Cli::try_parse_from(["snapkit", "-q", "-v", "config"]).is_err());
    }

    #[test]
    fn test_exit_code_mapping() {
        let missing = anyhow::Error::from(snapkit::Error::MissingSource(PathBuf::from("x")));
        assert_eq!(exit_code(&missing), sysexits::EX_NOINPUT);

        let usage = anyhow::Error::from(UsageError("no sources".into()));
        assert_eq!(exit_code(&usage), sysexits::EX_USAGE);

        let io_err = anyhow::Error::from(io::Error::other("disk full")).context("writing");
        assert_eq!(exit_code(&io_err), sysexits::EX_IOERR);

        assert_eq!(exit_code(&anyhow!("boom")), sysexits::EX_SOFTWARE);
    }
}
