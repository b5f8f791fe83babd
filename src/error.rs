//! Error type shared by every snapkit operation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Unified result type for all fallible operations in snapkit.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while scanning, backing up or touching paths.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller handed over an argument that cannot be used, e.g. an empty
    /// root path or an empty set of alternatives.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A backup source does not exist and the backup runs in strict mode.
    #[error("{} not exist", .0.display())]
    MissingSource(PathBuf),

    /// The path is not an existing regular file.
    #[error("{message}")]
    FileAccess { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
