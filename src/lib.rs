//! snapkit: snapshot an experiment's source files next to its outputs.
//!
//! This crate provides the backup runner, a lazy directory scanner and the
//! filesystem helpers used by the `snapkit` CLI.

pub mod backup;
pub mod error;
pub mod file_util;
pub mod job;
pub mod path;
pub mod report;
pub mod scan;
pub mod version;

pub use backup::{BackupRunner, backup};
pub use error::{Error, Result};
pub use job::{BackupJob, OneOrMany};
pub use report::{Advisory, BackupReport, Outcome};
pub use scan::{Scan, ScanRequest, scandir};
pub use version::Companion;
