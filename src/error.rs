//! Error types shared by the planning, apply, revert and cleanup operations.
//!
//! Only setup-level failures surface as an `OrganizeError`. Problems with a
//! single file (missing source, name conflict, permission denied on one move)
//! are logged through the caller's [`LogSink`](crate::logging::LogSink) and
//! counted in the operation report instead.

use crate::config::ConfigError;
use std::path::PathBuf;

/// Errors that abort a whole organize, revert or cleanup operation.
#[derive(Debug)]
pub enum OrganizeError {
    /// The target folder is missing or is not a directory.
    InvalidBasePath {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The target folder could not be listed.
    FolderReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write the movement journal.
    JournalWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read the movement journal.
    JournalReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The movement journal is not a JSON array of moves.
    InvalidJournalFormat { reason: String },
    /// Failed to read a saved plan file.
    PlanReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write a plan file.
    PlanWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A saved plan file could not be parsed.
    InvalidPlanFormat { reason: String },
    /// Another operation currently holds the folder.
    FolderBusy { path: PathBuf },
    /// A worker thread could not be started.
    WorkerSpawnFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The worker thread running an operation panicked.
    WorkerPanicked { path: PathBuf },
    /// Configuration could not be loaded or compiled.
    Config(ConfigError),
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBasePath { path, source } => {
                write!(f, "Invalid folder {}: {}", path.display(), source)
            }
            Self::FolderReadFailed { path, source } => {
                write!(f, "Failed to read folder {}: {}", path.display(), source)
            }
            Self::JournalWriteFailed { path, source } => {
                write!(
                    f,
                    "Failed to write movement journal {}: {}",
                    path.display(),
                    source
                )
            }
            Self::JournalReadFailed { path, source } => {
                write!(
                    f,
                    "Failed to read movement journal {}: {}",
                    path.display(),
                    source
                )
            }
            Self::InvalidJournalFormat { reason } => {
                write!(f, "Invalid movement journal: {}", reason)
            }
            Self::PlanReadFailed { path, source } => {
                write!(f, "Failed to read plan {}: {}", path.display(), source)
            }
            Self::PlanWriteFailed { path, source } => {
                write!(f, "Failed to write plan {}: {}", path.display(), source)
            }
            Self::InvalidPlanFormat { reason } => write!(f, "Invalid plan file: {}", reason),
            Self::FolderBusy { path } => write!(
                f,
                "Another operation is already running on {}",
                path.display()
            ),
            Self::WorkerSpawnFailed { path, source } => write!(
                f,
                "Could not start operation on {}: {}",
                path.display(),
                source
            ),
            Self::WorkerPanicked { path } => {
                write!(f, "Operation on {} stopped unexpectedly", path.display())
            }
            Self::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidBasePath { source, .. }
            | Self::FolderReadFailed { source, .. }
            | Self::JournalWriteFailed { source, .. }
            | Self::JournalReadFailed { source, .. }
            | Self::PlanReadFailed { source, .. }
            | Self::PlanWriteFailed { source, .. }
            | Self::WorkerSpawnFailed { source, .. } => Some(source),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for OrganizeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Result type for organize operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Checks that `folder` exists and is a directory.
pub(crate) fn ensure_folder(folder: &std::path::Path) -> OrganizeResult<()> {
    if folder.is_dir() {
        return Ok(());
    }
    let reason = if folder.exists() {
        "not a directory"
    } else {
        "folder does not exist"
    };
    Err(OrganizeError::InvalidBasePath {
        path: folder.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, reason),
    })
}
