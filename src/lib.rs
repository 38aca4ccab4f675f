//! sortwise - sort the files of a folder into category subfolders
//!
//! This library turns a classification of a folder's files (produced by an
//! external text-generation model or any other [`Classifier`]) into a
//! reviewable move plan, applies it while recording every move in a
//! movement journal, and reverts the most recent apply from that journal.
//! Configuration (categories, classifier command, exclusion filters) is
//! read from TOML files.
//!
//! ```no_run
//! use sortwise::{MemorySink, build_plan, apply_plan, revert, ClassificationEntry};
//! use std::path::Path;
//!
//! let folder = Path::new("/path/to/folder");
//! let sink = MemorySink::new();
//! let classified = vec![ClassificationEntry::new("a.txt", "Documents")];
//!
//! let plan = build_plan(folder, &classified, true, &sink);
//! apply_plan(folder, &plan, &sink)?;
//! revert(folder, &sink)?;
//! # Ok::<(), sortwise::OrganizeError>(())
//! ```

pub mod classify;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod journal;
pub mod lock;
pub mod logging;
pub mod organizer;
pub mod output;
pub mod plan;
pub mod revert;
pub mod scan;
pub mod unique_path;

pub use classify::{
    ClassificationRequest, Classifier, ClassifyMode, CommandClassifier, FileMetadata,
    ResponseFileClassifier,
};
pub use cleanup::{CleanupReport, clean_artifacts, prune_empty_folders};
pub use config::{CompiledFilters, Config, ConfigError};
pub use error::{OrganizeError, OrganizeResult};
pub use executor::{ApplyReport, apply_plan};
pub use journal::{JOURNAL_FILE_NAME, Journal, MovementLogEntry};
pub use lock::{FolderLocks, run_exclusive};
pub use logging::{ConsoleSink, LogSink, MemorySink, TracingSink};
pub use organizer::{Organizer, Preview};
pub use plan::{ClassificationEntry, MovePlan, PlanAction, PlanEntry, build_plan};
pub use revert::{RevertOutcome, RevertReport, revert};
pub use unique_path::unique_path;

pub use cli::{Cli, run_cli};
