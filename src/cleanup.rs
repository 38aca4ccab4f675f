//! Removal of organize artifacts: the movement journal and empty category
//! folders.

use crate::error::{OrganizeResult, ensure_folder};
use crate::journal::Journal;
use crate::logging::LogSink;
use std::fs;
use std::path::{Path, PathBuf};

/// What [`clean_artifacts`] removed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Whether a journal file existed and was deleted.
    pub journal_deleted: bool,
    /// Folders removed because they were empty.
    pub pruned_folders: Vec<PathBuf>,
}

/// Removes every empty direct subdirectory of `folder`.
///
/// Only one level is inspected. A folder that cannot be read or removed is
/// logged and the scan moves on to its siblings. Returns the removed folders.
pub fn prune_empty_folders(folder: &Path, sink: &dyn LogSink) -> Vec<PathBuf> {
    let mut removed = Vec::new();

    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            sink.warn(&format!(
                "Could not scan folders for cleanup in '{}': {}",
                folder.display(),
                e
            ));
            return removed;
        }
    };

    let mut children: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| entry.path())
        .collect();
    children.sort();

    for child in children {
        let is_empty = match fs::read_dir(&child) {
            Ok(mut inner) => inner.next().is_none(),
            Err(e) => {
                sink.warn(&format!("Could not remove folder '{}': {}", child.display(), e));
                continue;
            }
        };
        if !is_empty {
            continue;
        }

        match fs::remove_dir(&child) {
            Ok(()) => {
                let name = child
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                sink.info(&format!("Removed empty category folder: '{}'", name));
                removed.push(child);
            }
            Err(e) => {
                sink.warn(&format!("Could not remove folder '{}': {}", child.display(), e));
            }
        }
    }

    removed
}

/// Deletes the journal and/or prunes empty category folders of `folder`.
///
/// Both steps are independent; with both flags off this does nothing.
pub fn clean_artifacts(
    folder: &Path,
    delete_journal: bool,
    prune_folders: bool,
    sink: &dyn LogSink,
) -> OrganizeResult<CleanupReport> {
    ensure_folder(folder)?;
    let mut report = CleanupReport::default();

    if delete_journal {
        match Journal::delete(folder) {
            Ok(true) => {
                sink.info("Movement log removed.");
                report.journal_deleted = true;
            }
            Ok(false) => sink.info("No movement log found to delete."),
            Err(e) => sink.warn(&format!("Could not remove movement log: {}", e)),
        }
    }

    if prune_folders {
        report.pruned_folders = prune_empty_folders(folder, sink);
    }

    Ok(report)
}
