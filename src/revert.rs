/// Reverting the most recent apply.
///
/// Journal entries are replayed last-to-first, moving each file from its
/// recorded destination back to its recorded source. A file that has vanished
/// or whose original location is occupied again is skipped with a warning;
/// nothing is ever overwritten. Afterwards the journal is emptied and empty
/// category folders are pruned.
use crate::cleanup::prune_empty_folders;
use crate::error::{OrganizeError, OrganizeResult, ensure_folder};
use crate::executor::move_file;
use crate::journal::{Journal, MovementLogEntry};
use crate::logging::LogSink;
use std::fs;
use std::path::{Path, PathBuf};

/// How the journal looked when revert started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertOutcome {
    /// No journal file in the folder.
    NoJournal,
    /// The journal exists but records no moves.
    EmptyJournal,
    /// The journal could not be parsed and was left untouched.
    CorruptJournal,
    /// Journal entries were processed.
    Reverted,
}

/// Represents the result of a revert.
#[derive(Debug)]
pub struct RevertReport {
    pub outcome: RevertOutcome,
    /// Number of files moved back.
    pub restored: usize,
    /// Entries whose moved file no longer exists.
    pub skipped_missing: Vec<PathBuf>,
    /// Entries whose original location is occupied.
    pub skipped_conflict: Vec<PathBuf>,
    /// Entries that failed to move back, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    /// Empty category folders removed afterwards.
    pub pruned_folders: Vec<PathBuf>,
}

impl RevertReport {
    fn new(outcome: RevertOutcome) -> Self {
        Self {
            outcome,
            restored: 0,
            skipped_missing: Vec::new(),
            skipped_conflict: Vec::new(),
            failed: Vec::new(),
            pruned_folders: Vec::new(),
        }
    }

    /// Returns the total number of journal entries processed.
    pub fn total_processed(&self) -> usize {
        self.restored
            + self.skipped_missing.len()
            + self.skipped_conflict.len()
            + self.failed.len()
    }

    /// Returns true if every journal entry was moved back.
    pub fn is_complete_success(&self) -> bool {
        self.skipped_missing.is_empty()
            && self.skipped_conflict.is_empty()
            && self.failed.is_empty()
    }
}

enum Restore {
    Restored,
    Missing,
    Conflict,
}

/// Reverts the last apply recorded in `folder`'s journal.
///
/// A missing, empty or unreadable journal is not an error: the report's
/// [`RevertOutcome`] says which case applied and nothing is touched. Only an
/// invalid folder or a journal that cannot be emptied afterwards is returned
/// as an error.
///
/// # Examples
///
/// ```no_run
/// use sortwise::logging::TracingSink;
/// use sortwise::revert::revert;
/// use std::path::Path;
///
/// let report = revert(Path::new("/home/me/Desktop"), &TracingSink)?;
/// println!("Restored {} files", report.restored);
/// # Ok::<(), sortwise::OrganizeError>(())
/// ```
pub fn revert(folder: &Path, sink: &dyn LogSink) -> OrganizeResult<RevertReport> {
    ensure_folder(folder)?;

    let journal = match Journal::load(folder) {
        Ok(Some(journal)) => journal,
        Ok(None) => {
            sink.info("Movement log not found. Nothing to revert.");
            return Ok(RevertReport::new(RevertOutcome::NoJournal));
        }
        Err(OrganizeError::InvalidJournalFormat { reason }) => {
            sink.warn(&format!(
                "Movement log is empty or corrupted. Cannot revert. ({})",
                reason
            ));
            return Ok(RevertReport::new(RevertOutcome::CorruptJournal));
        }
        Err(e) => return Err(e),
    };

    if journal.is_empty() {
        sink.info("No recorded movements to revert.");
        return Ok(RevertReport::new(RevertOutcome::EmptyJournal));
    }

    sink.info("Starting revert...");
    let mut report = RevertReport::new(RevertOutcome::Reverted);
    let total = journal.len();

    for (index, entry) in journal.entries.iter().rev().enumerate() {
        match restore_entry(entry) {
            Ok(Restore::Restored) => {
                let parent = entry
                    .source
                    .parent()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                sink.info(&format!(
                    "Reverted: '{}' -> '{}'",
                    display_name(&entry.destination),
                    parent
                ));
                report.restored += 1;
            }
            Ok(Restore::Missing) => {
                sink.warn(&format!(
                    "Could not find file '{}' to revert.",
                    display_name(&entry.destination)
                ));
                report.skipped_missing.push(entry.destination.clone());
            }
            Ok(Restore::Conflict) => {
                sink.warn(&format!(
                    "Source file already exists and will not be overwritten: '{}'. Skipping this move.",
                    entry.source.display()
                ));
                report.skipped_conflict.push(entry.source.clone());
            }
            Err(e) => {
                sink.error(&format!(
                    "Could not revert move of '{}': {}",
                    display_name(&entry.destination),
                    e
                ));
                report.failed.push((entry.destination.clone(), e.to_string()));
            }
        }
        sink.progress(index + 1, total);
    }

    Journal::clear(folder)?;
    report.pruned_folders = prune_empty_folders(folder, sink);

    sink.info("Revert completed.");
    Ok(report)
}

fn restore_entry(entry: &MovementLogEntry) -> std::io::Result<Restore> {
    if !entry.destination.exists() {
        return Ok(Restore::Missing);
    }
    if entry.source.exists() {
        return Ok(Restore::Conflict);
    }

    if let Some(parent) = entry.source.parent() {
        fs::create_dir_all(parent)?;
    }
    move_file(&entry.destination, &entry.source)?;
    Ok(Restore::Restored)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
