/// Applying a move plan to the filesystem.
///
/// Only `move` entries are executed. Each one is re-checked against the live
/// folder: the source must still exist and the destination name is resolved
/// again, because the folder may have changed since the plan was previewed.
/// A failing entry is logged and the batch carries on.
use crate::error::{OrganizeResult, ensure_folder};
use crate::journal::{Journal, MovementLogEntry};
use crate::logging::LogSink;
use crate::plan::{MovePlan, is_single_component};
use crate::scan::is_reserved_name;
use crate::unique_path::unique_path;
use std::fs;
use std::io;
use std::path::Path;

/// Outcome of applying a plan.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Moves that completed, in the order they were performed.
    pub moved: Vec<MovementLogEntry>,
    /// Filenames whose source was gone at apply time.
    pub not_found: Vec<String>,
    /// Filenames that could not be moved, with the reason.
    pub failed: Vec<(String, String)>,
}

impl ApplyReport {
    /// True if every `move` entry was carried out.
    pub fn is_complete_success(&self) -> bool {
        self.not_found.is_empty() && self.failed.is_empty()
    }
}

/// Applies the `move` entries of `plan` inside `folder`.
///
/// The journal is rewritten after every successful move, so an interrupted
/// batch still leaves a journal that reverts what was done. It starts out as
/// an empty array, replacing the journal of any earlier batch; if that first
/// write fails, nothing is moved and the error is returned.
///
/// # Examples
///
/// ```no_run
/// use sortwise::executor::apply_plan;
/// use sortwise::logging::TracingSink;
/// use sortwise::plan::{ClassificationEntry, build_plan};
/// use std::path::Path;
///
/// let folder = Path::new("/home/me/Desktop");
/// let plan = build_plan(folder, &[ClassificationEntry::new("a.txt", "Docs")], true, &TracingSink);
/// let report = apply_plan(folder, &plan, &TracingSink)?;
/// println!("moved {} files", report.moved.len());
/// # Ok::<(), sortwise::OrganizeError>(())
/// ```
pub fn apply_plan(
    folder: &Path,
    plan: &MovePlan,
    sink: &dyn LogSink,
) -> OrganizeResult<ApplyReport> {
    ensure_folder(folder)?;

    let mut journal = Journal::new();
    journal.save(folder)?;

    let mut report = ApplyReport::default();
    let mut journal_dirty = false;
    let total = plan.moves().count();

    for (index, entry) in plan.moves().enumerate() {
        match apply_entry(folder, &entry.filename, &entry.category) {
            Ok(record) => {
                sink.info(&format!("Moved: '{}' -> '{}'", entry.filename, entry.category));
                journal.push(record.clone());
                report.moved.push(record);

                if let Err(e) = journal.save(folder) {
                    sink.warn(&format!("Could not update movement journal: {}", e));
                    journal_dirty = true;
                } else {
                    journal_dirty = false;
                }
            }
            Err(EntryError::NotFound) => {
                sink.info(&format!("File not found to move: '{}'", entry.filename));
                report.not_found.push(entry.filename.clone());
            }
            Err(EntryError::Failed(reason)) => {
                sink.error(&format!("Could not move '{}': {}", entry.filename, reason));
                report.failed.push((entry.filename.clone(), reason));
            }
        }
        sink.progress(index + 1, total);
    }

    if journal_dirty {
        journal.save(folder)?;
    }

    sink.info("Plan application completed.");
    Ok(report)
}

enum EntryError {
    NotFound,
    Failed(String),
}

fn apply_entry(
    folder: &Path,
    filename: &str,
    category: &str,
) -> Result<MovementLogEntry, EntryError> {
    // Saved plans can be edited by hand, so the names are checked again here.
    if !is_single_component(filename) || !is_single_component(category) {
        return Err(EntryError::Failed(
            "names must refer to entries directly inside the folder".to_string(),
        ));
    }
    if is_reserved_name(filename) {
        return Err(EntryError::Failed(
            "the organizer's own files are never moved".to_string(),
        ));
    }

    let source = folder.join(filename);
    if !source.is_file() {
        return Err(EntryError::NotFound);
    }

    let category_folder = folder.join(category);
    ensure_category_folder(&category_folder).map_err(|e| {
        EntryError::Failed(format!(
            "could not create folder {}: {}",
            category_folder.display(),
            e
        ))
    })?;

    let destination = unique_path(&category_folder.join(filename));
    move_file(&source, &destination).map_err(|e| EntryError::Failed(e.to_string()))?;

    Ok(MovementLogEntry {
        source,
        destination,
    })
}

/// Creates the category folder unless it already exists as a directory.
fn ensure_category_folder(path: &Path) -> io::Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Moves a file, renaming when possible and falling back to copy + delete
/// when the rename crosses a filesystem boundary.
pub fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(source, destination)?;
            if let Err(remove_err) = fs::remove_file(source) {
                // Leave the original in place rather than keeping two copies.
                let _ = fs::remove_file(destination);
                return Err(remove_err);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}
