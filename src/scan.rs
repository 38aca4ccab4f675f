/// Picks the files of a folder that are handed to the classifier.
use crate::config::{CompiledFilters, LOCAL_CONFIG_FILE_NAME};
use crate::error::{OrganizeError, OrganizeResult, ensure_folder};
use crate::journal::JOURNAL_FILE_NAME;
use crate::logging::LogSink;
use std::fs;
use std::path::{Path, PathBuf};

/// Default log file name used by the command-line front-end.
pub const LOG_FILE_NAME: &str = "sortwise.log";

/// Files the organizer itself keeps in the folder. They are never classified.
pub const RESERVED_FILE_NAMES: &[&str] =
    &[JOURNAL_FILE_NAME, LOG_FILE_NAME, LOCAL_CONFIG_FILE_NAME, ".env"];

/// True if `name` is one of [`RESERVED_FILE_NAMES`], ignoring ASCII case.
pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_FILE_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// Lists the regular files directly inside `folder` that pass `filters`,
/// sorted by name. Subdirectories (including existing category folders) are
/// never candidates.
pub fn collect_candidates(
    folder: &Path,
    filters: &CompiledFilters,
    sink: &dyn LogSink,
) -> OrganizeResult<Vec<PathBuf>> {
    ensure_folder(folder)?;

    let entries = fs::read_dir(folder).map_err(|e| OrganizeError::FolderReadFailed {
        path: folder.to_path_buf(),
        source: e,
    })?;

    let mut candidates = Vec::new();
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if is_reserved_name(&name) {
            continue;
        }
        if let Some(reason) = filters.exclusion(&name) {
            sink.info(&format!("Excluded '{}': {}", name, reason));
            continue;
        }

        candidates.push(entry.path());
    }

    candidates.sort();
    Ok(candidates)
}
