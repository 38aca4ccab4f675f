/// Movement journal persisted inside the organized folder.
///
/// The journal is a pretty-printed JSON array of `{source, destination}`
/// objects stored as `movement_log.json`. It records the physical moves of the
/// most recent apply and drives revert. A missing file simply means there is
/// nothing to revert.
use crate::error::{OrganizeError, OrganizeResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the journal inside the target folder.
pub const JOURNAL_FILE_NAME: &str = "movement_log.json";

/// One completed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementLogEntry {
    /// Where the file was before it was moved.
    pub source: PathBuf,
    /// Where the file was moved to.
    pub destination: PathBuf,
}

/// Shape tolerated on read: entries missing either path are dropped rather
/// than failing the whole journal.
#[derive(Deserialize)]
struct RawEntry {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    destination: Option<String>,
}

/// Ordered list of moves, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Journal {
    pub entries: Vec<MovementLogEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: MovementLogEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Path of the journal file for `folder`.
    pub fn path_for(folder: &Path) -> PathBuf {
        folder.join(JOURNAL_FILE_NAME)
    }

    /// Writes the journal to `folder`, replacing any previous content.
    pub fn save(&self, folder: &Path) -> OrganizeResult<()> {
        let path = Self::path_for(folder);
        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            OrganizeError::JournalWriteFailed {
                path: path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("JSON serialization failed: {}", e),
                ),
            }
        })?;

        fs::write(&path, json).map_err(|e| OrganizeError::JournalWriteFailed { path, source: e })
    }

    /// Loads the journal for `folder`.
    ///
    /// Returns `Ok(None)` when no journal file exists and
    /// `InvalidJournalFormat` when the file is not a JSON array of objects.
    pub fn load(folder: &Path) -> OrganizeResult<Option<Self>> {
        let path = Self::path_for(folder);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .map_err(|e| OrganizeError::JournalReadFailed { path, source: e })?;

        Self::parse(&json).map(Some)
    }

    /// Parses journal text. Incomplete entries are skipped.
    pub fn parse(json: &str) -> OrganizeResult<Self> {
        let raw: Vec<RawEntry> =
            serde_json::from_str(json).map_err(|e| OrganizeError::InvalidJournalFormat {
                reason: format!("JSON parse error: {}", e),
            })?;

        let entries = raw
            .into_iter()
            .filter_map(|entry| match (entry.source, entry.destination) {
                (Some(source), Some(destination))
                    if !source.is_empty() && !destination.is_empty() =>
                {
                    Some(MovementLogEntry {
                        source: PathBuf::from(source),
                        destination: PathBuf::from(destination),
                    })
                }
                _ => None,
            })
            .collect();

        Ok(Self { entries })
    }

    /// Truncates the journal of `folder` to an empty array.
    pub fn clear(folder: &Path) -> OrganizeResult<()> {
        Self::new().save(folder)
    }

    /// Removes the journal file of `folder`. Returns whether a file was removed.
    pub fn delete(folder: &Path) -> OrganizeResult<bool> {
        let path = Self::path_for(folder);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| OrganizeError::JournalWriteFailed { path, source: e })?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_absent_journal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let loaded = Journal::load(temp_dir.path()).expect("Load failed");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_writes_pretty_array() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut journal = Journal::new();
        journal.push(MovementLogEntry {
            source: PathBuf::from("/f/a.txt"),
            destination: PathBuf::from("/f/Docs/a.txt"),
        });
        journal.save(temp_dir.path()).expect("Failed to save journal");

        let text = fs::read_to_string(temp_dir.path().join(JOURNAL_FILE_NAME))
            .expect("Failed to read journal");
        assert!(text.starts_with("[\n"));
        let value: serde_json::Value = serde_json::from_str(&text).expect("Invalid JSON");
        assert_eq!(value[0]["source"], "/f/a.txt");
        assert_eq!(value[0]["destination"], "/f/Docs/a.txt");
    }

    #[test]
    fn test_save_overwrites_previous_journal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut journal = Journal::new();
        journal.push(MovementLogEntry {
            source: PathBuf::from("/f/a.txt"),
            destination: PathBuf::from("/f/Docs/a.txt"),
        });
        journal.save(temp_dir.path()).expect("Failed to save journal");

        Journal::clear(temp_dir.path()).expect("Failed to clear journal");

        let loaded = Journal::load(temp_dir.path())
            .expect("Load failed")
            .expect("Journal should exist");
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_parse_skips_incomplete_entries() {
        let journal = Journal::parse(
            r#"[
                {"source": "/f/a.txt", "destination": "/f/Docs/a.txt"},
                {"source": "/f/b.txt"},
                {"destination": ""},
                {"source": "", "destination": "/f/Docs/c.txt"}
            ]"#,
        )
        .expect("Parse failed");

        assert_eq!(journal.len(), 1);
        assert_eq!(journal.entries[0].source, PathBuf::from("/f/a.txt"));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(matches!(
            Journal::parse("{\"source\": \"x\"}"),
            Err(OrganizeError::InvalidJournalFormat { .. })
        ));
        assert!(Journal::parse("not json").is_err());
    }

    #[test]
    fn test_delete_journal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        assert!(!Journal::delete(temp_dir.path()).expect("Delete failed"));

        Journal::clear(temp_dir.path()).expect("Failed to write journal");
        assert!(Journal::delete(temp_dir.path()).expect("Delete failed"));
        assert!(!Journal::path_for(temp_dir.path()).exists());
    }
}
