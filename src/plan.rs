//! Move planning.
//!
//! Turns a classification result into a [`MovePlan`]: one entry per usable
//! classification, each marked `move`, `skip` or `missing`. Planning only reads
//! the filesystem; no category folder is created until the plan is applied.
//!
//! # Examples
//!
//! ```no_run
//! use sortwise::logging::TracingSink;
//! use sortwise::plan::{ClassificationEntry, build_plan};
//! use std::path::Path;
//!
//! let classified = vec![
//!     ClassificationEntry::new("a.txt", "Docs"),
//!     ClassificationEntry::new("b.pdf", "SKIP"),
//! ];
//! let plan = build_plan(Path::new("/home/me/Desktop"), &classified, true, &TracingSink);
//! for entry in plan.entries() {
//!     println!("{} -> {:?}", entry.filename, entry.action);
//! }
//! ```

use crate::error::{OrganizeError, OrganizeResult};
use crate::logging::LogSink;
use crate::scan::is_reserved_name;
use crate::unique_path::unique_path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Reserved category telling the organizer to leave a file where it is.
pub const SKIP_SENTINEL: &str = "SKIP";

/// One `{filename, category}` pair returned by a classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub category: String,
}

impl ClassificationEntry {
    pub fn new(filename: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            category: category.into(),
        }
    }
}

/// What applying the plan will do with a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanAction {
    /// Move the file into its category folder.
    Move,
    /// Leave the file alone (classified as `SKIP`).
    Skip,
    /// The file was not in the folder when the plan was built.
    Missing,
}

/// A single proposed action.
///
/// `destination` is only set for [`PlanAction::Move`] and is a preview: the
/// executor recomputes it right before moving in case the folder changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub filename: String,
    pub category: String,
    pub action: PlanAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
}

/// Per-action totals of a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanCounts {
    pub moves: usize,
    pub skips: usize,
    pub missing: usize,
}

/// An ordered list of plan entries, in classification order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovePlan {
    entries: Vec<PlanEntry>,
}

impl MovePlan {
    pub fn new(entries: Vec<PlanEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<PlanEntry> {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries that will actually move a file.
    pub fn moves(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries
            .iter()
            .filter(|e| e.action == PlanAction::Move)
    }

    pub fn counts(&self) -> PlanCounts {
        let mut counts = PlanCounts::default();
        for entry in &self.entries {
            match entry.action {
                PlanAction::Move => counts.moves += 1,
                PlanAction::Skip => counts.skips += 1,
                PlanAction::Missing => counts.missing += 1,
            }
        }
        counts
    }

    /// Number of planned moves per category, sorted by category name.
    pub fn moves_by_category(&self) -> BTreeMap<String, usize> {
        let mut by_category = BTreeMap::new();
        for entry in self.moves() {
            *by_category.entry(entry.category.clone()).or_insert(0) += 1;
        }
        by_category
    }

    /// Writes the plan as pretty JSON so it can be reviewed and applied later.
    pub fn save(&self, path: &Path) -> OrganizeResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            OrganizeError::InvalidPlanFormat {
                reason: format!("JSON serialization failed: {}", e),
            }
        })?;
        fs::write(path, json).map_err(|e| OrganizeError::PlanWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Reads a plan previously written by [`MovePlan::save`].
    pub fn load(path: &Path) -> OrganizeResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| OrganizeError::PlanReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| OrganizeError::InvalidPlanFormat {
            reason: format!("JSON parse error: {}", e),
        })
    }
}

/// True when `category` is the `SKIP` sentinel, ignoring case and surrounding
/// whitespace.
pub fn is_skip_sentinel(category: &str) -> bool {
    category.trim().eq_ignore_ascii_case(SKIP_SENTINEL)
}

/// True when `name` is exactly one normal path component, i.e. it names a
/// direct child of the folder it is joined to.
pub(crate) fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

/// Builds a move plan for `folder` from a classification result.
///
/// For each classification, in order:
/// - entries with an empty filename or category produce nothing;
/// - `SKIP` (when `allow_skip`) produces a `skip` entry keeping the category
///   text verbatim;
/// - a filename that is not a regular file in `folder` produces `missing`;
/// - everything else produces `move` with a collision-free destination under
///   `folder/category/`.
///
/// Entries whose filename or category would escape the folder (path
/// separators, `..`) are dropped and logged as errors, and so are entries
/// naming one of the organizer's own files such as the movement journal.
pub fn build_plan(
    folder: &Path,
    classified: &[ClassificationEntry],
    allow_skip: bool,
    sink: &dyn LogSink,
) -> MovePlan {
    let mut entries = Vec::new();

    for item in classified {
        if item.filename.is_empty() || item.category.is_empty() {
            continue;
        }

        if allow_skip && is_skip_sentinel(&item.category) {
            entries.push(PlanEntry {
                filename: item.filename.clone(),
                category: item.category.clone(),
                action: PlanAction::Skip,
                destination: None,
            });
            continue;
        }

        if !is_single_component(&item.filename) || !is_single_component(&item.category) {
            sink.error(&format!(
                "Ignoring '{}' -> '{}': names must refer to entries directly inside the folder",
                item.filename, item.category
            ));
            continue;
        }

        if is_reserved_name(&item.filename) {
            sink.error(&format!(
                "Ignoring '{}': this file belongs to the organizer and is never moved",
                item.filename
            ));
            continue;
        }

        let source = folder.join(&item.filename);
        if !source.is_file() {
            sink.warn(&format!("Not found for preview: '{}'", item.filename));
            entries.push(PlanEntry {
                filename: item.filename.clone(),
                category: item.category.clone(),
                action: PlanAction::Missing,
                destination: None,
            });
            continue;
        }

        let destination = unique_path(&folder.join(&item.category).join(&item.filename));
        entries.push(PlanEntry {
            filename: item.filename.clone(),
            category: item.category.clone(),
            action: PlanAction::Move,
            destination: Some(destination),
        });
    }

    MovePlan::new(entries)
}
