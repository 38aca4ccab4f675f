/// Collision-free destination names.
///
/// A taken name `report.pdf` resolves to `report (1).pdf`, then
/// `report (2).pdf`, and so on, always inside the same parent directory.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Returns `candidate` if nothing exists there, otherwise the first free
/// `"{stem} ({n}){ext}"` sibling for n = 1, 2, 3, ...
///
/// Only reads the filesystem. Two writers racing for the same name can still
/// collide; callers recompute right before each move to narrow that window.
///
/// # Examples
///
/// ```
/// use sortwise::unique_path::unique_path;
/// use std::path::Path;
///
/// let free = Path::new("/definitely/not/here/a.txt");
/// assert_eq!(unique_path(free), free);
/// ```
pub fn unique_path(candidate: &Path) -> PathBuf {
    if !candidate.exists() {
        return candidate.to_path_buf();
    }

    let parent = candidate.parent().unwrap_or_else(|| Path::new(""));
    // A trailing dot is part of the stem: `notes.` becomes `notes. (1)`.
    let (stem, extension) = match (candidate.file_stem(), candidate.extension()) {
        (Some(stem), Some(ext)) if !ext.is_empty() => (OsString::from(stem), Some(ext)),
        _ => (
            candidate.file_name().map(OsString::from).unwrap_or_default(),
            None,
        ),
    };

    let mut counter: u64 = 1;
    loop {
        let mut name = stem.clone();
        name.push(format!(" ({})", counter));
        if let Some(ext) = extension {
            name.push(".");
            name.push(ext);
        }

        let next = parent.join(name);
        if !next.exists() {
            return next;
        }
        counter += 1;
    }
}
