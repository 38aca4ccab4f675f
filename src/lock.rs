//! One operation per folder.
//!
//! Plan, apply, revert and cleanup all share the folder's journal and its
//! category folders, so two of them must never run on the same folder at
//! once. [`FolderLocks`] is the registry a front-end uses to enforce that, and
//! [`run_exclusive`] runs an operation on a worker thread while holding the
//! folder, keeping the caller responsive.
//!
//! ```
//! use sortwise::lock::FolderLocks;
//!
//! let locks = FolderLocks::new();
//! let dir = std::env::temp_dir();
//! let guard = locks.try_lock(&dir).unwrap();
//! assert!(locks.try_lock(&dir).is_err());
//! drop(guard);
//! assert!(locks.try_lock(&dir).is_ok());
//! ```

use crate::error::{OrganizeError, OrganizeResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

/// Registry of folders with an operation in flight. Cheap to clone; clones
/// share the same registry.
#[derive(Debug, Clone, Default)]
pub struct FolderLocks {
    busy: Arc<Mutex<HashSet<PathBuf>>>,
}

/// Holds a folder until dropped.
#[derive(Debug)]
pub struct FolderGuard {
    busy: Arc<Mutex<HashSet<PathBuf>>>,
    key: PathBuf,
}

impl FolderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(busy: &Mutex<HashSet<PathBuf>>) -> MutexGuard<'_, HashSet<PathBuf>> {
        // The set stays consistent even if a holder panicked.
        busy.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claims `folder`, or fails with `FolderBusy` if it is already claimed.
    ///
    /// Paths are canonicalized first, so `./Desktop` and `/home/me/Desktop`
    /// name the same folder.
    pub fn try_lock(&self, folder: &Path) -> OrganizeResult<FolderGuard> {
        let key = folder
            .canonicalize()
            .unwrap_or_else(|_| folder.to_path_buf());

        if !Self::registry(&self.busy).insert(key.clone()) {
            return Err(OrganizeError::FolderBusy {
                path: folder.to_path_buf(),
            });
        }

        Ok(FolderGuard {
            busy: Arc::clone(&self.busy),
            key,
        })
    }

    /// True if an operation currently holds `folder`.
    pub fn is_locked(&self, folder: &Path) -> bool {
        let key = folder
            .canonicalize()
            .unwrap_or_else(|_| folder.to_path_buf());
        Self::registry(&self.busy).contains(&key)
    }
}

impl Drop for FolderGuard {
    fn drop(&mut self) {
        FolderLocks::registry(&self.busy).remove(&self.key);
    }
}

/// Handle to an operation running on a worker thread.
#[derive(Debug)]
pub struct Worker<T> {
    folder: PathBuf,
    handle: JoinHandle<OrganizeResult<T>>,
}

impl<T> Worker<T> {
    /// True once the operation has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the operation and returns its result.
    pub fn join(self) -> OrganizeResult<T> {
        self.handle
            .join()
            .unwrap_or_else(|_| Err(OrganizeError::WorkerPanicked { path: self.folder }))
    }
}

/// Runs `op` on a new thread while holding `folder`.
///
/// The folder is claimed before this returns, so a busy folder is reported
/// immediately. It is released when `op` finishes. Operations cannot be
/// cancelled once started.
pub fn run_exclusive<T, F>(locks: &FolderLocks, folder: &Path, op: F) -> OrganizeResult<Worker<T>>
where
    T: Send + 'static,
    F: FnOnce(&Path) -> OrganizeResult<T> + Send + 'static,
{
    let guard = locks.try_lock(folder)?;
    let owned = folder.to_path_buf();
    let thread_folder = owned.clone();

    let handle = thread::Builder::new()
        .name("sortwise-worker".to_string())
        .spawn(move || {
            let _guard = guard;
            op(&thread_folder)
        })
        .map_err(|e| OrganizeError::WorkerSpawnFailed {
            path: owned.clone(),
            source: e,
        })?;

    Ok(Worker {
        folder: owned,
        handle,
    })
}
