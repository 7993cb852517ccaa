//! Advisory locking through sidecar marker files
//!
//! A lock on `<dir>/<name>` is held while the zero-length marker
//! `<dir>/.<name>.lock` exists. Markers are created with exclusive-create
//! semantics, which is what makes the lock hold across processes on one host.
//! The in-memory registry kept by [`LockManager`] is bookkeeping only.
//!
//! There is no stale-lock detection. A marker left behind by a crashed
//! process blocks every later acquisition of that path until it is removed
//! by hand.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::future::Future;
use std::io::ErrorKind;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use uuid::Uuid;

use crate::{Error, Result};

/// Default time to wait for a lock before giving up.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Default pause between acquisition attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Marker file guarding `path`: `<parent>/.<file name>.lock`.
pub fn marker_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.lock"))
}

/// An acquired lock.
///
/// Hand it back to [`LockManager::release`] when done, or use
/// [`LockManager::with_lock`] to have that happen automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLock {
    path: PathBuf,
    lock_file: PathBuf,
    acquired_at: DateTime<Utc>,
    token: Uuid,
}

impl FileLock {
    /// The path this lock guards.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The marker file whose existence holds the lock.
    pub fn lock_file(&self) -> &Path {
        &self.lock_file
    }

    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }
}

/// Acquires and releases [`FileLock`]s and tracks the ones this instance holds.
///
/// Create one per application context and share it (for example behind an
/// `Arc`) with everything that writes under the same data directory.
#[derive(Debug)]
pub struct LockManager {
    active: Mutex<HashMap<PathBuf, FileLock>>,
    poll_interval: Duration,
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LockManager {
    pub fn new() -> Self {
        Self::with_poll_interval(DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self {
            active: Mutex::new(HashMap::new()),
            poll_interval,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Acquire the lock for `path`, retrying until `timeout` has elapsed.
    ///
    /// With a zero timeout a held lock fails on the first attempt. Only an
    /// existing marker is retried; failing to create the lock directory or
    /// any other error on the marker fails immediately.
    pub async fn acquire(&self, path: impl AsRef<Path>, timeout: Duration) -> Result<FileLock> {
        let path = path.as_ref().to_path_buf();
        let lock_file = marker_path(&path);
        let started = Instant::now();

        loop {
            let attempt = {
                let marker = lock_file.clone();
                tokio::task::spawn_blocking(move || try_create_marker(&marker))
                    .await
                    .unwrap_or_else(|e| {
                        Err(Error::io(
                            &lock_file,
                            "creating lock file",
                            std::io::Error::other(e.to_string()),
                        ))
                    })
            };

            match attempt {
                Ok(true) => {
                    let lock = FileLock {
                        path: path.clone(),
                        lock_file,
                        acquired_at: Utc::now(),
                        token: Uuid::new_v4(),
                    };
                    self.registry().insert(path, lock.clone());
                    tracing::debug!(path = %lock.path.display(), "Lock acquired");
                    return Ok(lock);
                }
                Ok(false) => {
                    let elapsed = started.elapsed();
                    if elapsed >= timeout {
                        let lock_file_exists =
                            tokio::fs::try_exists(&lock_file).await.unwrap_or(false);
                        return Err(Error::LockTimeout {
                            path,
                            lock_file,
                            timeout,
                            lock_file_exists,
                        });
                    }
                    tokio::time::sleep(self.poll_interval.min(timeout - elapsed)).await;
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to create lock file"
                    );
                    return Err(e);
                }
            }
        }
    }

    /// Release a lock. Releasing the same lock again does nothing.
    ///
    /// The marker is removed whenever it is present, even when the lock was
    /// acquired through a different manager. Only a stale handle, one whose
    /// path this manager has since locked again, is ignored. A marker that
    /// cannot be removed is logged as an error and otherwise ignored; the
    /// registry entry is cleared regardless.
    pub async fn release(&self, lock: &FileLock) {
        if !self.deregister(lock) {
            return;
        }

        let lock_file = lock.lock_file.clone();
        let removal = tokio::task::spawn_blocking(move || remove_marker(&lock_file)).await;
        if let Err(e) = removal {
            tracing::error!(
                path = %lock.path.display(),
                lock_file = %lock.lock_file.display(),
                "Lock file removal did not complete: {}. Manual cleanup may be required.",
                e
            );
        }
    }

    /// Synchronous [`release`](Self::release), used when a guard is dropped.
    pub fn release_blocking(&self, lock: &FileLock) {
        if self.deregister(lock) {
            remove_marker(&lock.lock_file);
        }
    }

    /// Acquire a lock that is released when the returned guard goes out of
    /// scope, including on early return, panic or cancellation.
    ///
    /// Prefer `guard.release().await` on the normal path; dropping the guard
    /// removes the marker with a blocking call.
    pub async fn with_lock(&self, path: impl AsRef<Path>, timeout: Duration) -> Result<LockGuard<'_>> {
        let lock = self.acquire(path, timeout).await?;
        Ok(LockGuard {
            manager: self,
            lock,
            released: false,
        })
    }

    /// Run `f` while holding the lock for `path`.
    pub async fn run_locked<T, E, F, Fut>(
        &self,
        path: impl AsRef<Path>,
        timeout: Duration,
        f: F,
    ) -> std::result::Result<T, E>
    where
        E: From<Error>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let guard = self.with_lock(path, timeout).await?;
        let result = f().await;
        guard.release().await;
        result
    }

    /// Whether this manager currently holds a lock for `path`.
    ///
    /// Says nothing about locks held by other processes or other managers.
    pub fn is_locked(&self, path: impl AsRef<Path>) -> bool {
        self.registry().contains_key(path.as_ref())
    }

    /// Locks currently held through this manager.
    pub fn active_locks(&self) -> Vec<FileLock> {
        self.registry().values().cloned().collect()
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<PathBuf, FileLock>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear the registry entry for `lock`. Returns whether its marker
    /// should be removed.
    fn deregister(&self, lock: &FileLock) -> bool {
        let mut registry = self.registry();
        match registry.get(&lock.path) {
            Some(held) if held.token == lock.token => {
                registry.remove(&lock.path);
                true
            }
            Some(_) => {
                tracing::debug!(
                    path = %lock.path.display(),
                    "Ignoring release of a stale lock handle"
                );
                false
            }
            None => {
                tracing::warn!(
                    path = %lock.path.display(),
                    lock_file = %lock.lock_file.display(),
                    "Releasing a lock this manager does not hold"
                );
                true
            }
        }
    }
}

/// Create the marker for a lock. `Ok(false)` means another holder has it.
fn try_create_marker(lock_file: &Path) -> Result<bool> {
    if let Some(parent) = lock_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| Error::io(parent, "creating lock directory", e))?;
    }
    match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(lock_file)
    {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(Error::io(lock_file, "creating lock file", e)),
    }
}

fn remove_marker(lock_file: &Path) {
    match fs::remove_file(lock_file) {
        Ok(()) => tracing::debug!(lock_file = %lock_file.display(), "Lock released"),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(lock_file = %lock_file.display(), "Lock file already gone");
        }
        Err(e) => tracing::error!(
            lock_file = %lock_file.display(),
            "Failed to remove lock file: {}. Manual cleanup may be required; \
             the path stays locked until it is deleted.",
            e
        ),
    }
}

/// Scoped lock returned by [`LockManager::with_lock`].
#[must_use = "the lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct LockGuard<'a> {
    manager: &'a LockManager,
    lock: FileLock,
    released: bool,
}

impl LockGuard<'_> {
    /// Release the lock without blocking the runtime.
    pub async fn release(mut self) {
        self.manager.release(&self.lock).await;
        self.released = true;
    }
}

impl Deref for LockGuard<'_> {
    type Target = FileLock;

    fn deref(&self) -> &FileLock {
        &self.lock
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.manager.release_blocking(&self.lock);
        }
    }
}
