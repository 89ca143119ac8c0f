//! Shared test utilities for the identity workspace.
//!
//! [`EnvGuard`] serialises environment mutation across tests in one binary and
//! restores the previous values on drop. [`RepoTree`] builds throwaway
//! directory trees containing repository markers.

use std::env;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use tempfile::TempDir;

fn env_lock() -> &'static Mutex<()> {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

/// Holds the process-wide environment lock and undoes changes on drop.
///
/// Only one guard can be alive at a time; group several variable changes
/// under one guard with [`EnvGuard::set_var`] and [`EnvGuard::remove_var`].
pub struct EnvGuard {
    saved: Vec<(OsString, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Acquires the environment lock without changing anything.
    #[must_use]
    pub fn new() -> Self {
        let lock = env_lock().lock().unwrap_or_else(PoisonError::into_inner);
        Self {
            saved: Vec::new(),
            _lock: lock,
        }
    }

    /// Sets `key` to `value` under a fresh guard.
    #[must_use]
    pub fn set(key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        let mut guard = Self::new();
        guard.set_var(key, value);
        guard
    }

    /// Removes `key` under a fresh guard.
    #[must_use]
    pub fn remove(key: impl AsRef<OsStr>) -> Self {
        let mut guard = Self::new();
        guard.remove_var(key);
        guard
    }

    /// Sets `key` to `value` until the guard drops.
    pub fn set_var(&mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> &mut Self {
        let key = key.as_ref();
        self.save(key);
        // SAFETY: the environment lock serialises every mutation made through guards.
        unsafe {
            env::set_var(key, value);
        }
        self
    }

    /// Removes `key` until the guard drops.
    pub fn remove_var(&mut self, key: impl AsRef<OsStr>) -> &mut Self {
        let key = key.as_ref();
        self.save(key);
        // SAFETY: the environment lock serialises every mutation made through guards.
        unsafe {
            env::remove_var(key);
        }
        self
    }

    fn save(&mut self, key: &OsStr) {
        self.saved.push((key.to_os_string(), env::var_os(key)));
    }
}

impl Default for EnvGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..).rev() {
            // SAFETY: the lock is still held until `_lock` drops after this body.
            unsafe {
                match previous {
                    Some(value) => env::set_var(&key, value),
                    None => env::remove_var(&key),
                }
            }
        }
    }
}

/// Temporary directory tree with helpers for laying out repositories.
pub struct RepoTree {
    temp: TempDir,
}

impl RepoTree {
    /// Creates an empty tree in a fresh temporary directory.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            temp: tempfile::tempdir()?,
        })
    }

    /// Returns the root of the tree.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Returns `relative` joined onto the root.
    #[must_use]
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.temp.path().join(relative)
    }

    /// Creates the directory `relative` and any missing parents.
    pub fn dir(&self, relative: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.join(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Creates the marker directory `marker` inside `relative`.
    ///
    /// Returns the directory that now looks like a repository root.
    pub fn marker(&self, relative: impl AsRef<Path>, marker: &str) -> io::Result<PathBuf> {
        let root = self.dir(relative)?;
        fs::create_dir_all(root.join(marker))?;
        Ok(root)
    }

    /// Writes `contents` to the file `relative`, creating parent directories.
    pub fn file(&self, relative: impl AsRef<Path>, contents: &[u8]) -> io::Result<PathBuf> {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }
}
