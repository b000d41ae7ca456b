//! Scoped network namespace entry.
//!
//! Namespace membership is per thread. [`NetnsGuard`] switches the calling
//! thread into a target namespace and switches it back when dropped, so the
//! original namespace is restored on success, early return, and unwinding.

use std::fs::File;
use std::os::fd::{AsFd, BorrowedFd};
use std::path::{Path, PathBuf};

use nix::sched::{CloneFlags, setns};

use crate::error::{FabricError, Result};

/// Namespace file of the calling thread.
const THREAD_NETNS: &str = "/proc/thread-self/ns/net";

/// Opens the calling thread's current network namespace.
///
/// # Errors
///
/// Returns an error if `/proc/thread-self/ns/net` cannot be opened.
pub fn current() -> Result<File> {
    File::open(THREAD_NETNS).map_err(|source| FabricError::OpenNamespace {
        path: PathBuf::from(THREAD_NETNS),
        source,
    })
}

/// Keeps the calling thread inside a network namespace until dropped.
#[derive(Debug)]
pub struct NetnsGuard {
    origin: File,
    target: PathBuf,
}

impl NetnsGuard {
    /// Moves the calling thread into the namespace at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if either namespace file cannot be opened or
    /// `setns(2)` fails. The thread's namespace is unchanged in that case.
    pub fn enter(path: &Path) -> Result<Self> {
        let origin = current()?;
        let target = File::open(path).map_err(|source| FabricError::OpenNamespace {
            path: path.to_path_buf(),
            source,
        })?;
        setns(&target, CloneFlags::CLONE_NEWNET).map_err(|errno| {
            FabricError::EnterNamespace {
                path: path.to_path_buf(),
                source: errno.into(),
            }
        })?;
        tracing::debug!(netns = %path.display(), "entered network namespace");
        Ok(Self {
            origin,
            target: path.to_path_buf(),
        })
    }

    /// Returns a descriptor for the namespace the thread came from.
    ///
    /// Links moved to this descriptor land in the caller's namespace.
    pub fn origin(&self) -> BorrowedFd<'_> {
        self.origin.as_fd()
    }
}

impl Drop for NetnsGuard {
    fn drop(&mut self) {
        match setns(&self.origin, CloneFlags::CLONE_NEWNET) {
            Ok(()) => {
                tracing::debug!(netns = %self.target.display(), "left network namespace");
            }
            Err(errno) => {
                tracing::error!(
                    netns = %self.target.display(),
                    error = %errno,
                    "failed to restore original network namespace"
                );
            }
        }
    }
}

/// Runs `f` with the calling thread inside the namespace at `path`.
///
/// # Errors
///
/// Returns an error if the namespace cannot be entered, or whatever `f`
/// returns.
pub fn run_in<T>(path: &Path, f: impl FnOnce(&NetnsGuard) -> Result<T>) -> Result<T> {
    let guard = NetnsGuard::enter(path)?;
    f(&guard)
}
