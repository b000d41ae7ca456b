//! Process-wide registry of live counter attachments.
//!
//! A record exists for a link name if and only if a classifier installed by
//! this process is attached to it. All reads and writes go through one
//! mutex, so replacing a record and closing its predecessor is atomic with
//! respect to other callers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::error::Result;
use crate::programs::AttachmentHandle;

/// A live attachment on one host-side link.
#[derive(Debug)]
pub struct AttachmentRecord {
    link: String,
    pin_path: PathBuf,
    handle: Box<dyn AttachmentHandle>,
}

impl AttachmentRecord {
    /// Returns the host-side link name.
    pub fn link(&self) -> &str {
        &self.link
    }

    /// Returns where the counter map was pinned.
    pub fn pin_path(&self) -> &Path {
        &self.pin_path
    }

    /// Detaches the classifier, consuming the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel refuses the detach request.
    pub fn close(self) -> Result<()> {
        self.handle.close()
    }
}

/// Mapping from host-side link name to its live attachment.
#[derive(Debug, Default)]
pub struct AttachmentRegistry {
    records: Mutex<HashMap<String, AttachmentRecord>>,
}

static GLOBAL: OnceLock<AttachmentRegistry> = OnceLock::new();

impl AttachmentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the registry shared by the whole process.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(Self::new)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, AttachmentRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Installs a new attachment on `link`, closing any prior one first.
    ///
    /// The registry stays locked while `attach` runs. If `attach` fails the
    /// link is left without a record.
    ///
    /// # Errors
    ///
    /// Returns whatever `attach` returns.
    pub fn install<E>(
        &self,
        link: &str,
        pin_path: PathBuf,
        attach: impl FnOnce() -> std::result::Result<Box<dyn AttachmentHandle>, E>,
    ) -> std::result::Result<(), E> {
        let mut records = self.lock();
        if let Some(prior) = records.remove(link) {
            tracing::warn!(link, "replacing live counter attachment");
            if let Err(e) = prior.close() {
                tracing::warn!(link, error = %e, "failed to close replaced attachment");
            }
        }
        let handle = attach()?;
        let _ = records.insert(
            link.to_string(),
            AttachmentRecord {
                link: link.to_string(),
                pin_path,
                handle,
            },
        );
        Ok(())
    }

    /// Removes and returns the record for `link`.
    pub fn remove(&self, link: &str) -> Option<AttachmentRecord> {
        self.lock().remove(link)
    }

    /// Returns whether `link` has a live attachment.
    pub fn contains(&self, link: &str) -> bool {
        self.lock().contains_key(link)
    }

    /// Returns the pin path recorded for `link`.
    pub fn pin_path(&self, link: &str) -> Option<PathBuf> {
        self.lock().get(link).map(|r| r.pin_path.clone())
    }

    /// Returns the number of live attachments.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether no attachment is live.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
