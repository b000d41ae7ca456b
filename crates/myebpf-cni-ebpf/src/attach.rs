//! Counter attachment policy.
//!
//! Per link name the state machine is `UNATTACHED -> ATTACHED -> UNATTACHED`.
//! A failed attach leaves the link unattached. Attaching an already attached
//! link closes the prior handle and replaces it.

use std::path::Path;

use myebpf_cni_common::constants::COUNTER_PIN_NAME;

use crate::error::{CounterError, Result};
use crate::programs::CounterProgram;
use crate::registry::AttachmentRegistry;

/// Attaches and detaches the counter on host-side links.
pub struct CounterAttachment<'a> {
    program: &'a dyn CounterProgram,
    registry: &'a AttachmentRegistry,
}

impl<'a> CounterAttachment<'a> {
    /// Creates an attachment manager over `program` and `registry`.
    pub fn new(program: &'a dyn CounterProgram, registry: &'a AttachmentRegistry) -> Self {
        Self { program, registry }
    }

    /// Attaches the counter to `link`, pinning its map under `pin_root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin root cannot be created or the program
    /// cannot be loaded, pinned, or attached.
    pub fn attach(&self, link: &str, pin_root: &Path) -> Result<()> {
        std::fs::create_dir_all(pin_root).map_err(|source| CounterError::PinRoot {
            path: pin_root.to_path_buf(),
            source,
        })?;
        let pin_path = pin_root.join(COUNTER_PIN_NAME);
        self.registry
            .install(link, pin_path.clone(), || self.program.attach(link, &pin_path))?;
        tracing::info!(link, pin = %pin_path.display(), "counter registered");
        Ok(())
    }

    /// Detaches the counter from `link`, if this process attached one.
    ///
    /// Returns whether a record existed. The record is removed even when
    /// closing it fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel refuses the detach request.
    pub fn detach(&self, link: &str) -> Result<bool> {
        let Some(record) = self.registry.remove(link) else {
            tracing::debug!(link, "no counter attachment to detach");
            return Ok(false);
        };
        let pin = record.pin_path().display().to_string();
        record.close()?;
        tracing::info!(link, pin, "counter unregistered");
        Ok(true)
    }

    /// Returns whether `link` currently has a counter attached.
    pub fn is_attached(&self, link: &str) -> bool {
        self.registry.contains(link)
    }
}
