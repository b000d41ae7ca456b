//! Per-invocation container identity and payload.

use std::path::PathBuf;

use myebpf_cni_common::types::ContainerId;

use crate::error::PluginError;

/// Everything the runtime passed to one plugin invocation.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Container being attached.
    pub container_id: ContainerId,
    /// Path of the container's network namespace; may be empty on `DEL`.
    pub netns: PathBuf,
    /// Interface name requested by the runtime, forwarded to the allocator.
    pub ifname: String,
    /// Extra `CNI_ARGS`, forwarded to the allocator.
    pub args: Option<String>,
    /// Colon-separated plugin search path.
    pub cni_path: Option<String>,
    /// Raw network configuration, forwarded to the allocator verbatim.
    pub payload: Vec<u8>,
}

impl Invocation {
    /// Checks the fields `ADD` cannot proceed without.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Invocation`] if the container ID or namespace
    /// path is empty.
    pub fn require_attachable(&self) -> Result<(), PluginError> {
        if self.container_id.is_empty() {
            return Err(PluginError::Invocation {
                message: "CNI_CONTAINERID is empty".into(),
            });
        }
        if self.netns.as_os_str().is_empty() {
            return Err(PluginError::Invocation {
                message: "CNI_NETNS is empty".into(),
            });
        }
        Ok(())
    }
}
