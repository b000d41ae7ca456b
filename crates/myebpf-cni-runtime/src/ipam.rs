//! Address allocation through an external IPAM plugin.
//!
//! The plugin named by `ipam.type` is found on `CNI_PATH`, run with the
//! invocation's environment and the raw configuration on stdin, and its
//! result normalized into a [`CniResult`]. [`AddressCoordinator::allocate`]
//! hands back a [`PendingAllocation`] that releases the lease when dropped
//! unless the caller commits it.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use myebpf_cni_common::result::{CniResult, IpConfig};
use serde::Deserialize;
use thiserror::Error;

use crate::best_effort::best_effort;
use crate::error::PluginError;
use crate::invocation::Invocation;

/// Failure of an allocator plugin call.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// The plugin binary is not on `CNI_PATH`.
    #[error("allocator plugin {plugin:?} not found in CNI_PATH: {source}")]
    NotFound {
        /// Allocator plugin name.
        plugin: String,
        /// Lookup error.
        source: which::Error,
    },

    /// The plugin could not be started or talked to.
    #[error("failed to run allocator plugin {path}: {source}")]
    Exec {
        /// Resolved plugin binary.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The plugin reported a CNI error object.
    #[error("allocator plugin {plugin} failed with code {code}: {msg}")]
    Reported {
        /// Allocator plugin name.
        plugin: String,
        /// CNI error code.
        code: u32,
        /// Error message.
        msg: String,
        /// Optional details.
        details: Option<String>,
    },

    /// The plugin failed without a decodable error object.
    #[error("allocator plugin {plugin} exited with {status}")]
    Exit {
        /// Allocator plugin name.
        plugin: String,
        /// Exit status.
        status: ExitStatus,
    },

    /// The plugin's result could not be decoded.
    #[error("failed to decode result of allocator plugin {plugin}: {source}")]
    Decode {
        /// Allocator plugin name.
        plugin: String,
        /// Underlying decode error.
        source: serde_json::Error,
    },
}

/// Call contract of an external allocator.
pub trait Allocator {
    /// Runs the allocator's `ADD` and returns its normalized result.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocator cannot be run or fails.
    fn add(&self, plugin: &str, invocation: &Invocation) -> Result<CniResult, AllocationError>;

    /// Runs the allocator's `DEL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocator cannot be run or fails.
    fn del(&self, plugin: &str, invocation: &Invocation) -> Result<(), AllocationError>;
}

#[derive(Deserialize)]
struct ErrorReply {
    code: u32,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    details: Option<String>,
}

/// Allocator that executes a CNI IPAM plugin binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecAllocator;

impl ExecAllocator {
    fn locate(plugin: &str, invocation: &Invocation) -> Result<PathBuf, AllocationError> {
        let search = invocation.cni_path.as_deref().unwrap_or_default();
        which::which_in(plugin, Some(search), "/").map_err(|source| AllocationError::NotFound {
            plugin: plugin.to_string(),
            source,
        })
    }

    fn exec(
        plugin: &str,
        command: &str,
        invocation: &Invocation,
    ) -> Result<Vec<u8>, AllocationError> {
        let path = Self::locate(plugin, invocation)?;
        let exec_error = |source| AllocationError::Exec {
            path: path.clone(),
            source,
        };
        tracing::debug!(plugin, command, path = %path.display(), "running allocator plugin");

        let mut child = Command::new(&path)
            .env("CNI_COMMAND", command)
            .env("CNI_CONTAINERID", invocation.container_id.as_str())
            .env("CNI_NETNS", &invocation.netns)
            .env("CNI_IFNAME", &invocation.ifname)
            .env("CNI_ARGS", invocation.args.as_deref().unwrap_or_default())
            .env("CNI_PATH", invocation.cni_path.as_deref().unwrap_or_default())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(exec_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            // A plugin may exit without reading its configuration.
            match stdin.write_all(&invocation.payload) {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => return Err(exec_error(e)),
                _ => {}
            }
        }
        let output = child.wait_with_output().map_err(exec_error)?;

        if output.status.success() {
            return Ok(output.stdout);
        }
        match serde_json::from_slice::<ErrorReply>(&output.stdout) {
            Ok(reply) => Err(AllocationError::Reported {
                plugin: plugin.to_string(),
                code: reply.code,
                msg: reply.msg,
                details: reply.details,
            }),
            Err(_) => Err(AllocationError::Exit {
                plugin: plugin.to_string(),
                status: output.status,
            }),
        }
    }
}

impl Allocator for ExecAllocator {
    fn add(&self, plugin: &str, invocation: &Invocation) -> Result<CniResult, AllocationError> {
        let stdout = Self::exec(plugin, "ADD", invocation)?;
        CniResult::decode(&stdout).map_err(|source| AllocationError::Decode {
            plugin: plugin.to_string(),
            source,
        })
    }

    fn del(&self, plugin: &str, invocation: &Invocation) -> Result<(), AllocationError> {
        let _ = Self::exec(plugin, "DEL", invocation)?;
        Ok(())
    }
}

/// Delegates allocation and release to an [`Allocator`].
pub struct AddressCoordinator<'a> {
    allocator: &'a dyn Allocator,
}

impl<'a> AddressCoordinator<'a> {
    /// Creates a coordinator over `allocator`.
    pub fn new(allocator: &'a dyn Allocator) -> Self {
        Self { allocator }
    }

    /// Allocates addresses for `invocation` from `plugin`.
    ///
    /// The release obligation is armed as soon as the allocator answers, so
    /// an empty result is still released before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Allocation`] if the allocator fails and
    /// [`PluginError::EmptyAllocation`] if it assigns no address.
    pub fn allocate<'c>(
        &self,
        plugin: &'c str,
        invocation: &'c Invocation,
    ) -> Result<PendingAllocation<'c>, PluginError>
    where
        'a: 'c,
    {
        let result = self.allocator.add(plugin, invocation)?;
        let primary = result.ips.first().cloned();
        let pending = PendingAllocation {
            allocator: self.allocator,
            plugin,
            invocation,
            result,
            armed: true,
        };
        let Some(primary) = primary else {
            return Err(PluginError::EmptyAllocation {
                plugin: plugin.to_string(),
            });
        };
        tracing::info!(
            plugin,
            address = %primary.address,
            total = pending.result().ips.len(),
            "addresses allocated"
        );
        Ok(pending)
    }

    /// Releases the allocation for `invocation`, logging any failure.
    pub fn release(&self, plugin: &str, invocation: &Invocation) {
        release(self.allocator, plugin, invocation);
    }
}

fn release(allocator: &dyn Allocator, plugin: &str, invocation: &Invocation) {
    if best_effort("release allocation", || allocator.del(plugin, invocation)).is_some() {
        tracing::info!(plugin, container = %invocation.container_id, "allocation released");
    }
}

/// An allocation that is released on drop unless committed.
pub struct PendingAllocation<'c> {
    allocator: &'c dyn Allocator,
    plugin: &'c str,
    invocation: &'c Invocation,
    result: CniResult,
    armed: bool,
}

impl PendingAllocation<'_> {
    /// Returns the allocator's result.
    pub const fn result(&self) -> &CniResult {
        &self.result
    }

    /// Returns the first assigned address, the only one configured.
    pub fn primary(&self) -> Option<&IpConfig> {
        self.result().ips.first()
    }

    /// Keeps the lease and returns the result.
    pub fn commit(mut self) -> CniResult {
        self.armed = false;
        std::mem::take(&mut self.result)
    }
}

impl Drop for PendingAllocation<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!(plugin = self.plugin, "rolling back allocation");
            release(self.allocator, self.plugin, self.invocation);
        }
    }
}
