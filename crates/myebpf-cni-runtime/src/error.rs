//! Errors surfaced to the runtime by a failed invocation.
//!
//! Wraps each crate's domain error with the stage it failed in. Every
//! variant maps to a CNI error code through [`PluginError::code`].

use myebpf_cni_common::error::{CniErrorCode, ConfigError};
use myebpf_cni_core::error::FabricError;
use myebpf_cni_ebpf::error::CounterError;
use thiserror::Error;

use crate::ipam::AllocationError;

/// Fatal failure of a plugin command.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The network configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A required `CNI_*` variable is missing or malformed.
    #[error("invalid invocation: {message}")]
    Invocation {
        /// What is wrong with the invocation.
        message: String,
    },

    /// The network configuration could not be read from stdin.
    #[error("failed to read network configuration: {source}")]
    Input {
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The allocator could not provide addresses.
    #[error("ipam add: {source}")]
    Allocation {
        /// Underlying allocator error.
        #[from]
        source: AllocationError,
    },

    /// The allocator succeeded but assigned nothing.
    #[error("ipam plugin {plugin} returned no IPs")]
    EmptyAllocation {
        /// Allocator plugin name.
        plugin: String,
    },

    /// Namespace or link configuration failed.
    #[error("{stage}: {source}")]
    LinkFabric {
        /// Step that failed.
        stage: &'static str,
        /// Underlying fabric error.
        source: FabricError,
    },

    /// The counter could not be attached.
    #[error("attach ebpf tc on {link}: {source}")]
    Attach {
        /// Host-side link name.
        link: String,
        /// Underlying counter error.
        source: CounterError,
    },

    /// The result could not be rendered in the requested version.
    #[error("failed to encode result: {source}")]
    Output {
        /// Underlying encoding error.
        source: ConfigError,
    },
}

impl PluginError {
    /// Returns the CNI error code reported for this error.
    #[must_use]
    pub const fn code(&self) -> CniErrorCode {
        match self {
            Self::Config(e) => e.code(),
            Self::Invocation { .. } => CniErrorCode::InvalidEnvironment,
            Self::Input { .. } => CniErrorCode::IoFailure,
            Self::Allocation { .. } => CniErrorCode::AllocationFailed,
            Self::EmptyAllocation { .. } => CniErrorCode::EmptyAllocation,
            Self::LinkFabric {
                source: FabricError::Unsupported { .. },
                ..
            }
            | Self::Attach {
                source: CounterError::Unsupported { .. },
                ..
            } => CniErrorCode::UnsupportedPlatform,
            Self::LinkFabric { .. } => CniErrorCode::LinkFabricFailed,
            Self::Attach { .. } => CniErrorCode::AttachFailed,
            Self::Output { .. } => CniErrorCode::OutputFailed,
        }
    }
}

/// Wraps a fabric error with the stage it happened in.
pub fn fabric_stage(stage: &'static str) -> impl FnOnce(FabricError) -> PluginError {
    move |source| PluginError::LinkFabric { stage, source }
}
