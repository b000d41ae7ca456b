//! Configuration errors and CNI error codes.
//!
//! Each higher-level crate defines its own domain-specific error enum; the
//! runtime crate aggregates them and maps every variant to a [`CniErrorCode`].

use thiserror::Error;

/// Failure to decode or validate a network configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The payload is not a structurally valid network configuration.
    #[error("failed to decode network configuration: {source}")]
    Decode {
        /// Underlying decode error.
        #[from]
        source: serde_json::Error,
    },

    /// The configuration declares a CNI version this plugin cannot speak.
    #[error("unsupported CNI version {version}")]
    UnsupportedVersion {
        /// Version found in the configuration.
        version: String,
    },

    /// The nested `ipam` block does not name an allocator plugin.
    #[error("network configuration has no ipam.type")]
    MissingIpamType,
}

impl ConfigError {
    /// Returns the CNI error code reported for this error.
    #[must_use]
    pub const fn code(&self) -> CniErrorCode {
        match self {
            Self::Decode { .. } => CniErrorCode::DecodingFailure,
            Self::UnsupportedVersion { .. } => CniErrorCode::IncompatibleVersion,
            Self::MissingIpamType => CniErrorCode::InvalidNetworkConfig,
        }
    }
}

/// Convenience alias for configuration results.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Error codes written to stdout in CNI error objects.
///
/// Codes below 100 are reserved by the CNI specification; the rest are
/// specific to this plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CniErrorCode {
    /// Incompatible CNI version.
    IncompatibleVersion,
    /// Invalid necessary environment variables.
    InvalidEnvironment,
    /// I/O failure.
    IoFailure,
    /// Failed to decode content.
    DecodingFailure,
    /// Invalid network config.
    InvalidNetworkConfig,
    /// The allocator plugin failed.
    AllocationFailed,
    /// The allocator plugin returned no addresses.
    EmptyAllocation,
    /// Namespace or link configuration failed.
    LinkFabricFailed,
    /// The counter program could not be attached.
    AttachFailed,
    /// The host platform cannot run this plugin.
    UnsupportedPlatform,
    /// The result could not be written.
    OutputFailed,
}

impl CniErrorCode {
    /// Returns the numeric value of the code.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::IncompatibleVersion => 1,
            Self::InvalidEnvironment => 4,
            Self::IoFailure => 5,
            Self::DecodingFailure => 6,
            Self::InvalidNetworkConfig => 7,
            Self::AllocationFailed => 100,
            Self::EmptyAllocation => 101,
            Self::LinkFabricFailed => 102,
            Self::AttachFailed => 103,
            Self::UnsupportedPlatform => 104,
            Self::OutputFailed => 105,
        }
    }
}
