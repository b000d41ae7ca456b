//! Errors raised by namespace and link operations.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while entering a namespace or configuring links.
#[derive(Debug, Error)]
pub enum FabricError {
    /// A namespace file could not be opened.
    #[error("failed to open network namespace {path}: {source}")]
    OpenNamespace {
        /// Namespace path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// `setns(2)` into the namespace failed.
    #[error("failed to enter network namespace {path}: {source}")]
    EnterNamespace {
        /// Namespace path.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// A netlink request was rejected by the kernel.
    #[error("netlink {operation} failed: {source}")]
    Netlink {
        /// Request that failed.
        operation: &'static str,
        /// Underlying netlink error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A link that must exist was not found.
    #[error("link {name} not found")]
    LinkNotFound {
        /// Link name.
        name: String,
    },

    /// The netlink runtime or socket could not be created.
    #[error("failed to set up netlink connection: {source}")]
    Connection {
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The host platform cannot perform link operations.
    #[error("{operation} is not supported on {os}")]
    Unsupported {
        /// Operation that was attempted.
        operation: &'static str,
        /// Host operating system.
        os: &'static str,
    },
}

/// Convenience alias for link fabric results.
pub type Result<T> = std::result::Result<T, FabricError>;
