//! Errors raised while attaching or detaching the counter.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error from the BPF loader.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of one counter attachment step.
#[derive(Debug, Error)]
pub enum CounterError {
    /// The pin-root directory could not be created.
    #[error("failed to create pin root {path}: {source}")]
    PinRoot {
        /// Pin-root path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The compiled object could not be loaded.
    #[error("failed to load counter object {path}: {source}")]
    Load {
        /// Object file path.
        path: PathBuf,
        /// Underlying loader error.
        source: BoxError,
    },

    /// The object has no map with the expected name.
    #[error("map {name} not found in counter object")]
    MissingMap {
        /// Map name.
        name: &'static str,
    },

    /// The counter map could not be pinned.
    #[error("failed to pin counter map at {path}: {source}")]
    Pin {
        /// Pin path.
        path: PathBuf,
        /// Underlying pin error.
        source: BoxError,
    },

    /// The object has no program with the expected name.
    #[error("program {name} not found in counter object")]
    MissingProgram {
        /// Program name.
        name: &'static str,
    },

    /// Loading or attaching the classifier failed.
    #[error("failed to {operation} counter program on {link}: {source}")]
    Program {
        /// Step that failed.
        operation: &'static str,
        /// Host-side link name.
        link: String,
        /// Underlying program error.
        source: BoxError,
    },

    /// Detaching an installed classifier failed.
    #[error("failed to detach counter program from {link}: {source}")]
    Detach {
        /// Host-side link name.
        link: String,
        /// Underlying program error.
        source: BoxError,
    },

    /// The build or host cannot run BPF programs.
    #[error("counter attachment is not supported: {reason}")]
    Unsupported {
        /// Why attachment is unavailable.
        reason: &'static str,
    },
}

/// Convenience alias for counter results.
pub type Result<T> = std::result::Result<T, CounterError>;
