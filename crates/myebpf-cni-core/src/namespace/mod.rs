//! Linux namespace management.
//!
//! Only the network namespace is touched by this plugin; the module keeps
//! the per-namespace-type layout so each type owns its own entry logic.

#[cfg(target_os = "linux")]
pub mod network;
