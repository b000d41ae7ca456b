//! Attachment lifecycle for the myebpf-cni plugin.
//!
//! Sequences address allocation, veth creation, and counter attachment for
//! `ADD`, and reverses them best-effort for `DEL`.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod backend;
pub mod best_effort;
pub mod error;
pub mod invocation;
pub mod ipam;
pub mod lifecycle;
