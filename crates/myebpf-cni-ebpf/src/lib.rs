//! # myebpf-cni-ebpf
//!
//! TC ingress packet counter for the myebpf-cni plugin.
//!
//! - **Programs**: loading the compiled counter object, pinning its map,
//!   and attaching the ingress classifier to a host-side veth.
//! - **Registry**: process-wide record of live attachments, at most one
//!   per link name.
//! - **Attachment**: the attach/detach policy tying the two together.
//!
//! The `ebpf` feature must be enabled and the host must support BPF for
//! the aya-backed program to be available; otherwise attachment fails with
//! an unsupported-platform error.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod attach;
pub mod error;
pub mod programs;
pub mod registry;
