//! # myebpf-cni-core
//!
//! Low-level Linux networking primitives for the myebpf-cni plugin.
//!
//! This crate provides safe abstractions over:
//! - **Namespaces**: scoped `setns(2)` entry that always restores the
//!   calling thread's original network namespace.
//! - **Link fabric**: creating, addressing, routing, and deleting the veth
//!   pair that joins a container namespace to the host.
//!
//! On non-Linux hosts only the unsupported fabric variant is compiled.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod error;
pub mod fabric;
pub mod namespace;
