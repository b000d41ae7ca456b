//! # myebpf-cni-common
//!
//! Shared configuration, CNI result types, error definitions, and
//! constants used across the myebpf-cni workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and performs no I/O beyond logging.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod result;
pub mod types;
