//! Writers for the objects the plugin prints on stdout.
//!
//! stdout carries exactly one JSON document per invocation; logs go to
//! stderr.

use std::error::Error as _;
use std::io::{self, Write};

use myebpf_cni_common::result::CniErrorReply;
use myebpf_cni_runtime::error::PluginError;
use serde::Serialize;

/// Writes `value` as one line of JSON.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_json(out: &mut impl Write, value: &impl Serialize) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()
}

/// Writes the CNI error object for `error` in `version`.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn write_error(out: &mut impl Write, version: &str, error: &PluginError) -> io::Result<()> {
    tracing::error!(code = error.code().as_u32(), error = %error, "command failed");
    let reply = CniErrorReply::new(
        version,
        error.code(),
        error.to_string(),
        error.source().map(ToString::to_string),
    );
    write_json(out, &reply)
}
