//! `ADD`: attach the container and print the result.

use std::io::Write;

use myebpf_cni_runtime::error::PluginError;
use myebpf_cni_runtime::invocation::Invocation;
use myebpf_cni_runtime::lifecycle::AttachmentLifecycle;

use super::CommandError;
use crate::output;

/// Executes the `ADD` command.
///
/// The result is encoded in the configuration's `cniVersion`.
///
/// # Errors
///
/// Returns an error if the attachment fails or the result cannot be
/// written.
pub fn execute(
    lifecycle: &AttachmentLifecycle<'_>,
    invocation: &Invocation,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let result = lifecycle.add(invocation)?;
    let encoded = result
        .encode(&result.cni_version)
        .map_err(|source| PluginError::Output { source })?;
    output::write_json(out, &encoded)?;
    Ok(())
}
