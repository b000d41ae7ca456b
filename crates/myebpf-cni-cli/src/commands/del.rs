//! `DEL`: tear the attachment down.

use myebpf_cni_runtime::invocation::Invocation;
use myebpf_cni_runtime::lifecycle::AttachmentLifecycle;

use super::CommandError;

/// Executes the `DEL` command. Prints nothing and never fails.
///
/// # Errors
///
/// Infallible; the signature matches the other commands.
pub fn execute(
    lifecycle: &AttachmentLifecycle<'_>,
    invocation: &Invocation,
) -> Result<(), CommandError> {
    lifecycle.del(invocation);
    Ok(())
}
