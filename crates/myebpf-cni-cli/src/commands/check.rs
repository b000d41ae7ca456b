//! `CHECK`: always reports success.

use myebpf_cni_runtime::invocation::Invocation;
use myebpf_cni_runtime::lifecycle::AttachmentLifecycle;

use super::CommandError;

/// Executes the `CHECK` command.
///
/// # Errors
///
/// Infallible; the signature matches the other commands.
pub fn execute(
    lifecycle: &AttachmentLifecycle<'_>,
    invocation: &Invocation,
) -> Result<(), CommandError> {
    lifecycle.check(invocation);
    Ok(())
}
