//! Single place where failures are logged and swallowed.
//!
//! Every step that must not abort its workflow goes through
//! [`best_effort`]: all `DEL` steps, allocation release, route installation,
//! and host-side bring-up.

use std::fmt;

/// Runs `f`, returning its value or logging its error and returning `None`.
pub fn best_effort<T, E: fmt::Display>(
    step: &'static str,
    f: impl FnOnce() -> Result<T, E>,
) -> Option<T> {
    match f() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(step, error = %e, "best-effort step failed");
            None
        }
    }
}
