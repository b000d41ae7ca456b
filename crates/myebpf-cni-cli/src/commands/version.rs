//! `VERSION`: print the supported CNI versions.

use std::io::{self, Write};

use myebpf_cni_common::result::VersionReply;

use crate::output;

/// Executes the `VERSION` command.
///
/// # Errors
///
/// Returns an error if the reply cannot be written.
pub fn execute(out: &mut impl Write) -> io::Result<()> {
    output::write_json(out, &VersionReply::default())
}
