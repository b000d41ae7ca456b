//! Counter program for builds or hosts without BPF support.

use std::path::Path;

use super::{AttachmentHandle, CounterProgram};
use crate::error::{CounterError, Result};

/// Counter program that refuses every attachment.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedCounter;

impl CounterProgram for UnsupportedCounter {
    fn attach(&self, link: &str, _pin_path: &Path) -> Result<Box<dyn AttachmentHandle>> {
        tracing::debug!(link, "counter attachment unavailable on this build");
        Err(CounterError::Unsupported {
            reason: if cfg!(target_os = "linux") {
                "built without the `ebpf` feature"
            } else {
                "BPF requires Linux"
            },
        })
    }
}
