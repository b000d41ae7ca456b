//! aya-backed TC ingress counter.

use std::io;
use std::path::{Path, PathBuf};

use aya::Ebpf;
use aya::pin::PinError;
use aya::programs::links::Link;
use aya::programs::tc::{self, NlOptions, SchedClassifier, SchedClassifierLink, TcAttachOptions};
use aya::programs::TcAttachType;
use myebpf_cni_common::constants::{COUNTER_MAP_NAME, COUNTER_OBJECT_PATH, INGRESS_PROGRAM_NAME};

use super::{AttachmentHandle, CounterProgram};
use crate::error::{CounterError, Result};

/// Counter program loaded from the compiled object on disk.
#[derive(Debug, Clone)]
pub struct AyaCounterProgram {
    object: PathBuf,
}

impl AyaCounterProgram {
    /// Uses the object at the build-time location.
    #[must_use]
    pub fn new() -> Self {
        Self::with_object(COUNTER_OBJECT_PATH)
    }

    /// Uses the object at `path`.
    #[must_use]
    pub fn with_object(path: impl Into<PathBuf>) -> Self {
        Self {
            object: path.into(),
        }
    }
}

impl Default for AyaCounterProgram {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifier installed on a host-side link.
#[derive(Debug)]
struct TcCounterLink {
    link: String,
    tc_link: SchedClassifierLink,
}

impl AttachmentHandle for TcCounterLink {
    fn close(self: Box<Self>) -> Result<()> {
        let Self { link, tc_link } = *self;
        tc_link.detach().map_err(|e| CounterError::Detach {
            link: link.clone(),
            source: Box::new(e),
        })?;
        tracing::info!(link = %link, "counter detached");
        Ok(())
    }
}

fn program_error<'a>(
    operation: &'static str,
    link: &'a str,
) -> impl FnOnce(aya::programs::ProgramError) -> CounterError + 'a {
    move |e| CounterError::Program {
        operation,
        link: link.to_string(),
        source: Box::new(e),
    }
}

fn pin_counter_map(ebpf: &mut Ebpf, path: &Path) -> Result<()> {
    let map = ebpf
        .map_mut(COUNTER_MAP_NAME)
        .ok_or(CounterError::MissingMap {
            name: COUNTER_MAP_NAME,
        })?;
    match map.pin(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "counter map pinned");
            Ok(())
        }
        // The pin path is shared and the first pin wins. Later attachments
        // count into their own unpinned map.
        Err(PinError::SyscallError(err)) if err.io_error.kind() == io::ErrorKind::AlreadyExists => {
            tracing::debug!(path = %path.display(), "counter map pin already present");
            Ok(())
        }
        Err(e) => Err(CounterError::Pin {
            path: path.to_path_buf(),
            source: Box::new(e),
        }),
    }
}

impl CounterProgram for AyaCounterProgram {
    fn attach(&self, link: &str, pin_path: &Path) -> Result<Box<dyn AttachmentHandle>> {
        let mut ebpf = Ebpf::load_file(&self.object).map_err(|e| CounterError::Load {
            path: self.object.clone(),
            source: Box::new(e),
        })?;
        pin_counter_map(&mut ebpf, pin_path)?;

        if let Err(e) = tc::qdisc_add_clsact(link) {
            tracing::debug!(link, error = %e, "clsact qdisc add failed (likely already exists)");
        }

        let program: &mut SchedClassifier = ebpf
            .program_mut(INGRESS_PROGRAM_NAME)
            .ok_or(CounterError::MissingProgram {
                name: INGRESS_PROGRAM_NAME,
            })?
            .try_into()
            .map_err(program_error("cast", link))?;
        program.load().map_err(program_error("load", link))?;

        // Netlink filters outlive this process; TCX links would not.
        let link_id = program
            .attach_with_options(
                link,
                TcAttachType::Ingress,
                TcAttachOptions::Netlink(NlOptions::default()),
            )
            .map_err(program_error("attach", link))?;
        let tc_link = program
            .take_link(link_id)
            .map_err(program_error("take link of", link))?;

        tracing::info!(
            link,
            object = %self.object.display(),
            pin = %pin_path.display(),
            "counter attached at ingress"
        );
        Ok(Box::new(TcCounterLink {
            link: link.to_string(),
            tc_link,
        }))
    }
}
