//! Kernel program definitions.
//!
//! [`CounterProgram`] is the load/pin/attach contract of the compiled
//! counter object: an ingress classifier named
//! [`INGRESS_PROGRAM_NAME`](myebpf_cni_common::constants::INGRESS_PROGRAM_NAME)
//! and an array map named
//! [`COUNTER_MAP_NAME`](myebpf_cni_common::constants::COUNTER_MAP_NAME).

#[cfg(all(target_os = "linux", feature = "ebpf"))]
pub mod counter;
pub mod unsupported;

use std::fmt;
use std::path::Path;

use crate::error::Result;

#[cfg(all(target_os = "linux", feature = "ebpf"))]
pub use counter::AyaCounterProgram;
pub use unsupported::UnsupportedCounter;

/// A live classifier attachment.
pub trait AttachmentHandle: fmt::Debug + Send {
    /// Removes the classifier from its link.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel refuses the detach request.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Loads the counter object and attaches it to a link.
pub trait CounterProgram {
    /// Loads the object, pins its counter map at `pin_path`, and attaches
    /// the ingress classifier to `link`.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. Nothing stays attached then.
    fn attach(&self, link: &str, pin_path: &Path) -> Result<Box<dyn AttachmentHandle>>;
}

/// Returns the counter program this build and host can run.
#[must_use]
pub fn default_program() -> Box<dyn CounterProgram> {
    #[cfg(all(target_os = "linux", feature = "ebpf"))]
    {
        Box::new(AyaCounterProgram::new())
    }
    #[cfg(not(all(target_os = "linux", feature = "ebpf")))]
    {
        Box::new(UnsupportedCounter)
    }
}

/// Returns whether [`default_program`] is backed by the kernel.
#[must_use]
pub const fn kernel_backed() -> bool {
    cfg!(all(target_os = "linux", feature = "ebpf"))
}
