//! Platform selection for the attachment lifecycle.
//!
//! Linux hosts get the rtnetlink fabric and, when built with the `ebpf`
//! feature, the aya counter. Everything else gets the unsupported variants,
//! which fail each operation with an unsupported-platform error.

use std::path::PathBuf;

use myebpf_cni_common::constants::COUNTER_OBJECT_PATH;
use myebpf_cni_core::fabric::LinkFabric;
use myebpf_cni_ebpf::programs::{self, CounterProgram};

/// The kernel-facing halves of the lifecycle for this host.
pub struct Platform {
    /// Veth fabric.
    pub fabric: Box<dyn LinkFabric>,
    /// Counter program.
    pub counter: Box<dyn CounterProgram>,
}

/// Picks the fabric and counter program for the current platform.
#[must_use]
pub fn detect_platform() -> Platform {
    Platform {
        fabric: detect_fabric(),
        counter: programs::default_program(),
    }
}

fn detect_fabric() -> Box<dyn LinkFabric> {
    #[cfg(target_os = "linux")]
    {
        Box::new(myebpf_cni_core::fabric::NetlinkFabric::new())
    }
    #[cfg(not(target_os = "linux"))]
    {
        Box::new(myebpf_cni_core::fabric::UnsupportedFabric)
    }
}

/// Information about the current platform and what it can attach.
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    /// Host operating system name.
    pub os: String,
    /// Host CPU architecture.
    pub arch: String,
    /// Whether veth pairs can be created.
    pub netlink_available: bool,
    /// Whether the counter is backed by the kernel.
    pub ebpf_available: bool,
    /// Where the counter object is loaded from.
    pub object_path: PathBuf,
    /// Whether the counter object exists.
    pub object_present: bool,
}

/// Returns information about the current platform.
#[must_use]
pub fn platform_info() -> PlatformInfo {
    let object_path = PathBuf::from(COUNTER_OBJECT_PATH);
    PlatformInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        netlink_available: cfg!(target_os = "linux"),
        ebpf_available: programs::kernel_backed(),
        object_present: object_path.is_file(),
        object_path,
    }
}
