//! Veth pair management across the container and host namespaces.
//!
//! [`LinkFabric`] is the seam between the attachment lifecycle and the
//! kernel. The Linux variant talks rtnetlink; the unsupported variant fails
//! every operation with [`FabricError::Unsupported`].

pub mod unsupported;
#[cfg(target_os = "linux")]
pub mod veth;

use std::net::IpAddr;
use std::path::Path;

use myebpf_cni_common::result::IpConfig;
use myebpf_cni_common::types::{LinkNames, LinkPair};

use crate::error::Result;

pub use unsupported::UnsupportedFabric;
#[cfg(target_os = "linux")]
pub use veth::NetlinkFabric;

/// Creates, configures, and removes the link pair of one container.
pub trait LinkFabric {
    /// Creates the veth pair inside `netns` and moves the host end out.
    ///
    /// On success the container end is up and the host end exists, still
    /// down, in the caller's namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace cannot be entered or any link
    /// request fails. A partially created pair is left in place.
    fn create_pair(&self, netns: &Path, names: &LinkNames) -> Result<LinkPair>;

    /// Assigns `ip` to the container end of `pair`.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace cannot be entered or the address
    /// cannot be added.
    fn configure_address(&self, netns: &Path, pair: &LinkPair, ip: &IpConfig) -> Result<()>;

    /// Installs a default route via `gateway` on the container end.
    ///
    /// # Errors
    ///
    /// Returns an error if the route cannot be added, including when an
    /// equivalent route already exists.
    fn configure_route(&self, netns: &Path, pair: &LinkPair, gateway: IpAddr) -> Result<()>;

    /// Looks up the host end in the caller's namespace.
    ///
    /// Returns its index, or `None` if no link has that name.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup request itself fails.
    fn host_link_index(&self, host: &str) -> Result<Option<u32>>;

    /// Sets the host end with index `index` up.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be set up.
    fn bring_host_side_up(&self, index: u32) -> Result<()>;

    /// Deletes the container end inside `netns`, which removes its peer.
    ///
    /// A missing namespace or link is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace exists but cannot be entered, or
    /// the deletion request fails.
    fn delete_pair(&self, netns: &Path, container: &str) -> Result<()>;
}
