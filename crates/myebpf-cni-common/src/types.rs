//! Domain primitive types used across the myebpf-cni workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{CONTAINER_IFNAME, HOST_LINK_ID_CHARS, HOST_LINK_PREFIX};

/// Identifier of the container being attached, as supplied by the runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    /// Creates a container ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the runtime supplied an empty identifier.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the host-side veth name derived from this ID.
    ///
    /// Uniqueness holds only while container IDs differ within their first
    /// [`HOST_LINK_ID_CHARS`] characters.
    #[must_use]
    pub fn host_link_name(&self) -> String {
        let suffix: String = self.0.chars().take(HOST_LINK_ID_CHARS).collect();
        format!("{HOST_LINK_PREFIX}{suffix}")
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Names of the two ends of a container's veth pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkNames {
    /// Interface inside the container namespace.
    pub container: String,
    /// Peer interface on the host.
    pub host: String,
}

impl LinkNames {
    /// Derives both link names for a container.
    #[must_use]
    pub fn for_container(id: &ContainerId) -> Self {
        Self {
            container: CONTAINER_IFNAME.to_string(),
            host: id.host_link_name(),
        }
    }
}

/// A veth pair that exists after a successful link creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPair {
    /// Names of both ends.
    pub names: LinkNames,
    /// Index of the container-side interface inside its namespace.
    pub container_index: u32,
}
