//! Link fabric for hosts without Linux networking.

use std::net::IpAddr;
use std::path::Path;

use myebpf_cni_common::result::IpConfig;
use myebpf_cni_common::types::{LinkNames, LinkPair};

use super::LinkFabric;
use crate::error::{FabricError, Result};

/// Fabric that rejects every operation.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedFabric;

impl UnsupportedFabric {
    fn unsupported<T>(operation: &'static str) -> Result<T> {
        Err(FabricError::Unsupported {
            operation,
            os: std::env::consts::OS,
        })
    }
}

impl LinkFabric for UnsupportedFabric {
    fn create_pair(&self, _netns: &Path, _names: &LinkNames) -> Result<LinkPair> {
        Self::unsupported("veth creation")
    }

    fn configure_address(&self, _netns: &Path, _pair: &LinkPair, _ip: &IpConfig) -> Result<()> {
        Self::unsupported("address configuration")
    }

    fn configure_route(&self, _netns: &Path, _pair: &LinkPair, _gateway: IpAddr) -> Result<()> {
        Self::unsupported("route configuration")
    }

    fn host_link_index(&self, _host: &str) -> Result<Option<u32>> {
        Self::unsupported("link lookup")
    }

    fn bring_host_side_up(&self, _index: u32) -> Result<()> {
        Self::unsupported("link bring-up")
    }

    fn delete_pair(&self, _netns: &Path, _container: &str) -> Result<()> {
        Self::unsupported("veth deletion")
    }
}
