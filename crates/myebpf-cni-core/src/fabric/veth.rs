//! rtnetlink-backed link fabric.
//!
//! Every netlink conversation runs on a throwaway current-thread runtime
//! created on the calling thread. The socket therefore binds to the
//! namespace the thread is in when the conversation starts, which is what
//! makes [`NetnsGuard`](crate::namespace::network::NetnsGuard) scoping work.

use std::future::Future;
use std::io;
use std::net::IpAddr;
use std::os::fd::AsRawFd;
use std::path::Path;

use futures::TryStreamExt;
use myebpf_cni_common::result::IpConfig;
use myebpf_cni_common::types::{LinkNames, LinkPair};
use nix::errno::Errno;
use rtnetlink::Handle;

use super::LinkFabric;
use crate::error::{FabricError, Result};
use crate::namespace::network;

/// Link fabric that configures links through rtnetlink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetlinkFabric;

impl NetlinkFabric {
    /// Creates the fabric.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn netlink_error(operation: &'static str) -> impl FnOnce(rtnetlink::Error) -> FabricError {
    move |e| FabricError::Netlink {
        operation,
        source: Box::new(e),
    }
}

fn with_netlink<T, F, Fut>(f: F) -> Result<T>
where
    F: FnOnce(Handle) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()
        .map_err(|source| FabricError::Connection { source })?;
    runtime.block_on(async {
        let (connection, handle, _) =
            rtnetlink::new_connection().map_err(|source| FabricError::Connection { source })?;
        let driver = tokio::spawn(connection);
        let result = f(handle).await;
        driver.abort();
        result
    })
}

async fn link_index(handle: &Handle, name: &str) -> Result<Option<u32>> {
    let mut links = handle.link().get().match_name(name.to_string()).execute();
    match links.try_next().await {
        Ok(found) => Ok(found.map(|link| link.header.index)),
        Err(rtnetlink::Error::NetlinkError(message))
            if message.raw_code() == -(Errno::ENODEV as i32) =>
        {
            Ok(None)
        }
        Err(e) => Err(netlink_error("link lookup")(e)),
    }
}

async fn require_link(handle: &Handle, name: &str) -> Result<u32> {
    link_index(handle, name)
        .await?
        .ok_or_else(|| FabricError::LinkNotFound {
            name: name.to_string(),
        })
}

impl LinkFabric for NetlinkFabric {
    fn create_pair(&self, netns: &Path, names: &LinkNames) -> Result<LinkPair> {
        network::run_in(netns, |guard| {
            let host_netns = guard.origin().as_raw_fd();
            with_netlink(|handle| async move {
                handle
                    .link()
                    .add()
                    .veth(names.container.clone(), names.host.clone())
                    .execute()
                    .await
                    .map_err(netlink_error("veth add"))?;

                let container_index = require_link(&handle, &names.container).await?;
                handle
                    .link()
                    .set(container_index)
                    .up()
                    .execute()
                    .await
                    .map_err(netlink_error("link up"))?;

                // The peer is created next to the primary end.
                let host_index = require_link(&handle, &names.host).await?;
                handle
                    .link()
                    .set(host_index)
                    .setns_by_fd(host_netns)
                    .execute()
                    .await
                    .map_err(netlink_error("link namespace move"))?;

                tracing::info!(
                    container = %names.container,
                    host = %names.host,
                    "veth pair created"
                );
                Ok(LinkPair {
                    names: names.clone(),
                    container_index,
                })
            })
        })
    }

    fn configure_address(&self, netns: &Path, pair: &LinkPair, ip: &IpConfig) -> Result<()> {
        network::run_in(netns, |_| {
            with_netlink(|handle| async move {
                handle
                    .address()
                    .add(pair.container_index, ip.address.addr(), ip.address.prefix_len())
                    .execute()
                    .await
                    .map_err(netlink_error("address add"))?;
                tracing::info!(
                    link = %pair.names.container,
                    address = %ip.address,
                    "address assigned"
                );
                Ok(())
            })
        })
    }

    fn configure_route(&self, netns: &Path, pair: &LinkPair, gateway: IpAddr) -> Result<()> {
        network::run_in(netns, |_| {
            with_netlink(|handle| async move {
                let request = handle.route().add();
                let added = match gateway {
                    IpAddr::V4(gw) => {
                        request
                            .v4()
                            .output_interface(pair.container_index)
                            .gateway(gw)
                            .execute()
                            .await
                    }
                    IpAddr::V6(gw) => {
                        request
                            .v6()
                            .output_interface(pair.container_index)
                            .gateway(gw)
                            .execute()
                            .await
                    }
                };
                added.map_err(netlink_error("route add"))?;
                tracing::info!(link = %pair.names.container, %gateway, "default route installed");
                Ok(())
            })
        })
    }

    fn host_link_index(&self, host: &str) -> Result<Option<u32>> {
        with_netlink(|handle| async move {
            let index = link_index(&handle, host).await?;
            if index.is_none() {
                tracing::debug!(link = host, "host-side link not present");
            }
            Ok(index)
        })
    }

    fn bring_host_side_up(&self, index: u32) -> Result<()> {
        with_netlink(|handle| async move {
            handle
                .link()
                .set(index)
                .up()
                .execute()
                .await
                .map_err(netlink_error("link up"))?;
            tracing::debug!(index, "host-side link up");
            Ok(())
        })
    }

    fn delete_pair(&self, netns: &Path, container: &str) -> Result<()> {
        let deleted = network::run_in(netns, |_| {
            with_netlink(|handle| async move {
                let Some(index) = link_index(&handle, container).await? else {
                    tracing::debug!(link = container, "container link already gone");
                    return Ok(());
                };
                handle
                    .link()
                    .del(index)
                    .execute()
                    .await
                    .map_err(netlink_error("link delete"))?;
                tracing::info!(link = container, "veth pair deleted");
                Ok(())
            })
        });
        match deleted {
            Err(FabricError::OpenNamespace { path, source })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                tracing::debug!(netns = %path.display(), "namespace already gone");
                Ok(())
            }
            other => other,
        }
    }
}
