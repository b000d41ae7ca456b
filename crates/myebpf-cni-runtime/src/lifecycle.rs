//! Attachment lifecycle that orchestrates one plugin command.

use myebpf_cni_common::config;
use myebpf_cni_common::constants::CONTAINER_IFNAME;
use myebpf_cni_common::result::{CniResult, Interface};
use myebpf_cni_common::types::LinkNames;
use myebpf_cni_core::fabric::LinkFabric;
use myebpf_cni_ebpf::attach::CounterAttachment;
use myebpf_cni_ebpf::programs::CounterProgram;
use myebpf_cni_ebpf::registry::AttachmentRegistry;

use crate::best_effort::best_effort;
use crate::error::{PluginError, fabric_stage};
use crate::invocation::Invocation;
use crate::ipam::{AddressCoordinator, Allocator};

/// Sequences allocation, link setup, and counter attachment.
///
/// `ADD` either returns a result with the allocation kept, or an error with
/// the allocation released exactly once. `DEL` never fails.
pub struct AttachmentLifecycle<'a> {
    addresses: AddressCoordinator<'a>,
    fabric: &'a dyn LinkFabric,
    counter: CounterAttachment<'a>,
}

impl<'a> AttachmentLifecycle<'a> {
    /// Creates a lifecycle over the given collaborators.
    pub fn new(
        allocator: &'a dyn Allocator,
        fabric: &'a dyn LinkFabric,
        program: &'a dyn CounterProgram,
        registry: &'a AttachmentRegistry,
    ) -> Self {
        Self {
            addresses: AddressCoordinator::new(allocator),
            fabric,
            counter: CounterAttachment::new(program, registry),
        }
    }

    /// Attaches the container to the network.
    ///
    /// Only the first allocated address is configured on `eth0`; the rest
    /// are reported but left unconfigured. A partially created veth pair is
    /// left in place for `DEL` to remove.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, allocation fails,
    /// the link pair cannot be set up, or the counter cannot be attached.
    pub fn add(&self, invocation: &Invocation) -> Result<CniResult, PluginError> {
        let conf = config::resolve(&invocation.payload)?;
        invocation.require_attachable()?;
        let plugin = conf.allocator_type()?;
        tracing::debug!(
            container = %invocation.container_id,
            network = %conf.name,
            bridge = conf.bridge.as_deref().unwrap_or_default(),
            "starting ADD"
        );

        let pending = self.addresses.allocate(plugin, invocation)?;
        let primary = pending.primary().cloned().ok_or_else(|| PluginError::EmptyAllocation {
            plugin: plugin.to_string(),
        })?;
        if pending.result().ips.len() > 1 {
            tracing::debug!(
                extra = pending.result().ips.len() - 1,
                "only the first address is configured"
            );
        }

        let names = LinkNames::for_container(&invocation.container_id);
        let pair = self
            .fabric
            .create_pair(&invocation.netns, &names)
            .map_err(fabric_stage("create veth pair"))?;
        self.fabric
            .configure_address(&invocation.netns, &pair, &primary)
            .map_err(fabric_stage("configure address"))?;
        if let Some(gateway) = primary.gateway {
            let _ = best_effort("install default route", || {
                self.fabric.configure_route(&invocation.netns, &pair, gateway)
            });
        }

        // Attachment depends on finding the peer, not on bringing it up.
        let host_index = best_effort("look up host link", || {
            self.fabric.host_link_index(&names.host)
        })
        .flatten();
        if let Some(index) = host_index {
            let _ = best_effort("bring host link up", || self.fabric.bring_host_side_up(index));
        }

        match host_index {
            Some(index) if conf.attach_counter => {
                self.counter
                    .attach(&names.host, &conf.pin_root)
                    .map_err(|source| PluginError::Attach {
                        link: names.host.clone(),
                        source,
                    })?;
                tracing::info!(link = %names.host, index, "counter attached");
            }
            Some(_) => tracing::debug!(link = %names.host, "counter disabled by configuration"),
            None => tracing::warn!(link = %names.host, "host link not found, counter not attached"),
        }

        let mut result = pending.commit();
        result.cni_version = conf.cni_version;
        result.interfaces = vec![Interface {
            name: CONTAINER_IFNAME.to_string(),
            mac: None,
            sandbox: Some(invocation.netns.display().to_string()),
        }];
        for ip in &mut result.ips {
            ip.interface = Some(0);
        }
        tracing::info!(
            container = %invocation.container_id,
            host = %names.host,
            address = %primary.address,
            "container attached"
        );
        Ok(result)
    }

    /// Detaches the container, tolerating anything already gone.
    ///
    /// Every step is attempted regardless of earlier failures.
    pub fn del(&self, invocation: &Invocation) {
        let conf = config::resolve_lenient(&invocation.payload);
        match conf.allocator_type() {
            Ok(plugin) => self.addresses.release(plugin, invocation),
            Err(e) => tracing::warn!(error = %e, "skipping allocation release"),
        }

        let names = LinkNames::for_container(&invocation.container_id);
        let _ = best_effort("detach counter", || self.counter.detach(&names.host));

        if invocation.netns.as_os_str().is_empty() {
            tracing::debug!("no namespace given, skipping link deletion");
        } else {
            let _ = best_effort("delete veth pair", || {
                self.fabric.delete_pair(&invocation.netns, &names.container)
            });
        }
        tracing::info!(container = %invocation.container_id, "container detached");
    }

    /// Reports success without verifying the attachment.
    pub fn check(&self, invocation: &Invocation) {
        tracing::debug!(container = %invocation.container_id, "CHECK is a no-op");
    }
}
