//! Lifecycle tests against in-memory collaborators.
//!
//! The allocator, link fabric, and counter program are replaced by fakes
//! that record every call, so rollback and teardown can be checked without
//! touching the kernel.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::{Cell, RefCell};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use myebpf_cni_common::error::CniErrorCode;
use myebpf_cni_common::result::{CniResult, IpConfig};
use myebpf_cni_common::types::{ContainerId, LinkNames, LinkPair};
use myebpf_cni_core::error::FabricError;
use myebpf_cni_core::fabric::LinkFabric;
use myebpf_cni_ebpf::error::CounterError;
use myebpf_cni_ebpf::programs::{AttachmentHandle, CounterProgram};
use myebpf_cni_ebpf::registry::AttachmentRegistry;
use myebpf_cni_runtime::error::PluginError;
use myebpf_cni_runtime::invocation::Invocation;
use myebpf_cni_runtime::ipam::{AllocationError, Allocator};
use myebpf_cni_runtime::lifecycle::AttachmentLifecycle;

// ── Fakes ────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeAllocator {
    ips: Vec<(&'static str, Option<&'static str>)>,
    fail: bool,
    adds: Cell<usize>,
    dels: Cell<usize>,
}

impl FakeAllocator {
    fn with_ips(ips: Vec<(&'static str, Option<&'static str>)>) -> Self {
        Self {
            ips,
            ..Self::default()
        }
    }
}

impl Allocator for FakeAllocator {
    fn add(&self, plugin: &str, _invocation: &Invocation) -> Result<CniResult, AllocationError> {
        self.adds.set(self.adds.get() + 1);
        if self.fail {
            return Err(AllocationError::Reported {
                plugin: plugin.to_string(),
                code: 11,
                msg: "no addresses left".into(),
                details: None,
            });
        }
        Ok(CniResult {
            cni_version: "1.0.0".into(),
            ips: self
                .ips
                .iter()
                .map(|(address, gateway)| IpConfig {
                    address: address.parse().unwrap(),
                    gateway: gateway.map(|g| g.parse().unwrap()),
                    interface: None,
                })
                .collect(),
            ..CniResult::default()
        })
    }

    fn del(&self, _plugin: &str, _invocation: &Invocation) -> Result<(), AllocationError> {
        self.dels.set(self.dels.get() + 1);
        Ok(())
    }
}

#[derive(Default)]
struct FakeFabric {
    fail_create: bool,
    fail_address: bool,
    fail_route: bool,
    host_missing: bool,
    fail_up: bool,
    fail_delete: bool,
    calls: RefCell<Vec<String>>,
}

impl FakeFabric {
    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn netlink_failure(operation: &'static str) -> FabricError {
        FabricError::Netlink {
            operation,
            source: "operation not permitted".into(),
        }
    }
}

impl LinkFabric for FakeFabric {
    fn create_pair(
        &self,
        _netns: &Path,
        names: &LinkNames,
    ) -> myebpf_cni_core::error::Result<LinkPair> {
        self.record(format!("create {} {}", names.container, names.host));
        if self.fail_create {
            return Err(Self::netlink_failure("add veth"));
        }
        Ok(LinkPair {
            names: names.clone(),
            container_index: 2,
        })
    }

    fn configure_address(
        &self,
        _netns: &Path,
        pair: &LinkPair,
        ip: &IpConfig,
    ) -> myebpf_cni_core::error::Result<()> {
        self.record(format!("address {} {}", pair.names.container, ip.address));
        if self.fail_address {
            return Err(Self::netlink_failure("add address"));
        }
        Ok(())
    }

    fn configure_route(
        &self,
        _netns: &Path,
        _pair: &LinkPair,
        gateway: IpAddr,
    ) -> myebpf_cni_core::error::Result<()> {
        self.record(format!("route {gateway}"));
        if self.fail_route {
            return Err(Self::netlink_failure("add route"));
        }
        Ok(())
    }

    fn host_link_index(&self, host: &str) -> myebpf_cni_core::error::Result<Option<u32>> {
        self.record(format!("lookup {host}"));
        Ok((!self.host_missing).then_some(7))
    }

    fn bring_host_side_up(&self, index: u32) -> myebpf_cni_core::error::Result<()> {
        self.record(format!("up {index}"));
        if self.fail_up {
            return Err(Self::netlink_failure("link up"));
        }
        Ok(())
    }

    fn delete_pair(&self, _netns: &Path, container: &str) -> myebpf_cni_core::error::Result<()> {
        self.record(format!("delete {container}"));
        if self.fail_delete {
            return Err(FabricError::LinkNotFound {
                name: container.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
struct FakeHandle(Arc<AtomicUsize>);

impl AttachmentHandle for FakeHandle {
    fn close(self: Box<Self>) -> myebpf_cni_ebpf::error::Result<()> {
        let _ = self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct FakeProgram {
    fail: bool,
    attached: RefCell<Vec<(String, PathBuf)>>,
    closed: Arc<AtomicUsize>,
}

impl CounterProgram for FakeProgram {
    fn attach(
        &self,
        link: &str,
        pin_path: &Path,
    ) -> myebpf_cni_ebpf::error::Result<Box<dyn AttachmentHandle>> {
        self.attached
            .borrow_mut()
            .push((link.to_string(), pin_path.to_path_buf()));
        if self.fail {
            return Err(CounterError::MissingProgram { name: "tc_ingress" });
        }
        Ok(Box::new(FakeHandle(Arc::clone(&self.closed))))
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────

fn payload(pin_root: &Path, attach: bool) -> Vec<u8> {
    serde_json::json!({
        "cniVersion": "1.0.0",
        "name": "testnet",
        "type": "myebpf-cni",
        "bridge": "cni0",
        "attachEbpf": attach,
        "bpffsPath": pin_root,
        "ipam": { "type": "host-local", "subnet": "10.0.0.0/24" }
    })
    .to_string()
    .into_bytes()
}

fn invocation(pin_root: &Path) -> Invocation {
    Invocation {
        container_id: ContainerId::new("abcdef0123456789"),
        netns: PathBuf::from("/var/run/netns/test"),
        ifname: "eth0".into(),
        payload: payload(pin_root, true),
        ..Invocation::default()
    }
}

// ── ADD ──────────────────────────────────────────────────────────────

#[test]
fn add_configures_first_address_and_attaches_counter() {
    let dir = tempfile::tempdir().unwrap();
    let pin_root = dir.path().join("bpf");
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", Some("10.0.0.1"))]);
    let fabric = FakeFabric::default();
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);
    let inv = invocation(&pin_root);

    let result = lifecycle.add(&inv).unwrap();

    assert_eq!(result.cni_version, "1.0.0");
    assert_eq!(result.interfaces.len(), 1);
    assert_eq!(result.interfaces[0].name, "eth0");
    assert_eq!(result.interfaces[0].sandbox.as_deref(), Some("/var/run/netns/test"));
    assert_eq!(result.ips.len(), 1);
    assert_eq!(result.ips[0].address.to_string(), "10.0.0.5/24");
    assert_eq!(result.ips[0].interface, Some(0));

    assert_eq!(
        fabric.calls(),
        vec![
            "create eth0 vethabcde",
            "address eth0 10.0.0.5/24",
            "route 10.0.0.1",
            "lookup vethabcde",
            "up 7",
        ]
    );
    assert_eq!(
        program.attached.borrow()[0],
        ("vethabcde".to_string(), pin_root.join("counter"))
    );
    assert!(pin_root.is_dir());
    assert!(registry.contains("vethabcde"));
    assert_eq!(allocator.dels.get(), 0);
}

#[test]
fn add_result_encodes_for_requested_version() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", Some("10.0.0.1"))]);
    let fabric = FakeFabric::default();
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);
    let inv = invocation(dir.path());

    let encoded = lifecycle.add(&inv).unwrap().encode("1.0.0").unwrap();

    assert_eq!(encoded["cniVersion"], "1.0.0");
    assert_eq!(encoded["interfaces"][0]["name"], "eth0");
    assert_eq!(encoded["ips"][0]["address"], "10.0.0.5/24");
    assert_eq!(encoded["ips"][0]["gateway"], "10.0.0.1");
    assert_eq!(encoded["ips"][0]["interface"], 0);
}

#[test]
fn add_configures_only_the_first_of_several_addresses() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", None), ("fd00::5/64", None)]);
    let fabric = FakeFabric::default();
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);

    let result = lifecycle.add(&invocation(dir.path())).unwrap();

    assert_eq!(result.ips.len(), 2);
    assert!(result.ips.iter().all(|ip| ip.interface == Some(0)));
    let addressed: Vec<_> = fabric
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("address"))
        .collect();
    assert_eq!(addressed, vec!["address eth0 10.0.0.5/24"]);
}

#[test]
fn add_without_gateway_skips_route() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", None)]);
    let fabric = FakeFabric::default();
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);

    let _ = lifecycle.add(&invocation(dir.path())).unwrap();

    assert!(!fabric.calls().iter().any(|c| c.starts_with("route")));
}

#[test]
fn route_failure_does_not_fail_add() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", Some("10.0.0.1"))]);
    let fabric = FakeFabric {
        fail_route: true,
        ..FakeFabric::default()
    };
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);

    assert!(lifecycle.add(&invocation(dir.path())).is_ok());
    assert_eq!(allocator.dels.get(), 0);
    assert!(registry.contains("vethabcde"));
}

#[test]
fn link_fabric_failure_releases_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", None)]);
    let fabric = FakeFabric {
        fail_create: true,
        ..FakeFabric::default()
    };
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);

    let err = lifecycle.add(&invocation(dir.path())).unwrap_err();

    assert!(matches!(err, PluginError::LinkFabric { stage: "create veth pair", .. }));
    assert_eq!(err.code(), CniErrorCode::LinkFabricFailed);
    assert_eq!(allocator.dels.get(), 1);
    assert!(program.attached.borrow().is_empty());
    assert!(registry.is_empty());
}

#[test]
fn address_failure_releases_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", None)]);
    let fabric = FakeFabric {
        fail_address: true,
        ..FakeFabric::default()
    };
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);

    let err = lifecycle.add(&invocation(dir.path())).unwrap_err();

    assert!(matches!(err, PluginError::LinkFabric { stage: "configure address", .. }));
    assert_eq!(allocator.dels.get(), 1);
}

#[test]
fn attach_failure_releases_exactly_once_and_records_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", None)]);
    let fabric = FakeFabric::default();
    let program = FakeProgram {
        fail: true,
        ..FakeProgram::default()
    };
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);

    let err = lifecycle.add(&invocation(dir.path())).unwrap_err();

    assert!(matches!(err, PluginError::Attach { ref link, .. } if link == "vethabcde"));
    assert_eq!(err.code(), CniErrorCode::AttachFailed);
    assert_eq!(allocator.dels.get(), 1);
    assert!(!registry.contains("vethabcde"));
}

#[test]
fn empty_allocation_is_released_and_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::default();
    let fabric = FakeFabric::default();
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);

    let err = lifecycle.add(&invocation(dir.path())).unwrap_err();

    assert!(matches!(err, PluginError::EmptyAllocation { .. }));
    assert_eq!(err.code(), CniErrorCode::EmptyAllocation);
    assert_eq!(allocator.dels.get(), 1);
    assert!(fabric.calls().is_empty());
    assert!(program.attached.borrow().is_empty());
}

#[test]
fn allocation_failure_has_nothing_to_release() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator {
        fail: true,
        ..FakeAllocator::default()
    };
    let fabric = FakeFabric::default();
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);

    let err = lifecycle.add(&invocation(dir.path())).unwrap_err();

    assert_eq!(err.code(), CniErrorCode::AllocationFailed);
    assert_eq!(allocator.dels.get(), 0);
    assert!(fabric.calls().is_empty());
}

#[test]
fn missing_host_link_skips_counter() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", None)]);
    let fabric = FakeFabric {
        host_missing: true,
        ..FakeFabric::default()
    };
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);

    assert!(lifecycle.add(&invocation(dir.path())).is_ok());
    assert!(program.attached.borrow().is_empty());
    assert!(registry.is_empty());
}

#[test]
fn host_link_bring_up_failure_still_attaches_counter() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", None)]);
    let fabric = FakeFabric {
        fail_up: true,
        ..FakeFabric::default()
    };
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);

    assert!(lifecycle.add(&invocation(dir.path())).is_ok());

    assert!(fabric.calls().contains(&"up 7".to_string()));
    assert_eq!(program.attached.borrow().len(), 1);
    assert!(registry.contains("vethabcde"));
    assert_eq!(allocator.dels.get(), 0);
}

#[test]
fn missing_host_link_is_not_brought_up() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", None)]);
    let fabric = FakeFabric {
        host_missing: true,
        ..FakeFabric::default()
    };
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);

    assert!(lifecycle.add(&invocation(dir.path())).is_ok());
    assert!(!fabric.calls().iter().any(|c| c.starts_with("up")));
}

#[test]
fn disabled_counter_is_not_attached() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", None)]);
    let fabric = FakeFabric::default();
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);
    let inv = Invocation {
        payload: payload(dir.path(), false),
        ..invocation(dir.path())
    };

    assert!(lifecycle.add(&inv).is_ok());
    assert!(program.attached.borrow().is_empty());
    assert!(fabric.calls().contains(&"up 7".to_string()));
}

#[test]
fn invalid_configuration_fails_before_side_effects() {
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", None)]);
    let fabric = FakeFabric::default();
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);
    let inv = Invocation {
        payload: b"{not json".to_vec(),
        ..invocation(Path::new("/unused"))
    };

    let err = lifecycle.add(&inv).unwrap_err();

    assert_eq!(err.code(), CniErrorCode::DecodingFailure);
    assert_eq!(allocator.adds.get(), 0);
    assert!(fabric.calls().is_empty());
}

#[test]
fn unsupported_version_is_rejected() {
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", None)]);
    let fabric = FakeFabric::default();
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);
    let inv = Invocation {
        payload: br#"{"cniVersion":"9.9.9","name":"n","type":"myebpf-cni","ipam":{"type":"host-local"}}"#
            .to_vec(),
        ..invocation(Path::new("/unused"))
    };

    let err = lifecycle.add(&inv).unwrap_err();

    assert_eq!(err.code(), CniErrorCode::IncompatibleVersion);
    assert_eq!(allocator.adds.get(), 0);
}

#[test]
fn empty_container_id_is_an_invocation_error() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", None)]);
    let fabric = FakeFabric::default();
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);
    let inv = Invocation {
        container_id: ContainerId::new(""),
        ..invocation(dir.path())
    };

    let err = lifecycle.add(&inv).unwrap_err();

    assert_eq!(err.code(), CniErrorCode::InvalidEnvironment);
    assert_eq!(allocator.adds.get(), 0);
}

#[test]
fn second_add_replaces_prior_attachment() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", None)]);
    let fabric = FakeFabric::default();
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);
    let inv = invocation(dir.path());

    let _ = lifecycle.add(&inv).unwrap();
    let _ = lifecycle.add(&inv).unwrap();

    assert_eq!(program.attached.borrow().len(), 2);
    assert_eq!(program.closed.load(Ordering::SeqCst), 1);
    assert_eq!(registry.len(), 1);
}

// ── DEL ──────────────────────────────────────────────────────────────

#[test]
fn del_after_add_detaches_and_deletes() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", None)]);
    let fabric = FakeFabric::default();
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);
    let inv = invocation(dir.path());

    let _ = lifecycle.add(&inv).unwrap();
    lifecycle.del(&inv);

    assert_eq!(allocator.dels.get(), 1);
    assert_eq!(program.closed.load(Ordering::SeqCst), 1);
    assert!(registry.is_empty());
    assert_eq!(fabric.calls().last().map(String::as_str), Some("delete eth0"));
}

#[test]
fn del_twice_succeeds_and_leaves_no_record() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::with_ips(vec![("10.0.0.5/24", None)]);
    let fabric = FakeFabric::default();
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);
    let inv = invocation(dir.path());

    let _ = lifecycle.add(&inv).unwrap();
    lifecycle.del(&inv);
    lifecycle.del(&inv);

    assert!(registry.is_empty());
    assert_eq!(program.closed.load(Ordering::SeqCst), 1);
    assert_eq!(allocator.dels.get(), 2);
}

#[test]
fn del_without_add_only_releases() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::default();
    let fabric = FakeFabric::default();
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);
    let inv = Invocation {
        netns: PathBuf::new(),
        ..invocation(dir.path())
    };

    lifecycle.del(&inv);

    assert_eq!(allocator.dels.get(), 1);
    assert_eq!(allocator.adds.get(), 0);
    assert!(fabric.calls().is_empty());
    assert!(program.attached.borrow().is_empty());
    assert_eq!(program.closed.load(Ordering::SeqCst), 0);
}

#[test]
fn del_tolerates_link_deletion_failure() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::default();
    let fabric = FakeFabric {
        fail_delete: true,
        ..FakeFabric::default()
    };
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);

    lifecycle.del(&invocation(dir.path()));

    assert_eq!(fabric.calls(), vec!["delete eth0"]);
    assert_eq!(allocator.dels.get(), 1);
}

#[test]
fn del_with_garbage_configuration_still_tears_down() {
    let dir = tempfile::tempdir().unwrap();
    let allocator = FakeAllocator::default();
    let fabric = FakeFabric::default();
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);
    let inv = Invocation {
        payload: b"garbage".to_vec(),
        ..invocation(dir.path())
    };

    lifecycle.del(&inv);

    assert_eq!(allocator.dels.get(), 0);
    assert_eq!(fabric.calls(), vec!["delete eth0"]);
}

// ── CHECK ────────────────────────────────────────────────────────────

#[test]
fn check_succeeds_without_side_effects() {
    let allocator = FakeAllocator::default();
    let fabric = FakeFabric::default();
    let program = FakeProgram::default();
    let registry = AttachmentRegistry::new();
    let lifecycle = AttachmentLifecycle::new(&allocator, &fabric, &program, &registry);

    lifecycle.check(&Invocation::default());

    assert_eq!(allocator.adds.get() + allocator.dels.get(), 0);
    assert!(fabric.calls().is_empty());
}
