//! System-wide constants and default paths.

/// Default bpffs directory under which the counter map is pinned.
pub const DEFAULT_PIN_ROOT: &str = "/sys/fs/bpf/myebpf-cni";

/// File name of the pinned counter map inside the pin root.
pub const COUNTER_PIN_NAME: &str = "counter";

/// Name of the TC ingress program inside the compiled object.
pub const INGRESS_PROGRAM_NAME: &str = "tc_ingress";

/// Name of the counter map inside the compiled object.
pub const COUNTER_MAP_NAME: &str = "counter";

/// Location of the compiled counter object, fixed at build time.
///
/// Override with the `MYEBPF_CNI_OBJECT` environment variable when building.
pub const COUNTER_OBJECT_PATH: &str = match option_env!("MYEBPF_CNI_OBJECT") {
    Some(path) => path,
    None => "/opt/cni/lib/myebpf-cni/tc_counter.o",
};

/// Name of the interface created inside the container namespace.
pub const CONTAINER_IFNAME: &str = "eth0";

/// Prefix of the host-side veth name.
pub const HOST_LINK_PREFIX: &str = "veth";

/// Number of container ID characters appended to [`HOST_LINK_PREFIX`].
pub const HOST_LINK_ID_CHARS: usize = 5;

/// CNI version used when the configuration does not declare one.
pub const DEFAULT_CNI_VERSION: &str = "1.0.0";

/// CNI versions accepted in network configurations and emitted in results.
pub const SUPPORTED_VERSIONS: &[&str] = &["0.3.0", "0.3.1", "0.4.0", "1.0.0"];

/// Pre-0.3 result versions that allocators may still emit.
pub const LEGACY_RESULT_VERSIONS: &[&str] = &["0.1.0", "0.2.0"];

/// Command name of the plugin binary, as shown in `--help`.
pub const PLUGIN_NAME: &str = "myebpf-cni";
