//! Network configuration model and resolution.
//!
//! The runtime hands the plugin a JSON network configuration on stdin.
//! [`resolve`] decodes it into an immutable [`AttachmentConfig`] with
//! defaults applied; [`resolve_lenient`] never fails and is used by `DEL`,
//! which must still attempt cleanup when the payload is unreadable.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{DEFAULT_CNI_VERSION, DEFAULT_PIN_ROOT, SUPPORTED_VERSIONS};
use crate::error::{ConfigError, Result};

/// Network configuration as written by the runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetConf {
    /// CNI version the runtime speaks.
    #[serde(default)]
    pub cni_version: Option<String>,
    /// Network name.
    #[serde(default)]
    pub name: String,
    /// Plugin type (binary name).
    #[serde(default, rename = "type")]
    pub plugin_type: String,
    /// Host bridge name; accepted but not used by the veth topology.
    #[serde(default)]
    pub bridge: Option<String>,
    /// Whether to attach the TC counter.
    #[serde(default)]
    pub attach_ebpf: Option<bool>,
    /// Directory under bpffs where the counter map is pinned.
    #[serde(default)]
    pub bpffs_path: Option<PathBuf>,
    /// Allocator configuration, forwarded verbatim.
    #[serde(default)]
    pub ipam: IpamConfig,
    /// Result of a previous ADD, supplied on `CHECK` and `DEL`.
    #[serde(default)]
    pub prev_result: Option<Value>,
}

/// Nested allocator configuration.
///
/// Only `type` is interpreted; every other key belongs to the allocator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpamConfig {
    /// Name of the allocator plugin binary.
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Allocator-specific settings.
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

/// Resolved configuration for one attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentConfig {
    /// CNI version results are encoded in.
    pub cni_version: String,
    /// Network name.
    pub name: String,
    /// Bridge name, if one was configured.
    pub bridge: Option<String>,
    /// Whether the TC counter is attached on ADD.
    pub attach_counter: bool,
    /// bpffs directory holding the pinned counter map.
    pub pin_root: PathBuf,
    /// Allocator configuration.
    pub ipam: IpamConfig,
}

impl AttachmentConfig {
    /// Returns the allocator plugin name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingIpamType`] if the configuration does not
    /// name an allocator.
    pub fn allocator_type(&self) -> Result<&str> {
        if self.ipam.kind.is_empty() {
            return Err(ConfigError::MissingIpamType);
        }
        Ok(&self.ipam.kind)
    }

    fn from_net_conf(conf: NetConf) -> Self {
        Self {
            cni_version: conf
                .cni_version
                .unwrap_or_else(|| DEFAULT_CNI_VERSION.to_string()),
            name: conf.name,
            bridge: conf.bridge.filter(|b| !b.is_empty()),
            attach_counter: conf.attach_ebpf.unwrap_or(true),
            pin_root: conf
                .bpffs_path
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PIN_ROOT)),
            ipam: conf.ipam,
        }
    }
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self::from_net_conf(NetConf::default())
    }
}

/// Returns whether `version` is accepted in configurations and results.
#[must_use]
pub fn is_supported_version(version: &str) -> bool {
    SUPPORTED_VERSIONS.contains(&version)
}

/// Decodes and validates a network configuration.
///
/// # Errors
///
/// Returns an error if the payload is not valid JSON of the expected shape
/// or declares an unsupported CNI version.
pub fn resolve(raw: &[u8]) -> Result<AttachmentConfig> {
    let conf: NetConf = serde_json::from_slice(raw)?;
    let config = AttachmentConfig::from_net_conf(conf);
    if !is_supported_version(&config.cni_version) {
        return Err(ConfigError::UnsupportedVersion {
            version: config.cni_version,
        });
    }
    tracing::debug!(
        network = %config.name,
        attach = config.attach_counter,
        pin_root = %config.pin_root.display(),
        "resolved network configuration"
    );
    Ok(config)
}

/// Decodes a network configuration, falling back to defaults on failure.
///
/// The version is not validated, so teardown still works for
/// configurations written by a newer runtime.
pub fn resolve_lenient(raw: &[u8]) -> AttachmentConfig {
    match serde_json::from_slice::<NetConf>(raw) {
        Ok(conf) => AttachmentConfig::from_net_conf(conf),
        Err(e) => {
            tracing::warn!(error = %e, "undecodable network configuration, using defaults");
            AttachmentConfig::default()
        }
    }
}
