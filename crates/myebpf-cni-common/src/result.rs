//! CNI result model and version encoding.
//!
//! Allocators may answer in any CNI result version. [`CniResult::decode`]
//! normalizes them into one in-memory shape; [`CniResult::encode`] writes
//! that shape back out in the version the runtime asked for.

use std::net::IpAddr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::is_supported_version;
use crate::constants::{DEFAULT_CNI_VERSION, LEGACY_RESULT_VERSIONS, SUPPORTED_VERSIONS};
use crate::error::{CniErrorCode, ConfigError};

/// An assigned address with its optional gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpConfig {
    /// Address and prefix length.
    pub address: IpNet,
    /// Gateway reachable through the interface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<IpAddr>,
    /// Index into [`CniResult::interfaces`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<usize>,
}

impl IpConfig {
    fn version_tag(&self) -> &'static str {
        match self.address {
            IpNet::V4(_) => "4",
            IpNet::V6(_) => "6",
        }
    }
}

/// A route the allocator wants installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Destination network.
    pub dst: IpNet,
    /// Next hop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gw: Option<IpAddr>,
}

/// DNS settings passed through from the allocator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dns {
    /// Name servers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nameservers: Vec<String>,
    /// Local domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Search domains.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search: Vec<String>,
    /// Resolver options.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Dns {
    /// Returns whether no DNS setting is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nameservers.is_empty()
            && self.domain.is_none()
            && self.search.is_empty()
            && self.options.is_empty()
    }
}

/// An interface created by the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    /// Interface name.
    pub name: String,
    /// Hardware address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    /// Namespace path, empty for host interfaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<String>,
}

/// Version-independent CNI result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CniResult {
    /// Version the result was decoded from.
    #[serde(default)]
    pub cni_version: String,
    /// Interfaces created by the plugin.
    #[serde(default)]
    pub interfaces: Vec<Interface>,
    /// Assigned addresses.
    #[serde(default)]
    pub ips: Vec<IpConfig>,
    /// Routes to install.
    #[serde(default)]
    pub routes: Vec<Route>,
    /// DNS settings.
    #[serde(default)]
    pub dns: Dns,
}

#[derive(Deserialize)]
struct LegacyResult {
    #[serde(default)]
    ip4: Option<LegacyIp>,
    #[serde(default)]
    ip6: Option<LegacyIp>,
    #[serde(default)]
    dns: Dns,
}

#[derive(Deserialize)]
struct LegacyIp {
    ip: IpNet,
    #[serde(default)]
    gateway: Option<IpAddr>,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Encoded<'a> {
    cni_version: &'a str,
    #[serde(skip_serializing_if = "is_empty_slice")]
    interfaces: &'a [Interface],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ips: Vec<EncodedIp<'a>>,
    #[serde(skip_serializing_if = "is_empty_slice")]
    routes: &'a [Route],
    #[serde(skip_serializing_if = "dns_is_empty")]
    dns: &'a Dns,
}

#[derive(Serialize)]
struct EncodedIp<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'static str>,
    #[serde(flatten)]
    ip: &'a IpConfig,
}

fn is_empty_slice<T>(items: &&[T]) -> bool {
    items.is_empty()
}

fn dns_is_empty(dns: &&Dns) -> bool {
    dns.is_empty()
}

impl CniResult {
    /// Decodes an allocator result of any known version.
    ///
    /// Legacy `0.1.0`/`0.2.0` results use `ip4`/`ip6` objects; they are
    /// converted so callers only see the `ips` layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload does not match the declared version's
    /// layout.
    pub fn decode(raw: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(raw)?;
        let version = value
            .get("cniVersion")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_CNI_VERSION)
            .to_string();

        if LEGACY_RESULT_VERSIONS.contains(&version.as_str()) {
            let legacy: LegacyResult = serde_json::from_value(value)?;
            return Ok(Self::from_legacy(version, legacy));
        }

        let mut result: Self = serde_json::from_value(value)?;
        result.cni_version = version;
        Ok(result)
    }

    fn from_legacy(version: String, legacy: LegacyResult) -> Self {
        let mut result = Self {
            cni_version: version,
            dns: legacy.dns,
            ..Self::default()
        };
        for ip in [legacy.ip4, legacy.ip6].into_iter().flatten() {
            result.ips.push(IpConfig {
                address: ip.ip,
                gateway: ip.gateway,
                interface: None,
            });
            result.routes.extend(ip.routes);
        }
        result
    }

    /// Encodes the result as JSON in the requested CNI version.
    ///
    /// Versions before `1.0.0` tag every address with its IP family.
    ///
    /// # Errors
    ///
    /// Returns an error if `version` is not supported.
    pub fn encode(&self, version: &str) -> Result<Value, ConfigError> {
        if !is_supported_version(version) {
            return Err(ConfigError::UnsupportedVersion {
                version: version.to_string(),
            });
        }
        let tag_family = version.starts_with("0.");
        let encoded = Encoded {
            cni_version: version,
            interfaces: &self.interfaces,
            ips: self
                .ips
                .iter()
                .map(|ip| EncodedIp {
                    version: tag_family.then(|| ip.version_tag()),
                    ip,
                })
                .collect(),
            routes: &self.routes,
            dns: &self.dns,
        };
        Ok(serde_json::to_value(encoded)?)
    }
}

/// Error object printed on stdout when a command fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CniErrorReply {
    /// Version of the reply.
    pub cni_version: String,
    /// Numeric error code.
    pub code: u32,
    /// Short message.
    pub msg: String,
    /// Longer description, typically the error chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl CniErrorReply {
    /// Builds an error reply.
    #[must_use]
    pub fn new(
        version: impl Into<String>,
        code: CniErrorCode,
        msg: impl Into<String>,
        details: Option<String>,
    ) -> Self {
        Self {
            cni_version: version.into(),
            code: code.as_u32(),
            msg: msg.into(),
            details,
        }
    }
}

/// Reply to the `VERSION` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionReply {
    /// Version of the reply itself.
    pub cni_version: &'static str,
    /// Versions accepted by this plugin.
    pub supported_versions: &'static [&'static str],
}

impl Default for VersionReply {
    fn default() -> Self {
        Self {
            cni_version: DEFAULT_CNI_VERSION,
            supported_versions: SUPPORTED_VERSIONS,
        }
    }
}
