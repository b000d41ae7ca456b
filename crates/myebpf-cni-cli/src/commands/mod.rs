//! CNI command decoding and dispatch.

pub mod add;
pub mod check;
pub mod del;
pub mod version;

use std::io::{self, Read, Write};

use clap::{Parser, ValueEnum};
use myebpf_cni_common::config;
use myebpf_cni_common::constants::{DEFAULT_CNI_VERSION, PLUGIN_NAME};
use myebpf_cni_common::types::ContainerId;
use myebpf_cni_ebpf::registry::AttachmentRegistry;
use myebpf_cni_runtime::backend;
use myebpf_cni_runtime::error::PluginError;
use myebpf_cni_runtime::invocation::Invocation;
use myebpf_cni_runtime::ipam::ExecAllocator;
use myebpf_cni_runtime::lifecycle::AttachmentLifecycle;

use crate::output;

/// myebpf-cni: veth attachment with a TC ingress packet counter.
///
/// Every option is normally supplied by the container runtime through the
/// matching `CNI_*` environment variable.
#[derive(Parser, Debug)]
#[command(name = PLUGIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Operation requested by the runtime.
    #[arg(long, env = "CNI_COMMAND", value_enum, ignore_case = true)]
    pub command: CniCommand,

    /// Container being attached.
    #[arg(long, env = "CNI_CONTAINERID", default_value = "")]
    pub container_id: String,

    /// Path of the container's network namespace.
    #[arg(long, env = "CNI_NETNS", default_value = "")]
    pub netns: String,

    /// Interface name requested by the runtime.
    #[arg(long, env = "CNI_IFNAME", default_value = "eth0")]
    pub ifname: String,

    /// Extra arguments, forwarded to the allocator.
    #[arg(long, env = "CNI_ARGS")]
    pub args: Option<String>,

    /// Colon-separated directories searched for the allocator plugin.
    #[arg(long, env = "CNI_PATH")]
    pub cni_path: Option<String>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, env = "MYEBPF_CNI_LOG_JSON")]
    pub log_json: bool,
}

/// CNI operations.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "UPPER")]
pub enum CniCommand {
    /// Attach a container.
    Add,
    /// Detach a container.
    Del,
    /// Verify an attachment.
    Check,
    /// Report supported versions.
    Version,
}

impl Cli {
    fn invocation(&self, payload: Vec<u8>) -> Invocation {
        Invocation {
            container_id: ContainerId::new(self.container_id.as_str()),
            netns: self.netns.clone().into(),
            ifname: self.ifname.clone(),
            args: self.args.clone(),
            cni_path: self.cni_path.clone(),
            payload,
        }
    }
}

/// Version used for error replies: the configuration's, when acceptable.
fn reply_version(payload: &[u8]) -> String {
    let version = config::resolve_lenient(payload).cni_version;
    if config::is_supported_version(&version) {
        version
    } else {
        DEFAULT_CNI_VERSION.to_string()
    }
}

/// Runs the requested command, writing its reply to `out`.
///
/// Returns whether the command succeeded. Failures of the command itself
/// are reported on `out` as CNI error objects.
///
/// # Errors
///
/// Returns an error only if `out` cannot be written.
pub fn execute(cli: &Cli, input: &mut impl Read, out: &mut impl Write) -> io::Result<bool> {
    if cli.command == CniCommand::Version {
        version::execute(out)?;
        return Ok(true);
    }

    let mut payload = Vec::new();
    if let Err(source) = input.read_to_end(&mut payload) {
        output::write_error(out, DEFAULT_CNI_VERSION, &PluginError::Input { source })?;
        return Ok(false);
    }
    let invocation = cli.invocation(payload);
    tracing::debug!(
        command = ?cli.command,
        container = %invocation.container_id,
        netns = %invocation.netns.display(),
        "invoked"
    );

    let platform = backend::detect_platform();
    tracing::debug!(info = ?backend::platform_info(), "platform");
    let lifecycle = AttachmentLifecycle::new(
        &ExecAllocator,
        platform.fabric.as_ref(),
        platform.counter.as_ref(),
        AttachmentRegistry::global(),
    );

    let outcome = match cli.command {
        CniCommand::Add => add::execute(&lifecycle, &invocation, out),
        CniCommand::Del => del::execute(&lifecycle, &invocation),
        CniCommand::Check => check::execute(&lifecycle, &invocation),
        // Answered before stdin was read.
        CniCommand::Version => Ok(()),
    };

    match outcome {
        Ok(()) => Ok(true),
        Err(CommandError::Plugin(error)) => {
            output::write_error(out, &reply_version(&invocation.payload), &error)?;
            Ok(false)
        }
        Err(CommandError::Io(e)) => Err(e),
    }
}

/// Failure of a single command handler.
#[derive(Debug)]
pub enum CommandError {
    /// The command failed and must be reported as a CNI error.
    Plugin(PluginError),
    /// stdout could not be written.
    Io(io::Error),
}

impl From<PluginError> for CommandError {
    fn from(error: PluginError) -> Self {
        Self::Plugin(error)
    }
}

impl From<io::Error> for CommandError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}
