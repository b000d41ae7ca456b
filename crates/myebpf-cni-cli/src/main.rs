//! # myebpf-cni
//!
//! CNI plugin that joins a container to the host through a veth pair and
//! counts ingress packets on the host end with a TC classifier.
//! The container runtime invokes it with `CNI_*` variables and the network
//! configuration on stdin; the result or error object goes to stdout.

mod commands;
mod output;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use myebpf_cni_common::constants::DEFAULT_CNI_VERSION;
use myebpf_cni_common::error::CniErrorCode;
use myebpf_cni_common::result::CniErrorReply;
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;

fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let reply = CniErrorReply::new(
                DEFAULT_CNI_VERSION,
                CniErrorCode::InvalidEnvironment,
                "invalid invocation",
                Some(e.to_string()),
            );
            output::write_json(&mut io::stdout().lock(), &reply)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    init_tracing(cli.log_json)?;

    let succeeded = commands::execute(&cli, &mut io::stdin().lock(), &mut io::stdout().lock())?;
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
