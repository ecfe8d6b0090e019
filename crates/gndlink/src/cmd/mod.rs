use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Subcommand, ValueEnum};

use gndlink_transport::{PortConfig, ShutdownSignal, DEFAULT_BAUD_RATE};

use crate::exit::{CliError, CliResult, INTERNAL};

pub mod dict;
pub mod listen;
pub mod send;
pub mod telemetry;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one command frame over the link.
    Send(SendArgs),
    /// Receive command frames and hand them to the command executor.
    Listen(ListenArgs),
    /// Receive telemetry on the ground, or downlink synthetic readings.
    Telemetry(TelemetryArgs),
    /// List or describe dictionary entries.
    Dict(DictArgs),
}

pub fn run(command: Command) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args),
        Command::Listen(args) => listen::run(args),
        Command::Telemetry(args) => telemetry::run(args),
        Command::Dict(args) => dict::run(args),
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum PortType {
    Serial,
    Ethernet,
}

/// Port selection shared by the link-facing subcommands.
#[derive(Args, Debug)]
pub struct PortArgs {
    /// Physical medium behind the link.
    #[arg(long, value_enum, default_value = "ethernet")]
    pub port_type: PortType,

    /// Port identifier: a device path for serial, `local/remote` UDP
    /// endpoints for ethernet.
    #[arg(long)]
    pub port: String,

    /// Baud rate for serial links.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
}

impl PortArgs {
    pub fn to_config(&self) -> PortConfig {
        match self.port_type {
            PortType::Serial => PortConfig::serial(&self.port, self.baud),
            PortType::Ethernet => PortConfig::ethernet(&self.port),
        }
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Dictionary file (JSON).
    #[arg(long, value_name = "FILE")]
    pub dictionary: PathBuf,
    /// Command name as `component.mnemonic`.
    pub command: String,
    /// Command arguments, in template order.
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Dictionary file (JSON).
    #[arg(long, value_name = "FILE")]
    pub dictionary: PathBuf,
    /// External tool to execute decoded commands with; log-only when unset.
    #[arg(long, value_name = "PROGRAM")]
    pub run_with: Option<String>,
    /// Name carried in heartbeat frames.
    #[arg(long, default_value = "gndlink")]
    pub name: String,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum TelemetryMode {
    Ground,
    Downlink,
}

#[derive(Args, Debug)]
pub struct TelemetryArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Dictionary file (JSON).
    #[arg(long, value_name = "FILE")]
    pub dictionary: PathBuf,
    /// Ground reception or synthetic downlink.
    #[arg(long, value_enum, default_value = "ground")]
    pub mode: TelemetryMode,
    /// Downlink transmission interval in seconds.
    #[arg(long, default_value_t = 1)]
    pub interval: u64,
    /// Name carried in heartbeat frames.
    #[arg(long, default_value = "gndlink")]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct DictArgs {
    /// Dictionary file (JSON).
    pub dictionary: PathBuf,
    /// Describe one command instead of listing everything.
    pub command: Option<String>,
}

/// Route Ctrl-C into a shutdown signal.
pub fn install_ctrlc_handler(signal: Arc<ShutdownSignal>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        signal.trigger();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
