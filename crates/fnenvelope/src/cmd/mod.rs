use clap::{Args, Subcommand};
use fnenvelope_protocol::ProtocolConfig;
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod dispatch;
pub mod echo;
pub mod encode;
pub mod request;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a function process and send it requests.
    Dispatch(DispatchArgs),
    /// Print a request envelope.
    Encode(EncodeArgs),
    /// Act as a function that echoes each request back.
    Echo(EchoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, config: ProtocolConfig) -> CliResult<i32> {
    match command {
        Command::Dispatch(args) => dispatch::run(args, format, config),
        Command::Encode(args) => encode::run(args, config),
        Command::Echo(args) => echo::run(args, config),
        Command::Version(args) => version::run(args, config),
    }
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Request header (repeatable).
    #[arg(long = "header", short = 'H', value_name = "NAME:VALUE")]
    pub headers: Vec<String>,
    /// Raw string body.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read body from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DispatchArgs {
    #[command(flatten)]
    pub request: RequestArgs,
    /// Send the request this many times over the same process.
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,
    /// Function command line.
    #[arg(required = true, last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub request: RequestArgs,
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Status code to answer with.
    #[arg(long, default_value = "200")]
    pub status: u16,
    /// Exit after answering N requests.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
