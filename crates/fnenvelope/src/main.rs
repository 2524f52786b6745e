mod cmd;
mod exit;
mod logging;
mod output;

use clap::{ArgAction, Parser};
use fnenvelope_protocol::{ProtocolConfig, DEFAULT_MAX_BODY_SIZE};

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "fnenvelope", version, about = "HTTP functions over JSON envelopes")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "text",
        env = "FNENVELOPE_LOG_FORMAT",
        global = true
    )]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "FNENVELOPE_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    /// Maximum request body size in bytes.
    #[arg(
        long,
        value_name = "BYTES",
        default_value_t = DEFAULT_MAX_BODY_SIZE,
        env = "FNENVELOPE_MAX_BODY_SIZE",
        global = true
    )]
    max_body_size: usize,

    /// Terminate each envelope with a newline.
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = true,
        action = ArgAction::Set,
        env = "FNENVELOPE_NEWLINE_DELIMITED",
        global = true
    )]
    newline_delimited: bool,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn protocol_config(&self) -> ProtocolConfig {
        ProtocolConfig {
            max_body_size: self.max_body_size,
            newline_delimited: self.newline_delimited,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let config = cli.protocol_config();
    let result = cmd::run(cli.command, format, config);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
