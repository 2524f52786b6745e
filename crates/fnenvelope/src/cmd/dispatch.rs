use std::io::{self, Read, Write};
use std::process::Command;

use fnenvelope::FunctionProcess;
use fnenvelope_protocol::{BufferedResponse, JsonProtocol, ProtocolConfig, Sink};
use http::{Request, Response, StatusCode};

use crate::cmd::request::RequestTemplate;
use crate::cmd::DispatchArgs;
use crate::exit::{io_error, protocol_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{write_response, OutputFormat};

pub fn run(args: DispatchArgs, format: OutputFormat, config: ProtocolConfig) -> CliResult<i32> {
    let template = RequestTemplate::from_args(&args.request)?;
    let (program, program_args) = args
        .command
        .split_first()
        .ok_or_else(|| CliError::new(USAGE, "missing function command"))?;

    let mut function = FunctionProcess::spawn(Command::new(program).args(program_args), config)
        .map_err(|err| io_error(&format!("failed starting {program}"), err))?;

    let mut result = Ok(SUCCESS);
    if let Some(protocol) = function.protocol_mut() {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        // Every dispatch after the first relies on the stream pair being reusable.
        let attempts = if protocol.is_streamable() { args.repeat } else { 1 };
        for attempt in 1..=attempts {
            tracing::info!(attempt, "dispatching request");
            if let Err(err) = dispatch_once(protocol, template.request(), format, &mut out) {
                result = Err(err);
                break;
            }
        }
    }

    match function.shutdown() {
        Ok(status) => tracing::info!(%status, "function exited"),
        Err(err) => tracing::warn!(error = %err, "failed waiting for function"),
    }

    result
}

/// Dispatch one request and print the response to `out`.
///
/// `json` replays onto a capture sink so the full envelope, headers included,
/// reaches `out`. The other formats replay onto an HTTP sink and render its
/// status and body. A failed dispatch still prints a 500 response.
fn dispatch_once<W: Write, R: Read, B: Read>(
    protocol: &mut JsonProtocol<W, R>,
    request: Request<Option<B>>,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    let print_failed = |err| io_error("failed writing response", err);

    let (response, result) = match format {
        OutputFormat::Json => {
            let mut envelope = Vec::new();
            let Err(err) = protocol.dispatch(Sink::capture(&mut envelope), request) else {
                return out
                    .write_all(&envelope)
                    .and_then(|()| out.flush())
                    .map_err(print_failed);
            };
            // The capture sink holds the bare message; keep stdout JSON.
            let mut response = Response::new(err.to_string().into_bytes());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            (response, Err(err))
        }
        _ => {
            let mut response = BufferedResponse::new();
            let result = protocol.dispatch(Sink::http(&mut response), request);
            (response.into_response(), result)
        }
    };

    write_response(out, &response, format).map_err(print_failed)?;
    result.map_err(|err| protocol_error("dispatch failed", err))
}
