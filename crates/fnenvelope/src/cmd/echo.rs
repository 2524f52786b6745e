use std::io;

use fnenvelope_protocol::{
    DecodeError, EnvelopeReader, EnvelopeWriter, ProtocolConfig, RequestEnvelope,
    ResponseEnvelope,
};
use http::StatusCode;

use crate::cmd::EchoArgs;
use crate::exit::{decode_error, encode_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: EchoArgs, config: ProtocolConfig) -> CliResult<i32> {
    let status = StatusCode::from_u16(args.status)
        .map_err(|_| CliError::new(USAGE, format!("invalid status code: {}", args.status)))?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = EnvelopeReader::new(stdin.lock());
    let mut writer = EnvelopeWriter::with_config(stdout.lock(), config);

    let served = serve(&mut reader, &mut writer, status, args.count)?;
    tracing::info!(served, "echo finished");
    Ok(SUCCESS)
}

fn serve<R: io::Read, W: io::Write>(
    reader: &mut EnvelopeReader<R>,
    writer: &mut EnvelopeWriter<W>,
    status: StatusCode,
    count: Option<usize>,
) -> CliResult<usize> {
    let mut served = 0usize;
    while count.is_none_or(|count| served < count) {
        let request: RequestEnvelope = match reader.read_envelope() {
            Ok(request) => request,
            Err(DecodeError::Closed) => break,
            Err(err) => return Err(decode_error("read request failed", err)),
        };

        tracing::debug!(
            body_size = request.body.len(),
            headers = request.headers.len(),
            "echoing request"
        );

        let response = ResponseEnvelope::new(status, request.body).with_headers(request.headers);
        writer
            .write_envelope(&response)
            .map_err(|err| encode_error("write response failed", err))?;
        served += 1;
    }
    Ok(served)
}
