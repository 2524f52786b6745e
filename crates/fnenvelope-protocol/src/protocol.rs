use std::io::{Read, Write};

use http::{Request, StatusCode};

use crate::config::ProtocolConfig;
use crate::envelope::ResponseEnvelope;
use crate::error::{ProtocolError, Result};
use crate::reader::EnvelopeReader;
use crate::sink::Sink;
use crate::writer::EnvelopeWriter;

/// Carries HTTP request/response cycles over a stream pair as JSON envelopes.
///
/// `input` is the function's stdin (or any writable end), `output` its
/// stdout. One [`dispatch`](Self::dispatch) writes a request envelope, reads
/// exactly one response envelope back and replays it onto a [`Sink`].
///
/// The protocol does no locking of its own. Calls on the same stream pair
/// must be serialized by the caller, e.g. behind a `Mutex`: two concurrent
/// dispatches would interleave request bytes and race for responses.
pub struct JsonProtocol<W, R> {
    input: EnvelopeWriter<W>,
    output: EnvelopeReader<R>,
}

impl<W: Write, R: Read> JsonProtocol<W, R> {
    /// Create a protocol over a stream pair with default configuration.
    pub fn new(input: W, output: R) -> Self {
        Self::with_config(input, output, ProtocolConfig::default())
    }

    /// Create a protocol over a stream pair with explicit configuration.
    pub fn with_config(input: W, output: R, config: ProtocolConfig) -> Self {
        Self {
            input: EnvelopeWriter::with_config(input, config),
            output: EnvelopeReader::new(output),
        }
    }

    /// Whether the stream pair may be reused for another dispatch.
    ///
    /// Always true: every dispatch consumes exactly one envelope each way.
    pub fn is_streamable(&self) -> bool {
        true
    }

    /// Send `request` to the function and replay its response onto `sink`.
    ///
    /// On failure the sink has already received a 500 rendering of the
    /// returned error.
    pub fn dispatch<B: Read>(
        &mut self,
        mut sink: Sink<'_>,
        request: Request<Option<B>>,
    ) -> Result<()> {
        if let Err(err) = self.input.encode_request(request) {
            return Err(respond_with_error(&mut sink, err.into()));
        }

        let response = match self.output.read_response() {
            Ok(response) => response,
            Err(err) => return Err(respond_with_error(&mut sink, err.into())),
        };

        replay(&mut sink, response).map_err(|err| respond_with_error(&mut sink, err))
    }

    /// Current configuration.
    pub fn config(&self) -> &ProtocolConfig {
        self.input.config()
    }

    /// Borrow the input stream.
    pub fn input(&self) -> &W {
        self.input.get_ref()
    }

    /// Borrow the output stream.
    pub fn output(&self) -> &R {
        self.output.get_ref()
    }

    /// Consume the protocol and return the stream pair.
    pub fn into_inner(self) -> (W, R) {
        (self.input.into_inner(), self.output.into_inner())
    }
}

fn replay(sink: &mut Sink<'_>, response: ResponseEnvelope) -> Result<()> {
    match sink {
        Sink::Http(writer) => {
            writer.write_status(response.status());
            writer
                .write_body(response.body.as_bytes())
                .map_err(ProtocolError::Respond)
        }
        Sink::Capture(writer) => {
            let mut line = serde_json::to_vec(&response.with_resolved_status())
                .map_err(|err| ProtocolError::Capture(err.into()))?;
            line.push(b'\n');
            writer
                .write_all(&line)
                .and_then(|()| writer.flush())
                .map_err(ProtocolError::Capture)
        }
    }
}

/// Render `err` onto `sink` as a best-effort error response and hand it back.
///
/// HTTP sinks get status 500 with the message as body; capture sinks get the
/// message bytes verbatim.
pub fn respond_with_error(sink: &mut Sink<'_>, err: ProtocolError) -> ProtocolError {
    tracing::debug!(error = %err, "dispatch failed");
    let message = err.to_string();

    let written = match sink {
        Sink::Http(writer) => {
            writer.write_status(StatusCode::INTERNAL_SERVER_ERROR);
            writer.write_body(message.as_bytes())
        }
        Sink::Capture(writer) => writer
            .write_all(message.as_bytes())
            .and_then(|()| writer.flush()),
    };
    if let Err(write_err) = written {
        tracing::warn!(error = %write_err, "failed writing error response to sink");
    }

    err
}
