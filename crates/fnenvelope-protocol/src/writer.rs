use std::io::{ErrorKind, Read, Write};

use bytes::{BufMut, BytesMut};
use http::Request;
use serde::Serialize;

use crate::config::ProtocolConfig;
use crate::envelope::RequestEnvelope;
use crate::error::EncodeError;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete JSON envelopes to any `Write` stream.
///
/// Each envelope is serialized into an internal buffer first, so a
/// serialization failure never leaves half an object on the stream.
pub struct EnvelopeWriter<W> {
    inner: W,
    buf: BytesMut,
    config: ProtocolConfig,
}

impl<W: Write> EnvelopeWriter<W> {
    /// Create a new envelope writer with default configuration.
    pub fn new(inner: W) -> Self {
        Self::with_config(inner, ProtocolConfig::default())
    }

    /// Create a new envelope writer with explicit configuration.
    pub fn with_config(inner: W, config: ProtocolConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Serialize one envelope and write it to the stream (blocking).
    pub fn write_envelope<T: Serialize>(&mut self, envelope: &T) -> Result<(), EncodeError> {
        self.buf.clear();
        serde_json::to_writer((&mut self.buf).writer(), envelope)?;
        if self.config.newline_delimited {
            self.buf.put_u8(b'\n');
        }

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(EncodeError::Io(ErrorKind::WriteZero.into())),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(EncodeError::Io(err)),
            }
        }

        self.flush()
    }

    /// Encode an HTTP request as a [`RequestEnvelope`] and write it.
    ///
    /// Only the headers and body are carried. The body is read to the end and
    /// dropped before anything is written, whether or not encoding succeeds.
    pub fn encode_request<B: Read>(
        &mut self,
        request: Request<Option<B>>,
    ) -> Result<(), EncodeError> {
        let (parts, body) = request.into_parts();
        let body = match body {
            Some(body) => read_body(body, self.config.max_body_size)?,
            None => Vec::new(),
        };

        let envelope = RequestEnvelope::from_parts(&parts.headers, &body);
        tracing::debug!(
            body_size = body.len(),
            headers = envelope.headers.len(),
            "writing request envelope"
        );
        self.write_envelope(&envelope)
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<(), EncodeError> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(EncodeError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Current envelope writer configuration.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }
}

fn read_body<B: Read>(body: B, max_body_size: usize) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    body.take(max_body_size as u64 + 1)
        .read_to_end(&mut buf)
        .map_err(EncodeError::Body)?;
    if buf.len() > max_body_size {
        return Err(EncodeError::BodyTooLarge { max: max_body_size });
    }
    Ok(buf)
}
