use std::io::{BufRead, BufReader, ErrorKind, Read};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::envelope::ResponseEnvelope;
use crate::error::DecodeError;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Reads complete JSON envelopes from any `Read` stream.
///
/// Exactly one JSON value is consumed per call. Bytes that arrive after it
/// stay buffered for the next call, so the stream can carry a sequence of
/// envelopes without ever reaching EOF.
pub struct EnvelopeReader<R> {
    inner: BufReader<R>,
}

impl<R: Read> EnvelopeReader<R> {
    /// Create a new envelope reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::with_capacity(INITIAL_BUFFER_CAPACITY, inner),
        }
    }

    /// Read the next envelope (blocking).
    ///
    /// Returns `Err(DecodeError::Closed)` when EOF is reached before the
    /// envelope starts. After any other error the stream position is
    /// unspecified and the stream should not be reused.
    pub fn read_envelope<T: DeserializeOwned>(&mut self) -> Result<T, DecodeError> {
        if !self.skip_whitespace()? {
            return Err(DecodeError::Closed);
        }

        let mut de = serde_json::Deserializer::from_reader(&mut self.inner);
        Ok(T::deserialize(&mut de)?)
    }

    /// Read the next [`ResponseEnvelope`] and normalize its status code.
    pub fn read_response(&mut self) -> Result<ResponseEnvelope, DecodeError> {
        let envelope = self.read_envelope::<ResponseEnvelope>()?.normalize()?;
        tracing::debug!(
            status = envelope.status().as_u16(),
            body_size = envelope.body.len(),
            "read response envelope"
        );
        Ok(envelope)
    }

    /// Consume JSON whitespace. Returns false on EOF.
    fn skip_whitespace(&mut self) -> Result<bool, DecodeError> {
        loop {
            let buf = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(DecodeError::Io(err)),
            };
            if buf.is_empty() {
                return Ok(false);
            }

            let skip = buf
                .iter()
                .take_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
                .count();
            let found = skip < buf.len();
            self.inner.consume(skip);
            if found {
                return Ok(true);
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut R {
        self.inner.get_mut()
    }

    /// Consume the reader and return the inner stream.
    ///
    /// Any buffered bytes not yet decoded are lost.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}
