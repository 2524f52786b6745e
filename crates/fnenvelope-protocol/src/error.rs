/// Errors that can occur while writing a request envelope to the input stream.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The request body could not be read.
    #[error("request body read failed: {0}")]
    Body(#[source] std::io::Error),

    /// The request body exceeds the configured maximum size.
    #[error("request body exceeds {max} bytes")]
    BodyTooLarge { max: usize },

    /// The envelope could not be serialized.
    #[error("envelope serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred while writing to the input stream.
    #[error("envelope I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while reading an envelope from the output stream.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The stream reached EOF before any byte of the next envelope.
    #[error("stream closed (no envelope)")]
    Closed,

    /// The stream reached EOF in the middle of an envelope.
    #[error("stream closed (incomplete envelope): {0}")]
    Truncated(#[source] serde_json::Error),

    /// The envelope is not valid JSON or does not have the expected shape.
    #[error("{0}")]
    Json(#[source] serde_json::Error),

    /// The envelope carries a status code outside 100..=999.
    #[error("invalid status code {0}")]
    InvalidStatus(u16),

    /// An I/O error occurred while reading from the output stream.
    #[error("envelope I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Io => DecodeError::Io(err.into()),
            serde_json::error::Category::Eof => DecodeError::Truncated(err),
            serde_json::error::Category::Syntax | serde_json::error::Category::Data => {
                DecodeError::Json(err)
            }
        }
    }
}

/// Errors returned by [`JsonProtocol::dispatch`](crate::JsonProtocol::dispatch).
///
/// By the time one of these is returned, the sink has already been given a
/// best-effort rendering of it.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The request could not be written to the input stream.
    #[error("error writing JSON object from request: {0}")]
    Encode(#[from] EncodeError),

    /// The response could not be read from the output stream.
    #[error("unable to decode JSON response object: {0}")]
    Decode(#[from] DecodeError),

    /// The response body could not be written to an HTTP sink.
    #[error("unable to write JSON response object: {0}")]
    Respond(#[source] std::io::Error),

    /// The response envelope could not be written to a capture sink.
    #[error("error writing function response: {0}")]
    Capture(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
