//! JSON envelope protocol for HTTP functions behind a byte stream.
//!
//! A function process that knows nothing about HTTP reads one JSON object per
//! request from its input stream and answers with one JSON object on its
//! output stream:
//!
//! - request: `{"body":"...","headers":{"Name":["value"]}}`
//! - response: `{"headers":{...},"body":"...","status_code":200}`
//!
//! [`JsonProtocol`] encodes an [`http::Request`] into the first, decodes the
//! second, and replays it onto either a live HTTP response or a capture
//! stream. The same stream pair can be reused for the next request.

pub mod config;
pub mod envelope;
pub mod error;
pub mod protocol;
pub mod reader;
pub mod sink;
pub mod writer;

pub use config::{ProtocolConfig, DEFAULT_MAX_BODY_SIZE};
pub use envelope::{canonical_header_key, header_values, Headers, RequestEnvelope, ResponseEnvelope};
pub use error::{DecodeError, EncodeError, ProtocolError, Result};
pub use protocol::{respond_with_error, JsonProtocol};
pub use reader::EnvelopeReader;
pub use sink::{BufferedResponse, ResponseWriter, Sink};
pub use writer::EnvelopeWriter;
