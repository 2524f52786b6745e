use std::io::Write;

use http::{Response, StatusCode};

/// A destination that understands HTTP responses: a status line and a body.
pub trait ResponseWriter {
    /// Set the response status. Only the first call takes effect.
    fn write_status(&mut self, status: StatusCode);

    /// Append bytes to the response body.
    fn write_body(&mut self, body: &[u8]) -> std::io::Result<()>;
}

/// Where a decoded response is replayed.
pub enum Sink<'a> {
    /// A live HTTP response. Receives the status and body only.
    Http(&'a mut dyn ResponseWriter),
    /// A generic byte sink such as a log or capture file. Receives the full
    /// response envelope as JSON.
    Capture(&'a mut dyn Write),
}

impl<'a> Sink<'a> {
    pub fn http(writer: &'a mut dyn ResponseWriter) -> Self {
        Sink::Http(writer)
    }

    pub fn capture(writer: &'a mut dyn Write) -> Self {
        Sink::Capture(writer)
    }
}

/// An in-memory [`ResponseWriter`].
#[derive(Debug, Default, Clone)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// The status written so far, `200 OK` if none was.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_response(self) -> Response<Vec<u8>> {
        let status = self.status();
        let mut response = Response::new(self.body);
        *response.status_mut() = status;
        response
    }
}

impl ResponseWriter for BufferedResponse {
    fn write_status(&mut self, status: StatusCode) {
        match self.status {
            None => self.status = Some(status),
            Some(current) => {
                tracing::debug!(
                    current = current.as_u16(),
                    ignored = status.as_u16(),
                    "superfluous status write"
                );
            }
        }
    }

    fn write_body(&mut self, body: &[u8]) -> std::io::Result<()> {
        self.body.extend_from_slice(body);
        Ok(())
    }
}
