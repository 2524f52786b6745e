use std::fs;
use std::io::Cursor;

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, Request};

use crate::cmd::RequestArgs;
use crate::exit::{io_error, CliError, CliResult, USAGE};

/// A request built from command-line arguments, reusable for `--repeat`.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl RequestTemplate {
    pub fn from_args(args: &RequestArgs) -> CliResult<Self> {
        let mut headers = HeaderMap::new();
        for raw in &args.headers {
            let (name, value) = parse_header(raw)?;
            headers.append(name, value);
        }

        let body = if let Some(data) = &args.data {
            Some(data.as_bytes().to_vec())
        } else if let Some(path) = &args.file {
            Some(
                fs::read(path)
                    .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?,
            )
        } else {
            None
        };

        Ok(Self { headers, body })
    }

    /// A fresh request carrying the template's headers and body.
    pub fn request(&self) -> Request<Option<Cursor<Vec<u8>>>> {
        let mut request = Request::new(self.body.clone().map(Cursor::new));
        *request.method_mut() = Method::POST;
        *request.headers_mut() = self.headers.clone();
        request
    }
}

fn parse_header(raw: &str) -> CliResult<(HeaderName, HeaderValue)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| CliError::new(USAGE, format!("header must be NAME:VALUE: {raw}")))?;
    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|err| CliError::new(USAGE, format!("invalid header name in {raw:?}: {err}")))?;
    let value = HeaderValue::from_str(value.trim())
        .map_err(|err| CliError::new(USAGE, format!("invalid header value in {raw:?}: {err}")))?;
    Ok((name, value))
}
