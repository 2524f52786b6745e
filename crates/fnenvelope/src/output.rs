use std::io::{self, IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use http::Response;
use serde_json::json;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Render a response replayed onto an HTTP sink.
pub fn write_response(
    out: &mut dyn Write,
    response: &Response<Vec<u8>>,
    format: OutputFormat,
) -> io::Result<()> {
    let status = response.status();
    let body = response.body();
    match format {
        OutputFormat::Json => {
            let out_json = json!({
                "status_code": status.as_u16(),
                "body": String::from_utf8_lossy(body),
            });
            writeln!(out, "{out_json}")?;
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["STATUS", "SIZE", "BODY"])
                .add_row(vec![
                    status.to_string(),
                    body.len().to_string(),
                    body_preview(body),
                ]);
            writeln!(out, "{table}")?;
        }
        OutputFormat::Pretty => {
            writeln!(
                out,
                "status={} size={} body={}",
                status.as_u16(),
                body.len(),
                body_preview(body)
            )?;
        }
        OutputFormat::Raw => {
            out.write_all(body)?;
        }
    }
    out.flush()
}

fn body_preview(body: &[u8]) -> String {
    match std::str::from_utf8(body) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", body.len()),
    }
}
