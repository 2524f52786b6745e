use fnenvelope_protocol::{EnvelopeWriter, ProtocolConfig};

use crate::cmd::request::RequestTemplate;
use crate::cmd::EncodeArgs;
use crate::exit::{encode_error, CliResult, SUCCESS};

pub fn run(args: EncodeArgs, config: ProtocolConfig) -> CliResult<i32> {
    let template = RequestTemplate::from_args(&args.request)?;

    let stdout = std::io::stdout();
    let mut writer = EnvelopeWriter::with_config(stdout.lock(), config);
    writer
        .encode_request(template.request())
        .map_err(|err| encode_error("encode failed", err))?;

    Ok(SUCCESS)
}
