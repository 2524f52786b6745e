use fnenvelope_protocol::ProtocolConfig;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs, config: ProtocolConfig) -> CliResult<i32> {
    if !args.extended {
        println!("fnenvelope {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: fnenvelope");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("FNENVELOPE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("protocol: json (streamable)");
    println!("max_body_size: {}", config.max_body_size);
    println!("newline_delimited: {}", config.newline_delimited);

    Ok(SUCCESS)
}
