use textwire_frame::{DEFAULT_FRAGMENT_BUDGET, PROTOCOL_VERSION};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("textwire {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: textwire");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("protocol_version: {PROTOCOL_VERSION}");
    println!("default_budget: {DEFAULT_FRAGMENT_BUDGET}");
    println!(
        "target: {}",
        option_env!("TEXTWIRE_BUILD_TARGET").unwrap_or(std::env::consts::ARCH)
    );
    println!(
        "profile: {}",
        option_env!("TEXTWIRE_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("features: async={}, cli=true", cfg!(feature = "async"));

    Ok(SUCCESS)
}
