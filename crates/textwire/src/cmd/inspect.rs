use textwire_frame::{parse_route, TokenMode};

use crate::cmd::InspectArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_route, OutputFormat};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let mode = if args.lenient {
        TokenMode::Lenient
    } else {
        TokenMode::Strict
    };
    let route =
        parse_route(args.route.trim(), mode).map_err(|err| frame_error("inspect failed", err))?;
    print_route(&route, format);
    Ok(SUCCESS)
}
