use std::fs;
use std::io::Read;

use textwire_endpoint::{Messenger, MessengerConfig};
use textwire_frame::{parse_route, PacketConfig, TokenMode};
use textwire_transport::LoopbackTransport;
use tracing::debug;

use crate::cmd::PackArgs;
use crate::exit::{endpoint_error, frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_fragments, FragmentOutput, OutputFormat};
use crate::payload::Payload;

pub fn run(args: PackArgs, format: OutputFormat) -> CliResult<i32> {
    let input = resolve_input(&args)?;
    let payload = Payload::parse(args.kind, input)?;

    let wire = LoopbackTransport::new();
    let config = MessengerConfig {
        packet: PacketConfig {
            budget: args.budget,
        },
        ..MessengerConfig::default()
    };
    let mut messenger = Messenger::with_config(wire.clone(), config)
        .map_err(|err| endpoint_error("invalid configuration", err))?;

    let receipt = payload.send(&mut messenger, &args.endpoint)?;
    debug!(guid = %receipt.guid, fragments = receipt.fragments, "packed message");

    let deliveries = wire.drain();
    let routes = deliveries
        .iter()
        .map(|d| parse_route(&d.route, TokenMode::Strict))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| frame_error("route check failed", err))?;

    let fragments: Vec<_> = routes
        .iter()
        .zip(&deliveries)
        .map(|(route, delivery)| FragmentOutput::new(route, delivery))
        .collect();
    print_fragments(&fragments, format);

    Ok(SUCCESS)
}

fn resolve_input(args: &PackArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .map_err(|err| io_error("failed reading stdin", err))?;
    Ok(input)
}
