use std::cell::RefCell;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::rc::Rc;

use serde::Deserialize;
use textwire_endpoint::{Messenger, MessengerConfig};
use textwire_frame::{parse_route, TokenMode};
use textwire_transport::{Delivery, NullTransport};
use tracing::{debug, warn};

use crate::cmd::UnpackArgs;
use crate::exit::{
    endpoint_error, io_error, transport_error, CliError, CliResult, DATA_INVALID, FAILURE, SUCCESS,
};
use crate::output::{print_received, OutputFormat};
use crate::payload::{listen, Kind, Received};

/// JSON form written by `pack --format json`.
#[derive(Deserialize)]
struct JsonDelivery {
    route: String,
    payload: String,
}

pub fn run(args: UnpackArgs, format: OutputFormat) -> CliResult<i32> {
    let reader: Box<dyn BufRead> = match &args.file {
        Some(path) => Box::new(BufReader::new(File::open(path).map_err(|err| {
            io_error(&format!("failed opening {}", path.display()), err)
        })?)),
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    let mut unpacker = Unpacker::new(args.kind, args.endpoint.clone(), args.lenient)?;

    for (number, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| io_error("failed reading input", err))?;
        if line.trim().is_empty() {
            continue;
        }
        let delivery = parse_input_line(&line).map_err(|err| {
            CliError::new(err.code, format!("line {}: {}", number + 1, err.message))
        })?;

        for received in unpacker.feed(&delivery)? {
            print_received(&received, format);
        }
    }

    let pending = unpacker.pending();
    if pending > 0 {
        warn!(pending, "input ended with incomplete messages");
        eprintln!("error: {pending} incomplete message(s) at end of input");
        return Ok(FAILURE);
    }
    Ok(SUCCESS)
}

/// Accept either the `route<TAB>payload` line format or a JSON object.
fn parse_input_line(line: &str) -> CliResult<Delivery> {
    if line.trim_start().starts_with('{') {
        let json: JsonDelivery = serde_json::from_str(line)
            .map_err(|err| CliError::new(DATA_INVALID, format!("invalid JSON delivery: {err}")))?;
        return Ok(Delivery::new(json.route, json.payload));
    }
    Delivery::parse_line(line).map_err(|err| transport_error("invalid delivery", err))
}

/// Receiving side of `unpack`: subscribes lazily to every endpoint seen.
struct Unpacker {
    messenger: Messenger<NullTransport>,
    kind: Kind,
    only: Option<String>,
    mode: TokenMode,
    sink: Rc<RefCell<Vec<Received>>>,
}

impl Unpacker {
    fn new(kind: Kind, only: Option<String>, lenient: bool) -> CliResult<Self> {
        let mode = if lenient {
            TokenMode::Lenient
        } else {
            TokenMode::Strict
        };
        let config = MessengerConfig {
            token_mode: mode,
            ..MessengerConfig::default()
        };
        let messenger = Messenger::with_config(NullTransport, config)
            .map_err(|err| endpoint_error("invalid configuration", err))?;
        let sink = Rc::new(RefCell::new(Vec::new()));

        let mut unpacker = Self {
            messenger,
            kind,
            only,
            mode,
            sink,
        };
        if let Some(endpoint) = unpacker.only.clone() {
            unpacker.subscribe(&endpoint);
        }
        Ok(unpacker)
    }

    fn subscribe(&mut self, endpoint: &str) {
        if self.messenger.listener_count(endpoint) == 0 {
            debug!(endpoint, "subscribing");
            listen(&mut self.messenger, endpoint, self.kind, Rc::clone(&self.sink));
        }
    }

    fn feed(&mut self, delivery: &Delivery) -> CliResult<Vec<Received>> {
        if self.only.is_none() {
            if let Ok(route) = parse_route(&delivery.route, self.mode) {
                self.subscribe(&route.endpoint);
            }
        }

        self.messenger
            .on_delivery(delivery)
            .map_err(|err| endpoint_error("unpack failed", err))?;
        Ok(self.sink.borrow_mut().drain(..).collect())
    }

    fn pending(&self) -> usize {
        self.messenger.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Payload;
    use textwire_transport::LoopbackTransport;

    fn packed(endpoint: &str, payload: &Payload, budget: usize) -> Vec<Delivery> {
        let wire = LoopbackTransport::new();
        let config = MessengerConfig {
            packet: textwire_frame::PacketConfig { budget },
            ..MessengerConfig::default()
        };
        let mut messenger = Messenger::with_config(wire.clone(), config).unwrap();
        payload.send(&mut messenger, endpoint).unwrap();
        wire.drain()
    }

    #[test]
    fn unpacks_reversed_fragments() {
        let payload = Payload::Text("a longer piece of text".to_string());
        let mut deliveries = packed("notes", &payload, 6);
        deliveries.reverse();

        let mut unpacker = Unpacker::new(Kind::Text, None, false).unwrap();
        let mut out = Vec::new();
        for d in &deliveries {
            out.extend(unpacker.feed(d).unwrap());
        }
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].endpoint, "notes");
        assert_eq!(out[0].value, payload);
        assert_eq!(unpacker.pending(), 0);
    }

    #[test]
    fn endpoint_filter_skips_other_messages() {
        let mut unpacker = Unpacker::new(Kind::Ints, Some("keep".to_string()), false).unwrap();
        let skip = packed("skip", &Payload::Ints(vec![1]), 2048);
        let keep = packed("keep", &Payload::Ints(vec![2, 3]), 2048);

        assert!(unpacker.feed(&skip[0]).unwrap().is_empty());
        let out = unpacker.feed(&keep[0]).unwrap();
        assert_eq!(out[0].value, Payload::Ints(vec![2, 3]));
    }

    #[test]
    fn json_lines_are_accepted() {
        let delivery = parse_input_line(r#"{"route":"r","payload":"p","index":0}"#).unwrap();
        assert_eq!(delivery, Delivery::new("r", "p"));
    }

    #[test]
    fn malformed_line_is_data_error() {
        let err = parse_input_line("no tab here").unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn lenient_mode_skips_garbage_routes() {
        let mut unpacker = Unpacker::new(Kind::Text, None, true).unwrap();
        let garbage = Delivery::new("garbage:route", "00");
        assert!(unpacker.feed(&garbage).unwrap().is_empty());

        let mut strict = Unpacker::new(Kind::Text, None, false).unwrap();
        let err = strict.feed(&garbage).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }
}
