use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use textwire_frame::{fragment_cost, Route};
use textwire_transport::Delivery;

use crate::payload::{Payload, Received};

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

/// One outbound fragment, with its decoded route.
#[derive(Serialize)]
pub struct FragmentOutput<'a> {
    pub endpoint: &'a str,
    pub guid: &'a str,
    pub index: u32,
    pub is_final: bool,
    pub cost: usize,
    pub route: &'a str,
    pub payload: &'a str,
}

impl<'a> FragmentOutput<'a> {
    pub fn new(route: &'a Route, delivery: &'a Delivery) -> Self {
        Self {
            endpoint: &route.endpoint,
            guid: &route.header.guid,
            index: route.header.index,
            is_final: route.header.is_final,
            cost: fragment_cost(&delivery.payload),
            route: &delivery.route,
            payload: &delivery.payload,
        }
    }
}

pub fn print_fragments(fragments: &[FragmentOutput<'_>], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for fragment in fragments {
                println!("{}", to_json(fragment));
            }
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["INDEX", "FINAL", "COST", "ROUTE", "PAYLOAD"]);
            for f in fragments {
                table.add_row(vec![
                    f.index.to_string(),
                    f.is_final.to_string(),
                    f.cost.to_string(),
                    f.route.to_string(),
                    f.payload.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for f in fragments {
                println!(
                    "fragment {} final={} cost={} endpoint={} guid={} payload={}",
                    f.index, f.is_final, f.cost, f.endpoint, f.guid, f.payload
                );
            }
        }
        OutputFormat::Raw => {
            let mut out = std::io::stdout().lock();
            for f in fragments {
                let _ = writeln!(out, "{}", Delivery::new(f.route, f.payload).to_line());
            }
            let _ = out.flush();
        }
    }
}

pub fn print_received(received: &Received, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json(received)),
        OutputFormat::Table => {
            let mut table = new_table(vec!["ENDPOINT", "KIND", "VALUE"]);
            table.add_row(vec![
                received.endpoint.clone(),
                received.kind.as_str().to_string(),
                received.value.display(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "endpoint={} value={}",
            received.endpoint,
            received.value.display()
        ),
        OutputFormat::Raw => match &received.value {
            Payload::Bytes(bytes) => print_raw(bytes),
            other => println!("{}", other.display()),
        },
    }
}

pub fn print_route(route: &Route, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json(route)),
        OutputFormat::Table => {
            let mut table = new_table(vec!["ENDPOINT", "GUID", "VERSION", "INDEX", "FINAL"]);
            table.add_row(vec![
                route.endpoint.clone(),
                route.header.guid.clone(),
                route.header.version.clone(),
                route.header.index.to_string(),
                route.header.is_final.to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "endpoint={} guid={} version={} index={} final={}",
            route.endpoint,
            route.header.guid,
            route.header.version,
            route.header.index,
            route.header.is_final
        ),
        OutputFormat::Raw => println!(
            "{}\t{}\t{}\t{}\t{}",
            route.endpoint,
            route.header.guid,
            route.header.version,
            route.header.index,
            route.header.is_final
        ),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}
