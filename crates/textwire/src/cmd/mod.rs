use clap::{Args, Subcommand};
use std::path::PathBuf;

use textwire_frame::DEFAULT_FRAGMENT_BUDGET;

use crate::exit::CliResult;
use crate::output::OutputFormat;
use crate::payload::Kind;

pub mod inspect;
pub mod pack;
pub mod unpack;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serialize a value and print one delivery per fragment.
    Pack(PackArgs),
    /// Reassemble deliveries and print each completed value.
    Unpack(UnpackArgs),
    /// Decode a route's endpoint and fragment header.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Pack(args) => pack::run(args, format),
        Command::Unpack(args) => unpack::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct PackArgs {
    /// Endpoint the message is addressed to.
    #[arg(long, short = 'e')]
    pub endpoint: String,
    /// Value schema.
    #[arg(long, short = 'k', value_enum, default_value = "text")]
    pub kind: Kind,
    /// Inline payload.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Maximum fragment size.
    #[arg(long, default_value_t = DEFAULT_FRAGMENT_BUDGET)]
    pub budget: usize,
}

#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// Value schema.
    #[arg(long, short = 'k', value_enum, default_value = "text")]
    pub kind: Kind,
    /// Only decode messages for this endpoint.
    #[arg(long, short = 'e')]
    pub endpoint: Option<String>,
    /// Read deliveries from file instead of stdin.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Drop undecodable routes instead of failing.
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Route in `endpointToken:headerToken` form.
    pub route: String,
    /// Decode malformed tokens as empty instead of failing.
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
