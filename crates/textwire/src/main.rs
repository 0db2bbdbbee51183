mod cmd;
mod exit;
mod logging;
mod output;
mod payload;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "textwire", version, about = "Pack and unpack fragmented text-wire messages")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Kind;

    #[test]
    fn parses_pack_subcommand() {
        let cli = Cli::try_parse_from([
            "textwire", "pack", "--endpoint", "jobs", "--kind", "ints", "--data", "1,2,3",
        ])
        .expect("pack args should parse");

        match cli.command {
            Command::Pack(args) => {
                assert_eq!(args.endpoint, "jobs");
                assert_eq!(args.kind, Kind::Ints);
                assert_eq!(args.budget, textwire_frame::DEFAULT_FRAGMENT_BUDGET);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "textwire", "pack", "--endpoint", "e", "--data", "x", "--file", "/tmp/x",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn pack_requires_endpoint() {
        let err = Cli::try_parse_from(["textwire", "pack", "--data", "x"])
            .expect_err("missing endpoint should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parses_inspect_with_global_format() {
        let cli = Cli::try_parse_from(["textwire", "inspect", "(0x00):(0x00)", "--format", "json"])
            .expect("inspect args should parse");
        assert!(matches!(cli.command, Command::Inspect(_)));
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }
}
