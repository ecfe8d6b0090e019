mod cmd;
mod dictionary;
mod executor;
mod exit;
mod logging;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::LoggingArgs;

#[derive(Parser, Debug)]
#[command(
    name = "gndlink",
    version,
    about = "Frame commands and telemetry over serial/Ethernet links"
)]
struct Cli {
    #[command(flatten)]
    logging: LoggingArgs,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    cli.logging.init();

    match cmd::run(cli.command) {
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

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "gndlink",
            "send",
            "--port",
            "0.0.0.0:55200/127.0.0.1:55201",
            "--dictionary",
            "dict.json",
            "MATH.ADD",
            "10",
            "20",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.command, "MATH.ADD");
                assert_eq!(args.args, vec!["10".to_string(), "20".to_string()]);
            }
            other => panic!("expected send, got {other:?}"),
        }
    }

    #[test]
    fn parses_listen_with_serial_port() {
        let cli = Cli::try_parse_from([
            "gndlink",
            "listen",
            "--port-type",
            "serial",
            "--port",
            "/dev/ttyUSB0",
            "--baud",
            "115200",
            "--dictionary",
            "dict.json",
        ])
        .expect("listen args should parse");

        match cli.command {
            Command::Listen(args) => {
                assert_eq!(args.port.baud, 115_200);
                assert!(args.run_with.is_none());
            }
            other => panic!("expected listen, got {other:?}"),
        }
    }

    #[test]
    fn telemetry_defaults_to_ground_mode() {
        let cli = Cli::try_parse_from([
            "gndlink",
            "telemetry",
            "--port",
            "0.0.0.0:55200/127.0.0.1:55201",
            "--dictionary",
            "dict.json",
        ])
        .expect("telemetry args should parse");

        match cli.command {
            Command::Telemetry(args) => {
                assert!(matches!(args.mode, cmd::TelemetryMode::Ground));
                assert_eq!(args.interval, 1);
            }
            other => panic!("expected telemetry, got {other:?}"),
        }
    }

    #[test]
    fn dict_takes_optional_command() {
        let cli = Cli::try_parse_from(["gndlink", "dict", "dict.json", "MATH.ADD"])
            .expect("dict args should parse");
        assert!(matches!(cli.command, Command::Dict(_)));
    }

    #[test]
    fn port_is_required() {
        let err = Cli::try_parse_from(["gndlink", "listen", "--dictionary", "dict.json"])
            .expect_err("missing --port should fail");
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }
}
