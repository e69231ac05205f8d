pub mod serve;
pub mod version;

use clap::{Arg, Command};

use crate::core::config::{DEFAULT_PORT, DEFAULT_PROTOCOL, DEFAULT_TIMEOUT_SECS};

/// Arguments shared by every device subcommand
fn device_command(name: &'static str, about: &'static str, host_help: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(
            Arg::new("host")
                .help(host_help)
                .required(true)
                .index(1)
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help(format!("Port to serve metrics on (default: {})", DEFAULT_PORT))
                .value_parser(clap::value_parser!(u16))
                .default_value("9091")
        )
        .arg(
            Arg::new("protocol")
                .long("protocol")
                .value_name("PROTOCOL")
                .help(format!("Device API protocol (default: {})", DEFAULT_PROTOCOL))
                .value_parser(["http", "https"])
                .default_value(DEFAULT_PROTOCOL.as_str())
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .help(format!("Device request timeout (default: {})", DEFAULT_TIMEOUT_SECS))
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("30")
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug logging")
                .action(clap::ArgAction::SetTrue)
        )
}

pub fn build_cli() -> Command {
    Command::new("darkbay-exporter")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Prometheus exporters for Helios processors and smartPDUs")
        .long_about(
            "Prometheus exporters for Helios processors and smartPDUs\n\n\
             Run one process per device. Proxy settings may be supplied as a JSON\n\
             object in the PROXIES environment variable, e.g.\n    \
             PROXIES='{\"http\": \"http://proxy:3128\"}'",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(device_command(
            "helios",
            "Export receiver temperatures and basics from a Megapixel Helios processor",
            "IP or name of helios processor",
        ))
        .subcommand(device_command(
            "smartpdu",
            "Export input voltage, current and frequency from a smartPDU",
            "IP or name of smartPDU",
        ))
        .subcommand(
            Command::new("version")
                .about("Shows version information")
        )
}
