use anyhow::Result;

use darkbay_exporter::commands::{self, build_cli};
use darkbay_exporter::core::DeviceKind;

fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("helios", sub_matches)) => commands::serve::execute(DeviceKind::Helios, sub_matches),
        Some(("smartpdu", sub_matches)) => {
            commands::serve::execute(DeviceKind::SmartPdu, sub_matches)
        }
        Some(("version", _)) => commands::version::execute(),
        _ => {
            println!("Use 'darkbay-exporter --help' for more information.");
            Ok(())
        }
    }
}
