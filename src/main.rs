use anyhow::Result;

use supplymon::cli::{build_cli, config_from_matches};
use supplymon::commands;

fn main() -> Result<()> {
    supplymon::init_logging();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("run", sub_matches)) => {
            let config = config_from_matches(&matches, Some(sub_matches));
            commands::run(&config, sub_matches)?;
        }
        Some(("authorize", _)) => {
            let config = config_from_matches(&matches, None);
            commands::authorize(&config)?;
        }
        Some(("devices", _)) => {
            let config = config_from_matches(&matches, None);
            commands::devices(&config)?;
        }
        Some(("version", _)) => {
            commands::version()?;
        }
        _ => {
            println!("Welcome to supplymon!");
            println!("Use 'supplymon --help' for more information.");
        }
    }

    Ok(())
}
