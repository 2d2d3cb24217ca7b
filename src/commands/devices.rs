use crate::core::config::AppConfig;
use crate::core::devices::{load_devices, DeviceKind};
use anyhow::{Context, Result};
use colored::Colorize;

/// List the configured printers after validating the printers file
pub fn execute(config: &AppConfig) -> Result<()> {
    let devices = load_devices(&config.printers_path)
        .with_context(|| format!("Invalid printers file {}", config.printers_path.display()))?;

    println!(
        "{}",
        format!(
            "{} printer(s) in {}",
            devices.len(),
            config.printers_path.display()
        )
        .cyan()
        .bold()
    );
    println!();

    for device in &devices {
        println!(
            "  {} {}",
            device.name.white().bold(),
            format!("[{}]", device.kind.type_tag()).dimmed()
        );
        println!("    {} {}", "url:".dimmed(), device.kind.url());
        println!(
            "    {} {}",
            "order when:".dimmed(),
            device.kind.threshold_summary()
        );

        if let DeviceKind::Mfp(spec) = &device.kind {
            let mut colours: Vec<_> = spec.model_numbers.iter().collect();
            colours.sort();
            for (colour, model) in colours {
                println!("    {} {} -> {}", "cartridge:".dimmed(), colour, model);
            }
            if spec.drop_last_supply {
                println!(
                    "    {}",
                    "drops the last supply row before evaluation".yellow()
                );
            }
        }
    }

    Ok(())
}
