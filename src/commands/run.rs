use crate::core::config::AppConfig;
use crate::core::devices::{load_devices, DeviceDescriptor};
use crate::core::extract::LivePageSource;
use crate::core::mail::{GmailNotifier, Notifier};
use crate::core::monitor::{EmailOutcome, RunSummary, SupplyMonitor};
use crate::core::status_log::StatusLog;
use anyhow::{anyhow, Context, Result};
use colored::Colorize;

/// Execute one monitoring pass
pub fn execute(config: &AppConfig, matches: &clap::ArgMatches) -> Result<()> {
    let dry_run = matches.get_flag("dry-run");
    let only: Vec<String> = matches
        .get_many::<String>("device")
        .map(|names| names.cloned().collect())
        .unwrap_or_default();

    let devices = load_devices(&config.printers_path)
        .with_context(|| format!("Invalid printers file {}", config.printers_path.display()))?;
    let devices = select_devices(devices, &only)?;

    let source = LivePageSource::new(config).context("Failed to set up page fetching")?;
    let log = StatusLog::new(&config.log_file);
    let monitor = SupplyMonitor::new(&source, &log);

    let notifier = if dry_run {
        None
    } else {
        Some(
            GmailNotifier::new(config.mail.clone(), config.http_timeout)
                .context("Failed to set up mail client")?,
        )
    };

    let summary = monitor.run(
        &devices,
        notifier.as_ref().map(|n| n as &dyn Notifier),
        &config.mail.subject,
    );

    print_summary(&summary);
    Ok(())
}

/// Restrict the run to the named devices, keeping configured order
fn select_devices(devices: Vec<DeviceDescriptor>, only: &[String]) -> Result<Vec<DeviceDescriptor>> {
    if only.is_empty() {
        return Ok(devices);
    }

    if let Some(missing) = only
        .iter()
        .find(|name| !devices.iter().any(|d| &d.name == *name))
    {
        return Err(anyhow!("No printer named '{}' in the printers file", missing));
    }

    Ok(devices
        .into_iter()
        .filter(|d| only.contains(&d.name))
        .collect())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "{}",
        format!(
            "Checked {} printer(s), {} unreadable",
            summary.devices, summary.failed_devices
        )
        .cyan()
    );

    match &summary.email {
        EmailOutcome::NotNeeded => println!("{}", "✓ All supplies above thresholds, no email sent".green()),
        EmailOutcome::Sent(id) => println!("{} {}", "✓ Report sent, message id:".green(), id),
        EmailOutcome::Failed(e) => println!("{} {}", "⚠️  Report could not be sent:".yellow(), e),
        EmailOutcome::DryRun => {
            println!("{}", "Dry run, report not sent:".yellow());
            println!();
            print!("{}", summary.report.body());
        }
    }
}
