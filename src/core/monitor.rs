//! One monitoring pass: poll every device in order, aggregate the findings
//! and mail the report when something needs ordering.

use crate::core::devices::DeviceDescriptor;
use crate::core::extract::{extract_device, PageSource};
use crate::core::mail::Notifier;
use crate::core::report::{evaluate_device, Report, ReportEntry};
use crate::core::status_log::StatusLog;

/// What happened to the report email
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailOutcome {
    NotNeeded,
    DryRun,
    Sent(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub devices: usize,
    pub failed_devices: usize,
    pub report: Report,
    pub email: EmailOutcome,
}

pub struct SupplyMonitor<'a> {
    source: &'a dyn PageSource,
    log: &'a StatusLog,
}

impl<'a> SupplyMonitor<'a> {
    pub fn new(source: &'a dyn PageSource, log: &'a StatusLog) -> Self {
        Self { source, log }
    }

    /// Poll each device sequentially. A device that cannot be read adds an
    /// error line to the report and never stops the remaining devices.
    pub fn collect(&self, devices: &[DeviceDescriptor]) -> (Report, usize) {
        let mut report = Report::new();
        let mut failed = 0;

        for device in devices {
            match extract_device(self.source, device) {
                Ok(readings) => report.extend(evaluate_device(device, &readings, self.log)),
                Err(e) => {
                    log::error!("{} Error: {}", device.name, e);
                    report.push(ReportEntry::error(&device.name, &e));
                    failed += 1;
                }
            }
        }

        (report, failed)
    }

    /// Full pass. `notifier` is `None` for a dry run. Mail failures are
    /// recorded in the summary, not returned as errors.
    pub fn run(
        &self,
        devices: &[DeviceDescriptor],
        notifier: Option<&dyn Notifier>,
        subject: &str,
    ) -> RunSummary {
        self.log.record("Supply monitor started.");

        let (report, failed_devices) = self.collect(devices);

        let email = if !report.needs_sending() {
            self.log.record("no email sent");
            EmailOutcome::NotNeeded
        } else if let Some(notifier) = notifier {
            self.log.record("send email");
            match notifier.send(subject, &report.body()) {
                Ok(id) => {
                    self.log.record(&format!("Message sent! ID: {}", id));
                    EmailOutcome::Sent(id)
                }
                Err(e) => {
                    log::error!("Email failed: {}", e);
                    self.log.record(&format!("Email failed: {}", e));
                    EmailOutcome::Failed(e.to_string())
                }
            }
        } else {
            self.log.record("dry run, email not sent");
            EmailOutcome::DryRun
        };

        self.log.record("Supply monitor completed.");

        RunSummary {
            devices: devices.len(),
            failed_devices,
            report,
            email,
        }
    }
}
