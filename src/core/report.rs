//! Report aggregation.
//!
//! Evaluates each device's readings against its thresholds. Readings that
//! cross a threshold become [`ReportEntry`] values for the order email;
//! passing readings only go to the status log.

use crate::core::devices::{DeviceDescriptor, DeviceKind, MfpSpec};
use crate::core::extract::{Level, Reading};
use crate::core::status_log::StatusLog;
use std::fmt::Display;

pub const REPORT_HEADER: &str = "Order Printer Supplies:";
pub const WASTE_TONER_NORMAL: &str = "Normal";

/// A finding that goes into the email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub device: String,
    pub lines: Vec<String>,
    /// Ordering instruction rendered as "Order ..."
    pub order: Option<String>,
}

impl ReportEntry {
    pub fn supply(device: &str, line: String, order: Option<String>) -> Self {
        Self {
            device: device.to_string(),
            lines: vec![line],
            order,
        }
    }

    /// Device that could not be read at all
    pub fn error(device: &str, error: impl Display) -> Self {
        Self {
            device: device.to_string(),
            lines: vec![format!("{} Error: {}", device, error)],
            order: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = ReportEntry>) {
        self.entries.extend(entries);
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Email is only sent when at least one finding exists
    pub fn needs_sending(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Plain-text email body
    pub fn body(&self) -> String {
        let mut body = format!("{}\n\n", REPORT_HEADER);
        for entry in &self.entries {
            for line in &entry.lines {
                body.push_str(line);
                body.push('\n');
            }
            if let Some(order) = &entry.order {
                body.push_str(&format!("Order {}\n\n", order));
            }
        }
        body
    }
}

/// Pages-remaining devices order strictly below the threshold
pub fn pages_below_threshold(pages: u32, threshold: u32) -> bool {
    pages < threshold
}

/// Toner devices order at or below the threshold, never on an unknown level.
/// An unknown cartridge level is reported separately, not as an order.
pub fn toner_at_or_below(level: Level, threshold: u32) -> bool {
    matches!(level, Level::Known(value) if value <= threshold)
}

/// Exact, case-sensitive comparison against "Normal"
pub fn waste_toner_needs_order(status: &str) -> bool {
    status != WASTE_TONER_NORMAL
}

/// Turn one device's readings into report entries, logging passing ones
pub fn evaluate_device(
    device: &DeviceDescriptor,
    readings: &[Reading],
    log: &StatusLog,
) -> Vec<ReportEntry> {
    let name = device.name.as_str();
    let mut entries = Vec::new();

    for reading in readings {
        match (&device.kind, reading) {
            (DeviceKind::PagesRemaining(spec), Reading::PagesRemaining(pages)) => {
                let line = format!("{} Approximate Pages Remaining: {}", name, pages);
                if pages_below_threshold(*pages, spec.threshold) {
                    entries.push(ReportEntry::supply(name, line, Some(spec.model.clone())));
                } else {
                    log.record(&line);
                }
            }
            (DeviceKind::Toner(spec), Reading::TonerPercent(level)) => match level {
                Level::Known(percent) => {
                    let line = format!("{} Black toner percentage: {}%", name, percent);
                    if toner_at_or_below(*level, spec.threshold) {
                        entries.push(ReportEntry::supply(name, line, Some(spec.model.clone())));
                    } else {
                        log.record(&line);
                    }
                }
                Level::Unknown => {
                    log.record(&format!(
                        "{} Unable to determine the black toner percentage.",
                        name
                    ));
                }
            },
            (DeviceKind::Mfp(spec), Reading::WasteToner(status)) => {
                if waste_toner_needs_order(status) {
                    entries.push(ReportEntry::supply(
                        name,
                        format!("{} Toner Collection Unit Status: {}", name, status),
                        Some(format!(
                            "{} for {}",
                            spec.waste_toner_model,
                            spec.model_name()
                        )),
                    ));
                } else {
                    log.record(&format!("{} Waste Toner is normal", name));
                }
            }
            (DeviceKind::Mfp(spec), Reading::Cartridge { name: cartridge, level }) => {
                if let Some(entry) = evaluate_cartridge(name, spec, cartridge, *level, log) {
                    entries.push(entry);
                }
            }
            (kind, reading) => {
                log::warn!(
                    "Ignoring {:?} reading for {} device {}",
                    reading,
                    kind.type_tag(),
                    name
                );
            }
        }
    }

    entries
}

fn evaluate_cartridge(
    device: &str,
    spec: &MfpSpec,
    cartridge: &str,
    level: Level,
    log: &StatusLog,
) -> Option<ReportEntry> {
    match level {
        Level::Known(percent) if percent <= spec.toner_threshold => {
            let model_number = spec.model_number_for(cartridge);
            Some(ReportEntry::supply(
                device,
                format!("{} {} ({}): {}%", device, cartridge, model_number, percent),
                None,
            ))
        }
        Level::Known(percent) => {
            log.record(&format!("{} {}: {}", device, cartridge, percent));
            None
        }
        // Unreadable rows are surfaced so an operator can check the device
        Level::Unknown => Some(ReportEntry::supply(
            device,
            format!(
                "{} {} ({}): level unknown",
                device,
                cartridge,
                spec.model_number_for(cartridge)
            ),
            None,
        )),
    }
}
