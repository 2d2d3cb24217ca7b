//! Monitored device descriptors and the printers file loader.

use crate::error::{Result, SupplyError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use url::Url;

/// Table cell holding the estimated page count on the pages-remaining status page
pub const DEFAULT_PAGES_SELECTOR: &str =
    "#appConsumable-inkCart-tbl-Tbl > tbody > tr:nth-child(8) > td:nth-child(2)";

/// Supply rows that are never toner cartridges
pub const DEFAULT_EXCLUDED_SUPPLIES: &[&str] = &[
    "Toner Collection Unit",
    "Fuser",
    "Transfer",
    "Maintenance",
    "Imaging Drum",
];

/// Top-level layout of the printers file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintersFile {
    pub printers: Vec<DeviceDescriptor>,
}

/// One monitored printer or multifunction device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub kind: DeviceKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceKind {
    PagesRemaining(PagesRemainingSpec),
    Toner(TonerSpec),
    Mfp(MfpSpec),
}

/// Device reporting an estimated page count on a script-rendered page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagesRemainingSpec {
    pub url: String,
    pub threshold: u32,
    pub model: String,
    #[serde(default)]
    pub selector: Option<String>,
}

/// Device reporting a single toner percentage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TonerSpec {
    pub url: String,
    pub xpath: String,
    pub threshold: u32,
    pub model: String,
}

/// Colour MFP with a static supplies table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfpSpec {
    pub url: String,
    pub toner_threshold: u32,
    pub waste_toner_model: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub model_numbers: HashMap<String, String>,
    #[serde(default)]
    pub exclude_supplies: Option<Vec<String>>,
    #[serde(default)]
    pub drop_last_supply: bool,
}

impl DeviceKind {
    /// Type tag as written in the printers file
    pub fn type_tag(&self) -> &'static str {
        match self {
            DeviceKind::PagesRemaining(_) => "pages_remaining",
            DeviceKind::Toner(_) => "toner",
            DeviceKind::Mfp(_) => "mfp",
        }
    }

    pub fn url(&self) -> &str {
        match self {
            DeviceKind::PagesRemaining(spec) => &spec.url,
            DeviceKind::Toner(spec) => &spec.url,
            DeviceKind::Mfp(spec) => &spec.url,
        }
    }

    /// Human readable threshold summary for listings
    pub fn threshold_summary(&self) -> String {
        match self {
            DeviceKind::PagesRemaining(spec) => format!("< {} pages", spec.threshold),
            DeviceKind::Toner(spec) => format!("<= {}%", spec.threshold),
            DeviceKind::Mfp(spec) => format!("<= {}% per cartridge", spec.toner_threshold),
        }
    }
}

impl PagesRemainingSpec {
    pub fn selector(&self) -> &str {
        self.selector.as_deref().unwrap_or(DEFAULT_PAGES_SELECTOR)
    }
}

impl MfpSpec {
    /// Printer model named in waste toner order lines
    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or("MFP")
    }

    /// Part number for a cartridge, keyed by the first word of its label
    pub fn model_number_for(&self, cartridge: &str) -> &str {
        cartridge
            .split_whitespace()
            .next()
            .and_then(|colour| self.model_numbers.get(colour))
            .map(String::as_str)
            .unwrap_or("Unknown Model")
    }

    /// Whether a supply row label names something other than a cartridge
    pub fn is_excluded_supply(&self, label: &str) -> bool {
        match &self.exclude_supplies {
            Some(prefixes) => prefixes.iter().any(|p| label.starts_with(p.as_str())),
            None => DEFAULT_EXCLUDED_SUPPLIES
                .iter()
                .any(|p| label.starts_with(p)),
        }
    }
}

/// Parse and validate the printers file contents
pub fn parse_devices(content: &str) -> Result<Vec<DeviceDescriptor>> {
    let file: PrintersFile = serde_yml::from_str(content)?;
    validate_devices(&file.printers)?;
    Ok(file.printers)
}

/// Load the printers file from disk
pub fn load_devices(path: &Path) -> Result<Vec<DeviceDescriptor>> {
    let content = fs::read_to_string(path).map_err(|e| {
        SupplyError::config(format!(
            "Failed to read printers file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_devices(&content)
}

fn validate_devices(devices: &[DeviceDescriptor]) -> Result<()> {
    if devices.is_empty() {
        return Err(SupplyError::config("No printers configured"));
    }

    let mut seen = HashSet::new();
    for device in devices {
        let name = device.name.trim();
        if name.is_empty() {
            return Err(SupplyError::config("Printer name cannot be empty"));
        }
        if !seen.insert(name) {
            return Err(SupplyError::config(format!(
                "Duplicate printer name: {}",
                name
            )));
        }
        validate_device_url(name, device.kind.url())?;
    }

    Ok(())
}

fn validate_device_url(name: &str, url: &str) -> Result<()> {
    let parsed = Url::parse(url)
        .map_err(|e| SupplyError::config(format!("{}: invalid URL '{}': {}", name, url, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(SupplyError::config(format!(
                "{}: unsupported URL scheme '{}'",
                name, other
            )))
        }
    }

    if parsed.host_str().is_none() {
        return Err(SupplyError::config(format!("{}: URL has no host", name)));
    }

    Ok(())
}
