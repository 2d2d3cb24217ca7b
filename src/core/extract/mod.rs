//! Per-device-type extraction of consumable readings.
//!
//! Each device family is scraped differently (static HTML parse or a
//! script-rendered page), but every extractor produces the same
//! [`Reading`] shape so the report aggregator never needs to know how a
//! page was acquired.

pub mod live;
pub mod mfp;
pub mod pages_remaining;
pub mod parse;
pub mod toner;

pub use live::LivePageSource;

use crate::core::devices::{DeviceDescriptor, DeviceKind};
use crate::error::Result;
use std::fmt;
use std::time::Duration;

/// Consumable level that may be unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Known(u32),
    Unknown,
}

impl Level {
    pub fn known(&self) -> Option<u32> {
        match self {
            Level::Known(value) => Some(*value),
            Level::Unknown => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Known(value) => write!(f, "{}", value),
            Level::Unknown => write!(f, "unknown"),
        }
    }
}

/// One named consumable metric read from a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reading {
    PagesRemaining(u32),
    TonerPercent(Level),
    WasteToner(String),
    Cartridge { name: String, level: Level },
}

/// Structural path to an element on a rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    /// JavaScript expression evaluating to the element's text, or null
    pub fn text_expression(&self) -> String {
        match self {
            Locator::Css(selector) => format!(
                "(() => {{ const el = document.querySelector({}); return el ? el.innerText : null; }})()",
                js_string(selector)
            ),
            Locator::XPath(xpath) => format!(
                "(() => {{ const node = document.evaluate({}, document, null, \
                 XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue; \
                 return node ? (node.innerText ?? node.textContent) : null; }})()",
                js_string(xpath)
            ),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(selector) => write!(f, "css '{}'", selector),
            Locator::XPath(xpath) => write!(f, "xpath '{}'", xpath),
        }
    }
}

fn js_string(value: &str) -> String {
    // JSON string literals are valid JavaScript string literals
    serde_json::Value::String(value.to_string()).to_string()
}

/// Page acquisition backend
pub trait PageSource {
    /// Fetch a static page without executing scripts
    fn fetch_html(&self, url: &str) -> Result<String>;

    /// Load a page in a script engine and read an element's text.
    /// Returns `Ok(None)` when the element does not appear within `timeout`.
    fn query_rendered(
        &self,
        url: &str,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Option<String>>;

    /// Wait used for rendered lookups
    fn element_timeout(&self) -> Duration {
        Duration::from_secs(10)
    }
}

/// Extraction strategy for one device type
pub trait Extract {
    fn extract(&self, source: &dyn PageSource) -> Result<Vec<Reading>>;
}

impl DeviceKind {
    pub fn extractor(&self) -> &dyn Extract {
        match self {
            DeviceKind::PagesRemaining(spec) => spec,
            DeviceKind::Toner(spec) => spec,
            DeviceKind::Mfp(spec) => spec,
        }
    }
}

/// Read every metric a device exposes
pub fn extract_device(source: &dyn PageSource, device: &DeviceDescriptor) -> Result<Vec<Reading>> {
    log::debug!(
        "Extracting {} ({}) from {}",
        device.name,
        device.kind.type_tag(),
        device.kind.url()
    );
    device.kind.extractor().extract(source)
}
