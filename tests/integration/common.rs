use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;
use supplymon::core::extract::{Locator, PageSource};
use supplymon::core::mail::Notifier;
use supplymon::core::StatusLog;
use supplymon::{Result, SupplyError};
use tempfile::TempDir;

/// Canned device pages keyed by URL; unknown URLs behave like an
/// unreachable host.
#[derive(Default)]
pub struct FakeSource {
    pub html: HashMap<String, String>,
    pub rendered: HashMap<String, Option<String>>,
    pub rendered_calls: RefCell<Vec<(String, Locator)>>,
}

impl FakeSource {
    pub fn with_html(mut self, url: &str, html: String) -> Self {
        self.html.insert(url.to_string(), html);
        self
    }

    pub fn with_rendered(mut self, url: &str, text: Option<&str>) -> Self {
        self.rendered
            .insert(url.to_string(), text.map(str::to_string));
        self
    }
}

impl PageSource for FakeSource {
    fn fetch_html(&self, url: &str) -> Result<String> {
        self.html.get(url).cloned().ok_or_else(|| {
            SupplyError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("connection refused ({})", url),
            ))
        })
    }

    fn query_rendered(
        &self,
        url: &str,
        locator: &Locator,
        _timeout: Duration,
    ) -> Result<Option<String>> {
        self.rendered_calls
            .borrow_mut()
            .push((url.to_string(), locator.clone()));
        self.rendered
            .get(url)
            .cloned()
            .ok_or_else(|| SupplyError::browser(format!("net::ERR_CONNECTION_REFUSED at {}", url)))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: RefCell<Vec<(String, String)>>,
}

impl Notifier for RecordingNotifier {
    fn send(&self, subject: &str, body: &str) -> Result<String> {
        self.sent
            .borrow_mut()
            .push((subject.to_string(), body.to_string()));
        Ok(format!("msg-{}", self.sent.borrow().len()))
    }
}

pub fn temp_log() -> (TempDir, StatusLog) {
    let temp_dir = TempDir::new().unwrap();
    let log = StatusLog::new(temp_dir.path().join("supply_monitor.log"));
    (temp_dir, log)
}

pub fn read_log(log: &StatusLog) -> String {
    std::fs::read_to_string(log.path()).unwrap_or_default()
}

/// HP-style supplies page with one `mainContentArea` table per supply.
/// The collection unit status goes in its own labelled supply table, or in
/// an unlabelled status table when `labelled_unit` is false.
pub fn supplies_page(supplies: &[(&str, &str)], unit_status: &str, labelled_unit: bool) -> String {
    let mut tables = String::new();
    for (name, level) in supplies {
        tables.push_str(&format!(
            r#"<table class="mainContentArea">
  <tr>
    <td class="SupplyName width65">{}
      HP 410X</td>
    <td class="SupplyName width35 alignRight">{}</td>
  </tr>
</table>
"#,
            name, level
        ));
    }

    let unit_label = if labelled_unit {
        r#"<tr><td class="SupplyName width65">Toner Collection Unit</td></tr>"#
    } else {
        ""
    };
    tables.push_str(&format!(
        r#"<table class="mainContentArea">
  {}
  <tr><td>Status:</td><td>{}</td></tr>
</table>
"#,
        unit_label, unit_status
    ));

    format!("<html><head><title>Supplies</title></head><body>{}</body></html>", tables)
}
