use super::parse::first_number;
use super::{Extract, Level, Locator, PageSource, Reading};
use crate::core::devices::TonerSpec;
use crate::error::Result;

impl Extract for TonerSpec {
    /// Soft-failing: any lookup problem yields an unknown level so the run
    /// carries on with the remaining devices.
    fn extract(&self, source: &dyn PageSource) -> Result<Vec<Reading>> {
        let locator = Locator::XPath(self.xpath.clone());

        let level = match source.query_rendered(&self.url, &locator, source.element_timeout()) {
            Ok(Some(text)) => {
                let level = first_number(&text);
                if level == Level::Unknown {
                    log::warn!("No numeric value in toner text '{}' at {}", text.trim(), self.url);
                }
                level
            }
            Ok(None) => {
                log::warn!("Toner element {} did not appear at {}", locator, self.url);
                Level::Unknown
            }
            Err(e) => {
                log::warn!("Error fetching toner status from {}: {}", self.url, e);
                Level::Unknown
            }
        };

        Ok(vec![Reading::TonerPercent(level)])
    }
}
