use super::parse::parse_page_count;
use super::{Extract, Locator, PageSource, Reading};
use crate::core::devices::PagesRemainingSpec;
use crate::error::{ExtractionError, Result};

impl Extract for PagesRemainingSpec {
    /// The page count is filled in client-side, so the page is rendered and
    /// the cell read once scripts have populated it. A missing or
    /// non-numeric cell is an error for this device.
    fn extract(&self, source: &dyn PageSource) -> Result<Vec<Reading>> {
        let locator = Locator::Css(self.selector().to_string());
        let text = source
            .query_rendered(&self.url, &locator, source.element_timeout())?
            .ok_or_else(|| ExtractionError::ElementNotFound(locator.to_string()))?;

        let pages = parse_page_count(&text)?;
        Ok(vec![Reading::PagesRemaining(pages)])
    }
}
