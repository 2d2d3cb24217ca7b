use super::{Locator, PageSource};
use crate::core::browser::{self, ChromeSession};
use crate::core::config::{AppConfig, BrowserSettings};
use crate::error::Result;
use std::time::Duration;

/// Real page acquisition: plain HTTP for static pages, a headless browser
/// session per call for script-rendered ones.
pub struct LivePageSource {
    http: reqwest::blocking::Client,
    browser: BrowserSettings,
}

impl LivePageSource {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("supplymon/", env!("CARGO_PKG_VERSION")))
            // Printer web servers commonly use self-signed certificates
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            http,
            browser: config.browser.clone(),
        })
    }
}

impl PageSource for LivePageSource {
    fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send()?.error_for_status()?;
        Ok(response.text()?)
    }

    fn query_rendered(
        &self,
        url: &str,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Option<String>> {
        // Dropping the session kills the browser and removes its profile
        let session = ChromeSession::launch(&self.browser)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        runtime.block_on(browser::query_text(session.port(), url, locator, timeout))
    }

    fn element_timeout(&self) -> Duration {
        self.browser.element_timeout
    }
}
