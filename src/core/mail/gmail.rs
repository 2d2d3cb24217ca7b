use super::{oauth, Notifier};
use crate::core::config::MailSettings;
use crate::error::{Result, SupplyError};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const SEND_ENDPOINT: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

/// Sends the report through the Gmail API using the stored OAuth token
pub struct GmailNotifier {
    settings: MailSettings,
    http: reqwest::blocking::Client,
    send_endpoint: String,
}

impl GmailNotifier {
    pub fn new(settings: MailSettings, timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            settings,
            http,
            send_endpoint: SEND_ENDPOINT.to_string(),
        })
    }

    /// Send through another messages endpoint, e.g. a local relay
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.send_endpoint = endpoint.into();
        self
    }
}

/// RFC 2822 plain text message
pub fn compose_message(to: &str, from: &str, subject: &str, body: &str) -> String {
    let body = body.replace("\r\n", "\n").replace('\n', "\r\n");
    format!(
        "Content-Type: text/plain; charset=\"utf-8\"\r\n\
         MIME-Version: 1.0\r\n\
         Content-Transfer-Encoding: 8bit\r\n\
         to: {}\r\n\
         from: {}\r\n\
         subject: {}\r\n\
         \r\n\
         {}",
        to, from, subject, body
    )
}

/// URL-safe base64 with padding, as the `raw` field expects
pub fn encode_raw(message: &str) -> String {
    URL_SAFE.encode(message.as_bytes())
}

impl Notifier for GmailNotifier {
    fn send(&self, subject: &str, body: &str) -> Result<String> {
        let recipient = self
            .settings
            .get_recipient()
            .ok_or_else(|| SupplyError::config("No mail recipient configured"))?;
        let sender = self
            .settings
            .get_sender()
            .ok_or_else(|| SupplyError::config("No mail sender configured"))?;

        let access_token = oauth::access_token(&self.http, &self.settings)?;
        let raw = encode_raw(&compose_message(recipient, sender, subject, body));

        let response = self
            .http
            .post(&self.send_endpoint)
            .bearer_auth(access_token)
            .json(&json!({ "raw": raw }))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(SupplyError::mail(format!(
                "Gmail API returned {}: {}",
                status,
                text.trim()
            )));
        }

        let sent: SentMessage = response.json()?;
        Ok(sent.id)
    }
}
