// Mail delivery of the supply report

pub mod credentials;
pub mod gmail;
pub mod oauth;

pub use credentials::{ClientSecrets, StoredToken, GMAIL_SEND_SCOPE};
pub use gmail::GmailNotifier;

use crate::error::Result;

/// Delivers a finished report
pub trait Notifier {
    /// Send the message, returning the provider's message id
    fn send(&self, subject: &str, body: &str) -> Result<String>;
}
