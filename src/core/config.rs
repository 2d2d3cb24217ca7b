use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SUBJECT: &str = "Printer Monitoring Report: Order Supplies";

/// Settings for the mail notifier and its OAuth token
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub credentials_path: PathBuf,
    pub token_path: PathBuf,
    pub recipient: Option<String>,
    /// Falls back to the recipient when unset
    pub sender: Option<String>,
    pub subject: String,
}

/// Headless browser settings for script-rendered status pages
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub chrome_path: Option<PathBuf>,
    pub startup_timeout: Duration,
    pub element_timeout: Duration,
}

/// Run configuration, built once at startup and passed down explicitly
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub printers_path: PathBuf,
    pub log_file: PathBuf,
    pub mail: MailSettings,
    pub browser: BrowserSettings,
    pub http_timeout: Duration,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            credentials_path: PathBuf::from("credentials.json"),
            token_path: PathBuf::from("token.json"),
            recipient: None,
            sender: None,
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            chrome_path: None,
            startup_timeout: Duration::from_secs(15),
            element_timeout: Duration::from_secs(10),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            printers_path: PathBuf::from("printers.yaml"),
            log_file: PathBuf::from("supply_monitor.log"),
            mail: MailSettings::default(),
            browser: BrowserSettings::default(),
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl MailSettings {
    pub fn get_recipient(&self) -> Option<&str> {
        self.recipient.as_deref()
    }

    pub fn get_sender(&self) -> Option<&str> {
        self.sender.as_deref().or(self.recipient.as_deref())
    }
}
