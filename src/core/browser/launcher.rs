// Headless Chrome/Chromium launcher with DevTools (CDP) enabled
// One session per rendered lookup; the browser never outlives the session.

use crate::core::config::BrowserSettings;
use crate::error::{Result, SupplyError};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const PORT_CHECK_INTERVAL_MS: u64 = 100;

/// Executables tried in order when no explicit browser path is configured
const BROWSER_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Running headless browser bound to a throw-away profile.
///
/// Dropping the session kills the process and deletes the profile, so every
/// exit path of a lookup (success, error, panic unwinding) releases it.
pub struct ChromeSession {
    process: Child,
    port: u16,
    profile: TempDir,
}

impl ChromeSession {
    /// Start a headless browser and wait until its DevTools port is known
    pub fn launch(settings: &BrowserSettings) -> Result<Self> {
        let executable = find_browser_executable(settings.chrome_path.as_deref())?;

        let profile = tempfile::Builder::new()
            .prefix("supplymon-chrome-")
            .tempdir()?;

        let process = Command::new(&executable)
            .args(browser_args(profile.path()))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                SupplyError::browser(format!(
                    "Failed to start {}: {}",
                    executable.display(),
                    e
                ))
            })?;

        log::debug!("Started {} (pid {})", executable.display(), process.id());

        let mut session = Self {
            process,
            port: 0,
            profile,
        };
        session.port = session.wait_for_devtools_port(settings.startup_timeout)?;

        Ok(session)
    }

    /// DevTools HTTP/WebSocket port on 127.0.0.1
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn profile_dir(&self) -> &Path {
        self.profile.path()
    }

    /// Chrome writes the chosen port to `DevToolsActivePort` in the profile
    fn wait_for_devtools_port(&mut self, timeout: Duration) -> Result<u16> {
        let port_file = self.profile.path().join("DevToolsActivePort");
        let start = Instant::now();

        loop {
            if let Ok(Some(status)) = self.process.try_wait() {
                return Err(SupplyError::browser(format!(
                    "Browser exited during startup ({})",
                    status
                )));
            }

            if let Some(port) = fs::read_to_string(&port_file)
                .ok()
                .and_then(|content| parse_devtools_port(&content))
            {
                return Ok(port);
            }

            if start.elapsed() > timeout {
                return Err(SupplyError::browser(format!(
                    "Browser did not open a DevTools port within {} seconds",
                    timeout.as_secs()
                )));
            }

            std::thread::sleep(Duration::from_millis(PORT_CHECK_INTERVAL_MS));
        }
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        log::debug!("Stopping browser (pid {})", self.process.id());
        let _ = self.process.kill();
        let _ = self.process.wait(); // Wait for process to fully terminate
    }
}

/// First line of `DevToolsActivePort` is the port number
fn parse_devtools_port(content: &str) -> Option<u16> {
    content
        .lines()
        .next()
        .and_then(|line| line.trim().parse::<u16>().ok())
        .filter(|port| *port != 0)
}

/// Command line for a headless session on `profile`. Certificate errors are
/// ignored like the static fetch does, since printers ship self-signed certs.
fn browser_args(profile: &Path) -> Vec<String> {
    vec![
        "--headless=new".to_string(),
        "--disable-gpu".to_string(),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        "--ignore-certificate-errors".to_string(),
        "--remote-debugging-port=0".to_string(),
        format!("--user-data-dir={}", profile.display()),
        "about:blank".to_string(),
    ]
}

/// Find the browser executable, honouring an explicit configured path
pub fn find_browser_executable(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        // Allow a bare command name resolved through PATH
        return which::which(path).map_err(|_| {
            SupplyError::browser(format!("Browser not found: {}", path.display()))
        });
    }

    BROWSER_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or_else(|| {
            SupplyError::browser(format!(
                "No Chrome/Chromium executable found on PATH (tried: {}). \
                 Set --chrome or CHROME_PATH.",
                BROWSER_CANDIDATES.join(", ")
            ))
        })
}
