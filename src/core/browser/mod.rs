// Headless browser support for script-rendered status pages

pub mod cdp;
pub mod launcher;

pub use cdp::query_text;
pub use launcher::{find_browser_executable, ChromeSession};
