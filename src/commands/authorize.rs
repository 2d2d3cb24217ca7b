use crate::core::config::AppConfig;
use crate::core::mail::{oauth, ClientSecrets, StoredToken};
use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use dialoguer::Confirm;

/// Operator-run OAuth bootstrap. Scheduled runs never prompt; they rely on
/// the token stored here.
pub fn execute(config: &AppConfig) -> Result<()> {
    let mail = &config.mail;

    let secrets = ClientSecrets::load(&mail.credentials_path)?;

    if let Some(existing) = StoredToken::load(&mail.token_path)
        .with_context(|| format!("Unreadable token file {}", mail.token_path.display()))?
    {
        if existing.is_valid(Utc::now()) || existing.can_refresh() {
            let replace = Confirm::new()
                .with_prompt(format!(
                    "A usable token already exists at {}. Replace it?",
                    mail.token_path.display()
                ))
                .default(false)
                .interact()?;

            if !replace {
                println!("{}", "Keeping the existing token.".dimmed());
                return Ok(());
            }
        }
    }

    let http = reqwest::blocking::Client::builder()
        .timeout(config.http_timeout)
        .build()?;

    let token = oauth::authorize_interactive(&http, &secrets)?;
    token
        .save(&mail.token_path)
        .with_context(|| format!("Failed to write token {}", mail.token_path.display()))?;

    println!(
        "{} {}",
        "✓ Mail token saved to".green(),
        mail.token_path.display()
    );
    if !token.can_refresh() {
        println!(
            "{}",
            "⚠️  No refresh token was issued; scheduled runs will fail once it expires.".yellow()
        );
    }

    Ok(())
}
