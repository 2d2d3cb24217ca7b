// OAuth client secrets and the persisted user token

use crate::error::{Result, SupplyError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";

/// Tokens this close to expiry are treated as expired
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Client registration as downloaded from the Google Cloud console
#[derive(Debug, Clone, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

impl ClientSecrets {
    pub fn parse(content: &str) -> Result<Self> {
        let file: ClientSecretsFile = serde_json::from_str(content)?;
        file.installed.or(file.web).ok_or_else(|| {
            SupplyError::config("Client secrets file has neither an 'installed' nor a 'web' section")
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SupplyError::config(format!(
                "Failed to read mail credentials {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }
}

/// Authorized-user token as persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl StoredToken {
    /// Build a token from a fresh token endpoint response
    pub fn from_response(secrets: &ClientSecrets, response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            token: response.access_token,
            refresh_token: response.refresh_token,
            token_uri: secrets.token_uri.clone(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            scopes: scopes_from(response.scope.as_deref()),
            expiry: response.expires_in.map(|secs| now + Duration::seconds(secs)),
        }
    }

    /// Apply a refresh response; the refresh token is kept unless rotated
    pub fn refreshed(&self, response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            token: response.access_token,
            refresh_token: response.refresh_token.or_else(|| self.refresh_token.clone()),
            scopes: match response.scope {
                Some(scope) => scopes_from(Some(&scope)),
                None => self.scopes.clone(),
            },
            expiry: response.expires_in.map(|secs| now + Duration::seconds(secs)),
            ..self.clone()
        }
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry > now + Duration::seconds(EXPIRY_MARGIN_SECS),
            // No recorded expiry: only trust it if it cannot be refreshed
            None => self.refresh_token.is_none(),
        }
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Load the stored token; `Ok(None)` when no token file exists yet
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

fn scopes_from(scope: Option<&str>) -> Vec<String> {
    match scope {
        Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
        None => vec![GMAIL_SEND_SCOPE.to_string()],
    }
}
