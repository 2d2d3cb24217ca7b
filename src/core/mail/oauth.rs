// OAuth2 token handling for the mail API
//
// Scheduled runs only ever refresh a stored token. The interactive consent
// flow lives in `authorize_interactive` and is run by an operator through
// `supplymon authorize`.

use super::credentials::{ClientSecrets, StoredToken, TokenResponse, GMAIL_SEND_SCOPE};
use crate::core::config::MailSettings;
use crate::error::{Result, SupplyError};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use url::Url;
use uuid::Uuid;

/// How long the redirect listener may take to close after the code arrives
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Access token for a scheduled run. Never prompts: a missing or
/// unrefreshable token is an authorization error.
pub fn access_token(http: &reqwest::blocking::Client, settings: &MailSettings) -> Result<String> {
    let token = StoredToken::load(&settings.token_path)?.ok_or_else(|| {
        SupplyError::auth(format!(
            "No mail token at {}. Run `supplymon authorize` first.",
            settings.token_path.display()
        ))
    })?;

    if token.is_valid(Utc::now()) {
        return Ok(token.token);
    }

    if !token.can_refresh() {
        return Err(SupplyError::auth(
            "Mail token expired and has no refresh token. Run `supplymon authorize`.",
        ));
    }

    log::info!("Refreshing mail access token");
    let refreshed = refresh(http, &token)?;
    refreshed.save(&settings.token_path)?;
    Ok(refreshed.token)
}

/// Exchange the refresh token for a new access token
pub fn refresh(http: &reqwest::blocking::Client, token: &StoredToken) -> Result<StoredToken> {
    let refresh_token = token
        .refresh_token
        .as_deref()
        .ok_or_else(|| SupplyError::auth("Token has no refresh token"))?;

    let response = http
        .post(&token.token_uri)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", token.client_id.as_str()),
            ("client_secret", token.client_secret.as_str()),
        ])
        .send()?;

    let response = token_response(response)?;
    Ok(token.refreshed(response, Utc::now()))
}

fn token_response(response: reqwest::blocking::Response) -> Result<TokenResponse> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(SupplyError::auth(format!(
            "Token endpoint returned {}: {}",
            status,
            body.trim()
        )));
    }
    Ok(response.json()?)
}

/// Consent URL for the installed-app flow with a loopback redirect
pub fn consent_url(secrets: &ClientSecrets, redirect_uri: &str, state: &str) -> Result<Url> {
    Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", GMAIL_SEND_SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )
    .map_err(|e| SupplyError::config(format!("Invalid auth_uri '{}': {}", secrets.auth_uri, e)))
}

/// Query string the consent page redirects back with
#[derive(Debug, Default, Deserialize)]
pub struct RedirectParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Authorization code from a redirect whose `state` already matched
pub fn code_from_redirect(params: RedirectParams) -> Result<String> {
    if let Some(error) = params.error {
        return Err(SupplyError::auth(format!("Authorization denied: {}", error)));
    }
    params
        .code
        .ok_or_else(|| SupplyError::auth("Redirect did not include an authorization code"))
}

#[derive(Clone)]
struct RedirectState {
    expected_state: String,
    outcome: mpsc::UnboundedSender<Result<String>>,
}

async fn handle_redirect(
    State(redirect): State<RedirectState>,
    Query(params): Query<RedirectParams>,
) -> (StatusCode, &'static str) {
    // Stale tabs and forged requests are turned away without ending the wait
    if params.state.as_deref() != Some(redirect.expected_state.as_str()) {
        log::warn!("Ignoring authorization redirect with a mismatched state");
        return (StatusCode::BAD_REQUEST, "Authorization state mismatch.");
    }

    let outcome = code_from_redirect(params);
    let reply = match &outcome {
        Ok(_) => (
            StatusCode::OK,
            "Authorization received. You may close this window.",
        ),
        Err(_) => (StatusCode::OK, "Authorization was not granted."),
    };
    let _ = redirect.outcome.send(outcome);
    reply
}

fn redirect_router(expected_state: String, outcome: mpsc::UnboundedSender<Result<String>>) -> Router {
    Router::new()
        .route("/", get(handle_redirect))
        .with_state(RedirectState {
            expected_state,
            outcome,
        })
}

/// Serve the loopback redirect URI until the consent page redirects back
/// with the expected `state`. Requests for other paths get a 404.
pub async fn wait_for_code(listener: TcpListener, expected_state: String) -> Result<String> {
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = redirect_router(expected_state, outcome_tx);
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let outcome = outcome_rx
        .recv()
        .await
        .unwrap_or_else(|| Err(SupplyError::auth("Redirect listener stopped unexpectedly")));

    let _ = shutdown_tx.send(());
    if tokio::time::timeout(SHUTDOWN_GRACE, server).await.is_err() {
        log::debug!("Redirect listener did not stop within {:?}", SHUTDOWN_GRACE);
    }

    outcome
}

/// Unguessable `state` value binding the redirect to this consent request
fn new_state() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Interactive consent flow: prints the consent URL, waits for the loopback
/// redirect and exchanges the code for a token. Operator use only.
pub fn authorize_interactive(
    http: &reqwest::blocking::Client,
    secrets: &ClientSecrets,
) -> Result<StoredToken> {
    let state = new_state();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let (redirect_uri, code) = runtime.block_on(async {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let redirect_uri = format!("http://127.0.0.1:{}/", listener.local_addr()?.port());

        let url = consent_url(secrets, &redirect_uri, &state)?;
        println!("Open this URL in a browser to authorize sending mail:\n\n  {}\n", url);
        println!("Waiting for the authorization redirect on {} ...", redirect_uri);

        let code = wait_for_code(listener, state.clone()).await?;
        Ok::<_, SupplyError>((redirect_uri, code))
    })?;

    let response = http
        .post(&secrets.token_uri)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
        ])
        .send()?;

    let response = token_response(response)?;
    Ok(StoredToken::from_response(secrets, response, Utc::now()))
}
