// Chrome DevTools Protocol client: navigate a page and read rendered text

use crate::core::extract::Locator;
use crate::error::{Result, SupplyError};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

const POLL_INTERVAL_MS: u64 = 250;

/// CDP target information
#[derive(Debug, Deserialize)]
struct CdpTarget {
    #[serde(rename = "webSocketDebuggerUrl")]
    ws_url: Option<String>,
    #[serde(rename = "type")]
    target_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct CdpRequest<'a> {
    id: u64,
    method: &'a str,
    params: Value,
}

/// Command response or event; events carry no id
#[derive(Debug, Deserialize)]
struct CdpResponse {
    id: Option<u64>,
    result: Option<Value>,
    error: Option<CdpError>,
}

#[derive(Debug, Deserialize)]
struct CdpError {
    message: String,
}

/// WebSocket URL of the first page target
async fn page_ws_url(port: u16) -> Result<String> {
    let targets: Vec<CdpTarget> = reqwest::get(format!("http://127.0.0.1:{}/json/list", port))
        .await?
        .json()
        .await?;

    targets
        .into_iter()
        .find(|t| t.ws_url.is_some() && t.target_type.as_deref() == Some("page"))
        .and_then(|t| t.ws_url)
        .ok_or_else(|| SupplyError::browser("No DevTools page target available"))
}

fn ws_error(e: tokio_tungstenite::tungstenite::Error) -> SupplyError {
    SupplyError::browser(format!("DevTools connection error: {}", e))
}

struct CdpConnection {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: u64,
}

impl CdpConnection {
    async fn connect(ws_url: &str) -> Result<Self> {
        let (ws, _) = connect_async(ws_url).await.map_err(ws_error)?;
        Ok(Self { ws, next_id: 1 })
    }

    /// Send a command and wait at most `limit` for its response
    async fn call(&mut self, method: &str, params: Value, limit: Duration) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;

        let request = CdpRequest { id, method, params };
        self.ws
            .send(Message::Text(serde_json::to_string(&request)?.into()))
            .await
            .map_err(ws_error)?;

        tokio::time::timeout(limit, self.read_response(id, method))
            .await
            .map_err(|_| SupplyError::browser(format!("{} timed out", method)))?
    }

    async fn read_response(&mut self, id: u64, method: &str) -> Result<Value> {
        while let Some(msg) = self.ws.next().await {
            let msg = msg.map_err(ws_error)?;

            if let Message::Text(text) = msg {
                let response: CdpResponse = serde_json::from_str(&text)?;

                if response.id == Some(id) {
                    if let Some(error) = response.error {
                        return Err(SupplyError::browser(format!(
                            "{} failed: {}",
                            method, error.message
                        )));
                    }
                    return Ok(response.result.unwrap_or(Value::Null));
                }
            }
        }

        Err(SupplyError::browser("DevTools connection closed"))
    }
}

/// String value of a `Runtime.evaluate` result, if the script produced one
fn evaluated_text(result: &Value) -> Option<String> {
    if result.get("exceptionDetails").is_some() {
        return None;
    }

    result
        .get("result")
        .and_then(|r| r.get("value"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Navigate to `url` and poll until the located element has text.
///
/// Returns `Ok(None)` if the element is still absent or empty when `timeout`
/// expires. Evaluation errors while the page is still loading are retried.
pub async fn query_text(
    port: u16,
    url: &str,
    locator: &Locator,
    timeout: Duration,
) -> Result<Option<String>> {
    let ws_url = page_ws_url(port).await?;
    let mut conn = CdpConnection::connect(&ws_url).await?;

    let navigation = conn
        .call("Page.navigate", json!({ "url": url }), timeout)
        .await?;
    if let Some(error_text) = navigation.get("errorText").and_then(Value::as_str) {
        return Err(SupplyError::browser(format!(
            "Navigation to {} failed: {}",
            url, error_text
        )));
    }

    let deadline = Instant::now() + timeout;
    let params = json!({
        "expression": locator.text_expression(),
        "returnByValue": true,
    });

    loop {
        let now = Instant::now();
        if now >= deadline {
            log::debug!("Timed out waiting for {} on {}", locator, url);
            return Ok(None);
        }

        match conn
            .call("Runtime.evaluate", params.clone(), deadline - now)
            .await
        {
            Ok(result) => {
                if let Some(text) = evaluated_text(&result) {
                    if !text.trim().is_empty() {
                        return Ok(Some(text));
                    }
                }
            }
            // Execution context is replaced while the page loads
            Err(SupplyError::Browser(msg)) => log::debug!("Evaluate not ready: {}", msg),
            Err(e) => return Err(e),
        }

        tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}
