//! W3C WebDriver client
//!
//! Speaks the JSON wire protocol of chromedriver and geckodriver directly
//! over HTTP. Two vendor endpoints are used on top of the standard command
//! set: `se/log` for the Chrome console and `moz/addon/install` for Firefox
//! add-ons.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use crate::browser::{Browser, ElementRef, LogEntry};
use crate::error::{E2eError, E2eResult};
use crate::locator::By;

/// An open WebDriver session
pub struct WebDriverClient {
    http: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl WebDriverClient {
    /// Create a session with the given `alwaysMatch` capabilities
    pub async fn new_session(
        base_url: &str,
        capabilities: Value,
        command_timeout: Duration,
    ) -> E2eResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder().timeout(command_timeout).build()?;

        let body = json!({ "capabilities": { "alwaysMatch": capabilities } });
        debug!("POST {}/session {}", base_url, body);

        let resp = http
            .post(format!("{}/session", base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| E2eError::SessionStartup(format!("{}: {}", base_url, e)))?;

        let value = decode_response(resp)
            .await
            .map_err(|e| E2eError::SessionStartup(e.to_string()))?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                E2eError::SessionStartup("new session response carried no sessionId".to_string())
            })?
            .to_string();

        debug!("WebDriver session {} created", session_id);

        Ok(Self {
            http,
            base_url,
            session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> E2eResult<Value> {
        let url = if path.is_empty() {
            format!("{}/session/{}", self.base_url, self.session_id)
        } else {
            format!("{}/session/{}/{}", self.base_url, self.session_id, path)
        };
        debug!("{} {}", method, url);

        let mut request = self.http.request(method.clone(), &url);
        if method == Method::POST {
            request = request.json(&body.unwrap_or_else(|| json!({})));
        }

        let resp = request.send().await?;
        decode_response(resp).await
    }

    async fn element_command(
        &self,
        method: Method,
        element: &ElementRef,
        suffix: &str,
        body: Option<Value>,
    ) -> E2eResult<Value> {
        let path = format!("element/{}/{}", element.id(), suffix);
        self.command(method, &path, body).await
    }
}

async fn decode_response(resp: reqwest::Response) -> E2eResult<Value> {
    let status = resp.status();
    let body: Value = resp.json().await?;
    let value = body.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        Ok(value)
    } else {
        Err(protocol_error(&value))
    }
}

/// Map a W3C error payload onto the error taxonomy
pub fn protocol_error(value: &Value) -> E2eError {
    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match error {
        "no such element" => E2eError::ElementNotFound(message),
        "stale element reference" => E2eError::StaleElement(message),
        _ => E2eError::WebDriver {
            error: error.to_string(),
            message,
        },
    }
}

/// Decode a `find elements` result
pub fn parse_elements(value: &Value) -> Vec<ElementRef> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(ElementRef::from_json).collect())
        .unwrap_or_default()
}

#[async_trait]
impl Browser for WebDriverClient {
    async fn navigate(&self, url: &str) -> E2eResult<()> {
        self.command(Method::POST, "url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn window_handles(&self) -> E2eResult<Vec<String>> {
        let value = self.command(Method::GET, "window/handles", None).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn switch_to_window(&self, handle: &str) -> E2eResult<()> {
        self.command(Method::POST, "window", Some(json!({ "handle": handle })))
            .await?;
        Ok(())
    }

    async fn close_window(&self) -> E2eResult<()> {
        self.command(Method::DELETE, "window", None).await?;
        Ok(())
    }

    async fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementRef>> {
        let value = self
            .command(
                Method::POST,
                "elements",
                Some(json!({ "using": by.strategy(), "value": by.value() })),
            )
            .await?;
        Ok(parse_elements(&value))
    }

    async fn click(&self, element: &ElementRef) -> E2eResult<()> {
        self.element_command(Method::POST, element, "click", None)
            .await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> E2eResult<()> {
        self.element_command(Method::POST, element, "value", Some(json!({ "text": text })))
            .await?;
        Ok(())
    }

    async fn text(&self, element: &ElementRef) -> E2eResult<String> {
        let value = self.element_command(Method::GET, element, "text", None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn property(&self, element: &ElementRef, name: &str) -> E2eResult<Value> {
        self.element_command(Method::GET, element, &format!("property/{}", name), None)
            .await
    }

    async fn is_enabled(&self, element: &ElementRef) -> E2eResult<bool> {
        let value = self.element_command(Method::GET, element, "enabled", None).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn is_displayed(&self, element: &ElementRef) -> E2eResult<bool> {
        let value = self.element_command(Method::GET, element, "displayed", None).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> E2eResult<Value> {
        self.command(
            Method::POST,
            "execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        let value = self.command(Method::GET, "screenshot", None).await?;
        let encoded = value.as_str().unwrap_or_default();
        Ok(base64::engine::general_purpose::STANDARD.decode(encoded)?)
    }

    async fn page_source(&self) -> E2eResult<String> {
        let value = self.command(Method::GET, "source", None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn browser_logs(&self) -> E2eResult<Vec<LogEntry>> {
        let value = self
            .command(Method::POST, "se/log", Some(json!({ "type": "browser" })))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn set_window_size(&self, width: u32, height: u32) -> E2eResult<()> {
        self.command(
            Method::POST,
            "window/rect",
            Some(json!({ "width": width, "height": height })),
        )
        .await?;
        Ok(())
    }

    /// geckodriver only
    async fn install_addon(&self, path: &Path, temporary: bool) -> E2eResult<String> {
        let value = self
            .command(
                Method::POST,
                "moz/addon/install",
                Some(json!({
                    "path": path.to_string_lossy(),
                    "temporary": temporary,
                })),
            )
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn quit(&self) -> E2eResult<()> {
        self.command(Method::DELETE, "", None).await?;
        Ok(())
    }
}
