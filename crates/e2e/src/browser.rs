//! The browser seam
//!
//! Walkthrough steps talk to a live browser only through [`Browser`]. The
//! WebDriver client is the production implementation; unit tests use an
//! in-memory fake.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{E2eError, E2eResult};
use crate::locator::By;

/// W3C web element identifier key
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Opaque reference to an element in the current page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(pub String);

impl ElementRef {
    pub fn id(&self) -> &str {
        &self.0
    }

    /// Script argument form of the reference
    pub fn to_json(&self) -> Value {
        serde_json::json!({ ELEMENT_KEY: self.0 })
    }

    pub fn from_json(value: &Value) -> Option<Self> {
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(|id| ElementRef(id.to_string()))
    }
}

/// One browser console entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[async_trait]
pub trait Browser: Send + Sync {
    async fn navigate(&self, url: &str) -> E2eResult<()>;

    async fn window_handles(&self) -> E2eResult<Vec<String>>;

    async fn switch_to_window(&self, handle: &str) -> E2eResult<()>;

    async fn close_window(&self) -> E2eResult<()>;

    /// Every match in document order; empty when nothing matches
    async fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementRef>>;

    async fn click(&self, element: &ElementRef) -> E2eResult<()>;

    async fn send_keys(&self, element: &ElementRef, text: &str) -> E2eResult<()>;

    async fn text(&self, element: &ElementRef) -> E2eResult<String>;

    /// DOM property, e.g. the live `value` of an input
    async fn property(&self, element: &ElementRef, name: &str) -> E2eResult<Value>;

    async fn is_enabled(&self, element: &ElementRef) -> E2eResult<bool>;

    async fn is_displayed(&self, element: &ElementRef) -> E2eResult<bool>;

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> E2eResult<Value>;

    /// PNG bytes of the current viewport
    async fn screenshot(&self) -> E2eResult<Vec<u8>>;

    async fn page_source(&self) -> E2eResult<String>;

    async fn browser_logs(&self) -> E2eResult<Vec<LogEntry>>;

    async fn set_window_size(&self, width: u32, height: u32) -> E2eResult<()>;

    /// Install an unpacked add-on; returns the add-on id
    async fn install_addon(&self, path: &Path, temporary: bool) -> E2eResult<String>;

    async fn quit(&self) -> E2eResult<()>;

    /// First match, or `ElementNotFound`
    async fn find_element(&self, by: &By) -> E2eResult<ElementRef> {
        self.find_elements(by)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| E2eError::ElementNotFound(by.to_string()))
    }

    /// True once the element has been detached from the document
    async fn is_stale(&self, element: &ElementRef) -> E2eResult<bool> {
        match self.is_enabled(element).await {
            Ok(_) => Ok(false),
            Err(E2eError::StaleElement(_)) => Ok(true),
            Err(e) => Err(e),
        }
    }
}
