//! Console-error checks and failure reports

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{error, info};

use crate::browser::{Browser, LogEntry};
use crate::config::{Backend, ConsoleConfig};
use crate::error::E2eResult;

/// Drop console entries that are known noise
pub fn filter_console_errors(entries: Vec<LogEntry>, config: &ConsoleConfig) -> Vec<LogEntry> {
    entries
        .into_iter()
        .filter(|entry| {
            !config
                .ignored_levels
                .iter()
                .any(|level| level.eq_ignore_ascii_case(&entry.level))
        })
        .filter(|entry| {
            !config
                .ignored_messages
                .iter()
                .any(|fragment| entry.message.contains(fragment.as_str()))
        })
        .collect()
}

/// Read and filter the console log. Backends without a console log yield
/// nothing.
pub async fn check_console_errors(
    browser: &dyn Browser,
    backend: Backend,
    config: &ConsoleConfig,
) -> E2eResult<Vec<LogEntry>> {
    if !backend.supports_console_log() {
        return Ok(Vec::new());
    }
    let entries = browser.browser_logs().await?;
    Ok(filter_console_errors(entries, config))
}

/// Summary written next to the screenshot and DOM dump
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    pub step: String,
    pub error: String,
    pub captured_at: String,
    pub screenshot_path: Option<PathBuf>,
    pub screenshot_sha256: Option<String>,
    pub dom_path: Option<PathBuf>,
}

/// Captures the UI state when a step fails
pub struct FailureReporter {
    artifacts_dir: PathBuf,
    backend: Backend,
}

impl FailureReporter {
    pub fn new(artifacts_dir: impl Into<PathBuf>, backend: Backend) -> Self {
        Self {
            artifacts_dir: artifacts_dir.into(),
            backend,
        }
    }

    /// `<artifacts>/<backend>/<step title>`
    pub fn report_dir(&self, step_title: &str) -> PathBuf {
        self.artifacts_dir
            .join(self.backend.as_str())
            .join(sanitize_title(step_title))
    }

    /// Write whatever can be captured. A screenshot or DOM that cannot be
    /// read is left out of the report rather than failing it.
    pub async fn capture(
        &self,
        browser: &dyn Browser,
        step_title: &str,
        step_error: &str,
    ) -> E2eResult<(PathBuf, FailureReport)> {
        let dir = self.report_dir(step_title);
        std::fs::create_dir_all(&dir)?;

        let (screenshot_path, screenshot_sha256) = match browser.screenshot().await {
            Ok(png) => {
                let path = dir.join("test-failure-screenshot.png");
                std::fs::write(&path, &png)?;
                (Some(path), Some(sha256_hex(&png)))
            }
            Err(e) => {
                error!("Could not capture screenshot for '{}': {}", step_title, e);
                (None, None)
            }
        };

        let dom_path = match browser.page_source().await {
            Ok(html) => {
                let path = dir.join("test-failure-dom.html");
                std::fs::write(&path, html)?;
                Some(path)
            }
            Err(e) => {
                error!("Could not capture DOM for '{}': {}", step_title, e);
                None
            }
        };

        let report = FailureReport {
            step: step_title.to_string(),
            error: step_error.to_string(),
            captured_at: Utc::now().to_rfc3339(),
            screenshot_path,
            screenshot_sha256,
            dom_path,
        };
        write_json(&dir.join("test-failure.json"), &report)?;

        info!("Failure report written to: {}", dir.display());
        Ok((dir, report))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> E2eResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Make a step title usable as a single path component
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "unnamed-step".to_string()
    } else {
        trimmed.to_string()
    }
}
