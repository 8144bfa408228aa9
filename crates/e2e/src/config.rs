//! Suite configuration
//!
//! Values come from three layers, later ones winning: an optional YAML file,
//! the environment (`SELENIUM_BROWSER`, `SELENIUM_CHROME_BINARY`,
//! `WEBDRIVER_URL`), and whatever the entry binary sets from its flags.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};

pub const BROWSER_ENV: &str = "SELENIUM_BROWSER";
pub const CHROME_BINARY_ENV: &str = "SELENIUM_CHROME_BINARY";
pub const WEBDRIVER_URL_ENV: &str = "WEBDRIVER_URL";

/// Browser automation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Chrome,
    Firefox,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Chrome => "chrome",
            Backend::Firefox => "firefox",
        }
    }

    /// URL scheme under which the extension's pages are served
    pub fn extension_scheme(&self) -> &'static str {
        match self {
            Backend::Chrome => "chrome-extension",
            Backend::Firefox => "moz-extension",
        }
    }

    /// Where chromedriver / geckodriver listen by default
    pub fn default_webdriver_url(&self) -> &'static str {
        match self {
            Backend::Chrome => "http://127.0.0.1:9515",
            Backend::Firefox => "http://127.0.0.1:4444",
        }
    }

    pub fn default_extension_dir(&self) -> PathBuf {
        PathBuf::from("dist").join(self.as_str())
    }

    /// Only chromedriver exposes the browser console log
    pub fn supports_console_log(&self) -> bool {
        matches!(self, Backend::Chrome)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" => Ok(Backend::Chrome),
            "firefox" => Ok(Backend::Firefox),
            other => Err(E2eError::InvalidConfig(format!(
                "unsupported browser '{}' (expected chrome or firefox)",
                other
            ))),
        }
    }
}

/// Fixed stabilisation delays inserted after interactions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    pub tiny_ms: u64,
    pub regular_ms: u64,
    pub large_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            tiny_ms: 200,
            regular_ms: 400,
            large_ms: 800,
        }
    }
}

impl Pacing {
    /// No delays at all; used by unit tests
    pub fn none() -> Self {
        Self {
            tiny_ms: 0,
            regular_ms: 0,
            large_ms: 0,
        }
    }

    pub fn tiny(&self) -> Duration {
        Duration::from_millis(self.tiny_ms)
    }

    pub fn regular(&self) -> Duration {
        Duration::from_millis(self.regular_ms)
    }

    pub fn large(&self) -> Duration {
        Duration::from_millis(self.large_ms)
    }

    /// `n` large delays back to back, saturating instead of overflowing
    pub fn large_times(&self, n: u32) -> Duration {
        self.large().saturating_mul(n)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Lookups that name an explicit bound (reveal button, seed words, gas modal)
    pub element_ms: u64,

    /// Suite-wide bound for every other wait
    pub default_ms: u64,

    /// Delay between polls of a wait condition
    pub poll_ms: u64,

    /// HTTP timeout for a single WebDriver command
    pub command_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element_ms: 10_000,
            default_ms: 30_000,
            poll_ms: 100,
            command_ms: 60_000,
        }
    }
}

impl Timeouts {
    pub fn element(&self) -> Duration {
        Duration::from_millis(self.element_ms)
    }

    pub fn default_wait(&self) -> Duration {
        Duration::from_millis(self.default_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    pub fn command(&self) -> Duration {
        Duration::from_millis(self.command_ms)
    }
}

/// Scenario inputs and expectations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub password: String,
    pub import_seed_phrase: String,
    pub recipient: String,
    pub send_amount: String,
    pub network_name: String,
    pub balance_pattern: String,
    pub transaction_amount_pattern: String,
}

impl Default for Fixtures {
    fn default() -> Self {
        Self {
            password: "correct horse battery staple".to_string(),
            import_seed_phrase:
                "phrase upgrade clock rough situate wedding elder clever doctor stamp excess tent"
                    .to_string(),
            recipient: "0x2f318C334780961FB129D2a6c30D0763d9a5C970".to_string(),
            send_amount: "1".to_string(),
            network_name: "Localhost".to_string(),
            balance_pattern: r"100\s*ETH".to_string(),
            transaction_amount_pattern: r"-1\s*ETH".to_string(),
        }
    }
}

impl Fixtures {
    pub fn balance_regex(&self) -> E2eResult<Regex> {
        compile_pattern("balance_pattern", &self.balance_pattern)
    }

    pub fn transaction_amount_regex(&self) -> E2eResult<Regex> {
        compile_pattern("transaction_amount_pattern", &self.transaction_amount_pattern)
    }
}

fn compile_pattern(field: &str, pattern: &str) -> E2eResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| E2eError::InvalidConfig(format!("{} '{}': {}", field, pattern, e)))
}

/// Browser console entries that are known noise
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub ignored_levels: Vec<String>,
    pub ignored_messages: Vec<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            ignored_levels: vec!["WARNING".to_string()],
            ignored_messages: vec![
                // React warns on "dataset" but still sets the data-* properties
                "Warning: Unknown prop `dataset` on ".to_string(),
                "favicon.ico - Failed to load resource: the server responded with a status of 404 (Not Found)".to_string(),
                "Warning: It looks like you're using a minified copy of the development build of React.".to_string(),
                "This means that you are running a slower development build of Redux.".to_string(),
            ],
        }
    }
}

/// Values set on the command line; `None` leaves the config untouched
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend: Option<Backend>,
    pub webdriver_url: Option<String>,
    pub extension_dir: Option<PathBuf>,
    pub chrome_binary: Option<String>,
    pub artifacts_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub bail: Option<bool>,
    pub responsive: Option<bool>,
}

/// Complete configuration for one suite run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Required; there is no default browser
    pub backend: Option<Backend>,

    /// Driver endpoint; falls back to the backend's default port
    pub webdriver_url: Option<String>,

    /// Unpacked extension bundle; falls back to `dist/<backend>`
    pub extension_dir: Option<PathBuf>,

    pub chrome_binary: Option<String>,

    /// Narrow layout: devtools docked in Chrome, 320x600 window in Firefox
    pub responsive: Option<bool>,

    pub artifacts_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,

    /// Stop every remaining group after the first failed step
    pub bail: Option<bool>,

    pub max_seed_attempts: Option<u32>,

    pub pacing: Pacing,
    pub timeouts: Timeouts,
    pub fixtures: Fixtures,
    pub console: ConsoleConfig,
}

impl SuiteConfig {
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env<F>(&mut self, lookup: F) -> E2eResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(browser) = lookup(BROWSER_ENV).filter(|v| !v.trim().is_empty()) {
            self.backend = Some(browser.parse()?);
        }
        if let Some(binary) = lookup(CHROME_BINARY_ENV).filter(|v| !v.is_empty()) {
            self.chrome_binary = Some(binary);
        }
        if let Some(url) = lookup(WEBDRIVER_URL_ENV).filter(|v| !v.is_empty()) {
            self.webdriver_url = Some(url);
        }
        Ok(())
    }

    pub fn apply_process_env(&mut self) -> E2eResult<()> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Last layer: explicit flags win over file and environment
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if overrides.backend.is_some() {
            self.backend = overrides.backend;
        }
        if overrides.webdriver_url.is_some() {
            self.webdriver_url = overrides.webdriver_url;
        }
        if overrides.extension_dir.is_some() {
            self.extension_dir = overrides.extension_dir;
        }
        if overrides.chrome_binary.is_some() {
            self.chrome_binary = overrides.chrome_binary;
        }
        if overrides.artifacts_dir.is_some() {
            self.artifacts_dir = overrides.artifacts_dir;
        }
        if overrides.output_dir.is_some() {
            self.output_dir = overrides.output_dir;
        }
        if overrides.bail.is_some() {
            self.bail = overrides.bail;
        }
        if overrides.responsive.is_some() {
            self.responsive = overrides.responsive;
        }
    }

    pub fn backend(&self) -> E2eResult<Backend> {
        self.backend.ok_or_else(|| {
            E2eError::InvalidConfig(format!(
                "no browser selected; set {} to chrome or firefox",
                BROWSER_ENV
            ))
        })
    }

    pub fn webdriver_url(&self) -> E2eResult<String> {
        match &self.webdriver_url {
            Some(url) => Ok(url.trim_end_matches('/').to_string()),
            None => Ok(self.backend()?.default_webdriver_url().to_string()),
        }
    }

    pub fn extension_dir(&self) -> E2eResult<PathBuf> {
        match &self.extension_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(self.backend()?.default_extension_dir()),
        }
    }

    pub fn responsive(&self) -> bool {
        self.responsive.unwrap_or(true)
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.artifacts_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("test-artifacts"))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("test-results"))
    }

    pub fn bail(&self) -> bool {
        self.bail.unwrap_or(true)
    }

    pub fn max_seed_attempts(&self) -> u32 {
        self.max_seed_attempts.unwrap_or(3)
    }

    /// Catch bad values before a browser is started
    pub fn validate(&self) -> E2eResult<()> {
        self.backend()?;
        self.fixtures.balance_regex()?;
        self.fixtures.transaction_amount_regex()?;
        if self.max_seed_attempts() == 0 {
            return Err(E2eError::InvalidConfig(
                "max_seed_attempts must be at least 1".to_string(),
            ));
        }
        if self.timeouts.poll_ms == 0 {
            return Err(E2eError::InvalidConfig(
                "timeouts.poll_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
