//! Session bootstrap: start the browser with the extension loaded and land
//! on the extension's home page

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::Browser;
use crate::config::{Backend, SuiteConfig};
use crate::error::{E2eError, E2eResult};
use crate::locator::By;
use crate::wait::Waiter;
use crate::webdriver::WebDriverClient;

const CHROME_EXTENSIONS_PAGE: &str = "chrome://extensions";
const FIREFOX_DEBUGGING_PAGE: &str = "about:debugging#/runtime/this-firefox";

const CHROME_EXTENSION_ID_SCRIPT: &str = r#"
const manager = document.querySelector('extensions-manager');
const list = manager && manager.shadowRoot.querySelector('extensions-item-list');
const item = list && list.shadowRoot.querySelector('extensions-item');
return item ? item.getAttribute('id') : null;
"#;

const FIREFOX_UUID_XPATH: &str = "//dt[contains(text(), 'Internal UUID')]/following-sibling::dd[1]";

/// Width and height of the narrow Firefox window
const RESPONSIVE_WINDOW: (u32, u32) = (320, 600);

/// The installed extension and where its pages live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionTarget {
    pub backend: Backend,
    pub id: String,
}

impl ExtensionTarget {
    pub fn new(backend: Backend, id: &str) -> E2eResult<Self> {
        let id = id.trim();
        if id.is_empty() {
            return Err(E2eError::ExtensionId(format!(
                "{} reported an empty identifier",
                backend
            )));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(E2eError::ExtensionId(format!(
                "unexpected identifier '{}' from {}",
                id, backend
            )));
        }
        Ok(Self {
            backend,
            id: id.to_string(),
        })
    }

    pub fn home_url(&self) -> String {
        format!("{}://{}/home.html", self.backend.extension_scheme(), self.id)
    }
}

/// A live browser with the extension installed
pub struct Session {
    browser: Arc<dyn Browser>,
    target: ExtensionTarget,
    // Removed from disk when the session is dropped
    _profile: Option<TempDir>,
}

impl Session {
    /// Start the browser, load the extension and open its home page.
    /// Every failure here is fatal; nothing is retried.
    pub async fn bootstrap(config: &SuiteConfig) -> E2eResult<Self> {
        let backend = config.backend()?;
        let extension_dir = resolve_extension_dir(&config.extension_dir()?)?;
        let url = config.webdriver_url()?;

        info!(
            "Starting {} session via {} with extension {}",
            backend,
            url,
            extension_dir.display()
        );

        let (client, profile) = match backend {
            Backend::Chrome => {
                let profile = tempfile::Builder::new()
                    .prefix("wallet-e2e-chrome-profile")
                    .tempdir()?;
                let capabilities = chrome_capabilities(
                    &extension_dir,
                    profile.path(),
                    config.chrome_binary.as_deref(),
                    config.responsive(),
                );
                let client =
                    WebDriverClient::new_session(&url, capabilities, config.timeouts.command())
                        .await?;
                (client, Some(profile))
            }
            Backend::Firefox => {
                let client = WebDriverClient::new_session(
                    &url,
                    firefox_capabilities(),
                    config.timeouts.command(),
                )
                .await?;
                (client, None)
            }
        };
        info!("WebDriver session {} started", client.session_id());

        Self::establish(Arc::new(client), backend, &extension_dir, config, profile).await
    }

    /// Prepare an already started browser. The browser is closed again when
    /// preparation fails.
    pub async fn establish(
        browser: Arc<dyn Browser>,
        backend: Backend,
        extension_dir: &Path,
        config: &SuiteConfig,
        profile: Option<TempDir>,
    ) -> E2eResult<Self> {
        match prepare(browser.as_ref(), backend, extension_dir, config).await {
            Ok(target) => {
                info!("Extension home page: {}", target.home_url());
                Ok(Self {
                    browser,
                    target,
                    _profile: profile,
                })
            }
            Err(e) => {
                if let Err(quit_err) = browser.quit().await {
                    warn!("Could not close session after failed bootstrap: {}", quit_err);
                }
                Err(e)
            }
        }
    }

    pub fn browser(&self) -> Arc<dyn Browser> {
        self.browser.clone()
    }

    pub fn target(&self) -> &ExtensionTarget {
        &self.target
    }

    pub async fn close(self) -> E2eResult<()> {
        info!("Closing {} session", self.target.backend);
        self.browser.quit().await
    }
}

async fn prepare(
    browser: &dyn Browser,
    backend: Backend,
    extension_dir: &Path,
    config: &SuiteConfig,
) -> E2eResult<ExtensionTarget> {
    let waiter = Waiter::new(config.timeouts.element(), config.timeouts.poll());

    let id = match backend {
        Backend::Chrome => {
            let id = resolve_chrome_extension_id(browser, waiter).await?;
            sleep(config.pacing.large()).await;
            id
        }
        Backend::Firefox => {
            if config.responsive() {
                let (width, height) = RESPONSIVE_WINDOW;
                browser.set_window_size(width, height).await?;
            }
            let addon = browser.install_addon(extension_dir, true).await?;
            info!("Installed temporary add-on {}", addon);
            sleep(config.pacing.large()).await;
            resolve_firefox_extension_id(browser, waiter).await?
        }
    };
    let target = ExtensionTarget::new(backend, &id)?;

    // Installation may open extra tabs; reset to a single window
    let handles = browser.window_handles().await?;
    let first = handles.first().cloned().ok_or_else(|| {
        E2eError::SessionStartup("browser reported no open windows".to_string())
    })?;
    close_all_windows_except(browser, &[first.clone()]).await?;
    browser.switch_to_window(&first).await?;

    load_extension(browser, &target).await?;
    Ok(target)
}

fn resolve_extension_dir(dir: &Path) -> E2eResult<PathBuf> {
    if !dir.is_dir() {
        return Err(E2eError::ExtensionNotFound(dir.display().to_string()));
    }
    Ok(dir.canonicalize()?)
}

pub fn chrome_capabilities(
    extension_dir: &Path,
    profile_dir: &Path,
    binary: Option<&str>,
    responsive: bool,
) -> Value {
    let mut args = vec![
        format!("load-extension={}", extension_dir.display()),
        format!("user-data-dir={}", profile_dir.display()),
    ];
    if responsive {
        args.push("--auto-open-devtools-for-tabs".to_string());
    }

    let mut options = json!({ "args": args });
    if let Some(binary) = binary {
        options["binary"] = json!(binary);
    }

    json!({
        "browserName": "chrome",
        "goog:chromeOptions": options,
        "goog:loggingPrefs": { "browser": "ALL" },
    })
}

pub fn firefox_capabilities() -> Value {
    json!({ "browserName": "firefox" })
}

async fn resolve_chrome_extension_id(browser: &dyn Browser, waiter: Waiter) -> E2eResult<String> {
    browser.navigate(CHROME_EXTENSIONS_PAGE).await?;
    waiter
        .until("extension to appear on chrome://extensions", move || async move {
            let value = browser
                .execute_script(CHROME_EXTENSION_ID_SCRIPT, Vec::new())
                .await?;
            Ok(value
                .as_str()
                .filter(|id| !id.is_empty())
                .map(str::to_string))
        })
        .await
        .map_err(|e| E2eError::ExtensionId(e.to_string()))
}

async fn resolve_firefox_extension_id(browser: &dyn Browser, waiter: Waiter) -> E2eResult<String> {
    browser.navigate(FIREFOX_DEBUGGING_PAGE).await?;
    let by = By::xpath(FIREFOX_UUID_XPATH);
    let by = &by;
    waiter
        .until("internal UUID on about:debugging", move || async move {
            let element = browser.find_element(by).await?;
            let text = browser.text(&element).await?;
            let text = text.trim();
            Ok((!text.is_empty()).then(|| text.to_string()))
        })
        .await
        .map_err(|e| E2eError::ExtensionId(e.to_string()))
}

/// Close every window whose handle is not in `keep`
pub async fn close_all_windows_except(browser: &dyn Browser, keep: &[String]) -> E2eResult<()> {
    for handle in browser.window_handles().await? {
        if keep.contains(&handle) {
            continue;
        }
        debug!("Closing extra window {}", handle);
        browser.switch_to_window(&handle).await?;
        browser.close_window().await?;
    }
    Ok(())
}

/// (Re)load the extension's home page
pub async fn load_extension(browser: &dyn Browser, target: &ExtensionTarget) -> E2eResult<()> {
    browser.navigate(&target.home_url()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::fake_browser::{FakeBrowser, FakeDom};
    use crate::walkthrough::testing::fast_config;

    const FIREFOX_UUID: &str = "1b2c3d4e-0000-4a4a-9f9f-123456789abc";

    type Visit = (String, usize, Option<String>);

    /// Records the url, open window count and focused window of every navigation
    fn record_visits(browser: &FakeBrowser) -> Arc<Mutex<Vec<Visit>>> {
        let visits = Arc::new(Mutex::new(Vec::new()));
        let sink = visits.clone();
        browser.with_dom(|dom| {
            dom.on_navigate = Some(Arc::new(move |dom: &mut FakeDom| {
                let url = dom.navigations.last().cloned().unwrap_or_default();
                sink.lock()
                    .unwrap()
                    .push((url, dom.windows.len(), dom.current_window.clone()));
            }));
        });
        visits
    }

    fn chrome_browser(id: Value) -> Arc<FakeBrowser> {
        let browser = Arc::new(FakeBrowser::new());
        browser.with_dom(|dom| {
            dom.windows = vec!["main".into(), "devtools".into()];
            dom.script_result = id;
        });
        browser
    }

    fn firefox_browser(uuid: &str) -> Arc<FakeBrowser> {
        let browser = Arc::new(FakeBrowser::new());
        browser.with_dom(|dom| {
            dom.add("uuid", By::xpath(FIREFOX_UUID_XPATH)).text(uuid);
        });
        browser
    }

    async fn establish(browser: &Arc<FakeBrowser>, config: &SuiteConfig) -> E2eResult<Session> {
        let backend = config.backend()?;
        Session::establish(
            browser.clone(),
            backend,
            Path::new("/work/dist/firefox"),
            config,
            None,
        )
        .await
    }

    #[test]
    fn test_home_url_per_backend() {
        let chrome = ExtensionTarget::new(Backend::Chrome, "abcdefghijklmnopabcdefghijklmnop").unwrap();
        assert_eq!(
            chrome.home_url(),
            "chrome-extension://abcdefghijklmnopabcdefghijklmnop/home.html"
        );

        let firefox =
            ExtensionTarget::new(Backend::Firefox, " 1b2c3d4e-0000-4a4a-9f9f-123456789abc\n").unwrap();
        assert_eq!(
            firefox.home_url(),
            "moz-extension://1b2c3d4e-0000-4a4a-9f9f-123456789abc/home.html"
        );
    }

    #[test]
    fn test_rejects_unusable_identifiers() {
        assert!(matches!(
            ExtensionTarget::new(Backend::Chrome, "  "),
            Err(E2eError::ExtensionId(_))
        ));
        assert!(matches!(
            ExtensionTarget::new(Backend::Chrome, "abc/../etc"),
            Err(E2eError::ExtensionId(_))
        ));
    }

    #[test]
    fn test_chrome_capabilities() {
        let caps = chrome_capabilities(
            Path::new("/work/dist/chrome"),
            Path::new("/tmp/profile"),
            Some("/opt/chrome"),
            true,
        );
        assert_eq!(caps["browserName"], "chrome");
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert_eq!(args[0], "load-extension=/work/dist/chrome");
        assert_eq!(args[1], "user-data-dir=/tmp/profile");
        assert_eq!(args[2], "--auto-open-devtools-for-tabs");
        assert_eq!(caps["goog:chromeOptions"]["binary"], "/opt/chrome");
        assert_eq!(caps["goog:loggingPrefs"]["browser"], "ALL");
    }

    #[test]
    fn test_chrome_capabilities_without_binary() {
        let caps = chrome_capabilities(Path::new("/ext"), Path::new("/p"), None, false);
        assert!(caps["goog:chromeOptions"].get("binary").is_none());
        assert_eq!(caps["goog:chromeOptions"]["args"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_extension_dir_is_fatal() {
        let err = resolve_extension_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, E2eError::ExtensionNotFound(_)));
    }

    #[tokio::test]
    async fn test_close_all_windows_except() {
        let browser = FakeBrowser::new();
        browser.with_dom(|dom| {
            dom.windows = vec!["main".into(), "welcome".into(), "popup".into()];
        });

        close_all_windows_except(&browser, &["main".to_string()])
            .await
            .unwrap();

        browser.with_dom(|dom| {
            assert_eq!(dom.windows, vec!["main".to_string()]);
        });
    }

    #[tokio::test]
    async fn test_load_extension_navigates_home() {
        let browser = FakeBrowser::new();
        let target = ExtensionTarget::new(Backend::Chrome, "abc").unwrap();
        load_extension(&browser, &target).await.unwrap();
        browser.with_dom(|dom| {
            assert_eq!(dom.navigations, vec!["chrome-extension://abc/home.html".to_string()]);
        });
    }

    #[tokio::test]
    async fn test_chrome_session_cleans_windows_before_loading_home() {
        let browser = chrome_browser(json!("abcdefghijklmnop"));
        let visits = record_visits(&browser);

        let session = establish(&browser, &fast_config(Backend::Chrome))
            .await
            .unwrap();
        assert_eq!(session.target().id, "abcdefghijklmnop");

        assert_eq!(
            *visits.lock().unwrap(),
            vec![
                ("chrome://extensions".to_string(), 2, Some("main".to_string())),
                (
                    "chrome-extension://abcdefghijklmnop/home.html".to_string(),
                    1,
                    Some("main".to_string())
                ),
            ]
        );
        browser.with_dom(|dom| {
            assert_eq!(dom.scripts, vec![CHROME_EXTENSION_ID_SCRIPT.to_string()]);
            assert!(dom.addons.is_empty());
            assert!(!dom.quit);
        });

        session.close().await.unwrap();
        browser.with_dom(|dom| assert!(dom.quit));
    }

    #[tokio::test]
    async fn test_chrome_without_extension_is_fatal() {
        let browser = chrome_browser(Value::Null);

        let err = establish(&browser, &fast_config(Backend::Chrome))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, E2eError::ExtensionId(m) if m.contains("chrome://extensions")));
        browser.with_dom(|dom| {
            assert_eq!(dom.navigations, vec!["chrome://extensions".to_string()]);
            assert!(dom.quit);
        });
    }

    #[tokio::test]
    async fn test_chrome_malformed_id_is_fatal() {
        let browser = chrome_browser(json!("abc/../settings"));

        let err = establish(&browser, &fast_config(Backend::Chrome))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, E2eError::ExtensionId(_)));
        browser.with_dom(|dom| assert!(dom.quit));
    }

    #[tokio::test]
    async fn test_firefox_installs_addon_and_reads_uuid() {
        let browser = firefox_browser(&format!("  {}\n", FIREFOX_UUID));
        let visits = record_visits(&browser);

        let session = establish(&browser, &fast_config(Backend::Firefox))
            .await
            .unwrap();
        assert_eq!(session.target().id, FIREFOX_UUID);

        browser.with_dom(|dom| {
            assert_eq!(dom.window_size, Some(RESPONSIVE_WINDOW));
            assert_eq!(
                dom.addons,
                vec![(PathBuf::from("/work/dist/firefox"), true)]
            );
        });
        let urls: Vec<String> = visits.lock().unwrap().iter().map(|v| v.0.clone()).collect();
        assert_eq!(
            urls,
            vec![
                FIREFOX_DEBUGGING_PAGE.to_string(),
                format!("moz-extension://{}/home.html", FIREFOX_UUID),
            ]
        );
    }

    #[tokio::test]
    async fn test_firefox_keeps_window_size_when_not_responsive() {
        let browser = firefox_browser(FIREFOX_UUID);
        let mut config = fast_config(Backend::Firefox);
        config.responsive = Some(false);

        establish(&browser, &config).await.unwrap();
        browser.with_dom(|dom| assert_eq!(dom.window_size, None));
    }

    #[tokio::test]
    async fn test_firefox_empty_uuid_is_fatal() {
        let browser = firefox_browser("   ");

        let err = establish(&browser, &fast_config(Backend::Firefox))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, E2eError::ExtensionId(m) if m.contains("internal UUID")));
        browser.with_dom(|dom| {
            assert_eq!(dom.navigations, vec![FIREFOX_DEBUGGING_PAGE.to_string()]);
            assert!(dom.quit);
        });
    }
}
