//! Scripted in-memory browser for unit tests

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::browser::{Browser, ElementRef, LogEntry};
use crate::error::{E2eError, E2eResult};
use crate::locator::By;

pub(crate) type Handler = Arc<dyn Fn(&mut FakeDom) + Send + Sync>;

#[derive(Clone)]
pub(crate) struct FakeElement {
    pub id: String,
    pub name: String,
    pub locators: Vec<By>,
    pub text: String,
    pub value: String,
    pub enabled: bool,
    pub displayed: bool,
    pub attached: bool,
    pub on_click: Option<Handler>,
}

impl FakeElement {
    pub fn text(&mut self, text: &str) -> &mut Self {
        self.text = text.to_string();
        self
    }

    pub fn disabled(&mut self) -> &mut Self {
        self.enabled = false;
        self
    }

    pub fn hidden(&mut self) -> &mut Self {
        self.displayed = false;
        self
    }

    pub fn on_click(&mut self, handler: impl Fn(&mut FakeDom) + Send + Sync + 'static) -> &mut Self {
        self.on_click = Some(Arc::new(handler));
        self
    }
}

#[derive(Default)]
pub(crate) struct FakeDom {
    pub elements: Vec<FakeElement>,
    next_id: usize,
    pub windows: Vec<String>,
    pub current_window: Option<String>,
    pub navigations: Vec<String>,
    pub clicks: Vec<String>,
    pub typed: Vec<(String, String)>,
    pub scripts: Vec<String>,
    pub logs: Vec<LogEntry>,
    pub on_navigate: Option<Handler>,
    pub on_script: Option<Handler>,
    /// Returned from every script execution
    pub script_result: Value,
    pub window_size: Option<(u32, u32)>,
    pub addons: Vec<(PathBuf, bool)>,
    pub quit: bool,
    pub fail_screenshot: bool,
}

impl FakeDom {
    /// Attach a new, visible, enabled element
    pub fn add(&mut self, name: &str, by: By) -> &mut FakeElement {
        self.next_id += 1;
        self.elements.push(FakeElement {
            id: format!("{}#{}", name, self.next_id),
            name: name.to_string(),
            locators: vec![by],
            text: String::new(),
            value: String::new(),
            enabled: true,
            displayed: true,
            attached: true,
            on_click: None,
        });
        let last = self.elements.len() - 1;
        &mut self.elements[last]
    }

    /// Latest attached element with this name
    pub fn element(&mut self, name: &str) -> &mut FakeElement {
        self.elements
            .iter_mut()
            .rev()
            .find(|e| e.attached && e.name == name)
            .unwrap_or_else(|| panic!("no attached element named {}", name))
    }

    pub fn detach(&mut self, name: &str) {
        for element in self.elements.iter_mut().filter(|e| e.name == name) {
            element.attached = false;
        }
    }

    pub fn detach_all(&mut self) {
        for element in &mut self.elements {
            element.attached = false;
        }
    }

    pub fn clicked(&self, name: &str) -> usize {
        self.clicks.iter().filter(|c| c.as_str() == name).count()
    }

    fn lookup(&mut self, element: &ElementRef) -> E2eResult<&mut FakeElement> {
        self.elements
            .iter_mut()
            .find(|e| e.id == element.id() && e.attached)
            .ok_or_else(|| E2eError::StaleElement(element.id().to_string()))
    }
}

pub(crate) struct FakeBrowser {
    dom: Mutex<FakeDom>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        let dom = FakeDom {
            windows: vec!["main".to_string()],
            current_window: Some("main".to_string()),
            ..Default::default()
        };
        Self {
            dom: Mutex::new(dom),
        }
    }

    pub fn with_dom<R>(&self, f: impl FnOnce(&mut FakeDom) -> R) -> R {
        let mut dom = self.dom.lock().unwrap();
        f(&mut dom)
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn navigate(&self, url: &str) -> E2eResult<()> {
        let mut dom = self.dom.lock().unwrap();
        dom.navigations.push(url.to_string());
        if let Some(handler) = dom.on_navigate.clone() {
            handler(&mut *dom);
        }
        Ok(())
    }

    async fn window_handles(&self) -> E2eResult<Vec<String>> {
        Ok(self.dom.lock().unwrap().windows.clone())
    }

    async fn switch_to_window(&self, handle: &str) -> E2eResult<()> {
        let mut dom = self.dom.lock().unwrap();
        if !dom.windows.iter().any(|w| w == handle) {
            return Err(E2eError::WebDriver {
                error: "no such window".to_string(),
                message: handle.to_string(),
            });
        }
        dom.current_window = Some(handle.to_string());
        Ok(())
    }

    async fn close_window(&self) -> E2eResult<()> {
        let mut dom = self.dom.lock().unwrap();
        if let Some(current) = dom.current_window.take() {
            dom.windows.retain(|w| *w != current);
        }
        Ok(())
    }

    async fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementRef>> {
        let dom = self.dom.lock().unwrap();
        Ok(dom
            .elements
            .iter()
            .filter(|e| e.attached && e.locators.contains(by))
            .map(|e| ElementRef(e.id.clone()))
            .collect())
    }

    async fn click(&self, element: &ElementRef) -> E2eResult<()> {
        let mut dom = self.dom.lock().unwrap();
        let target = dom.lookup(element)?;
        if !target.enabled {
            return Err(E2eError::WebDriver {
                error: "element not interactable".to_string(),
                message: target.name.clone(),
            });
        }
        let name = target.name.clone();
        let handler = target.on_click.clone();
        dom.clicks.push(name);
        if let Some(handler) = handler {
            handler(&mut *dom);
        }
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> E2eResult<()> {
        let mut dom = self.dom.lock().unwrap();
        let target = dom.lookup(element)?;
        target.value.push_str(text);
        let name = target.name.clone();
        dom.typed.push((name, text.to_string()));
        Ok(())
    }

    async fn text(&self, element: &ElementRef) -> E2eResult<String> {
        let mut dom = self.dom.lock().unwrap();
        Ok(dom.lookup(element)?.text.clone())
    }

    async fn property(&self, element: &ElementRef, name: &str) -> E2eResult<Value> {
        let mut dom = self.dom.lock().unwrap();
        let target = dom.lookup(element)?;
        Ok(match name {
            "value" => Value::String(target.value.clone()),
            _ => Value::Null,
        })
    }

    async fn is_enabled(&self, element: &ElementRef) -> E2eResult<bool> {
        let mut dom = self.dom.lock().unwrap();
        Ok(dom.lookup(element)?.enabled)
    }

    async fn is_displayed(&self, element: &ElementRef) -> E2eResult<bool> {
        let mut dom = self.dom.lock().unwrap();
        Ok(dom.lookup(element)?.displayed)
    }

    async fn execute_script(&self, script: &str, _args: Vec<Value>) -> E2eResult<Value> {
        let mut dom = self.dom.lock().unwrap();
        dom.scripts.push(script.to_string());
        if let Some(handler) = dom.on_script.clone() {
            handler(&mut *dom);
        }
        Ok(dom.script_result.clone())
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        if self.dom.lock().unwrap().fail_screenshot {
            return Err(E2eError::WebDriver {
                error: "unable to capture screen".to_string(),
                message: String::new(),
            });
        }
        Ok(b"\x89PNG\r\n\x1a\nfake".to_vec())
    }

    async fn page_source(&self) -> E2eResult<String> {
        let dom = self.dom.lock().unwrap();
        let names: Vec<&str> = dom
            .elements
            .iter()
            .filter(|e| e.attached)
            .map(|e| e.name.as_str())
            .collect();
        Ok(format!("<html><body>{}</body></html>", names.join(" ")))
    }

    async fn browser_logs(&self) -> E2eResult<Vec<LogEntry>> {
        Ok(std::mem::take(&mut self.dom.lock().unwrap().logs))
    }

    async fn set_window_size(&self, width: u32, height: u32) -> E2eResult<()> {
        self.dom.lock().unwrap().window_size = Some((width, height));
        Ok(())
    }

    async fn install_addon(&self, path: &Path, temporary: bool) -> E2eResult<String> {
        self.dom
            .lock()
            .unwrap()
            .addons
            .push((path.to_path_buf(), temporary));
        Ok("wallet@example.org".to_string())
    }

    async fn quit(&self) -> E2eResult<()> {
        self.dom.lock().unwrap().quit = true;
        Ok(())
    }
}
