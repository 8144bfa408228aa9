//! Element lookups and explicit waits over a [`Browser`]

use std::time::Duration;

use regex::Regex;
use tracing::debug;

use crate::browser::{Browser, ElementRef};
use crate::error::{E2eError, E2eResult};
use crate::locator::By;
use crate::wait::Waiter;

/// The page currently loaded in the session
#[derive(Clone, Copy)]
pub struct Page<'a> {
    browser: &'a dyn Browser,
    waiter: Waiter,
}

impl<'a> Page<'a> {
    /// `waiter` carries the suite-wide default bound
    pub fn new(browser: &'a dyn Browser, waiter: Waiter) -> Self {
        Self { browser, waiter }
    }

    fn bounded(&self, timeout: Option<Duration>) -> Waiter {
        match timeout {
            Some(t) => self.waiter.with_timeout(t),
            None => self.waiter,
        }
    }

    /// Wait until at least one element matches
    pub async fn locate(&self, by: &By, timeout: Option<Duration>) -> E2eResult<ElementRef> {
        let browser = self.browser;
        self.bounded(timeout)
            .until(&format!("{} to be located", by), move || async move {
                Ok(browser.find_elements(by).await?.into_iter().next())
            })
            .await
    }

    /// Wait until an element is located and visible
    pub async fn find_element(&self, by: &By, timeout: Option<Duration>) -> E2eResult<ElementRef> {
        let element = self.locate(by, timeout).await?;
        self.wait_visible(&element, by, timeout).await?;
        Ok(element)
    }

    /// Wait until something matches, then return every match
    pub async fn find_elements(
        &self,
        by: &By,
        timeout: Option<Duration>,
    ) -> E2eResult<Vec<ElementRef>> {
        self.locate(by, timeout).await?;
        self.browser.find_elements(by).await
    }

    pub async fn wait_visible(
        &self,
        element: &ElementRef,
        by: &By,
        timeout: Option<Duration>,
    ) -> E2eResult<()> {
        let browser = self.browser;
        self.bounded(timeout)
            .until(&format!("{} to be visible", by), move || async move {
                Ok(browser.is_displayed(element).await?.then_some(()))
            })
            .await
    }

    pub async fn wait_enabled(
        &self,
        element: &ElementRef,
        what: &str,
        timeout: Option<Duration>,
    ) -> E2eResult<()> {
        let browser = self.browser;
        self.bounded(timeout)
            .until(&format!("{} to be enabled", what), move || async move {
                Ok(browser.is_enabled(element).await?.then_some(()))
            })
            .await
    }

    /// Wait until the element is detached from the document
    pub async fn wait_stale(
        &self,
        element: &ElementRef,
        what: &str,
        timeout: Option<Duration>,
    ) -> E2eResult<()> {
        let browser = self.browser;
        self.bounded(timeout)
            .until(&format!("{} to be removed", what), move || async move {
                Ok(browser.is_stale(element).await?.then_some(()))
            })
            .await?;
        debug!("{} detached", what);
        Ok(())
    }

    /// Wait until the element's text matches `pattern`; returns that text
    pub async fn wait_text_matches(
        &self,
        element: &ElementRef,
        pattern: &Regex,
        timeout: Option<Duration>,
    ) -> E2eResult<String> {
        let browser = self.browser;
        self.bounded(timeout)
            .until(&format!("text to match /{}/", pattern), move || async move {
                let text = browser.text(element).await?;
                Ok(pattern.is_match(&text).then_some(text))
            })
            .await
    }

    pub async fn click(&self, by: &By, timeout: Option<Duration>) -> E2eResult<()> {
        let element = self.find_element(by, timeout).await?;
        self.browser.click(&element).await
    }

    pub async fn scroll_into_view(&self, element: &ElementRef) -> E2eResult<()> {
        self.browser
            .execute_script("arguments[0].scrollIntoView(true)", vec![element.to_json()])
            .await?;
        Ok(())
    }

    pub async fn scroll_to_bottom(&self, element: &ElementRef) -> E2eResult<()> {
        self.browser
            .execute_script(
                "arguments[0].scrollTop = arguments[0].scrollHeight",
                vec![element.to_json()],
            )
            .await?;
        Ok(())
    }

    /// Assert the exact number of matches right now, without waiting
    pub async fn assert_count(&self, by: &By, expected: usize) -> E2eResult<Vec<ElementRef>> {
        let found = self.browser.find_elements(by).await?;
        if found.len() != expected {
            return Err(E2eError::AssertionFailed(format!(
                "expected {} element(s) for {}, found {}",
                expected,
                by,
                found.len()
            )));
        }
        Ok(found)
    }

    pub async fn assert_text(&self, element: &ElementRef, expected: &str) -> E2eResult<()> {
        let actual = self.browser.text(element).await?;
        if actual != expected {
            return Err(E2eError::AssertionFailed(format!(
                "expected text '{}', got '{}'",
                expected, actual
            )));
        }
        Ok(())
    }
}
