//! Send a transaction from inside the wallet

use tracing::info;

use super::Walkthrough;
use crate::config::Backend;
use crate::error::{E2eError, E2eResult};
use crate::selectors::{self, css};

impl Walkthrough {
    pub(super) async fn start_send(&self) -> E2eResult<()> {
        let page = self.page();
        page.click(&selectors::button(selectors::SEND_TEXT), None).await?;
        self.pause(self.pacing.regular()).await;

        let address = page.find_element(&css(selectors::RECIPIENT_INPUT), None).await?;
        let amount = page.find_element(&css(selectors::AMOUNT_INPUT), None).await?;
        self.browser().send_keys(&address, &self.fixtures.recipient).await?;
        self.browser().send_keys(&amount, &self.fixtures.send_amount).await?;

        let echoed = self.browser().property(&amount, "value").await?;
        let echoed = echoed.as_str().unwrap_or_default();
        if echoed != self.fixtures.send_amount {
            return Err(E2eError::AssertionFailed(format!(
                "amount input should read '{}', got '{}'",
                self.fixtures.send_amount, echoed
            )));
        }
        Ok(())
    }

    pub(super) async fn open_and_close_gas_modal(&self) -> E2eResult<()> {
        let page = self.page();
        page.click(&css(selectors::ADVANCED_GAS_BUTTON), None).await?;
        self.pause(self.pacing.regular()).await;

        let modal = page.locate(&css(selectors::MODAL), None).await?;
        page.click(&selectors::button(selectors::SAVE_TEXT), None).await?;
        page.wait_stale(&modal, "gas modal", self.element_timeout()).await?;
        self.pause(self.pacing.regular()).await;
        Ok(())
    }

    pub(super) async fn continue_to_confirm(&self) -> E2eResult<()> {
        self.page()
            .click(&selectors::button(selectors::NEXT_TEXT), None)
            .await?;
        self.pause(self.pacing.regular()).await;
        Ok(())
    }

    pub(super) async fn confirm_transaction(&self) -> E2eResult<()> {
        self.page()
            .click(&selectors::button(selectors::CONFIRM_TEXT), None)
            .await?;
        self.pause(self.pacing.large()).await;
        Ok(())
    }

    /// Firefox renders the amount differently, so only the count is checked there
    pub(super) async fn find_transaction(&self) -> E2eResult<()> {
        let page = self.page();
        let item = css(selectors::TRANSACTION_ITEM);
        page.locate(&item, None).await?;
        page.assert_count(&item, 1).await?;

        if self.target.backend != Backend::Firefox {
            let amount = page
                .find_element(&css(selectors::TRANSACTION_AMOUNT), None)
                .await?;
            let text = page
                .wait_text_matches(&amount, &self.transaction_amount_pattern, self.element_timeout())
                .await?;
            info!("Transaction amount: {}", text);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::config::Backend;
    use crate::error::E2eError;
    use crate::fake_browser::{FakeBrowser, FakeDom};
    use crate::selectors::{self, css};
    use crate::walkthrough::testing::walkthrough;
    use crate::walkthrough::Step;

    fn send_form(dom: &mut FakeDom) {
        dom.add("send", selectors::button(selectors::SEND_TEXT));
        dom.add("recipient", css(selectors::RECIPIENT_INPUT));
        dom.add("amount", css(selectors::AMOUNT_INPUT));
    }

    fn transaction_list(dom: &mut FakeDom, amount: &str) {
        dom.add("tx-0", css(selectors::TRANSACTION_ITEM));
        dom.add("tx-0-amount", css(selectors::TRANSACTION_AMOUNT)).text(amount);
    }

    #[tokio::test]
    async fn test_start_send_echoes_amount() {
        let browser = Arc::new(FakeBrowser::new());
        browser.with_dom(send_form);

        let mut wt = walkthrough(&browser, Backend::Chrome);
        wt.execute(Step::StartSend).await.unwrap();

        browser.with_dom(|dom| {
            assert_eq!(
                dom.typed,
                vec![
                    (
                        "recipient".to_string(),
                        "0x2f318C334780961FB129D2a6c30D0763d9a5C970".to_string()
                    ),
                    ("amount".to_string(), "1".to_string()),
                ]
            );
        });
    }

    #[tokio::test]
    async fn test_start_send_detects_mangled_amount() {
        let browser = Arc::new(FakeBrowser::new());
        browser.with_dom(|dom| {
            send_form(dom);
            dom.element("amount").value = "0".to_string();
        });

        let mut wt = walkthrough(&browser, Backend::Chrome);
        let err = wt.execute(Step::StartSend).await.unwrap_err();
        assert!(matches!(err, E2eError::AssertionFailed(m) if m.contains("'01'")));
    }

    #[tokio::test]
    async fn test_gas_modal_closes() {
        let browser = Arc::new(FakeBrowser::new());
        browser.with_dom(|dom| {
            dom.add("advanced-gas", css(selectors::ADVANCED_GAS_BUTTON))
                .on_click(|dom: &mut FakeDom| {
                    dom.add("gas-modal", css(selectors::MODAL));
                    dom.add("save", selectors::button(selectors::SAVE_TEXT))
                        .on_click(|dom: &mut FakeDom| {
                            dom.detach("gas-modal");
                            dom.detach("save");
                        });
                });
        });

        let mut wt = walkthrough(&browser, Backend::Chrome);
        wt.execute(Step::OpenAndCloseGasModal).await.unwrap();
        browser.with_dom(|dom| assert_eq!(dom.clicks, vec!["advanced-gas", "save"]));
    }

    #[tokio::test]
    async fn test_confirm_flow_clicks_next_then_confirm() {
        let browser = Arc::new(FakeBrowser::new());
        browser.with_dom(|dom| {
            dom.add("next", selectors::button(selectors::NEXT_TEXT));
            dom.add("confirm", selectors::button(selectors::CONFIRM_TEXT));
        });

        let mut wt = walkthrough(&browser, Backend::Chrome);
        wt.execute(Step::ContinueToConfirm).await.unwrap();
        wt.execute(Step::ConfirmTransaction).await.unwrap();
        browser.with_dom(|dom| assert_eq!(dom.clicks, vec!["next", "confirm"]));
    }

    #[tokio::test]
    async fn test_single_transaction_with_negative_amount() {
        let browser = Arc::new(FakeBrowser::new());
        browser.with_dom(|dom| transaction_list(dom, "-1 ETH"));

        let mut wt = walkthrough(&browser, Backend::Chrome);
        wt.execute(Step::FindTransaction).await.unwrap();
    }

    #[tokio::test]
    async fn test_amount_not_checked_on_firefox() {
        let browser = Arc::new(FakeBrowser::new());
        browser.with_dom(|dom| transaction_list(dom, "1.000 ETH"));

        let mut chrome = walkthrough(&browser, Backend::Chrome);
        assert!(matches!(
            chrome.execute(Step::FindTransaction).await,
            Err(E2eError::Timeout(_))
        ));

        let mut firefox = walkthrough(&browser, Backend::Firefox);
        firefox.execute(Step::FindTransaction).await.unwrap();
    }

    #[tokio::test]
    async fn test_two_transactions_fail() {
        let browser = Arc::new(FakeBrowser::new());
        browser.with_dom(|dom| {
            transaction_list(dom, "-1 ETH");
            dom.add("tx-1", css(selectors::TRANSACTION_ITEM));
        });

        let mut wt = walkthrough(&browser, Backend::Firefox);
        let err = wt.execute(Step::FindTransaction).await.unwrap_err();
        assert!(matches!(err, E2eError::AssertionFailed(m) if m.contains("found 2")));
    }
}
