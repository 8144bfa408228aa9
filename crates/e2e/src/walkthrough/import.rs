//! Log out, restore from a known phrase, switch to the local chain

use tracing::info;

use super::Walkthrough;
use crate::error::{E2eError, E2eResult};
use crate::selectors::{self, css};

impl Walkthrough {
    pub(super) async fn log_out(&self) -> E2eResult<()> {
        let page = self.page();
        page.click(&css(selectors::ACCOUNT_MENU_ICON), None).await?;
        self.pause(self.pacing.regular()).await;

        let logout = page.find_element(&css(selectors::LOGOUT_BUTTON), None).await?;
        page.assert_text(&logout, selectors::LOGOUT_TEXT).await?;
        self.browser().click(&logout).await?;
        self.pause(self.pacing.regular()).await;
        Ok(())
    }

    pub(super) async fn import_seed_phrase(&self) -> E2eResult<()> {
        let page = self.page();

        let restore = page.find_element(&css(selectors::IMPORT_SEED_LINK), None).await?;
        page.assert_text(&restore, selectors::IMPORT_SEED_LINK_TEXT).await?;
        self.browser().click(&restore).await?;
        self.pause(self.pacing.regular()).await;

        let seed_input = page.find_element(&css(selectors::SEED_TEXTAREA), None).await?;
        self.browser()
            .send_keys(&seed_input, &self.fixtures.import_seed_phrase)
            .await?;
        self.pause(self.pacing.regular()).await;

        let inputs = page.find_elements(&css(selectors::INPUTS), None).await?;
        let [password, confirm, ..] = inputs.as_slice() else {
            return Err(E2eError::AssertionFailed(format!(
                "import form should have password and confirmation inputs, found {} input(s)",
                inputs.len()
            )));
        };
        self.pause(self.pacing.regular()).await;

        self.browser().send_keys(password, &self.fixtures.password).await?;
        self.browser().send_keys(confirm, &self.fixtures.password).await?;
        page.click(&css(selectors::FIRST_TIME_FLOW_BUTTON), None).await?;
        self.pause(self.pacing.regular()).await;
        Ok(())
    }

    pub(super) async fn switch_to_localhost(&self) -> E2eResult<()> {
        let page = self.page();
        page.click(&css(selectors::NETWORK_NAME), None).await?;
        self.pause(self.pacing.regular()).await;

        let network = &self.fixtures.network_name;
        let options = page
            .find_elements(&selectors::network_option(network), None)
            .await?;
        let first = options
            .first()
            .ok_or_else(|| E2eError::ElementNotFound(format!("network option '{}'", network)))?;
        self.browser().click(first).await?;
        info!("Switched network to {}", network);
        self.pause(self.pacing.large_times(2)).await;
        Ok(())
    }

    /// Needs the local chain seeded with the expected balance
    pub(super) async fn balance_renders(&self) -> E2eResult<()> {
        let page = self.page();
        let balance = page.find_element(&css(selectors::PRIMARY_BALANCE), None).await?;
        let text = page
            .wait_text_matches(&balance, &self.balance_pattern, None)
            .await?;
        info!("Balance rendered: {}", text);
        self.pause(self.pacing.regular()).await;
        Ok(())
    }
}
