//! Account details dropdown

use super::Walkthrough;
use crate::error::E2eResult;
use crate::selectors::{self, css};

/// HD wallet accounts have no "remove account" entry
pub const ACCOUNT_DETAILS_ACTIONS: usize = 3;

impl Walkthrough {
    pub(super) async fn show_account_details_menu(&self) -> E2eResult<()> {
        let page = self.page();
        page.click(&css(selectors::ACCOUNT_DETAILS_TOGGLE), None).await?;

        let items = css(selectors::ACCOUNT_DETAILS_ITEMS);
        page.locate(&items, None).await?;
        page.assert_count(&items, ACCOUNT_DETAILS_ACTIONS).await?;
        self.pause(self.pacing.regular()).await;
        Ok(())
    }
}
