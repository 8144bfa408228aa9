//! First time flow: welcome, password, notices, seed phrase backup

use tracing::info;

use super::Walkthrough;
use crate::error::{E2eError, E2eResult};
use crate::selectors::{self, css, seed_word_option};
use crate::seed::SeedPhrase;
use crate::session::load_extension;

impl Walkthrough {
    pub(super) async fn click_welcome(&self) -> E2eResult<()> {
        self.page().click(&css(selectors::WELCOME_BUTTON), None).await?;
        self.pause(self.pacing.large()).await;
        Ok(())
    }

    pub(super) async fn accept_password(&self) -> E2eResult<()> {
        let page = self.page();
        let password = page.find_element(&css(selectors::CREATE_PASSWORD_INPUT), None).await?;
        let confirm = page.find_element(&css(selectors::CONFIRM_PASSWORD_INPUT), None).await?;
        let button = page.find_element(&css(selectors::CREATE_PASSWORD_BUTTON), None).await?;

        self.browser().send_keys(&password, &self.fixtures.password).await?;
        self.browser().send_keys(&confirm, &self.fixtures.password).await?;
        self.browser().click(&button).await?;
        self.pause(self.pacing.regular()).await;
        Ok(())
    }

    pub(super) async fn click_through_unique_image(&self) -> E2eResult<()> {
        self.page().click(&css(selectors::UNIQUE_IMAGE_BUTTON), None).await?;
        self.pause(self.pacing.regular()).await;
        Ok(())
    }

    /// The continue button stays disabled until the terms are scrolled to
    /// their last link.
    pub(super) async fn click_through_terms_of_use(&self) -> E2eResult<()> {
        let page = self.page();
        let continue_by = css(selectors::NOTICE_BUTTON);

        let early = page.locate(&continue_by, None).await?;
        if self.browser().is_enabled(&early).await? {
            return Err(E2eError::AssertionFailed(
                "terms of use continue button is enabled before scrolling".to_string(),
            ));
        }

        let bottom = page.find_element(&selectors::terms_bottom_link(), None).await?;
        page.scroll_into_view(&bottom).await?;
        self.pause(self.pacing.regular()).await;

        let accept = page.find_element(&continue_by, None).await?;
        page.wait_enabled(&accept, "terms of use continue button", None).await?;
        self.browser().click(&accept).await?;
        self.pause(self.pacing.regular()).await;
        Ok(())
    }

    pub(super) async fn click_through_privacy_notice(&self) -> E2eResult<()> {
        self.page().click(&css(selectors::NOTICE_BUTTON), None).await?;
        self.pause(self.pacing.regular()).await;
        Ok(())
    }

    pub(super) async fn click_through_phishing_notice(&self) -> E2eResult<()> {
        let page = self.page();
        let notice = page.locate(&css(selectors::NOTICE_BODY), None).await?;
        page.scroll_to_bottom(&notice).await?;
        self.pause(self.pacing.regular()).await;

        page.click(&css(selectors::NOTICE_BUTTON), None).await?;
        self.pause(self.pacing.regular()).await;
        Ok(())
    }

    pub(super) async fn reveal_seed_phrase(&mut self) -> E2eResult<()> {
        self.reveal_secret_words().await?;

        let page = self.page();
        let words = page.find_element(&css(selectors::SEED_WORDS), None).await?;
        let seed = SeedPhrase::parse(&self.browser().text(&words).await?)?;
        self.pause(self.pacing.regular()).await;

        self.continue_from_backup().await?;
        info!("Captured seed phrase ({} words)", seed.words().len());
        self.seed_phrase = Some(seed);
        Ok(())
    }

    /// Click the words back in order. A failed click reloads the extension
    /// and replays reveal + continue + words, within the retry bound.
    pub(super) async fn retype_seed_phrase(&self) -> E2eResult<()> {
        let seed = self.seed_phrase.as_ref().ok_or_else(|| {
            E2eError::AssertionFailed("no seed phrase was captured before re-entry".to_string())
        })?;
        let words = seed.words();
        let this = self;

        self.retry
            .run(
                move |attempt| async move {
                    if attempt > 1 {
                        this.reveal_secret_words().await?;
                        this.continue_from_backup().await?;
                    }
                    for word in words {
                        this.click_seed_word(word).await?;
                    }
                    Ok(())
                },
                move || async move { load_extension(this.browser(), &this.target).await },
            )
            .await?;

        self.page()
            .click(&selectors::button(selectors::CONFIRM_TEXT), None)
            .await?;
        self.pause(self.pacing.regular()).await;
        Ok(())
    }

    /// The deposit modal must be gone before anything else is clicked
    pub(super) async fn dismiss_deposit_modal(&self) -> E2eResult<()> {
        let page = self.page();
        let modal = page.locate(&css(selectors::MODAL), None).await?;
        page.click(&css(selectors::MODAL_CLOSE), None).await?;
        page.wait_stale(&modal, "deposit modal", None).await?;
        self.pause(self.pacing.regular()).await;
        Ok(())
    }

    async fn reveal_secret_words(&self) -> E2eResult<()> {
        let page = self.page();
        let reveal = css(selectors::REVEAL_SEED_BUTTON);
        page.locate(&reveal, self.element_timeout()).await?;
        page.click(&reveal, self.element_timeout()).await?;
        self.pause(self.pacing.regular()).await;
        Ok(())
    }

    async fn continue_from_backup(&self) -> E2eResult<()> {
        self.page()
            .click(&css(selectors::BACKUP_PHRASE_BUTTON), None)
            .await?;
        self.pause(self.pacing.regular()).await;
        Ok(())
    }

    async fn click_seed_word(&self, word: &str) -> E2eResult<()> {
        self.page()
            .click(&seed_word_option(word), self.element_timeout())
            .await?;
        self.pause(self.pacing.tiny()).await;
        Ok(())
    }
}
