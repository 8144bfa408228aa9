//! The scripted walkthrough: named steps in fixed groups

mod account;
mod import;
mod onboarding;
mod send;

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::debug;

use crate::browser::Browser;
use crate::config::{Fixtures, Pacing, SuiteConfig, Timeouts};
use crate::error::E2eResult;
use crate::page::Page;
use crate::retry::RetryPolicy;
use crate::seed::SeedPhrase;
use crate::session::ExtensionTarget;
use crate::wait::Waiter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepGroup {
    FirstTimeFlow,
    AccountInformation,
    ImportSeedPhrase,
    SendEth,
}

impl StepGroup {
    pub const ALL: [StepGroup; 4] = [
        StepGroup::FirstTimeFlow,
        StepGroup::AccountInformation,
        StepGroup::ImportSeedPhrase,
        StepGroup::SendEth,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            StepGroup::FirstTimeFlow => "Going through the first time flow",
            StepGroup::AccountInformation => "Show account information",
            StepGroup::ImportSeedPhrase => "Import seed phrase",
            StepGroup::SendEth => "Send ETH from inside the wallet",
        }
    }

    pub fn steps(&self) -> &'static [Step] {
        match self {
            StepGroup::FirstTimeFlow => &[
                Step::ClickWelcome,
                Step::AcceptPassword,
                Step::ClickThroughUniqueImage,
                Step::ClickThroughTermsOfUse,
                Step::ClickThroughPrivacyNotice,
                Step::ClickThroughPhishingNotice,
                Step::RevealSeedPhrase,
                Step::RetypeSeedPhrase,
                Step::DismissDepositModal,
            ],
            StepGroup::AccountInformation => &[Step::ShowAccountDetailsMenu],
            StepGroup::ImportSeedPhrase => &[
                Step::LogOut,
                Step::ImportSeedPhrase,
                Step::SwitchToLocalhost,
                Step::BalanceRenders,
            ],
            StepGroup::SendEth => &[
                Step::StartSend,
                Step::OpenAndCloseGasModal,
                Step::ContinueToConfirm,
                Step::ConfirmTransaction,
                Step::FindTransaction,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    ClickWelcome,
    AcceptPassword,
    ClickThroughUniqueImage,
    ClickThroughTermsOfUse,
    ClickThroughPrivacyNotice,
    ClickThroughPhishingNotice,
    RevealSeedPhrase,
    RetypeSeedPhrase,
    DismissDepositModal,
    ShowAccountDetailsMenu,
    LogOut,
    ImportSeedPhrase,
    SwitchToLocalhost,
    BalanceRenders,
    StartSend,
    OpenAndCloseGasModal,
    ContinueToConfirm,
    ConfirmTransaction,
    FindTransaction,
}

impl Step {
    pub fn title(&self) -> &'static str {
        match self {
            Step::ClickWelcome => "clicks the continue button on the welcome screen",
            Step::AcceptPassword => "accepts a secure password",
            Step::ClickThroughUniqueImage => "clicks through the unique image screen",
            Step::ClickThroughTermsOfUse => "clicks through the ToS",
            Step::ClickThroughPrivacyNotice => "clicks through the privacy notice",
            Step::ClickThroughPhishingNotice => "clicks through the phishing notice",
            Step::RevealSeedPhrase => "reveals the seed phrase",
            Step::RetypeSeedPhrase => "can retype the seed phrase",
            Step::DismissDepositModal => "clicks through the deposit modal",
            Step::ShowAccountDetailsMenu => "show account details dropdown menu",
            Step::LogOut => "logs out of the vault",
            Step::ImportSeedPhrase => "imports seed phrase",
            Step::SwitchToLocalhost => "switches to localhost",
            Step::BalanceRenders => "balance renders",
            Step::StartSend => "starts to send a transaction",
            Step::OpenAndCloseGasModal => "opens and closes the gas modal",
            Step::ContinueToConfirm => "clicks through to the confirm screen",
            Step::ConfirmTransaction => "confirms the transaction",
            Step::FindTransaction => "finds the transaction in the transactions list",
        }
    }

    pub fn group(&self) -> StepGroup {
        StepGroup::ALL
            .into_iter()
            .find(|group| group.steps().contains(self))
            .unwrap_or(StepGroup::FirstTimeFlow)
    }
}

/// State carried from one step to the next
pub struct Walkthrough {
    browser: Arc<dyn Browser>,
    target: ExtensionTarget,
    pacing: Pacing,
    timeouts: Timeouts,
    fixtures: Fixtures,
    retry: RetryPolicy,
    balance_pattern: Regex,
    transaction_amount_pattern: Regex,
    seed_phrase: Option<SeedPhrase>,
}

impl Walkthrough {
    pub fn new(
        browser: Arc<dyn Browser>,
        target: ExtensionTarget,
        config: &SuiteConfig,
    ) -> E2eResult<Self> {
        Ok(Self {
            browser,
            target,
            pacing: config.pacing.clone(),
            timeouts: config.timeouts.clone(),
            fixtures: config.fixtures.clone(),
            retry: RetryPolicy::new(config.max_seed_attempts()),
            balance_pattern: config.fixtures.balance_regex()?,
            transaction_amount_pattern: config.fixtures.transaction_amount_regex()?,
            seed_phrase: None,
        })
    }

    /// Phrase captured by the reveal step, if it has run
    pub fn seed_phrase(&self) -> Option<&SeedPhrase> {
        self.seed_phrase.as_ref()
    }

    pub async fn execute(&mut self, step: Step) -> E2eResult<()> {
        debug!("Executing step: {}", step.title());
        match step {
            Step::ClickWelcome => self.click_welcome().await,
            Step::AcceptPassword => self.accept_password().await,
            Step::ClickThroughUniqueImage => self.click_through_unique_image().await,
            Step::ClickThroughTermsOfUse => self.click_through_terms_of_use().await,
            Step::ClickThroughPrivacyNotice => self.click_through_privacy_notice().await,
            Step::ClickThroughPhishingNotice => self.click_through_phishing_notice().await,
            Step::RevealSeedPhrase => self.reveal_seed_phrase().await,
            Step::RetypeSeedPhrase => self.retype_seed_phrase().await,
            Step::DismissDepositModal => self.dismiss_deposit_modal().await,
            Step::ShowAccountDetailsMenu => self.show_account_details_menu().await,
            Step::LogOut => self.log_out().await,
            Step::ImportSeedPhrase => self.import_seed_phrase().await,
            Step::SwitchToLocalhost => self.switch_to_localhost().await,
            Step::BalanceRenders => self.balance_renders().await,
            Step::StartSend => self.start_send().await,
            Step::OpenAndCloseGasModal => self.open_and_close_gas_modal().await,
            Step::ContinueToConfirm => self.continue_to_confirm().await,
            Step::ConfirmTransaction => self.confirm_transaction().await,
            Step::FindTransaction => self.find_transaction().await,
        }
    }

    fn page(&self) -> Page<'_> {
        Page::new(
            self.browser.as_ref(),
            Waiter::new(self.timeouts.default_wait(), self.timeouts.poll()),
        )
    }

    fn browser(&self) -> &dyn Browser {
        self.browser.as_ref()
    }

    /// Bound for lookups that carry their own explicit timeout
    fn element_timeout(&self) -> Option<Duration> {
        Some(self.timeouts.element())
    }

    async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}
