//! DOM selector surface of the extension UI
//!
//! Any markup change in the extension breaks the matching step, so every
//! selector the walkthrough depends on lives here.

use crate::locator::{button_containing, button_with_class_and_text, span_containing, By};

// First time flow
pub const WELCOME_BUTTON: &str = ".welcome-screen__button";
pub const CREATE_PASSWORD_INPUT: &str = ".create-password #create-password";
pub const CONFIRM_PASSWORD_INPUT: &str = ".create-password #confirm-password";
pub const CREATE_PASSWORD_BUTTON: &str = ".create-password button";
pub const UNIQUE_IMAGE_BUTTON: &str = ".unique-image button";
pub const NOTICE_BUTTON: &str = ".tou button";
pub const NOTICE_BODY: &str = ".markdown";
pub const TERMS_BOTTOM_LINK_TEXT: &str = "Attributions";

// Seed phrase backup
pub const REVEAL_SEED_BUTTON: &str =
    ".backup-phrase__secret-blocker .backup-phrase__reveal-button";
pub const SEED_WORDS: &str = ".backup-phrase__secret-words";
pub const BACKUP_PHRASE_BUTTON: &str = ".backup-phrase button";
pub const SEED_OPTION_UNSELECTED_CLASS: &str =
    "backup-phrase__confirm-seed-option backup-phrase__confirm-seed-option--unselected";

// Modals
pub const MODAL: &str = "span .modal";
pub const MODAL_CLOSE: &str = ".page-container__header-close";

// Account
pub const ACCOUNT_DETAILS_TOGGLE: &str = "div.menu-bar__open-in-browser";
pub const ACCOUNT_DETAILS_ITEMS: &str = "div.menu.account-details-dropdown div.menu__item";
pub const ACCOUNT_MENU_ICON: &str = ".account-menu__icon";
pub const LOGOUT_BUTTON: &str = ".account-menu__logout-button";
pub const LOGOUT_TEXT: &str = "Log out";

// Import
pub const IMPORT_SEED_LINK: &str = ".unlock-page__link--import";
pub const IMPORT_SEED_LINK_TEXT: &str = "Import using account seed phrase";
pub const SEED_TEXTAREA: &str = "textarea";
pub const INPUTS: &str = "input";
pub const FIRST_TIME_FLOW_BUTTON: &str = ".first-time-flow__button";

// Network and balance
pub const NETWORK_NAME: &str = ".network-name";
pub const PRIMARY_BALANCE: &str = ".transaction-view-balance__primary-balance";

// Send
pub const RECIPIENT_INPUT: &str = "input[placeholder=\"Recipient Address\"]";
pub const AMOUNT_INPUT: &str = ".unit-input__input";
pub const ADVANCED_GAS_BUTTON: &str = ".advanced-gas-options-btn";
pub const TRANSACTION_ITEM: &str = ".transaction-list-item";
pub const TRANSACTION_AMOUNT: &str = ".transaction-list-item__amount--primary";

pub const CONFIRM_TEXT: &str = "Confirm";
pub const SEND_TEXT: &str = "Send";
pub const SAVE_TEXT: &str = "Save";
pub const NEXT_TEXT: &str = "Next";

pub fn css(selector: &str) -> By {
    By::css(selector)
}

/// Unselected word in the seed confirmation palette; the whole label must
/// match since some words contain others
pub fn seed_word_option(word: &str) -> By {
    button_with_class_and_text(SEED_OPTION_UNSELECTED_CLASS, word)
}

pub fn button(text: &str) -> By {
    button_containing(text)
}

/// Entry in the network dropdown
pub fn network_option(name: &str) -> By {
    span_containing(name)
}

pub fn terms_bottom_link() -> By {
    By::link_text(TERMS_BOTTOM_LINK_TEXT)
}
