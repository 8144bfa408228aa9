//! Wallet extension E2E walkthrough
//!
//! This crate drives a real browser over the W3C WebDriver protocol to:
//! - Start Chrome or Firefox with the wallet extension installed
//! - Walk through onboarding, seed phrase backup and re-entry
//! - Restore a known vault, switch to a local chain and send ETH
//! - Capture a screenshot and DOM dump for the first failing step
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Wallet E2E Runner (Rust)                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SuiteRunner                                                │
//! │    ├── Session::bootstrap() -> Session                      │
//! │    ├── Walkthrough::execute(step) -> E2eResult<()>          │
//! │    ├── check_console_errors() (chrome only)                 │
//! │    └── FailureReporter::capture() -> FailureReport          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Walkthrough                                                │
//! │    ├── first time flow     (9 steps, seed retry x3)         │
//! │    ├── account information (1 step)                         │
//! │    ├── import seed phrase  (4 steps)                        │
//! │    └── send ETH            (5 steps)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Browser (trait)                                            │
//! │    └── WebDriverClient  (chromedriver / geckodriver)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod browser;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod locator;
pub mod page;
pub mod retry;
pub mod runner;
pub mod seed;
pub mod selectors;
pub mod session;
pub mod wait;
pub mod walkthrough;
pub mod webdriver;

#[cfg(test)]
mod fake_browser;

pub use config::{Backend, SuiteConfig};
pub use error::{E2eError, E2eResult};
pub use runner::{SuiteResult, SuiteRunner};
pub use walkthrough::{Step, StepGroup};
