//! Bounded polling

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::time::sleep;

use crate::error::{E2eError, E2eResult};

/// Polls a condition until it holds or the deadline passes
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    timeout: Duration,
    poll_interval: Duration,
}

impl Waiter {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Run `probe` until it yields `Some`.
    ///
    /// Transient errors (element missing or detached) count as "not yet";
    /// anything else aborts the wait. The probe always runs at least once.
    pub async fn until<T, F, Fut>(&self, what: &str, mut probe: F) -> E2eResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = E2eResult<Option<T>>>,
    {
        let start = Instant::now();

        loop {
            match probe().await {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(e) if e.is_transient() => {}
                Err(e) => return Err(e),
            }

            if start.elapsed() >= self.timeout {
                return Err(E2eError::Timeout(format!(
                    "{} (after {} ms)",
                    what,
                    self.timeout.as_millis()
                )));
            }

            sleep(self.poll_interval).await;
        }
    }
}
