//! Finite retry with a reset action between attempts

use std::future::Future;

use tracing::warn;

use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `attempt` (numbered from 1) until it succeeds.
    ///
    /// `reset` runs before every attempt after the first. A failing reset is
    /// not retried. Once the bound is reached the last attempt's error is
    /// returned inside `RetryExhausted`.
    pub async fn run<T, A, AFut, R, RFut>(&self, mut attempt: A, mut reset: R) -> E2eResult<T>
    where
        A: FnMut(u32) -> AFut,
        AFut: Future<Output = E2eResult<T>>,
        R: FnMut() -> RFut,
        RFut: Future<Output = E2eResult<()>>,
    {
        let mut number = 1;
        loop {
            match attempt(number).await {
                Ok(value) => return Ok(value),
                Err(e) if number >= self.max_attempts => {
                    return Err(E2eError::RetryExhausted {
                        attempts: number,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    warn!(
                        "attempt {}/{} failed: {}; resetting",
                        number, self.max_attempts, e
                    );
                    reset().await?;
                    number += 1;
                }
            }
        }
    }
}
