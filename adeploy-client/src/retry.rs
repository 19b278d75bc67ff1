//! Fixed-delay bounded retry for the network phases.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{ClientError, Result};

/// Retry budget shared by the three network phases: 3 attempts total with a
/// fixed sleep between them. The attempt count is an observable contract;
/// the delay is only a tuning knob.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Run `op` until it succeeds, fails definitively, or the budget is
    /// exhausted. Transient errors are logged and retried after the fixed
    /// delay; definitive errors abort immediately without consuming the
    /// remaining budget.
    pub async fn run<T, F, Fut>(&self, phase: &'static str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) if attempt < self.attempts => {
                    warn!(
                        "{} attempt {}/{} failed: {}",
                        phase, attempt, self.attempts, err
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(err) => {
                    return Err(ClientError::ExhaustedRetries {
                        phase,
                        attempts: self.attempts,
                        source: Box::new(err),
                    });
                }
            }
        }
    }
}
