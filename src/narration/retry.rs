use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::foundation::error::SlidecastResult;

/// How often an external call is attempted before its failure is surfaced.
///
/// Only [`crate::SlidecastError::Service`] failures are retried; local failures surface at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first. `1` disables retrying.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: 0,
        }
    }
}

impl RetryPolicy {
    /// Run `call`, retrying service failures up to the configured attempt count.
    pub fn run<T>(
        &self,
        what: &str,
        mut call: impl FnMut() -> SlidecastResult<T>,
    ) -> SlidecastResult<T> {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match call() {
                Ok(v) => return Ok(v),
                Err(e) if e.is_service() && attempt < attempts => {
                    tracing::warn!(what, attempt, max = attempts, error = %e, "retrying");
                    if self.backoff_ms > 0 {
                        std::thread::sleep(Duration::from_millis(self.backoff_ms));
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
