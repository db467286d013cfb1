// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded retry for lock timeouts
//!
//! Only `LockTimeout` is retried: a timed-out operation had no side
//! effects, so repeating it is safe. Business rejections and not-found
//! errors surface immediately.

use std::future::Future;

use crate::config::RetryConfig;
use crate::error::EngineError;

/// Run `operation`, retrying lock timeouts with doubling backoff
///
/// Makes at most `config.max_attempts` attempts (a zero behaves like one).
/// Every other error, and the last timeout, is returned as-is.
pub async fn retry_timeouts<T, F, Fut>(
    config: &RetryConfig,
    mut operation: F,
) -> Result<T, EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EngineError>>,
{
    let mut delay = config.base_delay;
    let mut attempt = 1u32;

    loop {
        match operation().await {
            Err(EngineError::LockTimeout) if attempt < config.max_attempts => {
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "lock wait timed out, retrying"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            result => return result,
        }
    }
}
