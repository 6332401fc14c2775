// src/error_recovery.rs
//! Retry with exponential backoff for remote operations.
//!
//! A [`RetryPolicy`] wraps one logical call. Transient failures (see
//! [`AppError::is_transient`]) are retried with a doubling wait, capped at
//! the policy maximum, until the attempt ceiling is reached. Any other
//! failure is returned immediately and unchanged.

use crate::constants::{
    GENERATION_RETRY_ATTEMPTS, GENERATION_RETRY_BASE_DELAY, GENERATION_RETRY_MAX_DELAY,
    STORE_RETRY_ATTEMPTS, STORE_RETRY_BASE_DELAY, STORE_RETRY_MAX_DELAY,
};
use crate::error::AppError;
use std::future::Future;
use std::time::Duration;

/// Bounded exponential backoff for a single remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

/// How a retried call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    Succeeded,
    /// Every attempt failed transiently.
    Exhausted,
    /// A permanent failure stopped the loop early.
    NonRetryable,
}

/// Progress of one policy invocation, handed to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    /// 1-based number of the attempt that just finished.
    pub attempt: u32,
    pub max_attempts: u32,
    /// Wait before the next attempt; zero once the call is over.
    pub wait: Duration,
    /// `None` while the call is still being retried.
    pub outcome: Option<RetryOutcome>,
}

impl RetryPolicy {
    /// A zero attempt ceiling is treated as one attempt.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
        }
    }

    /// 5 attempts, 2 s doubling up to 30 s.
    pub fn for_store() -> Self {
        Self::new(
            STORE_RETRY_ATTEMPTS,
            STORE_RETRY_BASE_DELAY,
            STORE_RETRY_MAX_DELAY,
        )
    }

    /// 3 attempts, 2 s doubling up to 10 s.
    pub fn for_generation() -> Self {
        Self::new(
            GENERATION_RETRY_ATTEMPTS,
            GENERATION_RETRY_BASE_DELAY,
            GENERATION_RETRY_MAX_DELAY,
        )
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait after the `retry`-th failed attempt (1-based): `base * 2^(retry-1)`, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32
            .checked_shl(retry.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Every wait a fully exhausted call goes through, in order.
    pub fn backoff_schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts).map(|n| self.delay_for(n)).collect()
    }

    /// Runs `operation`, retrying transient failures.
    pub async fn run<F, Fut, T>(&self, label: &str, operation: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        self.run_with_observer(label, operation, |_| {}).await
    }

    /// Like [`run`](Self::run), reporting every state transition to `observe`.
    pub async fn run_with_observer<F, Fut, T, O>(
        &self,
        label: &str,
        mut operation: F,
        mut observe: O,
    ) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
        O: FnMut(&RetryState),
    {
        let mut state = RetryState {
            attempt: 0,
            max_attempts: self.max_attempts,
            wait: Duration::ZERO,
            outcome: None,
        };

        loop {
            state.attempt += 1;

            let error = match operation().await {
                Ok(value) => {
                    state.wait = Duration::ZERO;
                    state.outcome = Some(RetryOutcome::Succeeded);
                    observe(&state);
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !error.is_transient() {
                state.wait = Duration::ZERO;
                state.outcome = Some(RetryOutcome::NonRetryable);
                observe(&state);
                return Err(error);
            }

            if state.attempt >= self.max_attempts {
                log::error!(
                    "{} failed permanently after {} attempts: {}",
                    label,
                    state.attempt,
                    error
                );
                state.wait = Duration::ZERO;
                state.outcome = Some(RetryOutcome::Exhausted);
                observe(&state);
                return Err(AppError::RetriesExhausted {
                    operation: label.to_string(),
                    attempts: state.attempt,
                    last: Box::new(error),
                });
            }

            state.wait = self.delay_for(state.attempt);
            log::warn!(
                "{}: attempt {}/{} failed ({}), retrying in {:?}",
                label,
                state.attempt,
                self.max_attempts,
                error,
                state.wait
            );
            observe(&state);
            tokio::time::sleep(state.wait).await;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::for_store()
    }
}
