//! Process-local fixed-window rate limiter keyed by `"{action}:{scope}"`.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use thiserror::Error;
use tokio::sync::Mutex;

/// A named request budget: at most `max_requests` per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub const ADMIN: Self = Self::per(100, 60);
    pub const SOCIAL_STATS: Self = Self::per(30, 60);
    pub const SUBMISSION: Self = Self::per(5, 60 * 60);
    pub const AI_CATEGORIZE: Self = Self::per(10, 60);
    pub const LOGIN: Self = Self::per(5, 15 * 60);

    const fn per(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Rate limit exceeded. Try again in {retry_after_secs} seconds.")]
pub struct RateLimitExceeded {
    pub retry_after_secs: u64,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

impl RateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one unit of `policy` for `action` scoped to `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitExceeded`] once the window's budget is spent.
    pub async fn check(
        &self,
        action: &str,
        scope: &str,
        policy: RateLimitPolicy,
    ) -> Result<(), RateLimitExceeded> {
        self.check_at(&format!("{action}:{scope}"), policy, Instant::now())
            .await
    }

    pub(crate) async fn check_at(
        &self,
        key: &str,
        policy: RateLimitPolicy,
        now: Instant,
    ) -> Result<(), RateLimitExceeded> {
        let mut windows = self.windows.lock().await;

        match windows.get_mut(key) {
            Some(window) if now < window.reset_at => {
                if window.count < policy.max_requests {
                    window.count += 1;
                    Ok(())
                } else {
                    Err(RateLimitExceeded {
                        retry_after_secs: ceil_secs(window.reset_at - now),
                    })
                }
            }
            _ => {
                windows.insert(
                    key.to_owned(),
                    Window {
                        count: 1,
                        reset_at: now + policy.window,
                    },
                );
                Ok(())
            }
        }
    }

    /// Drops every window that has already expired. Returns how many were
    /// removed.
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Instant::now()).await
    }

    pub(crate) async fn sweep_at(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, w| now < w.reset_at);
        before - windows.len()
    }
}
