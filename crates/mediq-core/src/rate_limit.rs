//! Global invocation rate limiting.
//!
//! One limiter instance is shared by every pipeline in the process, so the
//! ceiling applies to total backend traffic rather than per run. Unlike a
//! rejecting limiter, [`acquire`](RateLimiter::acquire) suspends the caller
//! until the sliding window has budget again; no call is ever dropped.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Sliding-window rate limiter that suspends callers instead of rejecting.
///
/// Waiters are served in arrival order: the internal mutex queues them
/// fairly, and a caller that finds the window full sleeps while still
/// holding the lock, keeping everyone behind it in line.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    grants: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Ceiling of `max_rpm` invocations per minute. `0` disables the
    /// ceiling entirely.
    pub fn per_minute(max_rpm: u32) -> Self {
        Self::new(max_rpm, Duration::from_secs(60))
    }

    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            grants: Mutex::new(VecDeque::new()),
        }
    }

    /// The configured ceiling (requests per window).
    pub fn limit(&self) -> u32 {
        self.max_requests
    }

    /// Wait until the window has budget, then record the grant.
    pub async fn acquire(&self) {
        if self.max_requests == 0 {
            return;
        }

        let mut grants = self.grants.lock().await;
        loop {
            let now = Instant::now();
            while grants
                .front()
                .map(|t| now.duration_since(*t) >= self.window)
                .unwrap_or(false)
            {
                grants.pop_front();
            }

            if (grants.len() as u32) < self.max_requests {
                grants.push_back(now);
                return;
            }

            // Window is full. The front grant is the next to age out; sleep
            // until it does while holding the lock so later callers stay
            // queued behind this one.
            if let Some(&oldest) = grants.front() {
                tracing::debug!(
                    "[RateLimiter] Ceiling of {} per {:?} reached, suspending",
                    self.max_requests,
                    self.window
                );
                tokio::time::sleep_until(oldest + self.window).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_zero_limit_is_unlimited() {
        let limiter = RateLimiter::per_minute(0);
        let start = Instant::now();
        for _ in 0..100 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_under_ceiling_is_immediate() {
        let limiter = RateLimiter::per_minute(3);
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_over_ceiling_waits_out_the_window() {
        let limiter = RateLimiter::per_minute(2);
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_frees_as_window_slides() {
        let limiter = RateLimiter::per_minute(2);
        limiter.acquire().await;
        limiter.acquire().await;

        tokio::time::sleep(Duration::from_secs(61)).await;

        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiters_are_served_in_arrival_order() {
        let limiter = Arc::new(RateLimiter::new(1, Duration::from_secs(1)));
        limiter.acquire().await;

        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut handles = Vec::new();
        for i in 0..3 {
            let limiter = limiter.clone();
            let order = order.clone();
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
                order.lock().unwrap().push(i);
            }));
            // Let the spawned task reach the limiter queue before the next
            // one starts.
            tokio::task::yield_now().await;
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }
}
