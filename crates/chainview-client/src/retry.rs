//! Exponential backoff for transient RPC failures.
//!
//! Delays grow geometrically with random jitter so that many clients
//! recovering from the same outage do not retry in lockstep.

use rand::Rng;
use std::time::Duration;

/// Backoff configuration for [`with_backoff`].
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Cap applied to every delay
    pub max_delay: Duration,
    /// Growth factor per retry
    pub multiplier: f64,
    /// Jitter factor, 0.0 to 1.0
    pub jitter: f64,
    /// Total attempts, including the first
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: 0.2,
            max_attempts: 3,
        }
    }
}

impl BackoffConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the delay before the first retry.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the delay cap.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the total attempt count.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Sets the jitter factor, clamped to 0.0..=1.0.
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }
}

/// Iterator over the retry delays of a [`BackoffConfig`].
///
/// Yields `max_attempts - 1` delays: the first attempt is immediate.
#[derive(Debug)]
pub struct RetrySchedule {
    config: BackoffConfig,
    retries_left: u32,
    current: Duration,
}

impl RetrySchedule {
    /// Builds the schedule for `config`.
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            retries_left: config.max_attempts.saturating_sub(1),
            current: config.initial_delay,
            config,
        }
    }

    fn jittered(&self, base: Duration) -> Duration {
        if self.config.jitter <= 0.0 {
            return base;
        }
        let spread = base.as_secs_f64() * self.config.jitter;
        let offset = rand::thread_rng().gen_range(-spread..=spread);
        Duration::from_secs_f64((base.as_secs_f64() + offset).max(0.0))
    }
}

impl Iterator for RetrySchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.retries_left == 0 {
            return None;
        }
        self.retries_left -= 1;

        let delay = self.jittered(self.current).min(self.config.max_delay);
        self.current = Duration::from_secs_f64(
            (self.current.as_secs_f64() * self.config.multiplier)
                .min(self.config.max_delay.as_secs_f64()),
        );
        Some(delay)
    }
}

/// Runs `op` until it succeeds or the schedule is exhausted. Returns the
/// number of attempts made together with the last error.
pub async fn with_backoff<F, Fut, T, E>(config: BackoffConfig, mut op: F) -> Result<T, (u32, E)>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut schedule = RetrySchedule::new(config);
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => match schedule.next() {
                Some(delay) => {
                    tracing::debug!(attempt = attempts, %err, ?delay, "retrying after failure");
                    tokio::time::sleep(delay).await;
                }
                None => return Err((attempts, err)),
            },
        }
    }
}
