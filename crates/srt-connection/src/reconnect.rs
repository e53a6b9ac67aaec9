//! Opt-in reconnection with exponential backoff

use std::time::Duration;

use srt_core::config::BackoffConfig;
use srt_core::traits::SocketFactory;
use srt_core::SrtError;

use crate::connection::SrtConnection;

/// Exponential backoff with jitter for reconnection attempts
pub struct ExponentialBackoff {
    /// Current delay
    current: Duration,
    /// Maximum delay
    max: Duration,
    /// Multiplier
    multiplier: f64,
    /// Jitter factor (0.0 to 1.0)
    jitter: f64,
    /// Failed attempts tolerated before giving up
    max_attempts: Option<u32>,
}

impl ExponentialBackoff {
    /// Create a new backoff from configuration
    ///
    /// Does not validate; see [`BackoffConfig::validate`]. Unusable values
    /// still never panic in `next_delay`.
    pub fn from_config(config: &BackoffConfig) -> Self {
        Self {
            current: config.initial,
            max: config.max,
            multiplier: config.multiplier,
            jitter: clamp_jitter(config.jitter),
            max_attempts: config.max_attempts,
        }
    }

    /// Create a new backoff with custom parameters and no attempt limit
    pub fn new(initial: Duration, max: Duration, multiplier: f64, jitter: f64) -> Self {
        Self {
            current: initial,
            max,
            multiplier,
            jitter: clamp_jitter(jitter),
            max_attempts: None,
        }
    }

    /// Stop after `attempts` failed attempts
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Get the next delay and advance the backoff
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;

        // Negative, NaN and overflowing products saturate at `max`
        let next = Duration::try_from_secs_f64(self.current.as_secs_f64() * self.multiplier)
            .unwrap_or(self.max);
        self.current = std::cmp::min(next, self.max);

        let jitter_amount = delay.as_secs_f64() * self.jitter * rand::random::<f64>();
        delay.saturating_add(Duration::try_from_secs_f64(jitter_amount).unwrap_or_default())
    }

    /// Whether `failures` failed attempts exhaust the budget
    pub fn is_exhausted(&self, failures: u32) -> bool {
        self.max_attempts.map_or(false, |max| failures >= max)
    }

    /// Reset the backoff to initial delay
    pub fn reset(&mut self, initial: Duration) {
        self.current = initial;
    }
}

fn clamp_jitter(jitter: f64) -> f64 {
    if jitter.is_nan() {
        0.0
    } else {
        jitter.clamp(0.0, 1.0)
    }
}

impl<F: SocketFactory> SrtConnection<F> {
    /// Backoff built from this connection's configuration
    ///
    /// Fails with `ConfigError::Invalid` when the backoff settings are
    /// unusable.
    pub fn backoff(&self) -> Result<ExponentialBackoff, SrtError> {
        let config = &self.config().backoff;
        config.validate()?;
        Ok(ExponentialBackoff::from_config(config))
    }

    /// `connect`, retrying socket connection failures after a delay
    ///
    /// The sockets of a failed attempt are closed before the next one.
    /// Invalid addresses and rejected handshakes are returned immediately.
    pub async fn connect_with_retry(
        &mut self,
        address: &str,
        mut backoff: ExponentialBackoff,
    ) -> Result<(), SrtError> {
        let mut failures = 0u32;
        loop {
            match self.connect(address).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_connection_failed() => {
                    failures += 1;
                    if backoff.is_exhausted(failures) {
                        tracing::error!(
                            "Giving up on {} after {} attempts: {}",
                            address,
                            failures,
                            e
                        );
                        return Err(e);
                    }
                    self.close_sockets().await;
                    let delay = backoff.next_delay();
                    tracing::warn!("Connection failed: {}. Retrying in {:?}", e, delay);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_increases() {
        let mut backoff = ExponentialBackoff::new(
            Duration::from_millis(100),
            Duration::from_secs(10),
            2.0,
            0.0, // No jitter for deterministic test
        );

        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
        assert_eq!(backoff.next_delay(), Duration::from_millis(200));
        assert_eq!(backoff.next_delay(), Duration::from_millis(400));
    }

    #[test]
    fn test_backoff_max() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_secs(3), Duration::from_secs(5), 2.0, 0.0);

        assert_eq!(backoff.next_delay(), Duration::from_secs(3));
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));

        backoff.reset(Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_backoff_jitter_bounds() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(1), 1.0, 0.5);
        for _ in 0..20 {
            let delay = backoff.next_delay();
            assert!(delay >= Duration::from_secs(1));
            assert!(delay <= Duration::from_millis(1500));
        }
    }

    #[test]
    fn test_backoff_from_config() {
        let config = BackoffConfig {
            initial: Duration::from_millis(50),
            max: Duration::from_millis(80),
            multiplier: 2.0,
            jitter: 0.0,
            max_attempts: Some(3),
        };
        let mut backoff = ExponentialBackoff::from_config(&config);

        assert_eq!(backoff.next_delay(), Duration::from_millis(50));
        assert_eq!(backoff.next_delay(), Duration::from_millis(80));
        assert!(!backoff.is_exhausted(2));
        assert!(backoff.is_exhausted(3));
    }

    #[test]
    fn test_unusable_config_does_not_panic() {
        let cases = [(-2.0, 0.0), (1e300, 0.0), (f64::NAN, 0.0), (2.0, f64::NAN)];
        for (multiplier, jitter) in cases {
            let config = BackoffConfig {
                initial: Duration::from_millis(100),
                max: Duration::from_secs(1),
                multiplier,
                jitter,
                max_attempts: None,
            };
            let mut backoff = ExponentialBackoff::from_config(&config);

            let first = backoff.next_delay();
            assert!(first >= Duration::from_millis(100));
            assert!(first <= Duration::from_millis(200));
            for _ in 0..5 {
                assert!(backoff.next_delay() <= Duration::from_secs(2));
            }
        }
    }

    #[test]
    fn test_unlimited_backoff_never_exhausts() {
        let backoff =
            ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(1), 2.0, 0.0);
        assert!(!backoff.is_exhausted(u32::MAX));
        assert!(backoff.with_max_attempts(1).is_exhausted(1));
    }
}
