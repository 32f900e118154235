//! Bounded retry for sensor bring-up operations.
//!
//! The ammonia sensor's acquisition-mode switch is the main customer:
//! the device can take several seconds to acknowledge the change, so
//! bring-up polls it a bounded number of times with fixed spacing
//! instead of looping forever.
//!
//! # Example
//!
//! ```
//! use airlog_core::{RetryConfig, with_retry, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! let config = RetryConfig::for_mode_change();
//!
//! let mut attempts = 0u32;
//! let value = with_retry(&config, "demo", &mut attempts, |n| {
//!     Box::pin(async move {
//!         *n += 1;
//!         Ok::<_, Error>(*n)
//!     })
//! })
//! .await?;
//! assert_eq!(value, 1);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use futures::future::BoxFuture;
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 means a single attempt).
    pub max_retries: u32,
    /// Initial delay between attempts.
    pub initial_delay: Duration,
    /// Maximum delay between attempts (for exponential backoff).
    pub max_delay: Duration,
    /// Backoff multiplier (1.0 = constant delay, 2.0 = double each time).
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with custom settings.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// No retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Retry configuration for the ammonia acquisition-mode switch.
    ///
    /// The device polls its internal state machine roughly once a
    /// second, so the switch is attempted 5 times with a fixed 1 s
    /// spacing and no jitter.
    pub fn for_mode_change() -> Self {
        Self::attempts_with_spacing(5, Duration::from_secs(1))
    }

    /// Fixed-spacing configuration for a total of `attempts` attempts.
    ///
    /// `attempts` counts the initial try; 0 is treated as 1.
    pub fn attempts_with_spacing(attempts: u32, spacing: Duration) -> Self {
        Self {
            max_retries: attempts.saturating_sub(1),
            initial_delay: spacing,
            max_delay: spacing,
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }

    /// Set maximum number of retries.
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set initial delay.
    #[must_use]
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set maximum delay.
    #[must_use]
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set backoff multiplier.
    #[must_use]
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Enable or disable jitter.
    #[must_use]
    pub fn jitter(mut self, enabled: bool) -> Self {
        self.jitter = enabled;
        self
    }

    /// Calculate delay for a given attempt number.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay =
            self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay.as_secs_f64());

        let final_delay = if self.jitter {
            // Up to 25% jitter so concurrent bring-ups don't thunder
            let jitter_factor = 1.0 + (rand::rng().random::<f64>() * 0.25);
            capped_delay * jitter_factor
        } else {
            capped_delay
        };

        Duration::from_secs_f64(final_delay)
    }
}

/// Execute an async operation with bounded retries.
///
/// The operation borrows `state` mutably on each attempt, which lets
/// callers retry methods on an owned driver without interior
/// mutability.
///
/// # Arguments
///
/// * `config` - Retry configuration
/// * `operation_name` - Name for logging purposes
/// * `state` - Mutable state handed to each attempt (typically the driver)
/// * `operation` - The async operation to retry
///
/// # Returns
///
/// The result of the operation, or the last error if all attempts failed.
pub async fn with_retry<S: ?Sized, T>(
    config: &RetryConfig,
    operation_name: &str,
    state: &mut S,
    mut operation: impl for<'a> FnMut(&'a mut S) -> BoxFuture<'a, Result<T>>,
) -> Result<T> {
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        match operation(&mut *state).await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("{} succeeded after {} retries", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(e) => {
                if !is_retryable(&e) {
                    return Err(e);
                }

                last_error = Some(e);

                if attempt < config.max_retries {
                    let delay = config.delay_for_attempt(attempt);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}",
                        operation_name,
                        attempt + 1,
                        config.max_retries + 1,
                        delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| Error::InvalidData("operation failed with no error".to_string())))
}

/// Check if an error is retryable.
pub(crate) fn is_retryable(error: &Error) -> bool {
    match error {
        // Transport hiccups are usually transient
        Error::Bus(_) => true,
        // The device may simply not have finished the previous command
        Error::ModeChangeRejected => true,
        // Warm-up completes on its own schedule
        Error::NotReady => true,
        Error::Timeout { .. } => true,
        Error::Io(_) => true,
        // Probing the wrong address will not improve with repetition
        Error::NoDevice { .. } => false,
        Error::InvalidData(_) => false,
        Error::InvalidConfig(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert!(config.jitter);
    }

    #[test]
    fn test_mode_change_preset() {
        let config = RetryConfig::for_mode_change();
        // 5 total attempts, fixed 1s spacing
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.backoff_multiplier, 1.0);
        assert!(!config.jitter);
    }

    #[test]
    fn test_attempts_with_spacing_zero_is_single_attempt() {
        let config = RetryConfig::attempts_with_spacing(0, Duration::from_secs(1));
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_delay_calculation() {
        let config = RetryConfig {
            initial_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(10),
            jitter: false,
            max_retries: 5,
        };

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
    }

    #[test]
    fn test_constant_delay() {
        let config = RetryConfig::attempts_with_spacing(5, Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(1));
    }

    #[test]
    fn test_is_retryable() {
        assert!(is_retryable(&Error::bus("transient")));
        assert!(is_retryable(&Error::ModeChangeRejected));
        assert!(is_retryable(&Error::NotReady));
        assert!(!is_retryable(&Error::no_device("0x76")));
        assert!(!is_retryable(&Error::InvalidData("bad frame".to_string())));
    }

    #[tokio::test]
    async fn test_with_retry_immediate_success() {
        let config = RetryConfig::new(3);
        let mut attempts = 0u32;
        let result = with_retry(&config, "test", &mut attempts, |n| {
            Box::pin(async move {
                *n += 1;
                Ok::<_, Error>(42)
            })
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_eventual_success() {
        let config = RetryConfig::attempts_with_spacing(5, Duration::from_secs(1));

        let mut attempts = 0u32;
        let result = with_retry(&config, "test", &mut attempts, |n| {
            Box::pin(async move {
                *n += 1;
                if *n < 3 {
                    Err(Error::ModeChangeRejected)
                } else {
                    Ok(42)
                }
            })
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_all_fail() {
        let config = RetryConfig::attempts_with_spacing(5, Duration::from_secs(1));

        let mut attempts = 0u32;
        let result: Result<i32> = with_retry(&config, "test", &mut attempts, |n| {
            Box::pin(async move {
                *n += 1;
                Err(Error::ModeChangeRejected)
            })
        })
        .await;

        assert!(matches!(result, Err(Error::ModeChangeRejected)));
        assert_eq!(attempts, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_fixed_spacing() {
        let config = RetryConfig::attempts_with_spacing(3, Duration::from_secs(1));

        let start = Instant::now();
        let mut attempts = 0u32;
        let _: Result<()> = with_retry(&config, "test", &mut attempts, |n| {
            Box::pin(async move {
                *n += 1;
                Err(Error::ModeChangeRejected)
            })
        })
        .await;

        // 3 attempts separated by two 1s sleeps
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_with_retry_non_retryable_error() {
        let config = RetryConfig::new(3);
        let mut attempts = 0u32;
        let result: Result<i32> = with_retry(&config, "test", &mut attempts, |n| {
            Box::pin(async move {
                *n += 1;
                Err(Error::no_device("0x76"))
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts, 1); // No retries
    }
}
