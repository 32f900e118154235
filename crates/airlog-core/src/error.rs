//! Error types for airlog-core.
//!
//! All driver and bring-up failures funnel through [`Error`]. The policy
//! is that nothing here terminates the process: initialization failures
//! mark a sensor absent in the registry, steady-state read failures
//! degrade to [`airlog_types::Reading::Absent`], and only the retry
//! combinator inspects errors (via retryability classification) to
//! decide whether another attempt is worthwhile.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while bringing up or reading a sensor.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Transport-level failure on the sensor bus (I2C, UART, one-wire).
    #[error("bus error: {0}")]
    Bus(String),

    /// No device acknowledged at the probed bus address.
    #[error("no device at address {address}")]
    NoDevice {
        /// Human-readable address description.
        address: String,
    },

    /// The driver returned data that could not be interpreted.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The sensor has not finished warming up or stabilizing.
    #[error("sensor not ready")]
    NotReady,

    /// The acquisition-mode switch was not acknowledged by the device.
    #[error("mode change not acknowledged")]
    ModeChangeRejected,

    /// Operation exceeded its deadline.
    #[error("operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout duration.
        duration: Duration,
    },

    /// I/O error from the underlying transport.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Invalid configuration provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a bus error.
    pub fn bus(message: impl Into<String>) -> Self {
        Self::Bus(message.into())
    }

    /// Create a no-device error for a probed address.
    pub fn no_device(address: impl Into<String>) -> Self {
        Self::NoDevice {
            address: address.into(),
        }
    }

    /// Create a timeout error with operation context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result type alias using airlog-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
