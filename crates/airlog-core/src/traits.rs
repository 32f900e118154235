//! The uniform sensor capability.
//!
//! Every physical device, whatever its transport, is wrapped in
//! something that implements [`Sensor`]: try one reading, return a
//! typed-optional result, never fail past this boundary.

use async_trait::async_trait;

use airlog_types::{CompensationPair, Reading, SensorKind};

/// A sensor that can be asked for one reading per cycle.
///
/// Implementations must swallow and classify all transport and protocol
/// errors, degrading to [`Reading::Absent`]; `try_read` has no error
/// channel by design. The compensation pair is passed to every sensor
/// uniformly; only the VOC sensor uses it as a measurement input.
#[async_trait]
pub trait Sensor: Send {
    /// Which sensor kind this handle wraps.
    fn kind(&self) -> SensorKind;

    /// Attempt one reading.
    async fn try_read(&mut self, compensation: &CompensationPair) -> Reading;
}
