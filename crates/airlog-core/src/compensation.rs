//! Compensation pair resolution.
//!
//! The VOC sensor's index calculation wants the ambient temperature and
//! humidity as inputs. Those come from whatever temperature/humidity-
//! capable sensor answered this cycle: the combined climate sensor is
//! preferred, then the dedicated temperature/humidity sensor, then
//! fixed defaults.
//!
//! Temperature and humidity fall back **independently, per field** —
//! the pair can legitimately mix sources (BME temperature with DHT
//! humidity). This mirrors the deployed behavior and is intentional;
//! do not "fix" it to joint per-sensor fallback.

use airlog_types::{CompensationPair, Reading};

/// Resolve the compensation pair from this cycle's readings.
///
/// Only same-cycle readings are consulted; stale values from earlier
/// cycles never feed into compensation.
#[must_use]
pub fn resolve_compensation(
    climate: &Reading,
    temp_humidity: &Reading,
    defaults: CompensationPair,
) -> CompensationPair {
    CompensationPair {
        temperature: climate
            .temperature()
            .or_else(|| temp_humidity.temperature())
            .unwrap_or(defaults.temperature),
        humidity: climate
            .humidity()
            .or_else(|| temp_humidity.humidity())
            .unwrap_or(defaults.humidity),
    }
}
