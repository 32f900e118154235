//! Shared types for the airlog environmental sensor pipeline.
//!
//! This crate provides the data model used by every other airlog crate:
//! sensor kinds, per-kind readings, the fixed-schema record that is
//! appended to the daily log, and the temperature/humidity compensation
//! pair fed into the VOC index calculation.
//!
//! # Example
//!
//! ```
//! use airlog_types::{Reading, Record, SensorKind};
//!
//! let reading = Reading::VocIndex(112);
//! assert!(!reading.is_absent());
//! assert_eq!(SensorKind::Sgp.as_str(), "sgp");
//! assert_eq!(Record::HEADER.len(), Record::FIELD_COUNT);
//! ```

pub mod error;
pub mod types;

pub use error::{ParseKindError, ParseResult};
pub use types::{
    ClimateSample, CompensationPair, Reading, Record, SensorKind, local_timestamp,
};
