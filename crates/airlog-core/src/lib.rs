//! Sensor orchestration core for the airlog logging pipeline.
//!
//! This crate owns the degraded-mode data pipeline: bringing up a
//! heterogeneous set of environmental sensors where any subset may be
//! missing or broken, reading them each cycle with per-sensor fault
//! isolation, and assembling one fixed-schema record per cycle.
//!
//! # Design
//!
//! - **Drivers are opaque.** The physical bus stacks (I2C, UART,
//!   one-wire) sit behind the traits in [`driver`]; this crate only
//!   assumes "a read that may fail". Tests and hardware-less runs use
//!   [`mock::MockBackend`].
//! - **Absence is a value.** A sensor that failed bring-up or dropped
//!   a read contributes [`airlog_types::Reading::Absent`], never an
//!   error that could take down the cycle.
//! - **Compensation is same-cycle only.** The VOC measurement is
//!   compensated from whatever temperature/humidity source answered
//!   this cycle, field by field, with fixed defaults as the last
//!   resort.
//!
//! # Example
//!
//! ```
//! use airlog_core::mock::MockBackend;
//! use airlog_core::{InitOptions, Registry, run_cycle};
//! use airlog_types::CompensationPair;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut backend = MockBackend::new();
//!     let mut registry = Registry::initialize(&mut backend, &InitOptions::default()).await;
//!     let record = run_cycle(&mut registry, CompensationPair::default()).await;
//!     assert_eq!(record.absent_count(), 0);
//! }
//! ```

pub mod compensation;
pub mod cycle;
pub mod driver;
pub mod error;
pub mod mock;
pub mod registry;
pub mod retry;
pub mod sensors;
pub mod traits;

pub use compensation::resolve_compensation;
pub use cycle::run_cycle;
pub use driver::{Backend, BusAddress, ClimateProfile, TargetGas};
pub use error::{Error, Result};
pub use registry::{InitOptions, Registry};
pub use retry::{RetryConfig, with_retry};
pub use traits::Sensor;
