//! Daemon wiring for the airlog pipeline.
//!
//! Ties the pieces together: configuration ([`config`]), the polling
//! loop ([`collector`]), and a hardware-free simulated rig ([`sim`])
//! for machines without the physical buses.

pub mod collector;
pub mod config;
pub mod sim;

pub use collector::Collector;
pub use config::{Config, ConfigError};
pub use sim::SimBackend;
