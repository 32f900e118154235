//! Opaque driver traits for the physical sensor buses.
//!
//! The pipeline treats bus drivers as capability providers: each trait
//! models exactly the operations the orchestration layer needs, and a
//! [`Backend`] bundles the bring-up of all four. Real hardware stacks
//! implement these traits out of tree; tests use
//! [`MockBackend`](crate::mock::MockBackend).

use async_trait::async_trait;

use airlog_types::ClimateSample;

use crate::error::Result;

/// The two I2C addresses the combined climate/gas sensor can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusAddress {
    /// Primary address (0x76), probed first.
    Primary,
    /// Secondary address (0x77), probed if the primary does not answer.
    Secondary,
}

impl BusAddress {
    /// Human-readable form for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BusAddress::Primary => "primary (0x76)",
            BusAddress::Secondary => "secondary (0x77)",
        }
    }
}

/// Oversampling/filter/heater settings applied to the climate sensor
/// after it answers on one of the bus addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClimateProfile {
    /// Humidity oversampling factor.
    pub humidity_oversample: u8,
    /// Pressure oversampling factor.
    pub pressure_oversample: u8,
    /// Temperature oversampling factor.
    pub temperature_oversample: u8,
    /// IIR filter size.
    pub filter_size: u8,
    /// Gas heater target temperature in °C.
    pub heater_temperature_c: u16,
    /// Gas heater duration in milliseconds.
    pub heater_duration_ms: u16,
    /// Heater profile slot to select.
    pub heater_profile: u8,
}

impl Default for ClimateProfile {
    /// The fixed deployment profile: 2x/4x/8x oversampling, filter
    /// size 3, heater at 320 °C for 150 ms on profile slot 0.
    fn default() -> Self {
        Self {
            humidity_oversample: 2,
            pressure_oversample: 4,
            temperature_oversample: 8,
            filter_size: 3,
            heater_temperature_c: 320,
            heater_duration_ms: 150,
            heater_profile: 0,
        }
    }
}

/// Gas species the multi-gas sensor can be switched to acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TargetGas {
    /// Ammonia (NH3).
    Ammonia,
}

/// Driver for the dedicated temperature/humidity sensor.
///
/// The device reports its two channels independently, so a successful
/// protocol exchange can still carry a missing channel.
#[async_trait]
pub trait DhtDriver: Send {
    /// Read the current `(temperature °C, humidity %)` pair.
    async fn read(&mut self) -> Result<(Option<f64>, Option<f64>)>;
}

/// Driver for the VOC index sensor.
#[async_trait]
pub trait VocDriver: Send {
    /// Run one measurement with the given compensation inputs and
    /// return the VOC index.
    async fn measure_index(&mut self, temperature: f64, humidity: f64) -> Result<i32>;
}

/// Driver for the combined climate/gas sensor.
#[async_trait]
pub trait ClimateDriver: Send {
    /// Apply the oversampling/filter/heater profile.
    async fn configure(&mut self, profile: &ClimateProfile) -> Result<()>;

    /// Take one sample. `gas_ohms` in the returned sample is `None`
    /// when the heater was not heat-stable for this reading.
    async fn sample(&mut self) -> Result<ClimateSample>;
}

/// Driver for the UART multi-gas sensor.
#[async_trait]
pub trait MultiGasDriver: Send {
    /// Request a switch of the acquisition mode. Returns `Ok(false)`
    /// when the device has not acknowledged the change yet.
    async fn change_acquire_mode(&mut self, gas: TargetGas) -> Result<bool>;

    /// Enable or disable on-device temperature compensation.
    async fn set_temp_compensation(&mut self, enabled: bool) -> Result<()>;

    /// Read the current gas concentration in ppm.
    async fn read_concentration(&mut self) -> Result<f64>;
}

/// Bring-up seam for a full sensor rig.
///
/// Each `open_*` call constructs the driver for one sensor kind and may
/// fail independently; the [`Registry`](crate::registry::Registry)
/// turns those failures into absent sensors. The VOC and climate
/// sensors share one I2C bus handle; `open_voc` is expected to acquire
/// it once and keep it for the life of the driver.
#[async_trait]
pub trait Backend: Send {
    /// Driver type for the temperature/humidity sensor.
    type Dht: DhtDriver + 'static;
    /// Driver type for the VOC sensor.
    type Voc: VocDriver + 'static;
    /// Driver type for the climate/gas sensor.
    type Climate: ClimateDriver + 'static;
    /// Driver type for the multi-gas sensor.
    type MultiGas: MultiGasDriver + 'static;

    /// Open the temperature/humidity sensor.
    async fn open_dht(&mut self) -> Result<Self::Dht>;

    /// Open the VOC sensor, acquiring the shared bus handle.
    async fn open_voc(&mut self) -> Result<Self::Voc>;

    /// Open the climate/gas sensor at the given bus address.
    async fn open_climate(&mut self, address: BusAddress) -> Result<Self::Climate>;

    /// Open the multi-gas sensor transport at the given baud rate.
    async fn open_multi_gas(&mut self, baud_rate: u32) -> Result<Self::MultiGas>;
}
