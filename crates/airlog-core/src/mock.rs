//! Mock backend for testing.
//!
//! Provides an in-memory [`Backend`] whose behavior can be scripted
//! without hardware: initialization failures per sensor, read failures,
//! scripted readings, and a configurable number of unacknowledged
//! mode-change attempts for the ammonia sensor.
//!
//! All behavior lives in a shared [`MockState`]; the backend and every
//! driver it opens hold the same `Arc`, so tests can keep flipping
//! switches after the registry has been built.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;

use airlog_types::ClimateSample;

use crate::driver::{
    Backend, BusAddress, ClimateDriver, ClimateProfile, DhtDriver, MultiGasDriver, TargetGas,
    VocDriver,
};
use crate::error::{Error, Result};

/// Shared scripted behavior for a [`MockBackend`] and its drivers.
#[derive(Debug)]
pub struct MockState {
    // Initialization behavior
    dht_init_fail: AtomicBool,
    voc_init_fail: AtomicBool,
    climate_primary_fail: AtomicBool,
    climate_secondary_fail: AtomicBool,
    climate_configure_fail: AtomicBool,
    multi_gas_open_fail: AtomicBool,
    temp_compensation_fail: AtomicBool,
    /// Attempt number on which the mode change is acknowledged (0 = never).
    mode_change_ack_on: AtomicU32,

    // Read behavior
    dht_read_fail: AtomicBool,
    voc_read_fail: AtomicBool,
    climate_read_fail: AtomicBool,
    nh3_read_fail: AtomicBool,
    dht_reading: Mutex<(Option<f64>, Option<f64>)>,
    voc_index: Mutex<i32>,
    climate_sample: Mutex<ClimateSample>,
    nh3_concentration: Mutex<f64>,

    // Observations
    mode_change_attempts: AtomicU32,
    temp_compensation_enabled: AtomicBool,
    opened_baud: AtomicU32,
    climate_opened_at: Mutex<Option<BusAddress>>,
    applied_profile: Mutex<Option<ClimateProfile>>,
    last_voc_compensation: Mutex<Option<(f64, f64)>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            dht_init_fail: AtomicBool::new(false),
            voc_init_fail: AtomicBool::new(false),
            climate_primary_fail: AtomicBool::new(false),
            climate_secondary_fail: AtomicBool::new(false),
            climate_configure_fail: AtomicBool::new(false),
            multi_gas_open_fail: AtomicBool::new(false),
            temp_compensation_fail: AtomicBool::new(false),
            mode_change_ack_on: AtomicU32::new(1),
            dht_read_fail: AtomicBool::new(false),
            voc_read_fail: AtomicBool::new(false),
            climate_read_fail: AtomicBool::new(false),
            nh3_read_fail: AtomicBool::new(false),
            dht_reading: Mutex::new((Some(21.5), Some(52.0))),
            voc_index: Mutex::new(100),
            climate_sample: Mutex::new(ClimateSample {
                temperature: 22.0,
                humidity: 45.0,
                pressure: 1012.5,
                gas_ohms: Some(120_000.0),
            }),
            nh3_concentration: Mutex::new(0.8),
            mode_change_attempts: AtomicU32::new(0),
            temp_compensation_enabled: AtomicBool::new(false),
            opened_baud: AtomicU32::new(0),
            climate_opened_at: Mutex::new(None),
            applied_profile: Mutex::new(None),
            last_voc_compensation: Mutex::new(None),
        }
    }
}

impl MockState {
    // --- Scripting ---

    /// Make subsequent DHT reads fail.
    pub fn fail_dht_reads(&self) {
        self.dht_read_fail.store(true, Ordering::Relaxed);
    }

    /// Make subsequent VOC reads fail.
    pub fn fail_voc_reads(&self) {
        self.voc_read_fail.store(true, Ordering::Relaxed);
    }

    /// Make subsequent climate reads fail.
    pub fn fail_climate_reads(&self) {
        self.climate_read_fail.store(true, Ordering::Relaxed);
    }

    /// Make subsequent ammonia reads fail.
    pub fn fail_nh3_reads(&self) {
        self.nh3_read_fail.store(true, Ordering::Relaxed);
    }

    /// Script the DHT channels (either can be individually missing).
    pub fn set_dht_reading(&self, temperature: Option<f64>, humidity: Option<f64>) {
        *self.dht_reading.lock().unwrap() = (temperature, humidity);
    }

    /// Script the VOC index.
    pub fn set_voc_index(&self, index: i32) {
        *self.voc_index.lock().unwrap() = index;
    }

    /// Script the climate sample.
    pub fn set_climate_sample(&self, sample: ClimateSample) {
        *self.climate_sample.lock().unwrap() = sample;
    }

    /// Script the ammonia concentration.
    pub fn set_nh3_concentration(&self, concentration: f64) {
        *self.nh3_concentration.lock().unwrap() = concentration;
    }

    // --- Observations ---

    /// How many mode-change attempts the driver has seen.
    pub fn mode_change_attempts(&self) -> u32 {
        self.mode_change_attempts.load(Ordering::Relaxed)
    }

    /// Whether on-device temperature compensation was enabled.
    pub fn temp_compensation_enabled(&self) -> bool {
        self.temp_compensation_enabled.load(Ordering::Relaxed)
    }

    /// The baud rate the multi-gas transport was opened with (0 = never).
    pub fn opened_baud(&self) -> u32 {
        self.opened_baud.load(Ordering::Relaxed)
    }

    /// Which bus address the climate sensor was opened at.
    pub fn climate_opened_at(&self) -> Option<BusAddress> {
        *self.climate_opened_at.lock().unwrap()
    }

    /// The profile applied to the climate sensor, if any.
    pub fn applied_profile(&self) -> Option<ClimateProfile> {
        self.applied_profile.lock().unwrap().clone()
    }

    /// The compensation inputs of the most recent VOC measurement.
    pub fn last_voc_compensation(&self) -> Option<(f64, f64)> {
        *self.last_voc_compensation.lock().unwrap()
    }
}

/// A scriptable mock sensor rig.
///
/// # Example
///
/// ```
/// use airlog_core::mock::MockBackend;
/// use airlog_core::{InitOptions, Registry};
///
/// #[tokio::main]
/// async fn main() {
///     let mut backend = MockBackend::new().fail_dht_init();
///     let registry = Registry::initialize(&mut backend, &InitOptions::default()).await;
///     assert_eq!(registry.present_count(), 3);
/// }
/// ```
#[derive(Debug, Default)]
pub struct MockBackend {
    state: Arc<MockState>,
}

impl MockBackend {
    /// Create a backend where all four sensors are healthy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the scripted state.
    pub fn state(&self) -> Arc<MockState> {
        Arc::clone(&self.state)
    }

    /// Fail DHT initialization.
    #[must_use]
    pub fn fail_dht_init(self) -> Self {
        self.state.dht_init_fail.store(true, Ordering::Relaxed);
        self
    }

    /// Fail VOC initialization (shared bus acquisition).
    #[must_use]
    pub fn fail_voc_init(self) -> Self {
        self.state.voc_init_fail.store(true, Ordering::Relaxed);
        self
    }

    /// Fail the climate probe at one bus address.
    #[must_use]
    pub fn fail_climate_at(self, address: BusAddress) -> Self {
        let flag = match address {
            BusAddress::Primary => &self.state.climate_primary_fail,
            BusAddress::Secondary => &self.state.climate_secondary_fail,
        };
        flag.store(true, Ordering::Relaxed);
        self
    }

    /// Fail the climate profile configuration step.
    #[must_use]
    pub fn fail_climate_configure(self) -> Self {
        self.state
            .climate_configure_fail
            .store(true, Ordering::Relaxed);
        self
    }

    /// Fail opening the multi-gas transport.
    #[must_use]
    pub fn fail_multi_gas_open(self) -> Self {
        self.state.multi_gas_open_fail.store(true, Ordering::Relaxed);
        self
    }

    /// Fail enabling on-device temperature compensation.
    #[must_use]
    pub fn fail_temp_compensation(self) -> Self {
        self.state
            .temp_compensation_fail
            .store(true, Ordering::Relaxed);
        self
    }

    /// Acknowledge the mode change on the n-th attempt (1-based).
    #[must_use]
    pub fn ack_mode_change_on(self, attempt: u32) -> Self {
        self.state.mode_change_ack_on.store(attempt, Ordering::Relaxed);
        self
    }

    /// Never acknowledge the mode change.
    #[must_use]
    pub fn never_ack_mode_change(self) -> Self {
        self.state.mode_change_ack_on.store(0, Ordering::Relaxed);
        self
    }
}

#[async_trait]
impl Backend for MockBackend {
    type Dht = MockDht;
    type Voc = MockVoc;
    type Climate = MockClimate;
    type MultiGas = MockMultiGas;

    async fn open_dht(&mut self) -> Result<Self::Dht> {
        if self.state.dht_init_fail.load(Ordering::Relaxed) {
            return Err(Error::bus("mock dht init failure"));
        }
        Ok(MockDht {
            state: Arc::clone(&self.state),
        })
    }

    async fn open_voc(&mut self) -> Result<Self::Voc> {
        if self.state.voc_init_fail.load(Ordering::Relaxed) {
            return Err(Error::bus("mock i2c bus unavailable"));
        }
        Ok(MockVoc {
            state: Arc::clone(&self.state),
        })
    }

    async fn open_climate(&mut self, address: BusAddress) -> Result<Self::Climate> {
        let fail = match address {
            BusAddress::Primary => &self.state.climate_primary_fail,
            BusAddress::Secondary => &self.state.climate_secondary_fail,
        };
        if fail.load(Ordering::Relaxed) {
            return Err(Error::no_device(address.as_str()));
        }
        *self.state.climate_opened_at.lock().unwrap() = Some(address);
        Ok(MockClimate {
            state: Arc::clone(&self.state),
        })
    }

    async fn open_multi_gas(&mut self, baud_rate: u32) -> Result<Self::MultiGas> {
        self.state.opened_baud.store(baud_rate, Ordering::Relaxed);
        if self.state.multi_gas_open_fail.load(Ordering::Relaxed) {
            return Err(Error::bus("mock uart open failure"));
        }
        Ok(MockMultiGas {
            state: Arc::clone(&self.state),
        })
    }
}

/// Mock temperature/humidity driver.
#[derive(Debug)]
pub struct MockDht {
    state: Arc<MockState>,
}

#[async_trait]
impl DhtDriver for MockDht {
    async fn read(&mut self) -> Result<(Option<f64>, Option<f64>)> {
        if self.state.dht_read_fail.load(Ordering::Relaxed) {
            return Err(Error::bus("mock dht read failure"));
        }
        Ok(*self.state.dht_reading.lock().unwrap())
    }
}

/// Mock VOC driver.
#[derive(Debug)]
pub struct MockVoc {
    state: Arc<MockState>,
}

#[async_trait]
impl VocDriver for MockVoc {
    async fn measure_index(&mut self, temperature: f64, humidity: f64) -> Result<i32> {
        *self.state.last_voc_compensation.lock().unwrap() = Some((temperature, humidity));
        if self.state.voc_read_fail.load(Ordering::Relaxed) {
            return Err(Error::bus("mock sgp read failure"));
        }
        Ok(*self.state.voc_index.lock().unwrap())
    }
}

/// Mock climate/gas driver.
#[derive(Debug)]
pub struct MockClimate {
    state: Arc<MockState>,
}

#[async_trait]
impl ClimateDriver for MockClimate {
    async fn configure(&mut self, profile: &ClimateProfile) -> Result<()> {
        if self.state.climate_configure_fail.load(Ordering::Relaxed) {
            return Err(Error::bus("mock bme configure failure"));
        }
        *self.state.applied_profile.lock().unwrap() = Some(profile.clone());
        Ok(())
    }

    async fn sample(&mut self) -> Result<ClimateSample> {
        if self.state.climate_read_fail.load(Ordering::Relaxed) {
            return Err(Error::bus("mock bme read failure"));
        }
        Ok(*self.state.climate_sample.lock().unwrap())
    }
}

/// Mock multi-gas driver.
#[derive(Debug)]
pub struct MockMultiGas {
    state: Arc<MockState>,
}

#[async_trait]
impl MultiGasDriver for MockMultiGas {
    async fn change_acquire_mode(&mut self, _gas: TargetGas) -> Result<bool> {
        let attempt = self.state.mode_change_attempts.fetch_add(1, Ordering::Relaxed) + 1;
        let ack_on = self.state.mode_change_ack_on.load(Ordering::Relaxed);
        Ok(ack_on != 0 && attempt >= ack_on)
    }

    async fn set_temp_compensation(&mut self, enabled: bool) -> Result<()> {
        if self.state.temp_compensation_fail.load(Ordering::Relaxed) {
            return Err(Error::bus("mock temp compensation failure"));
        }
        self.state
            .temp_compensation_enabled
            .store(enabled, Ordering::Relaxed);
        Ok(())
    }

    async fn read_concentration(&mut self) -> Result<f64> {
        if self.state.nh3_read_fail.load(Ordering::Relaxed) {
            return Err(Error::bus("mock nh3 read failure"));
        }
        Ok(*self.state.nh3_concentration.lock().unwrap())
    }
}
