//! Simulated sensor rig.
//!
//! A hardware-free [`Backend`] that produces plausible, slowly drifting
//! readings, for running the daemon on machines without the physical
//! buses. The temperature/humidity sensor occasionally drops a read the
//! way the real part does, and the climate sensor withholds its gas
//! channel until the heater has "warmed up".

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use airlog_core::driver::{
    Backend, BusAddress, ClimateDriver, ClimateProfile, DhtDriver, MultiGasDriver, TargetGas,
    VocDriver,
};
use airlog_core::{Error, Result};
use airlog_types::ClimateSample;

/// Fraction of temperature/humidity reads that fail with a bus error.
const DHT_DROPOUT_RATE: f64 = 0.1;

/// Samples the climate sensor withholds its gas channel for after start.
const HEATER_WARMUP_SAMPLES: u32 = 3;

/// Simulated backend; every `open_*` call succeeds.
#[derive(Debug)]
pub struct SimBackend {
    rng: StdRng,
}

impl SimBackend {
    /// A backend seeded from the OS.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// A deterministically seeded backend.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn fork(&mut self) -> StdRng {
        StdRng::seed_from_u64(self.rng.random())
    }
}

impl Default for SimBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimBackend {
    type Dht = SimDht;
    type Voc = SimVoc;
    type Climate = SimClimate;
    type MultiGas = SimMultiGas;

    async fn open_dht(&mut self) -> Result<Self::Dht> {
        Ok(SimDht {
            rng: self.fork(),
            temperature: 23.0,
            humidity: 50.0,
        })
    }

    async fn open_voc(&mut self) -> Result<Self::Voc> {
        Ok(SimVoc {
            rng: self.fork(),
            index: 100.0,
        })
    }

    async fn open_climate(&mut self, _address: BusAddress) -> Result<Self::Climate> {
        Ok(SimClimate {
            rng: self.fork(),
            profile: None,
            temperature: 22.0,
            humidity: 45.0,
            pressure: 1013.0,
            samples: 0,
        })
    }

    async fn open_multi_gas(&mut self, _baud_rate: u32) -> Result<Self::MultiGas> {
        Ok(SimMultiGas {
            rng: self.fork(),
            concentration: 0.8,
        })
    }
}

fn drift(rng: &mut StdRng, value: &mut f64, step: f64, min: f64, max: f64) -> f64 {
    *value = (*value + rng.random_range(-step..=step)).clamp(min, max);
    *value
}

/// Simulated temperature/humidity sensor.
#[derive(Debug)]
pub struct SimDht {
    rng: StdRng,
    temperature: f64,
    humidity: f64,
}

#[async_trait]
impl DhtDriver for SimDht {
    async fn read(&mut self) -> Result<(Option<f64>, Option<f64>)> {
        if self.rng.random_bool(DHT_DROPOUT_RATE) {
            return Err(Error::bus("dht checksum mismatch"));
        }
        let temperature = drift(&mut self.rng, &mut self.temperature, 0.2, 10.0, 40.0);
        let humidity = drift(&mut self.rng, &mut self.humidity, 0.5, 20.0, 90.0);
        Ok((Some(temperature), Some(humidity)))
    }
}

/// Simulated VOC index sensor.
#[derive(Debug)]
pub struct SimVoc {
    rng: StdRng,
    index: f64,
}

#[async_trait]
impl VocDriver for SimVoc {
    async fn measure_index(&mut self, _temperature: f64, _humidity: f64) -> Result<i32> {
        let index = drift(&mut self.rng, &mut self.index, 3.0, 1.0, 500.0);
        Ok(index.round() as i32)
    }
}

/// Simulated climate/gas sensor.
#[derive(Debug)]
pub struct SimClimate {
    rng: StdRng,
    profile: Option<ClimateProfile>,
    temperature: f64,
    humidity: f64,
    pressure: f64,
    samples: u32,
}

#[async_trait]
impl ClimateDriver for SimClimate {
    async fn configure(&mut self, profile: &ClimateProfile) -> Result<()> {
        self.profile = Some(profile.clone());
        Ok(())
    }

    async fn sample(&mut self) -> Result<ClimateSample> {
        if self.profile.is_none() {
            return Err(Error::NotReady);
        }

        self.samples += 1;
        let gas_ohms = if self.samples > HEATER_WARMUP_SAMPLES {
            Some(self.rng.random_range(80_000.0..=160_000.0))
        } else {
            None
        };

        Ok(ClimateSample {
            temperature: drift(&mut self.rng, &mut self.temperature, 0.2, 10.0, 40.0),
            humidity: drift(&mut self.rng, &mut self.humidity, 0.5, 20.0, 90.0),
            pressure: drift(&mut self.rng, &mut self.pressure, 0.3, 950.0, 1050.0),
            gas_ohms,
        })
    }
}

/// Simulated multi-gas sensor; acknowledges the mode switch immediately.
#[derive(Debug)]
pub struct SimMultiGas {
    rng: StdRng,
    concentration: f64,
}

#[async_trait]
impl MultiGasDriver for SimMultiGas {
    async fn change_acquire_mode(&mut self, _gas: TargetGas) -> Result<bool> {
        Ok(true)
    }

    async fn set_temp_compensation(&mut self, _enabled: bool) -> Result<()> {
        Ok(())
    }

    async fn read_concentration(&mut self) -> Result<f64> {
        Ok(drift(&mut self.rng, &mut self.concentration, 0.05, 0.0, 10.0))
    }
}
