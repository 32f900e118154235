//! Sensor registry and bring-up.
//!
//! [`Registry::initialize`] attempts to bring up each configured sensor
//! independently. A sensor that fails bring-up is represented as absent,
//! never as a fatal error: one dead bus must not take the others down
//! with it. The registry never holds two handles for the same kind, and
//! no re-initialization is attempted mid-run.

use std::time::Duration;

use tracing::{debug, info, warn};

use airlog_types::SensorKind;

use crate::driver::{
    Backend, BusAddress, ClimateDriver, ClimateProfile, MultiGasDriver, TargetGas,
};
use crate::error::Error;
use crate::retry::{RetryConfig, with_retry};
use crate::sensors::{AmmoniaSensor, ClimateSensor, DhtSensor, VocSensor};
use crate::traits::Sensor;

/// Tunables for sensor bring-up.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Baud rate for the multi-gas UART transport.
    pub multi_gas_baud: u32,
    /// Total attempts for the ammonia acquisition-mode switch.
    pub mode_change_attempts: u32,
    /// Spacing between mode-change attempts.
    pub mode_change_spacing: Duration,
    /// Profile applied to the climate sensor after probing.
    pub climate_profile: ClimateProfile,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            multi_gas_baud: 9600,
            mode_change_attempts: 5,
            mode_change_spacing: Duration::from_secs(1),
            climate_profile: ClimateProfile::default(),
        }
    }
}

/// The set of sensor handles that survived bring-up, keyed by kind.
///
/// Owned exclusively by the orchestrator; handles live for the rest of
/// the process.
#[derive(Default)]
pub struct Registry {
    dht: Option<Box<dyn Sensor>>,
    sgp: Option<Box<dyn Sensor>>,
    bme: Option<Box<dyn Sensor>>,
    nh3: Option<Box<dyn Sensor>>,
}

impl Registry {
    /// A registry with no sensors at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Bring up every configured sensor, isolating failures per sensor.
    ///
    /// Never fails; a sensor whose bring-up errors is simply absent
    /// from the returned registry, with the cause logged.
    pub async fn initialize<B: Backend>(backend: &mut B, options: &InitOptions) -> Self {
        let dht = init_dht(backend).await;
        let sgp = init_voc(backend).await;
        let bme = init_climate(backend, options).await;
        let nh3 = init_ammonia(backend, options).await;

        let registry = Self { dht, sgp, bme, nh3 };
        info!(
            "sensor bring-up complete: {}/{} present ({})",
            registry.present_count(),
            SensorKind::ALL.len(),
            registry.describe()
        );
        registry
    }

    /// Insert a sensor handle, replacing any existing one of that kind.
    pub fn insert(&mut self, sensor: Box<dyn Sensor>) {
        let slot = self.slot_mut(sensor.kind());
        *slot = Some(sensor);
    }

    /// Mutable access to one kind's handle, if present.
    pub fn sensor_mut(&mut self, kind: SensorKind) -> Option<&mut Box<dyn Sensor>> {
        self.slot_mut(kind).as_mut()
    }

    /// Whether a handle exists for this kind.
    #[must_use]
    pub fn is_present(&self, kind: SensorKind) -> bool {
        match kind {
            SensorKind::Dht => self.dht.is_some(),
            SensorKind::Sgp => self.sgp.is_some(),
            SensorKind::Bme => self.bme.is_some(),
            SensorKind::Nh3 => self.nh3.is_some(),
        }
    }

    /// The kinds that are present, in read order.
    #[must_use]
    pub fn present(&self) -> Vec<SensorKind> {
        SensorKind::ALL
            .into_iter()
            .filter(|kind| self.is_present(*kind))
            .collect()
    }

    /// How many sensors are present.
    #[must_use]
    pub fn present_count(&self) -> usize {
        self.present().len()
    }

    fn slot_mut(&mut self, kind: SensorKind) -> &mut Option<Box<dyn Sensor>> {
        match kind {
            SensorKind::Dht => &mut self.dht,
            SensorKind::Sgp => &mut self.sgp,
            SensorKind::Bme => &mut self.bme,
            SensorKind::Nh3 => &mut self.nh3,
        }
    }

    fn describe(&self) -> String {
        SensorKind::ALL
            .into_iter()
            .map(|kind| {
                if self.is_present(kind) {
                    kind.as_str().to_string()
                } else {
                    format!("{}:absent", kind)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("present", &self.present())
            .finish()
    }
}

async fn init_dht<B: Backend>(backend: &mut B) -> Option<Box<dyn Sensor>> {
    match backend.open_dht().await {
        Ok(driver) => {
            info!("dht sensor initialized");
            Some(Box::new(DhtSensor::new(driver)))
        }
        Err(e) => {
            warn!("dht init failed: {}", e);
            None
        }
    }
}

async fn init_voc<B: Backend>(backend: &mut B) -> Option<Box<dyn Sensor>> {
    match backend.open_voc().await {
        Ok(driver) => {
            info!("sgp sensor initialized");
            Some(Box::new(VocSensor::new(driver)))
        }
        Err(e) => {
            warn!("sgp init failed: {}", e);
            None
        }
    }
}

async fn init_climate<B: Backend>(
    backend: &mut B,
    options: &InitOptions,
) -> Option<Box<dyn Sensor>> {
    let mut driver = match backend.open_climate(BusAddress::Primary).await {
        Ok(driver) => driver,
        Err(primary_err) => {
            debug!(
                "bme not found at {}: {}",
                BusAddress::Primary.as_str(),
                primary_err
            );
            match backend.open_climate(BusAddress::Secondary).await {
                Ok(driver) => driver,
                Err(e) => {
                    warn!("bme init failed: {}", e);
                    return None;
                }
            }
        }
    };

    if let Err(e) = driver.configure(&options.climate_profile).await {
        warn!("bme init failed while applying profile: {}", e);
        return None;
    }

    info!("bme sensor initialized");
    Some(Box::new(ClimateSensor::new(driver)))
}

async fn init_ammonia<B: Backend>(
    backend: &mut B,
    options: &InitOptions,
) -> Option<Box<dyn Sensor>> {
    let mut driver = match backend.open_multi_gas(options.multi_gas_baud).await {
        Ok(driver) => driver,
        Err(e) => {
            warn!("nh3 init failed: {}", e);
            return None;
        }
    };

    info!("waiting for nh3 sensor acquisition-mode change");
    let config = RetryConfig::attempts_with_spacing(
        options.mode_change_attempts,
        options.mode_change_spacing,
    );
    let switched = with_retry(&config, "nh3 mode change", &mut driver, |d| {
        Box::pin(async move {
            if d.change_acquire_mode(TargetGas::Ammonia).await? {
                Ok(())
            } else {
                Err(Error::ModeChangeRejected)
            }
        })
    })
    .await;

    if let Err(e) = switched {
        warn!("nh3 init failed (mode change timeout): {}", e);
        return None;
    }

    if let Err(e) = driver.set_temp_compensation(true).await {
        warn!("nh3 init failed while enabling temperature compensation: {}", e);
        return None;
    }

    info!("nh3 sensor initialized");
    Some(Box::new(AmmoniaSensor::new(driver)))
}
