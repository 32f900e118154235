//! Per-device [`Sensor`] wrappers.
//!
//! Each wrapper owns its driver and implements the swallow-everything
//! read contract. Logging levels differ deliberately: the DHT fails
//! sporadically by design and is only traced, while the other sensors
//! log failed reads at debug level.

use async_trait::async_trait;
use tracing::{debug, trace};

use airlog_types::{CompensationPair, Reading, SensorKind};

use crate::driver::{ClimateDriver, DhtDriver, MultiGasDriver, VocDriver};
use crate::traits::Sensor;

/// Wrapper for the dedicated temperature/humidity sensor.
pub struct DhtSensor<D> {
    driver: D,
}

impl<D: DhtDriver> DhtSensor<D> {
    /// Wrap an opened driver.
    pub fn new(driver: D) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl<D: DhtDriver> Sensor for DhtSensor<D> {
    fn kind(&self) -> SensorKind {
        SensorKind::Dht
    }

    async fn try_read(&mut self, _compensation: &CompensationPair) -> Reading {
        match self.driver.read().await {
            Ok((temperature, humidity)) => Reading::TempHumidity {
                temperature,
                humidity,
            },
            Err(e) => {
                // This device drops reads routinely; not worth a warning.
                trace!("dht read skipped: {}", e);
                Reading::Absent
            }
        }
    }
}

/// Wrapper for the VOC index sensor.
pub struct VocSensor<D> {
    driver: D,
}

impl<D: VocDriver> VocSensor<D> {
    /// Wrap an opened driver.
    pub fn new(driver: D) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl<D: VocDriver> Sensor for VocSensor<D> {
    fn kind(&self) -> SensorKind {
        SensorKind::Sgp
    }

    async fn try_read(&mut self, compensation: &CompensationPair) -> Reading {
        match self
            .driver
            .measure_index(compensation.temperature, compensation.humidity)
            .await
        {
            Ok(index) => Reading::VocIndex(index),
            Err(e) => {
                debug!("sgp read failed: {}", e);
                Reading::Absent
            }
        }
    }
}

/// Wrapper for the combined climate/gas sensor.
pub struct ClimateSensor<D> {
    driver: D,
}

impl<D: ClimateDriver> ClimateSensor<D> {
    /// Wrap an opened, configured driver.
    pub fn new(driver: D) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl<D: ClimateDriver> Sensor for ClimateSensor<D> {
    fn kind(&self) -> SensorKind {
        SensorKind::Bme
    }

    async fn try_read(&mut self, _compensation: &CompensationPair) -> Reading {
        match self.driver.sample().await {
            Ok(sample) => Reading::Climate(sample),
            Err(e) => {
                debug!("bme read failed: {}", e);
                Reading::Absent
            }
        }
    }
}

/// Wrapper for the ammonia concentration sensor.
pub struct AmmoniaSensor<D> {
    driver: D,
}

impl<D: MultiGasDriver> AmmoniaSensor<D> {
    /// Wrap a driver that has already been switched into ammonia mode.
    pub fn new(driver: D) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl<D: MultiGasDriver> Sensor for AmmoniaSensor<D> {
    fn kind(&self) -> SensorKind {
        SensorKind::Nh3
    }

    async fn try_read(&mut self, _compensation: &CompensationPair) -> Reading {
        match self.driver.read_concentration().await {
            Ok(concentration) => Reading::GasConcentration(concentration),
            Err(e) => {
                debug!("nh3 read failed: {}", e);
                Reading::Absent
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use crate::driver::{Backend, BusAddress};
    use airlog_types::ClimateSample;

    #[tokio::test]
    async fn test_dht_read_failure_degrades_to_absent() {
        let mut backend = MockBackend::new();
        backend.state().fail_dht_reads();
        let driver = backend.open_dht().await.unwrap();
        let mut sensor = DhtSensor::new(driver);

        let reading = sensor.try_read(&CompensationPair::default()).await;
        assert_eq!(reading, Reading::Absent);
    }

    #[tokio::test]
    async fn test_dht_partial_channels_pass_through() {
        let mut backend = MockBackend::new();
        backend.state().set_dht_reading(None, Some(48.0));
        let driver = backend.open_dht().await.unwrap();
        let mut sensor = DhtSensor::new(driver);

        let reading = sensor.try_read(&CompensationPair::default()).await;
        assert_eq!(
            reading,
            Reading::TempHumidity {
                temperature: None,
                humidity: Some(48.0),
            }
        );
    }

    #[tokio::test]
    async fn test_voc_uses_compensation_inputs() {
        let mut backend = MockBackend::new();
        backend.state().set_voc_index(131);
        let driver = backend.open_voc().await.unwrap();
        let mut sensor = VocSensor::new(driver);

        let pair = CompensationPair::new(22.0, 48.0);
        let reading = sensor.try_read(&pair).await;
        assert_eq!(reading, Reading::VocIndex(131));
        assert_eq!(
            backend.state().last_voc_compensation(),
            Some((22.0, 48.0))
        );
    }

    #[tokio::test]
    async fn test_climate_sample_passes_heat_stability_through() {
        let mut backend = MockBackend::new();
        backend.state().set_climate_sample(ClimateSample {
            temperature: 23.1,
            humidity: 40.2,
            pressure: 1008.7,
            gas_ohms: None,
        });
        let driver = backend.open_climate(BusAddress::Primary).await.unwrap();
        let mut sensor = ClimateSensor::new(driver);

        match sensor.try_read(&CompensationPair::default()).await {
            Reading::Climate(sample) => {
                assert_eq!(sample.temperature, 23.1);
                assert_eq!(sample.gas_ohms, None);
            }
            other => panic!("expected climate reading, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ammonia_read_failure_degrades_to_absent() {
        let mut backend = MockBackend::new();
        backend.state().fail_nh3_reads();
        let driver = backend.open_multi_gas(9600).await.unwrap();
        let mut sensor = AmmoniaSensor::new(driver);

        let reading = sensor.try_read(&CompensationPair::default()).await;
        assert_eq!(reading, Reading::Absent);
    }
}
