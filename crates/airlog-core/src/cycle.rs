//! One read cycle: all sensors, fixed order, one record.
//!
//! The order matters: the climate and temperature/humidity sensors are
//! read first so their values can compensate the VOC measurement in
//! the same cycle.

use tracing::trace;

use airlog_types::{CompensationPair, Reading, Record, SensorKind, local_timestamp};

use crate::compensation::resolve_compensation;
use crate::registry::Registry;

/// Read every sensor once and assemble the row for this cycle.
///
/// Absent sensors and failed reads both contribute explicit missing
/// fields; the record always has the full fixed schema. Never fails.
pub async fn run_cycle(registry: &mut Registry, defaults: CompensationPair) -> Record {
    let timestamp = local_timestamp();

    let climate = read_kind(registry, SensorKind::Bme, &defaults).await;
    let temp_humidity = read_kind(registry, SensorKind::Dht, &defaults).await;

    let compensation = resolve_compensation(&climate, &temp_humidity, defaults);
    trace!(
        "compensation resolved: {:.1} °C / {:.1} %",
        compensation.temperature, compensation.humidity
    );

    let voc = read_kind(registry, SensorKind::Sgp, &compensation).await;
    let ammonia = read_kind(registry, SensorKind::Nh3, &compensation).await;

    let mut record = Record::empty(timestamp);

    if let Reading::Climate(sample) = climate {
        record.bme_temp = Some(sample.temperature);
        record.bme_hum = Some(sample.humidity);
        record.bme_pres = Some(sample.pressure);
        record.bme_gas = sample.gas_ohms;
    }
    if let Reading::TempHumidity {
        temperature,
        humidity,
    } = temp_humidity
    {
        record.dht_temp = temperature;
        record.dht_hum = humidity;
    }
    if let Reading::VocIndex(index) = voc {
        record.sgp_voc = Some(index);
    }
    if let Reading::GasConcentration(concentration) = ammonia {
        record.nh3_conc = Some(concentration);
    }

    record
}

async fn read_kind(
    registry: &mut Registry,
    kind: SensorKind,
    compensation: &CompensationPair,
) -> Reading {
    match registry.sensor_mut(kind) {
        Some(sensor) => sensor.try_read(compensation).await,
        None => Reading::Absent,
    }
}
