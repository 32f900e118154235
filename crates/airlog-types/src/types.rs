//! Core types for airlog sensor data.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ParseKindError;

/// The fixed set of sensor kinds the pipeline knows about.
///
/// Each kind corresponds to one physical device on the monitoring rig:
/// a DHT22 temperature/humidity sensor, an SGP40 VOC sensor, a BME688
/// climate/gas sensor, and a DFRobot multi-gas sensor in ammonia mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    /// Dedicated temperature/humidity sensor (one-wire).
    Dht,
    /// VOC index sensor (I2C).
    Sgp,
    /// Combined temperature/humidity/pressure/gas-resistance sensor (I2C).
    Bme,
    /// Ammonia concentration sensor (UART).
    Nh3,
}

impl SensorKind {
    /// All sensor kinds, in the fixed per-cycle read order
    /// (BME first so its values can compensate the VOC read).
    pub const ALL: [SensorKind; 4] = [
        SensorKind::Bme,
        SensorKind::Dht,
        SensorKind::Sgp,
        SensorKind::Nh3,
    ];

    /// The short key used in logs and configuration.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Dht => "dht",
            SensorKind::Sgp => "sgp",
            SensorKind::Bme => "bme",
            SensorKind::Nh3 => "nh3",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dht" => Ok(SensorKind::Dht),
            "sgp" => Ok(SensorKind::Sgp),
            "bme" => Ok(SensorKind::Bme),
            "nh3" => Ok(SensorKind::Nh3),
            other => Err(ParseKindError::UnknownKind(other.to_string())),
        }
    }
}

/// One sample from the combined climate/gas sensor.
///
/// `gas_ohms` is `None` when the device reports that its gas heater was
/// not heat-stable for this sample; temperature, humidity, and pressure
/// remain valid in that case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateSample {
    /// Temperature in °C.
    pub temperature: f64,
    /// Relative humidity in %.
    pub humidity: f64,
    /// Barometric pressure in hPa.
    pub pressure: f64,
    /// Gas resistance in ohms, if the reading was heat-stable.
    pub gas_ohms: Option<f64>,
}

/// A single reading from one sensor, produced fresh each cycle.
///
/// `Absent` covers both "sensor not installed" and "read failed this
/// cycle"; the two are only distinguished at initialization time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Reading {
    /// Temperature/humidity pair from the dedicated sensor.
    ///
    /// Either channel can be individually missing; the device reports
    /// each independently.
    TempHumidity {
        /// Temperature in °C.
        temperature: Option<f64>,
        /// Relative humidity in %.
        humidity: Option<f64>,
    },
    /// VOC index (unitless, 0-500 scale).
    VocIndex(i32),
    /// Combined climate/gas sample.
    Climate(ClimateSample),
    /// Gas concentration in ppm.
    GasConcentration(f64),
    /// No value obtained this cycle.
    Absent,
}

impl Reading {
    /// Whether this reading carries no value at all.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        match self {
            Reading::Absent => true,
            Reading::TempHumidity {
                temperature,
                humidity,
            } => temperature.is_none() && humidity.is_none(),
            _ => false,
        }
    }

    /// The temperature carried by this reading, if any.
    #[must_use]
    pub fn temperature(&self) -> Option<f64> {
        match self {
            Reading::Climate(sample) => Some(sample.temperature),
            Reading::TempHumidity { temperature, .. } => *temperature,
            _ => None,
        }
    }

    /// The humidity carried by this reading, if any.
    #[must_use]
    pub fn humidity(&self) -> Option<f64> {
        match self {
            Reading::Climate(sample) => Some(sample.humidity),
            Reading::TempHumidity { humidity, .. } => *humidity,
            _ => None,
        }
    }
}

/// Temperature/humidity pair fed into the VOC index calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompensationPair {
    /// Temperature in °C.
    pub temperature: f64,
    /// Relative humidity in %.
    pub humidity: f64,
}

impl CompensationPair {
    /// Create a compensation pair.
    #[must_use]
    pub fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature,
            humidity,
        }
    }
}

impl Default for CompensationPair {
    /// The fixed fallback used when no sensor provided a value: 25 °C, 50 %.
    fn default() -> Self {
        Self {
            temperature: 25.0,
            humidity: 50.0,
        }
    }
}

/// One fixed-schema row of the daily log.
///
/// A record always has exactly [`Record::FIELD_COUNT`] fields in the
/// order of [`Record::HEADER`]; missing sensor data is an explicit
/// `None`, never a coerced zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// When the cycle ran (local clock).
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// BME temperature in °C.
    pub bme_temp: Option<f64>,
    /// BME relative humidity in %.
    pub bme_hum: Option<f64>,
    /// BME pressure in hPa.
    pub bme_pres: Option<f64>,
    /// BME gas resistance in ohms (absent when not heat-stable).
    pub bme_gas: Option<f64>,
    /// DHT temperature in °C.
    pub dht_temp: Option<f64>,
    /// DHT relative humidity in %.
    pub dht_hum: Option<f64>,
    /// VOC index.
    pub sgp_voc: Option<i32>,
    /// Ammonia concentration in ppm.
    pub nh3_conc: Option<f64>,
}

impl Record {
    /// Number of fields in a row, including the timestamp.
    pub const FIELD_COUNT: usize = 9;

    /// The fixed header written once at the top of every new daily log.
    pub const HEADER: [&'static str; Self::FIELD_COUNT] = [
        "Timestamp",
        "BME_Temp",
        "BME_Hum",
        "BME_Pres",
        "BME_Gas_Ohms",
        "DHT_Temp",
        "DHT_Hum",
        "SGP_VOC",
        "NH3_Conc",
    ];

    /// An all-absent record at the given timestamp.
    #[must_use]
    pub fn empty(timestamp: OffsetDateTime) -> Self {
        Self {
            timestamp,
            bme_temp: None,
            bme_hum: None,
            bme_pres: None,
            bme_gas: None,
            dht_temp: None,
            dht_hum: None,
            sgp_voc: None,
            nh3_conc: None,
        }
    }

    /// Render the record as CSV fields, in header order.
    ///
    /// Absent values render as empty strings. The timestamp renders as
    /// RFC 3339, falling back to the `Display` form in the unlikely case
    /// the offset cannot be formatted.
    #[must_use]
    pub fn csv_fields(&self) -> [String; Self::FIELD_COUNT] {
        let timestamp = self
            .timestamp
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| self.timestamp.to_string());

        [
            timestamp,
            render(self.bme_temp),
            render(self.bme_hum),
            render(self.bme_pres),
            render(self.bme_gas),
            render(self.dht_temp),
            render(self.dht_hum),
            self.sgp_voc.map(|v| v.to_string()).unwrap_or_default(),
            render(self.nh3_conc),
        ]
    }

    /// Number of data fields (excluding the timestamp) that are absent.
    #[must_use]
    pub fn absent_count(&self) -> usize {
        [
            self.bme_temp.is_none(),
            self.bme_hum.is_none(),
            self.bme_pres.is_none(),
            self.bme_gas.is_none(),
            self.dht_temp.is_none(),
            self.dht_hum.is_none(),
            self.sgp_voc.is_none(),
            self.nh3_conc.is_none(),
        ]
        .into_iter()
        .filter(|absent| *absent)
        .count()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.csv_fields();
        write!(f, "{}", fields.join(","))
    }
}

fn render(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Current time from the process-local clock.
///
/// Daily log keying and row timestamps both use this, so a cycle that
/// straddles midnight stays internally consistent. Falls back to UTC
/// when the local offset cannot be determined (e.g. multi-threaded
/// environments on some Unix platforms).
#[must_use]
pub fn local_timestamp() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_sensor_kind_roundtrip() {
        for kind in SensorKind::ALL {
            assert_eq!(kind.as_str().parse::<SensorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_sensor_kind_unknown() {
        let err = "co2".parse::<SensorKind>().unwrap_err();
        assert!(err.to_string().contains("co2"));
    }

    #[test]
    fn test_read_order_is_bme_first() {
        assert_eq!(SensorKind::ALL[0], SensorKind::Bme);
        assert_eq!(SensorKind::ALL[2], SensorKind::Sgp);
    }

    #[test]
    fn test_reading_is_absent() {
        assert!(Reading::Absent.is_absent());
        assert!(
            Reading::TempHumidity {
                temperature: None,
                humidity: None
            }
            .is_absent()
        );
        assert!(
            !Reading::TempHumidity {
                temperature: None,
                humidity: Some(48.0)
            }
            .is_absent()
        );
        assert!(!Reading::VocIndex(100).is_absent());
    }

    #[test]
    fn test_reading_accessors() {
        let climate = Reading::Climate(ClimateSample {
            temperature: 22.0,
            humidity: 41.5,
            pressure: 1013.2,
            gas_ohms: None,
        });
        assert_eq!(climate.temperature(), Some(22.0));
        assert_eq!(climate.humidity(), Some(41.5));

        let partial = Reading::TempHumidity {
            temperature: None,
            humidity: Some(48.0),
        };
        assert_eq!(partial.temperature(), None);
        assert_eq!(partial.humidity(), Some(48.0));

        assert_eq!(Reading::VocIndex(100).temperature(), None);
        assert_eq!(Reading::Absent.humidity(), None);
    }

    #[test]
    fn test_compensation_pair_default() {
        let pair = CompensationPair::default();
        assert_eq!(pair.temperature, 25.0);
        assert_eq!(pair.humidity, 50.0);
    }

    #[test]
    fn test_record_field_count() {
        let record = Record::empty(datetime!(2025-06-01 12:00:00 UTC));
        assert_eq!(record.csv_fields().len(), Record::FIELD_COUNT);
        assert_eq!(Record::HEADER.len(), Record::FIELD_COUNT);
        assert_eq!(record.absent_count(), 8);
    }

    #[test]
    fn test_record_csv_fields_absent_are_empty() {
        let mut record = Record::empty(datetime!(2025-06-01 12:00:00 UTC));
        record.bme_temp = Some(22.5);
        record.sgp_voc = Some(113);

        let fields = record.csv_fields();
        assert_eq!(fields[0], "2025-06-01T12:00:00Z");
        assert_eq!(fields[1], "22.5");
        assert_eq!(fields[2], "");
        assert_eq!(fields[7], "113");
        assert_eq!(fields[8], "");
    }

    #[test]
    fn test_record_display_matches_fields() {
        let mut record = Record::empty(datetime!(2025-06-01 08:30:00 UTC));
        record.dht_hum = Some(48.0);
        let rendered = record.to_string();
        assert!(rendered.starts_with("2025-06-01T08:30:00Z,"));
        assert_eq!(rendered.matches(',').count(), Record::FIELD_COUNT - 1);
    }

    #[test]
    fn test_record_serde_roundtrip() {
        let mut record = Record::empty(datetime!(2025-06-01 12:00:00 UTC));
        record.nh3_conc = Some(0.42);

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"nh3_conc\":0.42"));
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_absent_is_never_zero() {
        let record = Record::empty(datetime!(2025-06-01 12:00:00 UTC));
        for field in &record.csv_fields()[1..] {
            assert_eq!(field, "");
        }
    }
}
