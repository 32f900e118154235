//! Append-only daily CSV log.
//!
//! One file per calendar date, named `sensor_data_<YYYY-MM-DD>.csv`.
//! The first row ever written to a new file is the fixed header; every
//! later row for that date appends below it. The file is opened,
//! appended, flushed, and closed anew on every append — no handle is
//! held across cycles.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use time::Date;
use time::macros::format_description;
use tracing::info;

use airlog_types::Record;

use crate::error::{Error, Result};

/// Render a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> Result<String> {
    let format = format_description!("[year]-[month]-[day]");
    Ok(date.format(&format)?)
}

/// The log file name for a given date.
pub fn log_file_name(date: Date) -> Result<String> {
    Ok(format!("sensor_data_{}.csv", format_date(date)?))
}

/// The object-store key the log for a given date uploads under.
pub fn object_key(date: Date) -> Result<String> {
    Ok(format!("sensor_data/{}.csv", format_date(date)?))
}

/// Append-only daily log rooted at a data directory.
#[derive(Debug, Clone)]
pub struct DailyLog {
    dir: PathBuf,
}

impl DailyLog {
    /// Open a daily log rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| Error::CreateDirectory {
            path: dir.clone(),
            source: e,
        })?;
        info!("daily logs in {}", dir.display());
        Ok(Self { dir })
    }

    /// The data directory this log writes into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The path of the log file for a given date.
    pub fn path_for(&self, date: Date) -> Result<PathBuf> {
        Ok(self.dir.join(log_file_name(date)?))
    }

    /// Append one record to the log for the record's own date.
    ///
    /// Creates the file with the fixed header if it does not exist yet.
    /// The writer is flushed before this returns, on every path.
    pub fn append(&self, record: &Record) -> Result<PathBuf> {
        let path = self.path_for(record.timestamp.date())?;
        let is_new = !path.exists();

        let file = OpenOptions::new().append(true).create(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            writer.write_record(Record::HEADER)?;
        }
        writer.write_record(&record.csv_fields())?;
        writer.flush()?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use time::macros::{date, datetime};

    fn record_at(timestamp: OffsetDateTime) -> Record {
        let mut record = Record::empty(timestamp);
        record.bme_temp = Some(22.5);
        record.sgp_voc = Some(107);
        record
    }

    #[test]
    fn test_names_and_keys() {
        let date = date!(2025 - 06 - 01);
        assert_eq!(log_file_name(date).unwrap(), "sensor_data_2025-06-01.csv");
        assert_eq!(object_key(date).unwrap(), "sensor_data/2025-06-01.csv");
    }

    #[test]
    fn test_header_written_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = DailyLog::open(dir.path()).unwrap();

        let record = record_at(datetime!(2025-06-01 10:00:00 UTC));
        let path = log.append(&record).unwrap();
        log.append(&record).unwrap();
        log.append(&record).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4); // header + 3 rows
        assert_eq!(lines[0], Record::HEADER.join(","));
        assert_eq!(
            contents.matches("Timestamp").count(),
            1,
            "header must never repeat"
        );
    }

    #[test]
    fn test_rows_have_fixed_field_count() {
        let dir = tempfile::tempdir().unwrap();
        let log = DailyLog::open(dir.path()).unwrap();

        let record = record_at(datetime!(2025-06-01 10:00:00 UTC));
        let path = log.append(&record).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        for line in contents.lines() {
            assert_eq!(line.split(',').count(), Record::FIELD_COUNT);
        }
    }

    #[test]
    fn test_absent_fields_are_empty_not_zero() {
        let dir = tempfile::tempdir().unwrap();
        let log = DailyLog::open(dir.path()).unwrap();

        let record = Record::empty(datetime!(2025-06-01 10:00:00 UTC));
        let path = log.append(&record).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let data_row = contents.lines().nth(1).unwrap();
        assert_eq!(data_row, "2025-06-01T10:00:00Z,,,,,,,,");
    }

    #[test]
    fn test_new_date_gets_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = DailyLog::open(dir.path()).unwrap();

        let first = log
            .append(&record_at(datetime!(2025-06-01 23:59:00 UTC)))
            .unwrap();
        let second = log
            .append(&record_at(datetime!(2025-06-02 00:01:00 UTC)))
            .unwrap();

        assert_ne!(first, second);
        assert!(std::fs::read_to_string(&second)
            .unwrap()
            .starts_with("Timestamp,"));
    }

    #[test]
    fn test_open_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let log = DailyLog::open(&nested).unwrap();
        assert!(nested.exists());
        assert_eq!(log.dir(), nested.as_path());
    }
}
