//! Daily-log persistence and object-store forwarding for airlog.
//!
//! Records flow in one direction: [`Sink::process`] appends each record
//! to a per-date CSV file ([`DailyLog`]) and, when a store is attached,
//! mirrors the whole day's file to an object store under a stable key.
//! Both sides fail independently and neither failure propagates to the
//! caller.
//!
//! # Example
//!
//! ```no_run
//! use airlog_store::{DailyLog, Sink};
//! use airlog_types::{Record, local_timestamp};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let log = DailyLog::open(airlog_store::default_data_dir())?;
//!     let sink = Sink::new(log);
//!     sink.process(&Record::empty(local_timestamp())).await;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod log;
pub mod sink;
pub mod upload;

use std::path::PathBuf;

pub use error::{Error, Result};
pub use log::{DailyLog, format_date, log_file_name, object_key};
pub use sink::{ProcessOutcome, Sink, UploadOutcome};
pub use upload::{HttpObjectStore, ObjectStore, UploadError};

/// Default data directory: `~/.local/share/airlog` (or the platform
/// equivalent), falling back to `./airlog-data` when no home directory
/// can be determined.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("airlog"))
        .unwrap_or_else(|| PathBuf::from("airlog-data"))
}
