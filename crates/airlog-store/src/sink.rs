//! Record sink: local persistence plus optional object-store forwarding.
//!
//! Every record is appended to the daily log first; if an object store
//! is configured, the whole day's file is then re-uploaded under a
//! stable per-date key so the remote copy always mirrors the local one.
//! Failures on either side are logged and absorbed, and the two sides
//! are independent: a broken store never stops local logging, and a
//! failed append never stops the mirror attempt.

use time::Date;
use tracing::{debug, warn};

use airlog_types::Record;

use crate::error::{Error, Result};
use crate::log::{DailyLog, object_key};
use crate::upload::ObjectStore;

/// Outcome of [`Sink::process`] for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Whether the local append succeeded.
    pub persisted: bool,
    /// How the mirror side ended.
    pub upload: UploadOutcome,
}

/// How the mirror side of [`Sink::process`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// No object store is attached; nothing was attempted.
    NotConfigured,
    /// The day's file was mirrored to the store.
    Mirrored,
    /// The mirror was attempted and failed; the cause was logged.
    Failed,
}

/// Persists records locally and mirrors the daily file to an object store.
pub struct Sink {
    log: DailyLog,
    store: Option<Box<dyn ObjectStore>>,
}

impl Sink {
    /// Create a sink that only persists locally.
    #[must_use]
    pub fn new(log: DailyLog) -> Self {
        Self { log, store: None }
    }

    /// Attach an object store; every processed record re-uploads the day's file.
    #[must_use]
    pub fn with_store(mut self, store: Box<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Whether an object store is attached.
    #[must_use]
    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// The daily log this sink appends to.
    #[must_use]
    pub fn log(&self) -> &DailyLog {
        &self.log
    }

    /// Persist one record and mirror its day's file, absorbing failures.
    ///
    /// The two sides fail independently: a failed append is logged and
    /// the mirror is still attempted, so rows already in the day's file
    /// keep reaching the store even while new appends are failing.
    pub async fn process(&self, record: &Record) -> ProcessOutcome {
        let persisted = match self.persist(record) {
            Ok(path) => {
                debug!("appended record to {}", path.display());
                true
            }
            Err(e) => {
                warn!("failed to persist record: {e}");
                false
            }
        };

        let upload = if self.store.is_some() {
            match self.upload(record.timestamp.date()).await {
                Ok(key) => {
                    debug!("mirrored daily log as {key}");
                    UploadOutcome::Mirrored
                }
                Err(e) => {
                    warn!("failed to mirror daily log: {e}");
                    UploadOutcome::Failed
                }
            }
        } else {
            UploadOutcome::NotConfigured
        };

        ProcessOutcome { persisted, upload }
    }

    /// Append one record to the daily log.
    pub fn persist(&self, record: &Record) -> Result<std::path::PathBuf> {
        self.log.append(record)
    }

    /// Upload the whole log file for `date`, returning the object key.
    pub async fn upload(&self, date: Date) -> Result<String> {
        let store = self.store.as_ref().ok_or(Error::UploadNotConfigured)?;

        let path = self.log.path_for(date)?;
        let body = tokio::fs::read(&path)
            .await
            .map_err(|e| Error::ReadLog { path, source: e })?;

        let key = object_key(date)?;
        store.put_object(&key, body).await?;
        Ok(key)
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("dir", &self.log.dir())
            .field("has_store", &self.has_store())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use time::macros::datetime;

    use crate::upload::UploadError;

    use super::*;

    /// Test double that records every upload, optionally failing them all.
    #[derive(Default)]
    struct RecordingStore {
        uploads: Mutex<Vec<(String, Vec<u8>)>>,
        fail: bool,
    }

    #[async_trait]
    impl ObjectStore for RecordingStore {
        async fn put_object(
            &self,
            key: &str,
            body: Vec<u8>,
        ) -> std::result::Result<(), UploadError> {
            if self.fail {
                return Err(UploadError::Status {
                    key: key.to_string(),
                    status: 500,
                });
            }
            self.uploads.lock().unwrap().push((key.to_string(), body));
            Ok(())
        }
    }

    fn sample_record() -> Record {
        let mut record = Record::empty(datetime!(2025-06-01 10:00:00 UTC));
        record.bme_temp = Some(22.5);
        record.dht_hum = Some(48.0);
        record
    }

    #[tokio::test]
    async fn test_process_without_store_persists_locally() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Sink::new(DailyLog::open(dir.path()).unwrap());
        assert!(!sink.has_store());

        let record = sample_record();
        let outcome = sink.process(&record).await;
        assert!(outcome.persisted);
        assert_eq!(outcome.upload, UploadOutcome::NotConfigured);

        let path = sink.log().path_for(record.timestamp.date()).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_upload_sends_whole_file_under_date_key() {
        let dir = tempfile::tempdir().unwrap();
        let store: &'static RecordingStore = Box::leak(Box::new(RecordingStore::default()));
        let sink = Sink::new(DailyLog::open(dir.path()).unwrap())
            .with_store(Box::new(SharedStore(store)));

        let record = sample_record();
        let outcome = sink.process(&record).await;
        assert_eq!(outcome.upload, UploadOutcome::Mirrored);
        sink.process(&record).await;

        let uploads = store.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[1].0, "sensor_data/2025-06-01.csv");

        // The second upload carries the full file: header plus both rows.
        let body = String::from_utf8(uploads[1].1.clone()).unwrap();
        assert_eq!(body.lines().count(), 3);
        assert!(body.starts_with("Timestamp,"));
    }

    #[tokio::test]
    async fn test_upload_failure_leaves_local_log_intact() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Sink::new(DailyLog::open(dir.path()).unwrap()).with_store(Box::new(
            RecordingStore {
                fail: true,
                ..Default::default()
            },
        ));

        let record = sample_record();
        let outcome = sink.process(&record).await;
        assert!(outcome.persisted);
        assert_eq!(outcome.upload, UploadOutcome::Failed);
        sink.process(&record).await;

        let path = sink.log().path_for(record.timestamp.date()).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents.lines().count(), 3, "both rows persisted locally");
    }

    #[tokio::test]
    async fn test_persist_failure_still_attempts_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Sink::new(DailyLog::open(dir.path()).unwrap())
            .with_store(Box::new(RecordingStore::default()));

        // Occupy the day's log path with a directory so the append fails.
        let record = sample_record();
        let path = sink.log().path_for(record.timestamp.date()).unwrap();
        std::fs::create_dir(&path).unwrap();

        let outcome = sink.process(&record).await;
        assert!(!outcome.persisted);
        assert_eq!(
            outcome.upload,
            UploadOutcome::Failed,
            "mirror must still be attempted after a failed append"
        );
    }

    #[tokio::test]
    async fn test_persist_failure_without_store_skips_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Sink::new(DailyLog::open(dir.path()).unwrap());

        let record = sample_record();
        let path = sink.log().path_for(record.timestamp.date()).unwrap();
        std::fs::create_dir(&path).unwrap();

        let outcome = sink.process(&record).await;
        assert!(!outcome.persisted);
        assert_eq!(outcome.upload, UploadOutcome::NotConfigured);
    }

    #[tokio::test]
    async fn test_upload_without_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Sink::new(DailyLog::open(dir.path()).unwrap());

        let err = sink.upload(datetime!(2025-06-01 10:00:00 UTC).date()).await;
        assert!(matches!(err, Err(Error::UploadNotConfigured)));
    }

    #[tokio::test]
    async fn test_upload_missing_file_reports_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Sink::new(DailyLog::open(dir.path()).unwrap())
            .with_store(Box::new(RecordingStore::default()));

        let err = sink.upload(datetime!(2025-06-01 10:00:00 UTC).date()).await;
        assert!(matches!(err, Err(Error::ReadLog { .. })));
    }

    /// Forwards to a leaked store so the test can inspect it afterwards.
    struct SharedStore(&'static RecordingStore);

    #[async_trait]
    impl ObjectStore for SharedStore {
        async fn put_object(
            &self,
            key: &str,
            body: Vec<u8>,
        ) -> std::result::Result<(), UploadError> {
            self.0.put_object(key, body).await
        }
    }
}
