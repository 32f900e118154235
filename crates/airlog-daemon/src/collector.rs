//! The polling loop.
//!
//! One cycle reads every present sensor, hands the record to the sink,
//! and sleeps. A cycle that panics is contained: the panic is logged
//! and the loop resumes after a backoff instead of taking the daemon
//! down. Only cancellation ends the loop.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use airlog_core::{Registry, run_cycle};
use airlog_store::Sink;
use airlog_types::CompensationPair;

/// Drives the read/persist/sleep loop until cancelled.
pub struct Collector {
    registry: Registry,
    sink: Sink,
    defaults: CompensationPair,
    interval: Duration,
    error_backoff: Duration,
    shutdown: CancellationToken,
}

impl Collector {
    /// Create a collector over an initialized registry and sink.
    #[must_use]
    pub fn new(
        registry: Registry,
        sink: Sink,
        defaults: CompensationPair,
        interval: Duration,
        error_backoff: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            registry,
            sink,
            defaults,
            interval,
            error_backoff,
            shutdown,
        }
    }

    /// Run cycles until the shutdown token is cancelled.
    pub async fn run(mut self) {
        info!(
            "collector started: {} sensor(s) present, cycle every {:?}",
            self.registry.present_count(),
            self.interval
        );

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            let registry = &mut self.registry;
            let sink = &self.sink;
            let defaults = self.defaults;
            let cycle = AssertUnwindSafe(async move {
                let record = run_cycle(registry, defaults).await;
                sink.process(&record).await;
                record
            })
            .catch_unwind();

            let delay = match cycle.await {
                Ok(record) => {
                    debug!("cycle complete: {}", record);
                    self.interval
                }
                Err(payload) => {
                    error!(
                        "cycle panicked: {}; backing off {:?}",
                        panic_message(payload.as_ref()),
                        self.error_backoff
                    );
                    self.error_backoff
                }
            };

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!("collector stopped");
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use airlog_core::mock::MockBackend;
    use airlog_core::{InitOptions, Sensor};
    use airlog_store::DailyLog;
    use airlog_types::{Reading, SensorKind, local_timestamp};

    async fn mock_registry() -> Registry {
        let mut backend = MockBackend::new();
        Registry::initialize(&mut backend, &InitOptions::default()).await
    }

    fn collector(registry: Registry, dir: &std::path::Path, shutdown: CancellationToken) -> Collector {
        Collector::new(
            registry,
            Sink::new(DailyLog::open(dir).unwrap()),
            CompensationPair::default(),
            Duration::from_secs(5),
            Duration::from_secs(5),
            shutdown,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_writes_one_row_per_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(
            collector(mock_registry().await, dir.path(), shutdown.clone()).run(),
        );

        // Cycles land at t=0, 5 and 10 seconds.
        tokio::time::sleep(Duration::from_secs(12)).await;
        shutdown.cancel();
        handle.await.unwrap();

        let log = DailyLog::open(dir.path()).unwrap();
        let path = log.path_for(local_timestamp().date()).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents.lines().count(), 4); // header + 3 rows
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_start_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        collector(mock_registry().await, dir.path(), shutdown).run().await;

        let log = DailyLog::open(dir.path()).unwrap();
        let path = log.path_for(local_timestamp().date()).unwrap();
        assert!(!path.exists());
    }

    struct PanickingSensor;

    #[async_trait]
    impl Sensor for PanickingSensor {
        fn kind(&self) -> SensorKind {
            SensorKind::Dht
        }

        async fn try_read(&mut self, _compensation: &CompensationPair) -> Reading {
            panic!("driver bug");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_cycle_does_not_kill_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = mock_registry().await;
        registry.insert(Box::new(PanickingSensor));

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(collector(registry, dir.path(), shutdown.clone()).run());

        // Every cycle panics; the loop must keep backing off and retrying.
        tokio::time::sleep(Duration::from_secs(12)).await;
        shutdown.cancel();
        handle.await.expect("collector task must not propagate the panic");

        let log = DailyLog::open(dir.path()).unwrap();
        let path = log.path_for(local_timestamp().date()).unwrap();
        assert!(!path.exists(), "panicked cycles must not write rows");
    }
}
