//! Refresh coordination: fetch every endpoint on a timer, aggregate the
//! payloads into one immutable snapshot, publish it to subscribers.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::client::{FetchError, WeatherApi};
use crate::config::Config;
use crate::model::{Section, Snapshot};
use crate::pollutant;
use crate::reader::SnapshotReader;

/// Aggregate failure of one refresh cycle, wrapping the first fetch error
/// encountered.
#[derive(Debug, Error)]
#[error("error refreshing weather data: {source}")]
pub struct UpdateError {
    #[from]
    source: FetchError,
}

impl UpdateError {
    /// Endpoint whose fetch failed the cycle.
    pub fn section(&self) -> Section {
        self.source.section()
    }
}

/// Where the coordinator is in its refresh cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshState {
    /// No cycle in flight; the published snapshot is the last good one, if
    /// any cycle has succeeded yet.
    #[default]
    Idle,
    /// A cycle is in flight; the previous snapshot is still served.
    Refreshing,
    /// The last cycle failed; the previous snapshot, if any, is still
    /// served.
    Failed,
}

/// What subscribers observe: the published snapshot plus cycle status.
#[derive(Debug, Clone, Default)]
pub struct Published {
    pub snapshot: Option<Arc<Snapshot>>,
    pub state: RefreshState,
    pub last_error: Option<Arc<UpdateError>>,
}

/// Fetches the four endpoints on a timer and publishes each complete result
/// as one immutable [`Snapshot`].
///
/// Publication is a single reference swap: readers either see the previous
/// complete snapshot or the new one, never a partial mix. A failed cycle
/// leaves the previous snapshot in place and is retried at the next tick;
/// every tick is an equal-opportunity retry, there is no backoff.
#[derive(Debug)]
pub struct Coordinator {
    api: Box<dyn WeatherApi>,
    interval: Duration,
    tx: watch::Sender<Published>,
    refresh_requests: Notify,
}

impl Coordinator {
    pub fn new(api: Box<dyn WeatherApi>, config: &Config) -> Arc<Self> {
        Arc::new(Self {
            api,
            interval: Duration::from_secs(config.update_interval * 60),
            tx: watch::channel(Published::default()).0,
            refresh_requests: Notify::new(),
        })
    }

    /// Subscribe to snapshot publications and cycle status changes.
    pub fn subscribe(&self) -> watch::Receiver<Published> {
        self.tx.subscribe()
    }

    /// A reader over this coordinator's publications.
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader::new(self.subscribe())
    }

    /// Latest complete snapshot, if any cycle has succeeded yet.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.tx.borrow().snapshot.clone()
    }

    pub fn state(&self) -> RefreshState {
        self.tx.borrow().state
    }

    /// Ask the polling task for an immediate refresh (a UI button, say).
    pub fn request_refresh(&self) {
        self.refresh_requests.notify_one();
    }

    /// First refresh on startup. Hosts await this before wiring readers, so
    /// the first snapshot readers observe is complete.
    pub async fn first_refresh(&self) -> Result<(), Arc<UpdateError>> {
        self.refresh().await
    }

    /// Run one full refresh cycle and publish the outcome.
    ///
    /// All four endpoint fetches must succeed for a new snapshot to be
    /// published; on the first failure the cycle stops and the previously
    /// published snapshot is left untouched. The error is published to
    /// subscribers as well as returned.
    pub async fn refresh(&self) -> Result<(), Arc<UpdateError>> {
        self.tx
            .send_modify(|published| published.state = RefreshState::Refreshing);

        match self.update().await {
            Ok(snapshot) => {
                self.tx.send_modify(|published| {
                    published.snapshot = Some(Arc::new(snapshot));
                    published.state = RefreshState::Idle;
                    published.last_error = None;
                });
                info!("weather data refreshed");
                Ok(())
            }
            Err(err) => {
                let err = Arc::new(err);
                self.tx.send_modify(|published| {
                    published.state = RefreshState::Failed;
                    published.last_error = Some(Arc::clone(&err));
                });
                warn!(endpoint = %err.section(), "refresh cycle failed: {err}");
                Err(err)
            }
        }
    }

    /// Fetch and normalize all endpoint payloads into one snapshot. The
    /// calls are sequential; total latency is the sum of the round-trips.
    async fn update(&self) -> Result<Snapshot, UpdateError> {
        let conditions = self.api.fetch(Section::Conditions).await?;
        let mut airquality = self.api.fetch(Section::AirQuality).await?;
        let forecast_hourly = self.api.fetch(Section::ForecastHourly).await?;
        let forecast_daily = self.api.fetch(Section::ForecastDaily).await?;

        pollutant::normalize_payload(&mut airquality);

        Ok(Snapshot {
            conditions,
            airquality,
            forecast_hourly,
            forecast_daily,
        })
    }

    /// Spawn the polling task: refreshes at the configured interval and on
    /// [`Coordinator::request_refresh`], until `shutdown` is signalled.
    pub fn spawn(self: &Arc<Self>, shutdown: watch::Receiver<()>) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move { coordinator.run(shutdown).await })
    }

    async fn run(&self, mut shutdown: watch::Receiver<()>) {
        // The caller has already done the first refresh; the ticker starts
        // one interval out.
        let start = tokio::time::Instant::now() + self.interval;
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {}
                _ = self.refresh_requests.notified() => {}
            }

            // Failures are published and logged by refresh; the next tick
            // retries.
            let _ = self.refresh().await;
        }
    }
}
