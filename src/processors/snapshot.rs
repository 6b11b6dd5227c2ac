use crate::config::AppConfig;
use crate::error::{ProcessingError, Result};
use crate::fetchers::ReadingSource;
use crate::models::{Location, Snapshot, SnapshotSet, WeatherReading};
use crate::utils::constants::{
    DEFAULT_DANGER_THRESHOLD_C, DEFAULT_MAX_CONCURRENCY, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::utils::progress::ProgressReporter;
use crate::utils::InputPolicy;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Fetches current conditions for many locations and turns them into snapshots.
pub struct SnapshotAggregator {
    source: Arc<dyn ReadingSource>,
    max_concurrency: usize,
    request_timeout: Duration,
    request_budget: Option<usize>,
    danger_threshold_c: f64,
    input_policy: InputPolicy,
}

impl SnapshotAggregator {
    pub fn new(source: Arc<dyn ReadingSource>) -> Self {
        Self {
            source,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            request_budget: None,
            danger_threshold_c: DEFAULT_DANGER_THRESHOLD_C,
            input_policy: InputPolicy::default(),
        }
    }

    pub fn from_config(source: Arc<dyn ReadingSource>, config: &AppConfig) -> Self {
        Self::new(source)
            .with_max_concurrency(config.max_concurrency)
            .with_request_timeout(config.request_timeout())
            .with_request_budget(config.request_budget)
            .with_danger_threshold(config.danger_threshold_c)
            .with_input_policy(config.input_policy)
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_request_budget(mut self, request_budget: Option<usize>) -> Self {
        self.request_budget = request_budget;
        self
    }

    pub fn with_danger_threshold(mut self, danger_threshold_c: f64) -> Self {
        self.danger_threshold_c = danger_threshold_c;
        self
    }

    pub fn with_input_policy(mut self, input_policy: InputPolicy) -> Self {
        self.input_policy = input_policy;
        self
    }

    /// Snapshot a single location
    pub async fn snapshot_for(&self, location: Location) -> Result<Snapshot> {
        let reading = fetch_with_timeout(self.source.clone(), location, self.request_timeout).await?;
        self.to_snapshot(reading)
    }

    /// Snapshot every location, at most `max_concurrency` requests in flight.
    ///
    /// Locations whose fetch fails, times out or exceeds the request budget are
    /// omitted. Surviving snapshots keep the order of `locations`.
    pub async fn aggregate(
        &self,
        locations: &[Location],
        progress: Option<&ProgressReporter>,
    ) -> SnapshotSet {
        let allowed = self
            .request_budget
            .map_or(locations.len(), |budget| budget.min(locations.len()));

        if allowed < locations.len() {
            warn!(
                "Request budget of {} reached; skipping {} locations",
                allowed,
                locations.len() - allowed
            );
        }

        let mut pending = locations[..allowed].iter().copied().enumerate();
        let mut tasks: JoinSet<(usize, Location, Result<WeatherReading>)> = JoinSet::new();
        let mut snapshots: Vec<(usize, Snapshot)> = Vec::with_capacity(allowed);
        let mut completed = 0u64;

        loop {
            while tasks.len() < self.max_concurrency {
                let Some((index, location)) = pending.next() else {
                    break;
                };
                let source = self.source.clone();
                let timeout = self.request_timeout;
                tasks.spawn(async move {
                    let reading = fetch_with_timeout(source, location, timeout).await;
                    (index, location, reading)
                });
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };

            completed += 1;
            if let Some(p) = progress {
                p.update(completed);
            }

            let (index, location, reading) = match joined {
                Ok(result) => result,
                Err(e) => {
                    error!("Snapshot task failed: {}", e);
                    continue;
                }
            };

            match reading.and_then(|reading| self.to_snapshot(reading)) {
                Ok(snapshot) => {
                    debug!("{}: WBT {:.2} °C", location, snapshot.wbt_c);
                    snapshots.push((index, snapshot));
                }
                Err(e) if e.is_absence() => warn!("Omitting {}: {}", location, e),
                Err(e) => error!("Omitting {}: {}", location, e),
            }
        }

        snapshots.sort_by_key(|(index, _)| *index);
        let set = SnapshotSet::new(
            snapshots.into_iter().map(|(_, snapshot)| snapshot).collect(),
            Utc::now(),
        );

        info!(
            "Collected {} of {} snapshots ({} dangerous)",
            set.len(),
            locations.len(),
            set.dangerous().count()
        );

        set
    }

    fn to_snapshot(&self, reading: WeatherReading) -> Result<Snapshot> {
        let wbt_c = self
            .input_policy
            .estimate(reading.temperature_c, reading.humidity_pct)?;

        Ok(Snapshot {
            location: reading.location,
            temperature_c: reading.temperature_c,
            humidity_pct: reading.humidity_pct,
            wbt_c,
            is_dangerous: wbt_c > self.danger_threshold_c,
            observed_at: reading.observed_at,
        })
    }
}

async fn fetch_with_timeout(
    source: Arc<dyn ReadingSource>,
    location: Location,
    timeout: Duration,
) -> Result<WeatherReading> {
    match tokio::time::timeout(timeout, source.fetch_reading(location)).await {
        Ok(reading) => reading,
        Err(_) => Err(ProcessingError::Timeout {
            location: location.to_string(),
            timeout,
        }),
    }
}
