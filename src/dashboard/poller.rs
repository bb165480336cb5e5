use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::Snapshot;
use crate::models::Reading;

// ---

/// Interval between dashboard refreshes.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Periodically fetches readings from the query endpoint and publishes a
/// fresh [`Snapshot`].
///
/// Refreshes never overlap: the loop awaits each refresh before taking the
/// next tick, and ticks missed while a slow fetch was running are skipped.
pub struct DashboardPoller {
    client: reqwest::Client,
    source_url: String,
    tx: watch::Sender<Snapshot>,
}

impl DashboardPoller {
    // ---
    /// Create a poller and the receiver its snapshots are published on.
    pub fn new(source_url: impl Into<String>) -> Result<(Self, watch::Receiver<Snapshot>)> {
        // ---
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .no_proxy()
            .build()
            .map_err(|e| anyhow!("Failed to build dashboard HTTP client: {}", e))?;
        let (tx, rx) = watch::channel(Snapshot::empty());

        let poller = DashboardPoller {
            client,
            source_url: source_url.into(),
            tx,
        };
        Ok((poller, rx))
    }

    /// Run the refresh loop on the runtime until `cancel` fires.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    async fn run(self, cancel: CancellationToken) {
        // ---
        info!(
            "Dashboard poller started: {} every {:?}",
            self.source_url, REFRESH_INTERVAL
        );

        let mut ticker = tokio::time::interval(REFRESH_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Dashboard poller shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.refresh().await;
                }
            }
        }
    }

    /// Fetch, aggregate and publish one snapshot.
    ///
    /// A failed fetch is logged and aggregated as an empty dataset.
    pub async fn refresh(&self) -> Snapshot {
        // ---
        let readings = match fetch_readings(&self.client, &self.source_url).await {
            Ok(readings) => readings,
            Err(e) => {
                warn!("Failed to fetch readings from {}: {}", self.source_url, e);
                Vec::new()
            }
        };

        let snapshot = Snapshot::from_readings(&readings, Utc::now());
        debug!(
            "Dashboard refreshed: {} readings ({} occupied)",
            snapshot.summary.metrics.total, snapshot.summary.metrics.occupied
        );

        self.tx.send_replace(snapshot.clone());
        snapshot
    }
}

/// Fetch all readings from the query endpoint.
///
/// Items that do not parse as a [`Reading`] are skipped.
async fn fetch_readings(client: &reqwest::Client, url: &str) -> Result<Vec<Reading>> {
    // ---
    let response: serde_json::Value = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let items = response
        .as_array()
        .ok_or_else(|| anyhow!("expected a JSON array from {}", url))?;

    let mut readings = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match serde_json::from_value::<Reading>(item.clone()) {
            Ok(reading) => readings.push(reading),
            Err(e) => {
                debug!("Failed to parse item {}: {} - Raw item: {}", i, e, item);
            }
        }
    }
    Ok(readings)
}
