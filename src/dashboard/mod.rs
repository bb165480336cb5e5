//! Live occupancy dashboard.
//!
//! A background [`DashboardPoller`] reads the query endpoint on a fixed
//! interval, aggregates the readings and publishes a [`Snapshot`] through a
//! watch channel. The `/dashboard/` routes only ever read the latest snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::{summarize, Summary};
use crate::models::Reading;

mod charts;
mod poller;

pub use charts::Charts;
pub use poller::{DashboardPoller, REFRESH_INTERVAL};

// ---

/// Result of one dashboard refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// When the snapshot was computed; `None` before the first refresh.
    pub refreshed_at: Option<DateTime<Utc>>,
    pub summary: Summary,
    pub charts: Charts,
}

impl Snapshot {
    // ---
    /// Placeholder published until the poller completes its first tick.
    pub fn empty() -> Self {
        Self::build(&[], None)
    }

    pub fn from_readings(readings: &[Reading], at: DateTime<Utc>) -> Self {
        Self::build(readings, Some(at))
    }

    fn build(readings: &[Reading], refreshed_at: Option<DateTime<Utc>>) -> Self {
        let summary = summarize(readings);
        let charts = Charts::from_summary(&summary);
        Snapshot {
            refreshed_at,
            summary,
            charts,
        }
    }
}
