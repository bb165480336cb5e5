//! Test fakes shared by the unit tests.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::classifier::{Classifier, PredictionError};
use crate::dashboard::Snapshot;
use crate::models::{Features, NewReading, Occupancy, Reading, DISPLAY_FORMAT, FEATURE_COUNT};
use crate::routes::AppState;
use crate::store::ReadingStore;

// ---

/// A reading with a fixed display timestamp and the given temperature.
pub fn reading_at(timestamp: &str, occupancy: Occupancy, temperature: f64) -> Reading {
    // ---
    let naive = NaiveDateTime::parse_from_str(timestamp, DISPLAY_FORMAT).unwrap();
    Reading {
        id: Uuid::new_v4().to_string(),
        timestamp: timestamp.to_string(),
        recorded_at: Utc.from_utc_datetime(&naive),
        features: Features {
            temperature,
            humidity: 30.0,
            light: 250.0,
            co2: 700.0,
            humidity_ratio: 0.0045,
        },
        occupancy,
    }
}

/// In-memory store with switchable failures.
#[derive(Default)]
pub struct MemoryStore {
    readings: Mutex<Vec<Reading>>,
    fail_inserts: bool,
    fail_reads: bool,
}

impl MemoryStore {
    pub fn with_readings(readings: Vec<Reading>) -> Self {
        MemoryStore {
            readings: Mutex::new(readings),
            ..Default::default()
        }
    }

    /// Store whose inserts always fail.
    pub fn failing_inserts() -> Self {
        MemoryStore {
            fail_inserts: true,
            ..Default::default()
        }
    }

    /// Store whose reads always fail.
    pub fn failing_reads() -> Self {
        MemoryStore {
            fail_reads: true,
            ..Default::default()
        }
    }

    pub fn count(&self) -> usize {
        self.readings.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<Reading> {
        self.readings.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn insert(&self, reading: NewReading) -> Result<Reading> {
        if self.fail_inserts {
            bail!("connection reset by peer");
        }
        let stored = Reading::from_new(Uuid::new_v4().to_string(), reading);
        self.readings.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn find_all(&self) -> Result<Vec<Reading>> {
        if self.fail_reads {
            bail!("store unreachable");
        }
        let mut all = self.all();
        all.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(all)
    }
}

/// Classifier that always returns the same label.
pub struct FixedClassifier(pub Occupancy);

impl Classifier for FixedClassifier {
    fn predict(&self, _features: &[f64; FEATURE_COUNT]) -> Result<Occupancy, PredictionError> {
        Ok(self.0)
    }
}

/// Classifier that always fails.
pub struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn predict(&self, _features: &[f64; FEATURE_COUNT]) -> Result<Occupancy, PredictionError> {
        Err(PredictionError::NonFiniteScore)
    }
}

pub fn test_state(store: Arc<MemoryStore>, classifier: impl Classifier + 'static) -> AppState {
    // ---
    let (_tx, snapshot) = tokio::sync::watch::channel(Snapshot::empty());
    AppState {
        store,
        classifier: Arc::new(classifier),
        snapshot,
    }
}
