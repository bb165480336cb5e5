//! Data models for occupancy readings.

use chrono::{DateTime, DurationRound, Local, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

// ---

/// Display format of a reading's timestamp (`dd/mm/yy HH:MM`, local time).
pub const DISPLAY_FORMAT: &str = "%d/%m/%y %H:%M";

/// Number of features the classifier consumes.
pub const FEATURE_COUNT: usize = 5;

/// Feature names in the fixed order of the classifier's input vector.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["temperature", "humidity", "light", "co2", "humidity_ratio"];

/// Binary occupancy label. Serialized as `0` / `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Occupancy {
    Unoccupied,
    Occupied,
}

impl Occupancy {
    // ---
    pub const ALL: [Occupancy; 2] = [Occupancy::Unoccupied, Occupancy::Occupied];

    pub fn as_u8(self) -> u8 {
        match self {
            Occupancy::Unoccupied => 0,
            Occupancy::Occupied => 1,
        }
    }

    /// Status label used on the dashboard and confirmation page.
    pub fn label(self) -> &'static str {
        match self {
            Occupancy::Unoccupied => "Desocupado",
            Occupancy::Occupied => "Ocupado",
        }
    }

    /// Chart color for this status.
    pub fn color(self) -> &'static str {
        match self {
            Occupancy::Unoccupied => "#4CAF50",
            Occupancy::Occupied => "#E6FFE6",
        }
    }
}

impl From<Occupancy> for u8 {
    fn from(value: Occupancy) -> Self {
        value.as_u8()
    }
}

impl TryFrom<u8> for Occupancy {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Occupancy::Unoccupied),
            1 => Ok(Occupancy::Occupied),
            other => Err(format!("invalid occupancy label: {other}")),
        }
    }
}

/// The five environmental sensor values submitted with a prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features {
    // ---
    pub temperature: f64,
    pub humidity: f64,
    pub light: f64,
    pub co2: f64,
    pub humidity_ratio: f64,
}

impl Features {
    // ---
    /// Feature vector in classifier order (see [`FEATURE_NAMES`]).
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.temperature,
            self.humidity,
            self.light,
            self.co2,
            self.humidity_ratio,
        ]
    }
}

/// A reading that has been classified but not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    // ---
    pub recorded_at: DateTime<Utc>,
    pub features: Features,
    pub occupancy: Occupancy,
}

impl NewReading {
    // ---
    /// Stamp a classified sample with the current time, truncated to the minute.
    pub fn now(features: Features, occupancy: Occupancy) -> Self {
        NewReading {
            recorded_at: truncate_to_minute(Utc::now()),
            features,
            occupancy,
        }
    }
}

/// A persisted reading as served by `/dados`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    // ---
    pub id: String,
    /// Local display timestamp (`dd/mm/yy HH:MM`).
    pub timestamp: String,
    /// Sortable instant the display timestamp is derived from.
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub features: Features,
    pub occupancy: Occupancy,
}

impl Reading {
    // ---
    pub fn from_new(id: impl Into<String>, new: NewReading) -> Self {
        Reading {
            id: id.into(),
            timestamp: display_timestamp(new.recorded_at),
            recorded_at: new.recorded_at,
            features: new.features,
            occupancy: new.occupancy,
        }
    }
}

/// Format an instant as a local `dd/mm/yy HH:MM` string.
pub fn display_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(DISPLAY_FORMAT).to_string()
}

fn truncate_to_minute(at: DateTime<Utc>) -> DateTime<Utc> {
    at.duration_trunc(TimeDelta::minutes(1)).unwrap_or(at)
}
