//! Dashboard aggregation: reshapes raw readings into occupancy summaries.
//!
//! Everything here is a pure function of the input slice. The dashboard
//! recomputes the full [`Summary`] from scratch on every refresh.

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

use crate::models::{Features, Occupancy, Reading, DISPLAY_FORMAT};

// ---

/// Part of the day a reading falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    Morning,
    Afternoon,
    Night,
}

impl Shift {
    // ---
    pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Afternoon, Shift::Night];

    /// Half-open buckets: `[5,12)` morning, `[12,18)` afternoon, else night.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Shift::Morning,
            12..=17 => Shift::Afternoon,
            _ => Shift::Night,
        }
    }

    /// Shift of a `dd/mm/yy HH:MM` display timestamp.
    ///
    /// Unparseable timestamps land in the night bucket.
    pub fn from_timestamp(timestamp: &str) -> Self {
        match NaiveDateTime::parse_from_str(timestamp, DISPLAY_FORMAT) {
            Ok(at) => Shift::from_hour(at.hour()),
            Err(e) => {
                tracing::debug!("Unparseable timestamp {:?}: {}", timestamp, e);
                Shift::Night
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Shift::Morning => "Manhã",
            Shift::Afternoon => "Tarde",
            Shift::Night => "Noite",
        }
    }
}

/// One of the five sensor fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorField {
    Temperature,
    Humidity,
    Light,
    Co2,
    HumidityRatio,
}

impl SensorField {
    // ---
    pub const ALL: [SensorField; 5] = [
        SensorField::Temperature,
        SensorField::Humidity,
        SensorField::Light,
        SensorField::Co2,
        SensorField::HumidityRatio,
    ];

    pub fn value(self, features: &Features) -> f64 {
        match self {
            SensorField::Temperature => features.temperature,
            SensorField::Humidity => features.humidity,
            SensorField::Light => features.light,
            SensorField::Co2 => features.co2,
            SensorField::HumidityRatio => features.humidity_ratio,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SensorField::Temperature => "Temperatura (°C)",
            SensorField::Humidity => "Umidade (%)",
            SensorField::Light => "Luminosidade",
            SensorField::Co2 => "CO2 (ppm)",
            SensorField::HumidityRatio => "Razão de umidade",
        }
    }
}

/// Counts shown in the metrics strip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub total: usize,
    pub occupied: usize,
    pub unoccupied: usize,
}

/// Share of one occupancy status within the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyShare {
    pub status: Occupancy,
    pub count: usize,
    pub percentage: f64,
}

/// Share of one occupancy status within a single shift.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftShare {
    pub shift: Shift,
    pub status: Occupancy,
    pub count: usize,
    pub percentage: f64,
}

/// Mean of one sensor field for occupied and unoccupied readings.
///
/// `None` means the group has no readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMeans {
    pub field: SensorField,
    pub occupied: Option<f64>,
    pub unoccupied: Option<f64>,
}

/// Everything the dashboard renders for one refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub metrics: Metrics,
    pub overall: Vec<OccupancyShare>,
    pub by_shift: Vec<ShiftShare>,
    pub means: Vec<FieldMeans>,
}

/// Aggregate a snapshot of readings.
pub fn summarize(readings: &[Reading]) -> Summary {
    // ---
    let occupied = count_status(readings.iter(), Occupancy::Occupied);
    let metrics = Metrics {
        total: readings.len(),
        occupied,
        unoccupied: readings.len() - occupied,
    };

    Summary {
        metrics,
        overall: overall_split(readings),
        by_shift: shift_split(readings),
        means: field_means(readings),
    }
}

fn count_status<'a>(readings: impl Iterator<Item = &'a Reading>, status: Occupancy) -> usize {
    readings.filter(|r| r.occupancy == status).count()
}

fn percentage(count: usize, total: usize) -> f64 {
    count as f64 / total as f64 * 100.0
}

/// One share per status present; empty input yields no shares.
fn overall_split(readings: &[Reading]) -> Vec<OccupancyShare> {
    // ---
    let total = readings.len();
    Occupancy::ALL
        .into_iter()
        .map(|status| (status, count_status(readings.iter(), status)))
        .filter(|(_, count)| *count > 0)
        .map(|(status, count)| OccupancyShare {
            status,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

/// Per-shift shares; shifts without readings are omitted.
fn shift_split(readings: &[Reading]) -> Vec<ShiftShare> {
    // ---
    let shifts: Vec<Shift> = readings
        .iter()
        .map(|r| Shift::from_timestamp(&r.timestamp))
        .collect();

    let mut shares = Vec::new();
    for shift in Shift::ALL {
        let in_shift: Vec<&Reading> = readings
            .iter()
            .zip(&shifts)
            .filter(|(_, s)| **s == shift)
            .map(|(r, _)| r)
            .collect();
        let shift_total = in_shift.len();

        for status in Occupancy::ALL {
            let count = count_status(in_shift.iter().copied(), status);
            if count > 0 {
                shares.push(ShiftShare {
                    shift,
                    status,
                    count,
                    percentage: percentage(count, shift_total),
                });
            }
        }
    }
    shares
}

fn field_means(readings: &[Reading]) -> Vec<FieldMeans> {
    // ---
    SensorField::ALL
        .into_iter()
        .map(|field| FieldMeans {
            field,
            occupied: mean_for(readings, field, Occupancy::Occupied),
            unoccupied: mean_for(readings, field, Occupancy::Unoccupied),
        })
        .collect()
}

fn mean_for(readings: &[Reading], field: SensorField, status: Occupancy) -> Option<f64> {
    // ---
    let (sum, n) = readings
        .iter()
        .filter(|r| r.occupancy == status)
        .fold((0.0, 0usize), |(sum, n), r| {
            (sum + field.value(&r.features), n + 1)
        });

    (n > 0).then(|| sum / n as f64)
}
