//! Record store for readings.
//!
//! Handlers depend on the [`ReadingStore`] trait; the process wires in a
//! [`PgReadingStore`] built from the shared connection pool at startup.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Features, NewReading, Occupancy, Reading};

// ---

/// Append-only persistence of readings.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Persist a reading, returning it with its store-assigned id.
    async fn insert(&self, reading: NewReading) -> Result<Reading>;

    /// All readings, most recent first.
    async fn find_all(&self) -> Result<Vec<Reading>>;
}

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgReadingStore {
    pool: PgPool,
}

impl PgReadingStore {
    pub fn new(pool: PgPool) -> Self {
        PgReadingStore { pool }
    }
}

/// Row layout of the `readings` table.
#[derive(Debug, sqlx::FromRow)]
struct ReadingRow {
    // ---
    id: Uuid,
    recorded_at: DateTime<Utc>,
    temperature: f64,
    humidity: f64,
    light: f64,
    co2: f64,
    humidity_ratio: f64,
    occupancy: i16,
}

impl TryFrom<ReadingRow> for Reading {
    type Error = anyhow::Error;

    fn try_from(row: ReadingRow) -> Result<Self> {
        // ---
        let label = u8::try_from(row.occupancy)
            .map_err(|_| anyhow!("invalid occupancy {} for reading {}", row.occupancy, row.id))?;
        let occupancy = Occupancy::try_from(label).map_err(|e| anyhow!("reading {}: {}", row.id, e))?;

        Ok(Reading::from_new(
            row.id.to_string(),
            NewReading {
                recorded_at: row.recorded_at,
                features: Features {
                    temperature: row.temperature,
                    humidity: row.humidity,
                    light: row.light,
                    co2: row.co2,
                    humidity_ratio: row.humidity_ratio,
                },
                occupancy,
            },
        ))
    }
}

#[async_trait]
impl ReadingStore for PgReadingStore {
    async fn insert(&self, reading: NewReading) -> Result<Reading> {
        // ---
        let id = Uuid::new_v4();
        let f = &reading.features;

        sqlx::query(
            r#"
            INSERT INTO readings (
                id, recorded_at,
                temperature, humidity, light, co2, humidity_ratio,
                occupancy
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id)
        .bind(reading.recorded_at)
        .bind(f.temperature)
        .bind(f.humidity)
        .bind(f.light)
        .bind(f.co2)
        .bind(f.humidity_ratio)
        .bind(i16::from(reading.occupancy.as_u8()))
        .execute(&self.pool)
        .await?;

        tracing::debug!("Stored reading {}", id);
        Ok(Reading::from_new(id.to_string(), reading))
    }

    async fn find_all(&self) -> Result<Vec<Reading>> {
        // ---
        let rows = sqlx::query_as::<_, ReadingRow>(
            r#"
            SELECT id, recorded_at,
                   temperature, humidity, light, co2, humidity_ratio,
                   occupancy
            FROM readings
            ORDER BY recorded_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Reading::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn row(occupancy: i16) -> ReadingRow {
        ReadingRow {
            id: Uuid::nil(),
            recorded_at: Utc.with_ymd_and_hms(2025, 5, 1, 8, 30, 0).unwrap(),
            temperature: 21.0,
            humidity: 35.5,
            light: 120.0,
            co2: 600.0,
            humidity_ratio: 0.0051,
            occupancy,
        }
    }

    #[test]
    fn test_row_conversion_preserves_fields() {
        // ---
        let reading = Reading::try_from(row(1)).unwrap();

        assert_eq!(reading.id, Uuid::nil().to_string());
        assert_eq!(reading.occupancy, Occupancy::Occupied);
        assert_eq!(reading.features.humidity, 35.5);
        assert_eq!(reading.features.humidity_ratio, 0.0051);
        assert_eq!(
            reading.recorded_at,
            Utc.with_ymd_and_hms(2025, 5, 1, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_row_with_invalid_label_is_rejected() {
        // ---
        assert!(Reading::try_from(row(2)).is_err());
        assert!(Reading::try_from(row(-1)).is_err());
    }
}
