//! Database schema management for `occupancy-monitor`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs`.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create the database schema (idempotent).
///
/// Creates the append-only `readings` table plus an index on `recorded_at`
/// backing the most-recent-first listing served by `/dados`. Safe to call on
/// every startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS readings (
            id             UUID             PRIMARY KEY,
            recorded_at    TIMESTAMPTZ      NOT NULL,
            temperature    DOUBLE PRECISION NOT NULL,
            humidity       DOUBLE PRECISION NOT NULL,
            light          DOUBLE PRECISION NOT NULL,
            co2            DOUBLE PRECISION NOT NULL,
            humidity_ratio DOUBLE PRECISION NOT NULL,
            occupancy      SMALLINT         NOT NULL CHECK (occupancy IN (0, 1))
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_readings_recorded_at
            ON readings (recorded_at DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
