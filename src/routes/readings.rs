//! Query endpoint: `GET /dados` returns every stored reading as JSON, most
//! recent first. The dashboard poller reads the same endpoint.

use axum::{extract::State, routing::get, Json, Router};
use tracing::{error, info};

use super::AppState;
use crate::error::ApiError;
use crate::Reading;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/dados", get(handler))
}

/// `GET /dados`: every stored reading, most recent first.
async fn handler(State(state): State<AppState>) -> Result<Json<Vec<Reading>>, ApiError> {
    // ---
    let readings = state.store.find_all().await.map_err(|e| {
        error!("GET /dados - failed to read records: {}", e);
        ApiError::Store(e.to_string())
    })?;

    info!("GET /dados - returning {} readings", readings.len());
    Ok(Json(readings))
}
