//! Ingestion endpoint: the prediction form.
//!
//! `GET /` renders the form. `POST /` parses the five sensor fields, asks the
//! classifier for a label, stamps and persists the reading, and renders the
//! result. A failed insert is reported on the page but does not fail the
//! request.

use axum::{
    extract::{rejection::FormRejection, State},
    response::Html,
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use tracing::{debug, error, info};

use super::AppState;
use crate::error::ApiError;
use crate::models::{display_timestamp, Features, NewReading};
use crate::views::{self, Confirmation};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/", get(form).post(submit))
}

async fn form() -> Html<String> {
    Html(views::index_page(None))
}

/// Raw form fields; each is parsed as a decimal number.
#[derive(Debug, Deserialize)]
struct PredictForm {
    temperature: Option<String>,
    humidity: Option<String>,
    light: Option<String>,
    co2: Option<String>,
    humidity_ratio: Option<String>,
}

impl PredictForm {
    fn parse(&self) -> Result<Features, ApiError> {
        // ---
        Ok(Features {
            temperature: parse_field("temperature", self.temperature.as_deref())?,
            humidity: parse_field("humidity", self.humidity.as_deref())?,
            light: parse_field("light", self.light.as_deref())?,
            co2: parse_field("co2", self.co2.as_deref())?,
            humidity_ratio: parse_field("humidity_ratio", self.humidity_ratio.as_deref())?,
        })
    }
}

fn parse_field(name: &str, raw: Option<&str>) -> Result<f64, ApiError> {
    // ---
    let Some(raw) = raw else {
        debug!("Form field '{}' is missing", name);
        return Err(ApiError::InvalidInput);
    };
    raw.trim().parse::<f64>().map_err(|e| {
        debug!("Form field '{}' is not numeric ({:?}): {}", name, raw, e);
        ApiError::InvalidInput
    })
}

async fn submit(
    State(state): State<AppState>,
    payload: Result<Form<PredictForm>, FormRejection>,
) -> Result<Html<String>, ApiError> {
    // ---
    let Form(form) = payload.map_err(|e| {
        debug!("Rejected form body: {}", e);
        ApiError::InvalidInput
    })?;
    let features = form.parse()?;

    let occupancy = state
        .classifier
        .predict(&features.to_vector())
        .map_err(|e| {
            error!("Prediction failed for {:?}: {}", features, e);
            e
        })?;

    let reading = NewReading::now(features, occupancy);
    let timestamp = display_timestamp(reading.recorded_at);

    let saved = match state.store.insert(reading).await {
        Ok(stored) => {
            info!(
                "POST / - stored reading {} (occupancy={})",
                stored.id,
                occupancy.as_u8()
            );
            true
        }
        Err(e) => {
            error!("POST / - predicted but failed to store reading: {}", e);
            false
        }
    };

    Ok(Html(views::index_page(Some(&Confirmation {
        occupancy,
        timestamp,
        saved,
    }))))
}
