use std::sync::Arc;

use axum::Router;
use tokio::sync::watch;

use crate::{Classifier, ReadingStore, Snapshot};

mod dashboard;
mod health;
mod predict;
mod readings;

// ---

/// Shared handler state, constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReadingStore>,
    pub classifier: Arc<dyn Classifier>,
    /// Latest dashboard snapshot published by the poller.
    pub snapshot: watch::Receiver<Snapshot>,
}

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(predict::router())
        .merge(readings::router())
        .merge(dashboard::router())
        .merge(health::router())
        .with_state(state)
}
