//! Dashboard routes. Both read the latest snapshot published by the poller;
//! neither touches the store.

use axum::{
    extract::State,
    response::{Html, Redirect},
    routing::get,
    Json, Router,
};

use super::AppState;
use crate::views;
use crate::Snapshot;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/dashboard", get(|| async { Redirect::permanent("/dashboard/") }))
        .route("/dashboard/", get(page))
        .route("/dashboard/data", get(data))
}

async fn page(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.snapshot.borrow().clone();
    Html(views::dashboard_page(&snapshot))
}

async fn data(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.snapshot.borrow().clone())
}
