// Plain HTTP routes served next to the WebSocket.

use crate::interface_adapters::state::AppState;
use axum::{Json, extract::State};
use std::sync::Arc;

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    // Latest scene tick; stays at 0 until the first frame completes.
    pub tick: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let tick = *state.tick_rx.borrow();
    Json(HealthResponse { status: "ok", tick })
}
