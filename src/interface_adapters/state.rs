use crate::domain::appearance::HandAppearance;
use crate::use_cases::SceneInput;
use axum::extract::ws::Utf8Bytes;
use std::sync::atomic::AtomicU64;
use tokio::sync::{broadcast, mpsc, watch};

/// Driver slot value when no connection is driving the scene.
pub const NO_DRIVER: u64 = 0;

pub struct AppState {
    // Inputs flowing from the driving client into the scene loop.
    pub input_tx: mpsc::Sender<SceneInput>,
    // Serialized scene updates, shared across all connections.
    pub update_bytes_tx: broadcast::Sender<Utf8Bytes>,
    // Latest serialized frame for lag recovery.
    pub frame_latest_rx: watch::Receiver<Utf8Bytes>,
    // Latest completed scene tick.
    pub tick_rx: watch::Receiver<u64>,
    pub appearance: HandAppearance,
    // Connection id of the driver, or NO_DRIVER.
    pub driver: AtomicU64,
}
