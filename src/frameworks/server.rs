// Framework bootstrap for the hand scene runtime.

use crate::frameworks::config;
use crate::interface_adapters::http::health_handler;
use crate::interface_adapters::net::{scene_update_serializer, ws_handler};
use crate::interface_adapters::state::{AppState, NO_DRIVER};
use crate::use_cases::{SceneInput, SceneSettings, SceneUpdate, scene_task};

use axum::{Router, extract::ws::Utf8Bytes, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc, sync::atomic::AtomicU64};
use tokio::sync::{Notify, broadcast, mpsc, watch};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state();

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Arc<AppState> {
    // input_tx/rx: driver inputs go to the single scene task.
    let (input_tx, input_rx) = mpsc::channel::<SceneInput>(config::INPUT_CHANNEL_CAPACITY);

    // Scene updates (domain structs) and their serialized form shared by every socket.
    let (update_tx, _update_rx) =
        broadcast::channel::<SceneUpdate>(config::UPDATE_BROADCAST_CAPACITY);
    let (update_bytes_tx, _update_bytes_rx) =
        broadcast::channel::<Utf8Bytes>(config::UPDATE_BROADCAST_CAPACITY);
    let (frame_latest_tx, frame_latest_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));
    let (tick_tx, tick_rx) = watch::channel::<u64>(0);

    let settings = SceneSettings {
        tick_interval: config::tick_interval(),
        tuning: config::scene_tuning(),
    };
    tracing::debug!(
        tick_interval_ms = settings.tick_interval.as_secs_f64() * 1000.0,
        "scene configured"
    );

    // Subscribe the serializer before the scene can emit anything.
    tokio::spawn(scene_update_serializer(
        update_tx.subscribe(),
        update_bytes_tx.clone(),
        frame_latest_tx,
    ));

    // The scene runs for the life of the process.
    tokio::spawn(scene_task(
        input_rx,
        update_tx,
        tick_tx,
        settings,
        Arc::new(Notify::new()),
    ));

    Arc::new(AppState {
        input_tx,
        update_bytes_tx,
        frame_latest_rx,
        tick_rx,
        appearance: config::hand_appearance(),
        driver: AtomicU64::new(NO_DRIVER),
    })
}
