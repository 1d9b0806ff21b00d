use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::interface_adapters::state::{AppState, NO_DRIVER};
use crate::interface_adapters::utils::rng::rand_id;
use crate::use_cases::{SceneInput, SceneUpdate};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::{Arc, atomic::Ordering},
    time::{Duration, Instant},
};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
pub enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    InputClosed,
    UpdatesClosed,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;

pub async fn scene_update_serializer(
    mut update_rx: broadcast::Receiver<SceneUpdate>,
    update_bytes_tx: broadcast::Sender<Utf8Bytes>,
    frame_latest_tx: watch::Sender<Utf8Bytes>,
) {
    // Serialize each update once and broadcast the shared bytes.
    loop {
        match update_rx.recv().await {
            Ok(update) => {
                let is_frame = matches!(update, SceneUpdate::Frame(_));
                let msg = ServerMessage::from(update);
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize scene update");
                        continue;
                    }
                };

                let bytes = Utf8Bytes::from(txt);
                if is_frame {
                    frame_latest_tx.send_replace(bytes.clone());
                }
                let _ = update_bytes_tx.send(bytes);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "scene serializer lagged; skipping to latest update");
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("scene updates channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let conn_id = rand_id();
        handle_socket(socket, state, conn_id).instrument(info_span!("conn", conn_id))
    })
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, conn_id: u64) {
    // Subscribe before any await so the first frames are not missed.
    let updates_rx = state.update_bytes_tx.subscribe();

    // First connection in drives the scene; everyone else watches.
    let is_driver = state
        .driver
        .compare_exchange(NO_DRIVER, conn_id, Ordering::AcqRel, Ordering::Acquire)
        .is_ok();

    let now = Instant::now() - LOG_THROTTLE;
    let mut ctx = ConnCtx {
        conn_id,
        is_driver,
        input_tx: state.input_tx.clone(),
        updates_rx,
        frame_latest_rx: state.frame_latest_rx.clone(),
        lag_recovery_count: 0,

        msgs_in: 0,
        msgs_out: 0,
        bytes_in: 0,
        bytes_out: 0,

        invalid_json: 0,

        last_input_full_log: now,
        last_update_lag_log: now,
        last_invalid_input_log: now,

        close_frame: None,
        sample_clock: None,
    };

    let welcome = ServerMessage::Welcome {
        conn_id: conn_id.to_string(),
        driver: is_driver,
        appearance: state.appearance,
    };
    match send_message(&mut socket, &welcome).await {
        Ok(bytes) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += bytes as u64;
        }
        Err(e) => {
            warn!(error = ?e, "failed to send welcome");
            disconnect_cleanup(&state, &ctx).await;
            return;
        }
    }

    info!(driver = is_driver, "client connected");

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }

    disconnect_cleanup(&state, &ctx).await;
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

struct ConnCtx {
    pub conn_id: u64,
    // Only the driver's messages reach the scene.
    pub is_driver: bool,
    pub input_tx: mpsc::Sender<SceneInput>,
    pub updates_rx: broadcast::Receiver<Utf8Bytes>,
    pub frame_latest_rx: watch::Receiver<Utf8Bytes>,
    // Count lag recovery frames sent to this client.
    pub lag_recovery_count: u64,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_json: u32,

    pub last_input_full_log: Instant,
    pub last_update_lag_log: Instant,
    pub last_invalid_input_log: Instant,

    pub close_frame: Option<CloseFrame>,
    // Anchors client capture times to server instants.
    sample_clock: Option<SampleClock>,
}

/// Pairs the first client capture time seen with its arrival instant.
#[derive(Debug, Clone, Copy)]
struct SampleClock {
    client_ms: f64,
    server: Instant,
}

impl SampleClock {
    fn instant_for(&self, client_ms: f64) -> Option<Instant> {
        let offset = Duration::try_from_secs_f64((client_ms - self.client_ms) / 1000.0).ok()?;
        self.server.checked_add(offset)
    }
}

/// Picks the instant a message is applied at.
///
/// Stamped messages keep their capture spacing so buffered deliveries do not
/// distort hand speed; unstamped or unusable stamps fall back to arrival time.
fn sample_instant(
    clock: &mut Option<SampleClock>,
    client_ms: Option<f64>,
    arrived: Instant,
) -> Instant {
    let Some(client_ms) = client_ms.filter(|ms| ms.is_finite()) else {
        return arrived;
    };
    let clock = *clock.get_or_insert(SampleClock {
        client_ms,
        server: arrived,
    });
    clock.instant_for(client_ms).unwrap_or(arrived)
}

enum LoopControl {
    Continue,
    Disconnect,
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            incoming = socket.recv() => {
                match handle_incoming_ws(incoming, ctx) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            update = ctx.updates_rx.recv() => {
                match update {
                    Ok(bytes) => matches!(
                        forward_bytes(bytes, socket, ctx).await,
                        LoopControl::Disconnect
                    ),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if should_log(&mut ctx.last_update_lag_log) {
                            warn!(missed = n, "scene updates lagged; sending latest frame");
                        }

                        // Resync with the newest frame; skipped gesture events are not replayed.
                        let latest = ctx.frame_latest_rx.borrow().clone();
                        if latest.is_empty() {
                            false
                        } else {
                            ctx.lag_recovery_count += 1;
                            matches!(
                                forward_bytes(latest, socket, ctx).await,
                                LoopControl::Disconnect
                            )
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::UpdatesClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    fatal.map_or(Ok(()), Err)
}

fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                ctx.msgs_in += 1;
                ctx.bytes_in += text.len() as u64;

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(msg) => process_client_message(msg, ctx),
                    Err(parse_err) => {
                        ctx.invalid_json += 1;
                        if should_log(&mut ctx.last_invalid_input_log) {
                            warn!(
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if ctx.invalid_json > MAX_INVALID_JSON {
                            ctx.close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return Ok(LoopControl::Disconnect);
                        }

                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(_) => {
                ctx.close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!("websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

fn process_client_message(msg: ClientMessage, ctx: &mut ConnCtx) -> Result<LoopControl, NetError> {
    if !ctx.is_driver {
        if should_log(&mut ctx.last_invalid_input_log) {
            warn!("spectator input ignored");
        }
        return Ok(LoopControl::Continue);
    }

    let at = sample_instant(&mut ctx.sample_clock, msg.sample_time_ms(), Instant::now());
    let Some(input) = msg.into_input(at) else {
        if should_log(&mut ctx.last_invalid_input_log) {
            warn!("invalid pose values (NaN/inf or zero rotation); dropping");
        }
        return Ok(LoopControl::Continue);
    };

    match ctx.input_tx.try_send(input) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(TrySendError::Full(_input)) => {
            if should_log(&mut ctx.last_input_full_log) {
                warn!("input channel full; dropping input");
            }
            Ok(LoopControl::Continue)
        }
        Err(TrySendError::Closed(_input)) => Err(NetError::InputClosed),
    }
}

async fn forward_bytes(
    msg: Utf8Bytes,
    socket: &mut WebSocket,
    ctx: &mut ConnCtx,
) -> LoopControl {
    let bytes_len = msg.len();
    match socket.send(Message::Text(msg)).await.map_err(NetError::Ws) {
        Ok(()) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Disconnect follows immediately.
            warn!(error = ?err, "failed to send scene update");
            LoopControl::Disconnect
        }
    }
}

async fn disconnect_cleanup(state: &AppState, ctx: &ConnCtx) {
    if ctx.is_driver {
        // Reset the scene before the slot opens so a new driver starts clean.
        if ctx.input_tx.send(SceneInput::DriverLeft).await.is_err() {
            warn!("scene loop gone; driver leave not delivered");
        }
        let _ = state.driver.compare_exchange(
            ctx.conn_id,
            NO_DRIVER,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    debug!(
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_json = ctx.invalid_json,
        lag_recovery_count = ctx.lag_recovery_count,
        "connection stats"
    );
    info!(driver = ctx.is_driver, "client disconnected");
}
