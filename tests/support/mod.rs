// Boots the scene server once per test binary on an ephemeral port.
#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Host and port of the running server, published once it has bound.
static SERVER_ADDR: OnceLock<String> = OnceLock::new();
static SERVER_READY: OnceLock<()> = OnceLock::new();

/// Starts the server if needed and returns its `host:port`.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published = Arc::new(OnceLock::<String>::new());
        let published_thread = Arc::clone(&published);

        // A dedicated thread and runtime so the server outlives each `#[tokio::test]` runtime.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_thread.set(addr.to_string());
                xr_hands::run(listener).await.expect("server failed");
            });
        });

        wait_until_accepting(published);
    });

    SERVER_ADDR
        .get()
        .expect("server address should be initialized")
        .as_str()
}

fn wait_until_accepting(published: Arc<OnceLock<String>>) {
    let addr = loop {
        if let Some(addr) = published.get() {
            break addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };
    let _ = SERVER_ADDR.set(addr.clone());

    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("server did not become ready in time");
}

pub async fn connect() -> Client {
    let url = format!("ws://{}/ws", ensure_server());
    let (socket, _response) = connect_async(url).await.expect("websocket connect");
    socket
}

pub async fn send_json(client: &mut Client, value: Value) {
    client
        .send(Message::Text(value.to_string().into()))
        .await
        .expect("websocket send");
}

/// Reads messages until one of the given `type` arrives, skipping the rest.
pub async fn next_of_type(client: &mut Client, kind: &str) -> Value {
    tokio::time::timeout(Duration::from_secs(3), async {
        loop {
            let msg = client
                .next()
                .await
                .expect("stream ended")
                .expect("websocket recv");
            if !msg.is_text() {
                continue;
            }
            let text = msg.into_text().expect("text frame");
            let value: Value = serde_json::from_str(text.as_str()).expect("server sent json");
            if value["type"] == kind {
                return value;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("no {kind} message within timeout"))
}

/// A hand frame in the rock-horns pose: index and pinky out, middle and ring curled.
pub fn rock_horns_frame(hand: &str) -> Value {
    json!({
        "type": "HandFrame",
        "data": {
            "hand": hand,
            "joints": {
                "wrist": [0.0, 0.0, 0.0],
                "index-finger-metacarpal": [0.0, 1.0, 0.0],
                "index-finger-tip": [0.9, 1.0, 0.0],
                "middle-finger-metacarpal": [0.0, 0.0, 1.0],
                "middle-finger-tip": [0.2, 0.0, 1.0],
                "ring-finger-metacarpal": [0.0, -1.0, 0.0],
                "ring-finger-tip": [0.2, -1.0, 0.0],
                "pinky-finger-metacarpal": [0.0, 0.0, -1.0],
                "pinky-finger-tip": [0.9, 0.0, -1.0]
            }
        }
    })
}
