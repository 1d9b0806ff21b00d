// Interface adapters: wire protocol, WebSocket and HTTP handling.

pub mod http;
pub mod net;
pub mod protocol;
pub mod state;
pub mod utils;
