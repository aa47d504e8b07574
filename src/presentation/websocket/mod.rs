//! WebSocket Presentation Layer

pub mod handler;
pub mod messages;

pub use handler::ws_handler;
