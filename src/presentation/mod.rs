//! Presentation Layer
//!
//! HTTP routes and handlers, middleware, and the websocket transport.

pub mod http;
pub mod middleware;
pub mod websocket;
