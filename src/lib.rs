//! Sinfgram Server
//!
//! A real-time messaging backend: REST API for chats, messages, and users,
//! plus a WebSocket channel for presence, typing indicators, and message
//! fan-out.

/// Configuration loading
pub mod config;

/// Core entities, identifiers, and the store trait
pub mod domain;

/// Business services and DTOs
pub mod application;

/// Database pool and store implementation
pub mod infrastructure;

/// HTTP routes, middleware, and the websocket transport
pub mod presentation;

/// Presence, rooms, typing, and fan-out engine
pub mod realtime;

/// Shared error types
pub mod shared;

/// Application assembly and server lifecycle
pub mod startup;

/// Logging and tracing setup
pub mod telemetry;
