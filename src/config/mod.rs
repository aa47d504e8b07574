//! Configuration Management
//!
//! Layered settings loading: defaults, TOML files, environment variables.

pub mod settings;

pub use settings::{CorsSettings, DatabaseSettings, RealtimeSettings, ServerSettings, Settings};
