//! Shared Utilities
//!
//! Common error types used across all layers.

pub mod error;

pub use error::AppError;
