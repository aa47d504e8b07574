//! Infrastructure Layer
//!
//! Database pool and the PostgreSQL store implementation.

pub mod database;
pub mod repositories;

pub use repositories::PgChatStore;
