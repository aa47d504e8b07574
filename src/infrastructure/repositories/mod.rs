//! Store Implementations
//!
//! PostgreSQL-backed implementation of the domain `ChatStore` trait.

pub mod pg_chat_store;

pub use pg_chat_store::PgChatStore;
