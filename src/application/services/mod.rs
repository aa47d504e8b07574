//! Application Services
//!
//! Business logic orchestrating the store and the realtime engine.

pub mod chat_service;
pub mod message_service;
pub mod user_service;

pub use chat_service::ChatService;
pub use message_service::MessageService;
pub use user_service::UserService;
