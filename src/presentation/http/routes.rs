//! Route Definitions

use axum::routing::{get, post, put};
use axum::Router;

use crate::presentation::http::handlers::{chat, health, message, user};
use crate::presentation::websocket;
use crate::startup::AppState;

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    let chat_routes = Router::new()
        .route("/", get(chat::list_chats).post(chat::create_chat))
        .route("/search", get(chat::search_chats))
        .route("/{chat_id}/members", post(chat::add_member))
        .route(
            "/{chat_id}/messages",
            get(message::list_messages).post(message::send_message),
        );

    let user_routes = Router::new()
        .route("/search", get(user::search_users))
        .route("/status", put(user::update_status))
        .route("/{user_id}", get(user::get_user));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ws", get(websocket::ws_handler))
        .nest("/api/chats", chat_routes)
        .nest("/api/users", user_routes)
        .route("/api/messages/{message_id}/reactions", post(message::react))
        .with_state(state)
}
