//! WebSocket Frame Types
//!
//! Wire format: `{"event": "<kebab-case name>", "data": ...}` in both
//! directions, with camelCase field names inside the payload.

use serde::{Deserialize, Serialize};

use crate::domain::{ChatId, Message, PresenceStatus, UserId};
use crate::realtime::OutboundEvent;

/// Frames a client may send.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientFrame {
    JoinChat(ChatId),
    LeaveChat(ChatId),
    #[serde(rename_all = "camelCase")]
    SendMessage { chat_id: ChatId, message: Message },
    #[serde(rename_all = "camelCase")]
    Typing { chat_id: ChatId, user_id: UserId },
    #[serde(rename_all = "camelCase")]
    StopTyping { chat_id: ChatId, user_id: UserId },
    UserOnline(UserId),
    UserOffline(UserId),
}

/// Frames the server pushes.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerFrame {
    ReceiveMessage(Message),
    #[serde(rename_all = "camelCase")]
    UserTyping { chat_id: ChatId, user_id: UserId },
    #[serde(rename_all = "camelCase")]
    UserStopTyping { chat_id: ChatId, user_id: UserId },
    #[serde(rename_all = "camelCase")]
    UserStatusChange {
        user_id: UserId,
        status: PresenceStatus,
    },
}

impl From<OutboundEvent> for ServerFrame {
    fn from(event: OutboundEvent) -> Self {
        match event {
            OutboundEvent::NewMessage { message, .. } => Self::ReceiveMessage(message),
            OutboundEvent::TypingStart { chat_id, user_id } => {
                Self::UserTyping { chat_id, user_id }
            }
            OutboundEvent::TypingStop { chat_id, user_id } => {
                Self::UserStopTyping { chat_id, user_id }
            }
            OutboundEvent::PresenceChanged { user_id, status } => {
                Self::UserStatusChange { user_id, status }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn join_chat_frame_deserializes() {
        let chat = ChatId::new();
        let raw = json!({ "event": "join-chat", "data": chat }).to_string();

        let frame: ClientFrame = serde_json::from_str(&raw).unwrap();
        assert_eq!(frame, ClientFrame::JoinChat(chat));
    }

    #[test]
    fn typing_frame_deserializes_with_camel_case_fields() {
        let chat = ChatId::new();
        let user = UserId::new();
        let raw = json!({
            "event": "typing",
            "data": { "chatId": chat, "userId": user }
        })
        .to_string();

        let frame: ClientFrame = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            frame,
            ClientFrame::Typing {
                chat_id: chat,
                user_id: user,
            }
        );
    }

    #[test]
    fn malformed_frame_is_an_error() {
        assert!(serde_json::from_str::<ClientFrame>(r#"{"event":"dance"}"#).is_err());
    }

    #[test]
    fn status_change_frame_serializes() {
        let user = UserId::new();
        let frame = ServerFrame::UserStatusChange {
            user_id: user,
            status: PresenceStatus::Online,
        };

        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "user-status-change",
                "data": { "userId": user, "status": "online" }
            })
        );
    }
}
