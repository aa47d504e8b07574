//! PostgreSQL Store Implementation
//!
//! Implements `ChatStore` over the `chats`, `chat_members`, `messages`,
//! and `users` tables. Message content and reactions are JSONB columns,
//! membership is a join table aggregated into arrays at query time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    Chat, ChatId, ChatKind, ChatStore, Message, MessageContent, MessageId, MessageKind,
    PresenceStatus, Reaction, User, UserId,
};
use crate::shared::error::AppError;

/// PostgreSQL implementation of the durable chat store.
pub struct PgChatStore {
    pool: PgPool,
}

impl PgChatStore {
    /// Creates a new PgChatStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CHAT_SELECT: &str = r#"
    SELECT c.id, c.kind, c.name, c.is_group, c.group_avatar,
           c.last_message_id, c.created_at, c.updated_at,
           COALESCE(array_agg(m.user_id)
               FILTER (WHERE m.user_id IS NOT NULL), '{}'::uuid[]) AS members,
           COALESCE(array_agg(m.user_id)
               FILTER (WHERE m.is_admin), '{}'::uuid[]) AS admins
    FROM chats c
    LEFT JOIN chat_members m ON m.chat_id = c.id
"#;

/// Internal row type for chat queries.
#[derive(Debug, sqlx::FromRow)]
struct ChatRow {
    id: Uuid,
    kind: String,
    name: Option<String>,
    is_group: bool,
    group_avatar: Option<String>,
    last_message_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    members: Vec<Uuid>,
    admins: Vec<Uuid>,
}

impl ChatRow {
    fn into_chat(self) -> Chat {
        Chat {
            id: ChatId(self.id),
            kind: ChatKind::from_str(&self.kind),
            name: self.name,
            members: self.members.into_iter().map(UserId).collect(),
            admins: self.admins.into_iter().map(UserId).collect(),
            is_group: self.is_group,
            group_avatar: self.group_avatar,
            last_message_id: self.last_message_id.map(MessageId),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    chat_id: Uuid,
    sender_id: Uuid,
    content: Json<MessageContent>,
    kind: String,
    reactions: Json<Vec<Reaction>>,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> Message {
        Message {
            id: MessageId(self.id),
            chat_id: ChatId(self.chat_id),
            sender_id: UserId(self.sender_id),
            content: self.content.0,
            kind: MessageKind::from_str(&self.kind),
            reactions: self.reactions.0,
            created_at: self.created_at,
        }
    }
}

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    avatar: Option<String>,
    status: String,
    last_seen: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: UserId(self.id),
            username: self.username,
            avatar: self.avatar,
            status: PresenceStatus::from_str(&self.status),
            last_seen: self.last_seen,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn find_chats_for_user(&self, user: UserId) -> Result<Vec<Chat>, AppError> {
        let query = format!(
            "{CHAT_SELECT}
             WHERE c.id IN (SELECT chat_id FROM chat_members WHERE user_id = $1)
             GROUP BY c.id
             ORDER BY c.updated_at DESC"
        );
        let rows = sqlx::query_as::<_, ChatRow>(&query)
            .bind(user.0)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ChatRow::into_chat).collect())
    }

    async fn search_public_chats(&self, query: &str, limit: i64) -> Result<Vec<Chat>, AppError> {
        let sql = format!(
            "{CHAT_SELECT}
             WHERE c.kind = 'public' AND c.name ILIKE $1
             GROUP BY c.id
             ORDER BY c.updated_at DESC
             LIMIT $2"
        );
        let rows = sqlx::query_as::<_, ChatRow>(&sql)
            .bind(format!("%{query}%"))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ChatRow::into_chat).collect())
    }

    async fn create_chat(
        &self,
        kind: ChatKind,
        name: Option<String>,
        creator: UserId,
        members: Vec<UserId>,
    ) -> Result<Chat, AppError> {
        let id = ChatId::new();
        let is_group = !members.is_empty() || kind != ChatKind::Private;

        let mut member_set: Vec<UserId> = vec![creator];
        for member in members {
            if !member_set.contains(&member) {
                member_set.push(member);
            }
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO chats (id, kind, name, is_group, created_at, updated_at)
             VALUES ($1, $2, $3, $4, NOW(), NOW())",
        )
        .bind(id.0)
        .bind(kind.as_str())
        .bind(&name)
        .bind(is_group)
        .execute(&mut *tx)
        .await?;

        for member in &member_set {
            sqlx::query(
                "INSERT INTO chat_members (chat_id, user_id, is_admin)
                 VALUES ($1, $2, $3)
                 ON CONFLICT DO NOTHING",
            )
            .bind(id.0)
            .bind(member.0)
            .bind(*member == creator)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.find_chat(id)
            .await?
            .ok_or_else(|| AppError::Internal("chat missing immediately after insert".into()))
    }

    async fn find_chat(&self, chat: ChatId) -> Result<Option<Chat>, AppError> {
        let query = format!("{CHAT_SELECT} WHERE c.id = $1 GROUP BY c.id");
        let row = sqlx::query_as::<_, ChatRow>(&query)
            .bind(chat.0)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ChatRow::into_chat))
    }

    async fn add_member(&self, chat: ChatId, user: UserId) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO chat_members (chat_id, user_id, is_admin)
             VALUES ($1, $2, FALSE)
             ON CONFLICT DO NOTHING",
        )
        .bind(chat.0)
        .bind(user.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn chat_member_ids(&self, chat: ChatId) -> Result<Vec<UserId>, AppError> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM chat_members WHERE chat_id = $1")
                .bind(chat.0)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().map(UserId).collect())
    }

    async fn list_messages(
        &self,
        chat: ChatId,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, chat_id, sender_id, content, kind, reactions, created_at
             FROM messages
             WHERE chat_id = $1
             ORDER BY created_at DESC, id DESC
             OFFSET $2 LIMIT $3",
        )
        .bind(chat.0)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        // Newest page, oldest first within it
        let mut messages: Vec<Message> = rows.into_iter().map(MessageRow::into_message).collect();
        messages.reverse();
        Ok(messages)
    }

    async fn insert_message(
        &self,
        chat: ChatId,
        sender: UserId,
        content: MessageContent,
        kind: MessageKind,
    ) -> Result<Message, AppError> {
        let message = Message {
            id: MessageId::new(),
            chat_id: chat,
            sender_id: sender,
            content,
            kind,
            reactions: Vec::new(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO messages (id, chat_id, sender_id, content, kind, reactions, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(message.id.0)
        .bind(message.chat_id.0)
        .bind(message.sender_id.0)
        .bind(Json(&message.content))
        .bind(message.kind.as_str())
        .bind(Json(&message.reactions))
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(message)
    }

    async fn update_chat_last_message(
        &self,
        chat: ChatId,
        message: MessageId,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE chats SET last_message_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(chat.0)
            .bind(message.0)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_message(&self, message: MessageId) -> Result<Option<Message>, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            "SELECT id, chat_id, sender_id, content, kind, reactions, created_at
             FROM messages WHERE id = $1",
        )
        .bind(message.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MessageRow::into_message))
    }

    async fn set_reaction(
        &self,
        message: MessageId,
        user: UserId,
        emoji: String,
    ) -> Result<Message, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, MessageRow>(
            "SELECT id, chat_id, sender_id, content, kind, reactions, created_at
             FROM messages WHERE id = $1
             FOR UPDATE",
        )
        .bind(message.0)
        .fetch_optional(&mut *tx)
        .await?;

        let mut stored = row
            .map(MessageRow::into_message)
            .ok_or_else(|| AppError::NotFound("Message not found".into()))?;

        // One reaction per user: replace any previous one
        stored.reactions.retain(|r| r.user_id != user);
        stored.reactions.push(Reaction {
            user_id: user,
            emoji,
            created_at: Utc::now(),
        });

        sqlx::query("UPDATE messages SET reactions = $2 WHERE id = $1")
            .bind(message.0)
            .bind(Json(&stored.reactions))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(stored)
    }

    async fn find_user(&self, user: UserId) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, avatar, status, last_seen, created_at
             FROM users WHERE id = $1",
        )
        .bind(user.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, avatar, status, last_seen, created_at
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn search_users(
        &self,
        query: &str,
        exclude: UserId,
        limit: i64,
    ) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, avatar, status, last_seen, created_at
             FROM users
             WHERE username ILIKE $1 AND id <> $2
             ORDER BY username
             LIMIT $3",
        )
        .bind(format!("%{query}%"))
        .bind(exclude.0)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn update_user_status(
        &self,
        user: UserId,
        status: PresenceStatus,
    ) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET status = $2, last_seen = NOW()
             WHERE id = $1
             RETURNING id, username, avatar, status, last_seen, created_at",
        )
        .bind(user.0)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user)
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}
