use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "message_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Seen,
}

/// Tag for the polymorphic reply target. A reply points at either a
/// whole message or one attachment of a message, never both.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "reply_target_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReplyTargetType {
    Message,
    Attachment,
}

#[derive(Debug, Clone, FromRow)]
pub struct MessageEntity {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender_id: Uuid,
    pub content: Option<String>,
    pub status: MessageStatus,
    pub is_deleted: bool,
    pub replied_target_id: Option<Uuid>,
    pub replied_target_type: Option<ReplyTargetType>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MessageAttachmentEntity {
    pub id: Uuid,
    pub message_id: Uuid,
    pub file_id: Uuid,
}
