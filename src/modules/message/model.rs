use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::modules::file_upload::schema::{FileUploadResponse, MimeCategory};
use crate::modules::message::schema::{MessageStatus, ReplyTargetType};
use crate::modules::reaction::model::{ReactionSummary, ViewerReaction};
use crate::modules::user::model::UserInfo;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MessageSearchQuery {
    pub room_id: Option<Uuid>,
    pub sender_id: Option<Uuid>,
    pub status: Option<MessageStatus>,
    pub is_deleted: Option<bool>,
    pub keyword: Option<String>,
    pub has_files: Option<bool>,
    pub date_from: Option<chrono::DateTime<chrono::Utc>>,
    pub date_to: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub page: i64,
    #[serde(default = "default_size")]
    #[validate(range(min = 1, max = 100))]
    pub size: i64,
    pub sort: Option<String>,
}

fn default_size() -> i64 {
    10
}

impl MessageSearchQuery {
    pub fn offset(&self) -> i64 {
        self.page * self.size
    }
}

/// Text fields of the multipart create-message request.
#[derive(Debug, Clone)]
pub struct CreateMessageFields {
    pub room_id: Uuid,
    pub content: Option<String>,
    pub replied_target_id: Option<Uuid>,
    pub replied_target_type: Option<ReplyTargetType>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
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
    pub sender_username: String,
    pub sender_display_name: String,
    pub sender_avatar_url: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MessageAttachmentRow {
    pub message_id: Uuid,
    pub attachment_id: Uuid,
    pub file_id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub mime_type: String,
    pub mime_category: MimeCategory,
    pub file_size: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Short preview of the message a reply points at.
#[derive(Debug, Clone, Serialize)]
pub struct RepliedMessagePreview {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub content: Option<String>,
    pub is_deleted: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Resolved reply target, tagged so clients switch on `type` instead
/// of probing fields.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepliedTarget {
    Message { message: RepliedMessagePreview },
    Attachment { id: Uuid, file: FileUploadResponse },
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender: UserInfo,
    pub content: Option<String>,
    pub status: MessageStatus,
    pub is_deleted: bool,
    pub replied_target: Option<RepliedTarget>,
    pub attachments: Vec<FileUploadResponse>,
    pub reactions: Vec<ReactionSummary>,
    pub has_reacted: bool,
    pub user_reaction_emoji: Option<String>,
    pub user_reaction_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl MessageResponse {
    pub fn assemble(
        row: MessageRow,
        replied_target: Option<RepliedTarget>,
        attachments: Vec<FileUploadResponse>,
        reactions: Vec<ReactionSummary>,
        viewer_reaction: Option<ViewerReaction>,
    ) -> Self {
        let (has_reacted, user_reaction_emoji, user_reaction_id) = match viewer_reaction {
            Some(vr) => (true, Some(vr.emoji), Some(vr.reaction_id)),
            None => (false, None, None),
        };

        MessageResponse {
            id: row.id,
            room_id: row.room_id,
            sender: UserInfo {
                id: row.sender_id,
                username: row.sender_username,
                display_name: row.sender_display_name,
                avatar_url: row.sender_avatar_url,
            },
            content: row.content,
            status: row.status,
            is_deleted: row.is_deleted,
            replied_target,
            attachments,
            reactions,
            has_reacted,
            user_reaction_emoji,
            user_reaction_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Distinct reply-target ids of a page, split by target type. Each
/// partition resolves with one batched query, so a page never costs
/// more than two extra lookups.
pub fn reply_partitions(rows: &[MessageRow]) -> (Vec<Uuid>, Vec<Uuid>) {
    let mut message_ids = Vec::new();
    let mut attachment_ids = Vec::new();

    for row in rows {
        let (Some(target_id), Some(target_type)) =
            (row.replied_target_id, row.replied_target_type)
        else {
            continue;
        };

        let bucket = match target_type {
            ReplyTargetType::Message => &mut message_ids,
            ReplyTargetType::Attachment => &mut attachment_ids,
        };
        if !bucket.contains(&target_id) {
            bucket.push(target_id);
        }
    }

    (message_ids, attachment_ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        replied_target_id: Option<Uuid>,
        replied_target_type: Option<ReplyTargetType>,
    ) -> MessageRow {
        MessageRow {
            id: Uuid::now_v7(),
            room_id: Uuid::now_v7(),
            sender_id: Uuid::now_v7(),
            content: Some("hi".into()),
            status: MessageStatus::Sent,
            is_deleted: false,
            replied_target_id,
            replied_target_type,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            sender_username: "alice".into(),
            sender_display_name: "Alice".into(),
            sender_avatar_url: None,
        }
    }

    #[test]
    fn partitions_split_by_target_type() {
        let m = Uuid::now_v7();
        let a = Uuid::now_v7();
        let rows = vec![
            row(Some(m), Some(ReplyTargetType::Message)),
            row(Some(a), Some(ReplyTargetType::Attachment)),
            row(None, None),
        ];

        let (message_ids, attachment_ids) = reply_partitions(&rows);
        assert_eq!(message_ids, vec![m]);
        assert_eq!(attachment_ids, vec![a]);
    }

    #[test]
    fn partitions_deduplicate_repeated_targets() {
        let m = Uuid::now_v7();
        let rows = vec![
            row(Some(m), Some(ReplyTargetType::Message)),
            row(Some(m), Some(ReplyTargetType::Message)),
            row(Some(m), Some(ReplyTargetType::Message)),
        ];

        let (message_ids, attachment_ids) = reply_partitions(&rows);
        assert_eq!(message_ids, vec![m]);
        assert!(attachment_ids.is_empty());
    }

    #[test]
    fn messages_without_replies_produce_empty_partitions() {
        let rows = vec![row(None, None), row(None, None)];
        let (message_ids, attachment_ids) = reply_partitions(&rows);
        assert!(message_ids.is_empty());
        assert!(attachment_ids.is_empty());
    }

    #[test]
    fn replied_target_serializes_with_type_tag() {
        let preview = RepliedMessagePreview {
            id: Uuid::now_v7(),
            sender_id: Uuid::now_v7(),
            content: Some("original".into()),
            is_deleted: false,
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(RepliedTarget::Message { message: preview }).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["message"]["content"], "original");
    }
}
