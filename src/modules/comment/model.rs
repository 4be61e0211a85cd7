use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::modules::file_upload::schema::{FileUploadResponse, MimeCategory};
use crate::modules::reaction::model::{ReactionSummary, ViewerReaction};
use crate::modules::user::model::UserInfo;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommentsQuery {
    pub post_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
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

impl CommentsQuery {
    pub fn offset(&self) -> i64 {
        self.page * self.size
    }
}

/// Text fields of the multipart create-comment request.
#[derive(Debug, Clone)]
pub struct CreateCommentFields {
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub creator_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub creator_username: String,
    pub creator_display_name: String,
    pub creator_avatar_url: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ChildCountRow {
    pub parent_id: Uuid,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct CommentAttachmentRow {
    pub comment_id: Uuid,
    pub attachment_id: Uuid,
    pub file_id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub mime_type: String,
    pub mime_category: MimeCategory,
    pub file_size: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentAttachmentResponse {
    pub id: Uuid,
    pub file: FileUploadResponse,
    pub reactions: Vec<ReactionSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub creator: UserInfo,
    pub content: Option<String>,
    pub attachment: Option<CommentAttachmentResponse>,
    pub total_children: i64,
    pub reactions: Vec<ReactionSummary>,
    pub has_reacted: bool,
    pub user_reaction_emoji: Option<String>,
    pub user_reaction_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl CommentResponse {
    pub fn assemble(
        row: CommentRow,
        attachment: Option<CommentAttachmentResponse>,
        total_children: i64,
        reactions: Vec<ReactionSummary>,
        viewer_reaction: Option<ViewerReaction>,
    ) -> Self {
        let (has_reacted, user_reaction_emoji, user_reaction_id) = match viewer_reaction {
            Some(vr) => (true, Some(vr.emoji), Some(vr.reaction_id)),
            None => (false, None, None),
        };

        CommentResponse {
            id: row.id,
            post_id: row.post_id,
            parent_id: row.parent_id,
            creator: UserInfo {
                id: row.creator_id,
                username: row.creator_username,
                display_name: row.creator_display_name,
                avatar_url: row.creator_avatar_url,
            },
            content: row.content,
            attachment,
            total_children,
            reactions,
            has_reacted,
            user_reaction_emoji,
            user_reaction_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_carries_child_count_and_reactions() {
        let row = CommentRow {
            id: Uuid::now_v7(),
            post_id: Uuid::now_v7(),
            creator_id: Uuid::now_v7(),
            parent_id: None,
            content: Some("nice".into()),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            creator_username: "bob".into(),
            creator_display_name: "Bob".into(),
            creator_avatar_url: None,
        };

        let response = CommentResponse::assemble(
            row,
            None,
            4,
            vec![ReactionSummary { emoji: "❤️".into(), count: 2 }],
            None,
        );

        assert_eq!(response.total_children, 4);
        assert_eq!(response.reactions.len(), 1);
        assert!(!response.has_reacted);
    }
}
