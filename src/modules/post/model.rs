use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::modules::file_upload::schema::FileUploadResponse;
use crate::modules::reaction::model::{ReactionSummary, ViewerReaction};
use crate::modules::user::model::UserInfo;

/// Text fields of the multipart create-post request.
#[derive(Debug, Clone)]
pub struct CreatePostFields {
    pub content: String,
    pub shared_post_id: Option<Uuid>,
}

/// One feed row as the ranking query returns it. The counts feed the
/// ordering and are reused in the response.
#[derive(Debug, Clone, FromRow)]
pub struct RankedPostRow {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub content: String,
    pub shared_post_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub creator_username: String,
    pub creator_display_name: String,
    pub creator_avatar_url: Option<String>,
    pub rank_tier: i32,
    pub reaction_count: i64,
    pub comment_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct PostAttachmentRow {
    pub post_id: Uuid,
    pub id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub mime_type: String,
    pub mime_category: crate::modules::file_upload::schema::MimeCategory,
    pub file_size: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub creator: UserInfo,
    pub content: String,
    pub shared_post_id: Option<Uuid>,
    pub attachments: Vec<FileUploadResponse>,
    pub reaction_count: i64,
    pub comment_count: i64,
    pub reactions: Vec<ReactionSummary>,
    pub has_reacted: bool,
    pub user_reaction_emoji: Option<String>,
    pub user_reaction_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl PostResponse {
    pub fn assemble(
        row: RankedPostRow,
        attachments: Vec<FileUploadResponse>,
        reactions: Vec<ReactionSummary>,
        viewer_reaction: Option<ViewerReaction>,
    ) -> Self {
        let (has_reacted, user_reaction_emoji, user_reaction_id) = match viewer_reaction {
            Some(vr) => (true, Some(vr.emoji), Some(vr.reaction_id)),
            None => (false, None, None),
        };

        PostResponse {
            id: row.id,
            creator: UserInfo {
                id: row.creator_id,
                username: row.creator_username,
                display_name: row.creator_display_name,
                avatar_url: row.creator_avatar_url,
            },
            content: row.content,
            shared_post_id: row.shared_post_id,
            attachments,
            reaction_count: row.reaction_count,
            comment_count: row.comment_count,
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

    fn row() -> RankedPostRow {
        RankedPostRow {
            id: Uuid::now_v7(),
            creator_id: Uuid::now_v7(),
            content: "hello".into(),
            shared_post_id: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            creator_username: "alice".into(),
            creator_display_name: "Alice".into(),
            creator_avatar_url: None,
            rank_tier: 2,
            reaction_count: 3,
            comment_count: 1,
        }
    }

    #[test]
    fn viewer_reaction_fills_all_three_fields() {
        let reaction_id = Uuid::now_v7();
        let response = PostResponse::assemble(
            row(),
            vec![],
            vec![],
            Some(ViewerReaction { reaction_id, emoji: "👍".into() }),
        );
        assert!(response.has_reacted);
        assert_eq!(response.user_reaction_emoji.as_deref(), Some("👍"));
        assert_eq!(response.user_reaction_id, Some(reaction_id));
    }

    #[test]
    fn missing_viewer_reaction_leaves_fields_empty() {
        let response = PostResponse::assemble(row(), vec![], vec![], None);
        assert!(!response.has_reacted);
        assert!(response.user_reaction_emoji.is_none());
        assert!(response.user_reaction_id.is_none());
    }
}
