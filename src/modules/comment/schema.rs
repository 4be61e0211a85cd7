use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct CommentEntity {
    pub id: Uuid,
    pub post_id: Uuid,
    pub creator_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CommentAttachmentEntity {
    pub id: Uuid,
    pub comment_id: Uuid,
    pub file_id: Uuid,
}
