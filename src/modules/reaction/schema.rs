use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

/// Which entity a reaction row belongs to. One reaction table serves
/// every owner; owner delete transactions clean up their rows.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Type, Serialize, Deserialize)]
#[sqlx(type_name = "reaction_owner_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    Post,
    Comment,
    CommentAttachment,
    Message,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReactionEntity {
    pub id: Uuid,
    pub owner_kind: OwnerKind,
    pub owner_id: Uuid,
    pub creator_id: Uuid,
    pub emoji: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// emoji -> count aggregate over one owner's reactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionSummary {
    pub emoji: String,
    pub count: i64,
}
