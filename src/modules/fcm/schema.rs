use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FcmTokenEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
