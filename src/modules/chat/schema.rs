use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "room_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Private,
    Group,
}

#[derive(Debug, Clone, FromRow)]
pub struct RoomEntity {
    pub id: Uuid,
    pub name: Option<String>,
    pub room_type: RoomType,
    pub created_by: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
