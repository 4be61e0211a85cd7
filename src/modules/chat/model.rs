use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::modules::chat::schema::{RoomEntity, RoomType};
use crate::modules::user::model::UserInfo;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomModel {
    #[validate(length(min = 1, max = 100, message = "Room name must be 1 to 100 characters"))]
    pub name: Option<String>,
    pub room_type: RoomType,
    #[validate(length(min = 1, message = "At least one member is required"))]
    pub member_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RoomMemberRow {
    pub room_id: Uuid,
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomMember {
    #[serde(flatten)]
    pub user: UserInfo,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

impl From<RoomMemberRow> for RoomMember {
    fn from(row: RoomMemberRow) -> Self {
        RoomMember {
            user: UserInfo {
                id: row.id,
                username: row.username,
                display_name: row.display_name,
                avatar_url: row.avatar_url,
            },
            joined_at: row.joined_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomResponse {
    pub id: Uuid,
    pub name: Option<String>,
    pub room_type: RoomType,
    pub created_by: Uuid,
    pub members: Vec<RoomMember>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl RoomResponse {
    pub fn from_entity(room: RoomEntity, members: Vec<RoomMember>) -> Self {
        RoomResponse {
            id: room.id,
            name: room.name,
            room_type: room.room_type,
            created_by: room.created_by,
            members,
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}
