use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::fcm::schema::FcmTokenEntity;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterTokenModel {
    #[validate(length(min = 1, max = 4096, message = "Token must not be empty"))]
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmTokenResponse {
    pub id: Uuid,
    pub token: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<FcmTokenEntity> for FcmTokenResponse {
    fn from(entity: FcmTokenEntity) -> Self {
        FcmTokenResponse { id: entity.id, token: entity.token, created_at: entity.created_at }
    }
}

/// Wire payload for the legacy FCM send endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct FcmPayload {
    pub to: String,
    pub notification: FcmNotification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,
}
