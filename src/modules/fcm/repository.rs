use uuid::Uuid;

use crate::{api::error, modules::fcm::schema::FcmTokenEntity};

#[async_trait::async_trait]
pub trait FcmTokenRepository {
    /// Re-registering a known token reassigns it to the new user.
    async fn upsert_token(
        &self,
        user_id: &Uuid,
        token: &str,
    ) -> Result<FcmTokenEntity, error::SystemError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<FcmTokenEntity>, error::SystemError>;

    async fn find_tokens_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FcmTokenEntity>, error::SystemError>;

    async fn delete(&self, id: &Uuid) -> Result<(), error::SystemError>;
}
