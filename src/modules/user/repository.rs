use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UpdateUser},
        schema::{UserEntity, VerificationTokenEntity},
    },
};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError>;
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, error::SystemError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError>;
    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError>;
    async fn update(&self, id: &Uuid, user: &UpdateUser) -> Result<UserEntity, error::SystemError>;
    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;

    /// Search users by username or display name (case-insensitive, partial match)
    async fn search_users(
        &self,
        query: &str,
        limit: i32,
    ) -> Result<Vec<UserEntity>, error::SystemError>;

    async fn create_verification_token(
        &self,
        user_id: &Uuid,
        ttl_secs: i64,
    ) -> Result<VerificationTokenEntity, error::SystemError>;

    /// Consumes the token and marks the user verified. Returns false
    /// when the token is unknown or expired.
    async fn consume_verification_token(&self, token: &Uuid)
    -> Result<bool, error::SystemError>;
}
