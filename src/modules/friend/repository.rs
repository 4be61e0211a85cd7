use uuid::Uuid;

use crate::api::error;
use crate::modules::friend::model::{FriendRequestResponse, FriendResponse};
use crate::modules::friend::schema::{FriendEntity, FriendRequestEntity};

#[async_trait::async_trait]
pub trait FriendRepository {
    fn get_pool(&self) -> &sqlx::PgPool;

    /// Pair order does not matter; the impl normalizes it.
    async fn find_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendEntity>, error::SystemError>;

    async fn find_friends(&self, user_id: &Uuid)
    -> Result<Vec<FriendResponse>, error::SystemError>;

    async fn create_friendship<'e, E>(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
        tx: E,
    ) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send;

    async fn delete_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<bool, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRequestRepository {
    /// Matches a pending request in either direction between the pair.
    async fn find_friend_request(
        &self,
        sender_id: &Uuid,
        receiver_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn find_friend_request_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn find_friend_request_from_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError>;

    async fn find_friend_request_to_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError>;

    async fn create_friend_request(
        &self,
        sender_id: &Uuid,
        receiver_id: &Uuid,
        message: &Option<String>,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    async fn delete_friend_request<'e, E>(
        &self,
        request_id: &Uuid,
        tx: E,
    ) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send;
}

pub trait FriendRepo: FriendRepository + FriendRequestRepository + Send + Sync {}

impl<T> FriendRepo for T where T: FriendRepository + FriendRequestRepository + Send + Sync {}
