use uuid::Uuid;

use crate::{
    api::error,
    modules::chat::{
        model::RoomMemberRow,
        schema::{RoomEntity, RoomType},
    },
};

#[async_trait::async_trait]
pub trait ChatRepository {
    fn get_pool(&self) -> &sqlx::PgPool;

    async fn create_room<'e, E>(
        &self,
        name: Option<&str>,
        room_type: RoomType,
        created_by: &Uuid,
        tx: E,
    ) -> Result<RoomEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send;

    async fn add_member<'e, E>(
        &self,
        room_id: &Uuid,
        user_id: &Uuid,
        tx: E,
    ) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send;

    async fn find_by_id(&self, room_id: &Uuid) -> Result<Option<RoomEntity>, error::SystemError>;

    /// A private room whose member set is exactly the given pair.
    async fn find_private_room_between(
        &self,
        user_a: &Uuid,
        user_b: &Uuid,
    ) -> Result<Option<RoomEntity>, error::SystemError>;

    async fn find_rooms_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<RoomEntity>, error::SystemError>;

    async fn is_member(&self, room_id: &Uuid, user_id: &Uuid)
    -> Result<bool, error::SystemError>;

    async fn members_for_rooms(
        &self,
        room_ids: &[Uuid],
    ) -> Result<Vec<RoomMemberRow>, error::SystemError>;
}
