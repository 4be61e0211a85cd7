use uuid::Uuid;

use crate::{
    api::error,
    modules::chat::{
        model::RoomMemberRow,
        repository::ChatRepository,
        schema::{RoomEntity, RoomType},
    },
};

#[derive(Clone)]
pub struct ChatRepositoryPg {
    pool: sqlx::PgPool,
}

impl ChatRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ChatRepository for ChatRepositoryPg {
    fn get_pool(&self) -> &sqlx::PgPool {
        &self.pool
    }

    async fn create_room<'e, E>(
        &self,
        name: Option<&str>,
        room_type: RoomType,
        created_by: &Uuid,
        tx: E,
    ) -> Result<RoomEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send,
    {
        let room = sqlx::query_as::<_, RoomEntity>(
            r#"
            INSERT INTO chat_rooms (id, name, room_type, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(room_type)
        .bind(created_by)
        .fetch_one(tx)
        .await?;

        Ok(room)
    }

    async fn add_member<'e, E>(
        &self,
        room_id: &Uuid,
        user_id: &Uuid,
        tx: E,
    ) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send,
    {
        sqlx::query(
            "INSERT INTO chat_room_members (room_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(room_id)
        .bind(user_id)
        .execute(tx)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, room_id: &Uuid) -> Result<Option<RoomEntity>, error::SystemError> {
        let room = sqlx::query_as::<_, RoomEntity>("SELECT * FROM chat_rooms WHERE id = $1")
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(room)
    }

    async fn find_private_room_between(
        &self,
        user_a: &Uuid,
        user_b: &Uuid,
    ) -> Result<Option<RoomEntity>, error::SystemError> {
        let room = sqlx::query_as::<_, RoomEntity>(
            r#"
            SELECT r.*
            FROM chat_rooms r
            JOIN chat_room_members m1 ON m1.room_id = r.id AND m1.user_id = $1
            JOIN chat_room_members m2 ON m2.room_id = r.id AND m2.user_id = $2
            WHERE r.room_type = 'private'
            LIMIT 1
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room)
    }

    async fn find_rooms_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<RoomEntity>, error::SystemError> {
        let rooms = sqlx::query_as::<_, RoomEntity>(
            r#"
            SELECT r.*
            FROM chat_rooms r
            JOIN chat_room_members m ON m.room_id = r.id
            WHERE m.user_id = $1
            ORDER BY r.updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    async fn is_member(
        &self,
        room_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM chat_room_members WHERE room_id = $1 AND user_id = $2)",
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }

    async fn members_for_rooms(
        &self,
        room_ids: &[Uuid],
    ) -> Result<Vec<RoomMemberRow>, error::SystemError> {
        if room_ids.is_empty() {
            return Ok(Vec::new());
        }

        let members = sqlx::query_as::<_, RoomMemberRow>(
            r#"
            SELECT
                m.room_id,
                u.id,
                u.username,
                u.display_name,
                u.avatar_url,
                m.joined_at
            FROM chat_room_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.room_id = ANY($1)
            "#,
        )
        .bind(room_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }
}
