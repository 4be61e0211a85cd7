use uuid::Uuid;

use crate::{
    api::error,
    modules::reaction::{
        model::{ReactionSummaryRow, ViewerReactionRow},
        repository::ReactionRepository,
        schema::{OwnerKind, ReactionEntity},
    },
};

#[derive(Clone)]
pub struct ReactionRepositoryPg {
    pool: sqlx::PgPool,
}

impl ReactionRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ReactionRepository for ReactionRepositoryPg {
    fn get_pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    async fn create(
        &self,
        owner_kind: OwnerKind,
        owner_id: &Uuid,
        creator_id: &Uuid,
        emoji: &str,
    ) -> Result<ReactionEntity, error::SystemError> {
        let reaction = sqlx::query_as::<_, ReactionEntity>(
            r#"
            INSERT INTO reactions (id, owner_kind, owner_id, creator_id, emoji)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(owner_kind)
        .bind(owner_id)
        .bind(creator_id)
        .bind(emoji)
        .fetch_one(&self.pool)
        .await?;

        Ok(reaction)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ReactionEntity>, error::SystemError> {
        let reaction =
            sqlx::query_as::<_, ReactionEntity>("SELECT * FROM reactions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(reaction)
    }

    async fn exists_by_owner_and_creator(
        &self,
        owner_kind: OwnerKind,
        owner_id: &Uuid,
        creator_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM reactions
                WHERE owner_kind = $1 AND owner_id = $2 AND creator_id = $3
            )
            "#,
        )
        .bind(owner_kind)
        .bind(owner_id)
        .bind(creator_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }

    async fn update_emoji(
        &self,
        id: &Uuid,
        emoji: &str,
    ) -> Result<ReactionEntity, error::SystemError> {
        let reaction = sqlx::query_as::<_, ReactionEntity>(
            "UPDATE reactions SET emoji = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(emoji)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Reaction not found"))?;

        Ok(reaction)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM reactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }

    async fn summaries_for_owners(
        &self,
        owner_kind: OwnerKind,
        owner_ids: &[Uuid],
    ) -> Result<Vec<ReactionSummaryRow>, error::SystemError> {
        if owner_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ReactionSummaryRow>(
            r#"
            SELECT owner_id, emoji, COUNT(*) AS count
            FROM reactions
            WHERE owner_kind = $1 AND owner_id = ANY($2)
            GROUP BY owner_id, emoji
            "#,
        )
        .bind(owner_kind)
        .bind(owner_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn viewer_reactions_for_owners(
        &self,
        owner_kind: OwnerKind,
        owner_ids: &[Uuid],
        viewer_id: &Uuid,
    ) -> Result<Vec<ViewerReactionRow>, error::SystemError> {
        if owner_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ViewerReactionRow>(
            r#"
            SELECT owner_id, id, emoji
            FROM reactions
            WHERE owner_kind = $1 AND owner_id = ANY($2) AND creator_id = $3
            "#,
        )
        .bind(owner_kind)
        .bind(owner_ids)
        .bind(viewer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete_for_owner<'e, E>(
        &self,
        owner_kind: OwnerKind,
        owner_id: &Uuid,
        tx: E,
    ) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query("DELETE FROM reactions WHERE owner_kind = $1 AND owner_id = $2")
            .bind(owner_kind)
            .bind(owner_id)
            .execute(tx)
            .await?;

        Ok(())
    }
}
