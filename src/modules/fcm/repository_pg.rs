use uuid::Uuid;

use crate::{
    api::error,
    modules::fcm::{repository::FcmTokenRepository, schema::FcmTokenEntity},
};

#[derive(Clone)]
pub struct FcmTokenRepositoryPg {
    pool: sqlx::PgPool,
}

impl FcmTokenRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FcmTokenRepository for FcmTokenRepositoryPg {
    async fn upsert_token(
        &self,
        user_id: &Uuid,
        token: &str,
    ) -> Result<FcmTokenEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, FcmTokenEntity>(
            r#"
            INSERT INTO user_fcm_tokens (id, user_id, token)
            VALUES ($1, $2, $3)
            ON CONFLICT (token) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(token)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<FcmTokenEntity>, error::SystemError> {
        let entity =
            sqlx::query_as::<_, FcmTokenEntity>("SELECT * FROM user_fcm_tokens WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(entity)
    }

    async fn find_tokens_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FcmTokenEntity>, error::SystemError> {
        let tokens = sqlx::query_as::<_, FcmTokenEntity>(
            "SELECT * FROM user_fcm_tokens WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), error::SystemError> {
        sqlx::query("DELETE FROM user_fcm_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
