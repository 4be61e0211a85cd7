use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UpdateUser},
        repository::UserRepository,
        schema::{UserEntity, VerificationTokenEntity},
    },
};

#[derive(Clone)]
pub struct UserRepositoryPg {
    pool: sqlx::PgPool,
}

impl UserRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            "SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            "SELECT * FROM users WHERE lower(username) = lower($1) AND deleted_at IS NULL",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            "SELECT * FROM users WHERE lower(email) = lower($1) AND deleted_at IS NULL",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError> {
        let id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO users (id, username, email, hash_password, display_name) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.hash_password)
        .bind(&user.display_name)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update(&self, id: &Uuid, user: &UpdateUser) -> Result<UserEntity, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
        UPDATE users
        SET
            username     = COALESCE($2, username),
            email        = COALESCE($3, email),
            display_name = COALESCE($4, display_name),
            avatar_url   = CASE WHEN $5::boolean THEN $6 ELSE avatar_url END,
            bio          = CASE WHEN $7::boolean THEN $8 ELSE bio END,
            phone        = CASE WHEN $9::boolean THEN $10 ELSE phone END,
            updated_at   = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING *
        "#,
        )
        .bind(id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.avatar_url.is_some())
        .bind(user.avatar_url.as_ref().and_then(|v| v.as_ref()))
        .bind(user.bio.is_some())
        .bind(user.bio.as_ref().and_then(|v| v.as_ref()))
        .bind(user.phone.is_some())
        .bind(user.phone.as_ref().and_then(|v| v.as_ref()))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(user)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let rows =
            sqlx::query("UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(rows > 0)
    }

    async fn search_users(
        &self,
        query: &str,
        limit: i32,
    ) -> Result<Vec<UserEntity>, error::SystemError> {
        let search_pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));
        let users = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT * FROM users
            WHERE deleted_at IS NULL
            AND (
                lower(username) LIKE lower($1)
                OR lower(display_name) LIKE lower($1)
            )
            ORDER BY display_name
            LIMIT $2
            "#,
        )
        .bind(&search_pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn create_verification_token(
        &self,
        user_id: &Uuid,
        ttl_secs: i64,
    ) -> Result<VerificationTokenEntity, error::SystemError> {
        let token = sqlx::query_as::<_, VerificationTokenEntity>(
            r#"
            INSERT INTO email_verification_tokens (token, user_id, expires_at)
            VALUES ($1, $2, NOW() + make_interval(secs => $3))
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(ttl_secs as f64)
        .fetch_one(&self.pool)
        .await?;

        Ok(token)
    }

    async fn consume_verification_token(
        &self,
        token: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, VerificationTokenEntity>(
            "DELETE FROM email_verification_tokens WHERE token = $1 RETURNING *",
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(false);
        };

        if row.expires_at < chrono::Utc::now() {
            tx.commit().await?;
            return Ok(false);
        }

        sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(row.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
