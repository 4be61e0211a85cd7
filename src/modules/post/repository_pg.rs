use uuid::Uuid;

use crate::{
    api::error,
    modules::post::{
        model::{PostAttachmentRow, RankedPostRow},
        repository::PostRepository,
        schema::PostEntity,
    },
};

const RANKED_COLUMNS: &str = r#"
    p.id,
    p.creator_id,
    p.content,
    p.shared_post_id,
    p.created_at,
    p.updated_at,
    u.username AS creator_username,
    u.display_name AS creator_display_name,
    u.avatar_url AS creator_avatar_url,
    COALESCE(r.reaction_count, 0) AS reaction_count,
    COALESCE(c.comment_count, 0) AS comment_count
"#;

const COUNT_JOINS: &str = r#"
    JOIN users u ON u.id = p.creator_id
    LEFT JOIN (
        SELECT owner_id, COUNT(*) AS reaction_count
        FROM reactions
        WHERE owner_kind = 'post'
        GROUP BY owner_id
    ) r ON r.owner_id = p.id
    LEFT JOIN (
        SELECT post_id, COUNT(*) AS comment_count
        FROM comments
        GROUP BY post_id
    ) c ON c.post_id = p.id
"#;

#[derive(Clone)]
pub struct PostRepositoryPg {
    pool: sqlx::PgPool,
}

impl PostRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PostRepository for PostRepositoryPg {
    fn get_pool(&self) -> &sqlx::PgPool {
        &self.pool
    }

    async fn create<'e, E>(
        &self,
        creator_id: &Uuid,
        content: &str,
        shared_post_id: Option<&Uuid>,
        tx: E,
    ) -> Result<PostEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send,
    {
        let post = sqlx::query_as::<_, PostEntity>(
            r#"
            INSERT INTO posts (id, creator_id, content, shared_post_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(creator_id)
        .bind(content)
        .bind(shared_post_id)
        .fetch_one(tx)
        .await?;

        Ok(post)
    }

    async fn add_attachment<'e, E>(
        &self,
        post_id: &Uuid,
        file_id: &Uuid,
        tx: E,
    ) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send,
    {
        sqlx::query("INSERT INTO post_attachments (post_id, file_id) VALUES ($1, $2)")
            .bind(post_id)
            .bind(file_id)
            .execute(tx)
            .await?;

        Ok(())
    }

    async fn find_by_id(&self, post_id: &Uuid) -> Result<Option<PostEntity>, error::SystemError> {
        let post = sqlx::query_as::<_, PostEntity>("SELECT * FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    async fn ranked_feed(
        &self,
        viewer_id: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RankedPostRow>, error::SystemError> {
        // The friendship join uses the normalized pair, so one indexed
        // lookup covers both orientations.
        let sql = format!(
            r#"
            SELECT
                {RANKED_COLUMNS},
                CASE
                    WHEN p.creator_id = $1 THEN 0
                    WHEN f.user_a IS NOT NULL THEN 1
                    ELSE 2
                END AS rank_tier
            FROM posts p
            {COUNT_JOINS}
            LEFT JOIN friends f
                ON f.user_a = LEAST($1, p.creator_id)
               AND f.user_b = GREATEST($1, p.creator_id)
            ORDER BY rank_tier ASC, reaction_count DESC, comment_count DESC, p.created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query_as::<_, RankedPostRow>(&sql)
            .bind(viewer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn count_all(&self) -> Result<i64, error::SystemError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM posts").fetch_one(&self.pool).await?;
        Ok(count.0)
    }

    async fn posts_by_creator(
        &self,
        creator_id: &Uuid,
        viewer_id: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RankedPostRow>, error::SystemError> {
        let sql = format!(
            r#"
            SELECT
                {RANKED_COLUMNS},
                CASE WHEN p.creator_id = $2 THEN 0 ELSE 2 END AS rank_tier
            FROM posts p
            {COUNT_JOINS}
            WHERE p.creator_id = $1
            ORDER BY p.created_at DESC
            LIMIT $3 OFFSET $4
            "#
        );

        let rows = sqlx::query_as::<_, RankedPostRow>(&sql)
            .bind(creator_id)
            .bind(viewer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn count_by_creator(&self, creator_id: &Uuid) -> Result<i64, error::SystemError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE creator_id = $1")
            .bind(creator_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn attachments_for_posts(
        &self,
        post_ids: &[Uuid],
    ) -> Result<Vec<PostAttachmentRow>, error::SystemError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PostAttachmentRow>(
            r#"
            SELECT
                pa.post_id,
                f.id,
                f.filename,
                f.original_filename,
                f.mime_type,
                f.mime_category,
                f.file_size,
                f.created_at
            FROM post_attachments pa
            JOIN files f ON f.id = pa.file_id
            WHERE pa.post_id = ANY($1)
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete_comment_tree_reactions<'e, E>(
        &self,
        post_id: &Uuid,
        tx: E,
    ) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send,
    {
        sqlx::query(
            r#"
            DELETE FROM reactions
            WHERE (owner_kind = 'comment'
                   AND owner_id IN (SELECT id FROM comments WHERE post_id = $1))
               OR (owner_kind = 'comment_attachment'
                   AND owner_id IN (
                       SELECT ca.id
                       FROM comment_attachments ca
                       JOIN comments c ON c.id = ca.comment_id
                       WHERE c.post_id = $1
                   ))
            "#,
        )
        .bind(post_id)
        .execute(tx)
        .await?;

        Ok(())
    }

    async fn delete<'e, E>(&self, post_id: &Uuid, tx: E) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send,
    {
        sqlx::query("DELETE FROM posts WHERE id = $1").bind(post_id).execute(tx).await?;
        Ok(())
    }
}
