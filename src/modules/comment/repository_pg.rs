use uuid::Uuid;

use crate::{
    api::error,
    modules::comment::{
        model::{ChildCountRow, CommentAttachmentRow, CommentRow},
        repository::CommentRepository,
        schema::{CommentAttachmentEntity, CommentEntity},
    },
};

const COMMENT_COLUMNS: &str = r#"
    c.id,
    c.post_id,
    c.creator_id,
    c.parent_id,
    c.content,
    c.created_at,
    c.updated_at,
    u.username AS creator_username,
    u.display_name AS creator_display_name,
    u.avatar_url AS creator_avatar_url
"#;

#[derive(Clone)]
pub struct CommentRepositoryPg {
    pool: sqlx::PgPool,
}

impl CommentRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(
        builder: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>,
        post_id: Option<&Uuid>,
        parent_id: Option<&Uuid>,
    ) {
        if let Some(post_id) = post_id {
            builder.push(" AND c.post_id = ").push_bind(*post_id);
        }
        match parent_id {
            Some(parent_id) => {
                builder.push(" AND c.parent_id = ").push_bind(*parent_id);
            }
            None => {
                builder.push(" AND c.parent_id IS NULL");
            }
        }
    }
}

#[async_trait::async_trait]
impl CommentRepository for CommentRepositoryPg {
    fn get_pool(&self) -> &sqlx::PgPool {
        &self.pool
    }

    async fn create<'e, E>(
        &self,
        post_id: &Uuid,
        creator_id: &Uuid,
        parent_id: Option<&Uuid>,
        content: Option<&str>,
        tx: E,
    ) -> Result<CommentEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send,
    {
        let comment = sqlx::query_as::<_, CommentEntity>(
            r#"
            INSERT INTO comments (id, post_id, creator_id, parent_id, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(post_id)
        .bind(creator_id)
        .bind(parent_id)
        .bind(content)
        .fetch_one(tx)
        .await?;

        Ok(comment)
    }

    async fn add_attachment<'e, E>(
        &self,
        comment_id: &Uuid,
        file_id: &Uuid,
        tx: E,
    ) -> Result<CommentAttachmentEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send,
    {
        let attachment = sqlx::query_as::<_, CommentAttachmentEntity>(
            r#"
            INSERT INTO comment_attachments (id, comment_id, file_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(comment_id)
        .bind(file_id)
        .fetch_one(tx)
        .await?;

        Ok(attachment)
    }

    async fn find_by_id(
        &self,
        comment_id: &Uuid,
    ) -> Result<Option<CommentEntity>, error::SystemError> {
        let comment = sqlx::query_as::<_, CommentEntity>("SELECT * FROM comments WHERE id = $1")
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(comment)
    }

    async fn find_attachment_by_id(
        &self,
        attachment_id: &Uuid,
    ) -> Result<Option<CommentAttachmentEntity>, error::SystemError> {
        let attachment = sqlx::query_as::<_, CommentAttachmentEntity>(
            "SELECT * FROM comment_attachments WHERE id = $1",
        )
        .bind(attachment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attachment)
    }

    async fn list(
        &self,
        post_id: Option<&Uuid>,
        parent_id: Option<&Uuid>,
        order_by: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentRow>, error::SystemError> {
        let mut builder = sqlx::QueryBuilder::new(format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c JOIN users u ON u.id = c.creator_id WHERE 1=1"
        ));
        Self::push_filters(&mut builder, post_id, parent_id);
        builder.push(format!(" ORDER BY {order_by}"));
        builder.push(" LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);

        let rows = builder.build_query_as::<CommentRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn count(
        &self,
        post_id: Option<&Uuid>,
        parent_id: Option<&Uuid>,
    ) -> Result<i64, error::SystemError> {
        let mut builder = sqlx::QueryBuilder::new("SELECT COUNT(*) FROM comments c WHERE 1=1");
        Self::push_filters(&mut builder, post_id, parent_id);

        let count: (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(count.0)
    }

    async fn child_counts(
        &self,
        parent_ids: &[Uuid],
    ) -> Result<Vec<ChildCountRow>, error::SystemError> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ChildCountRow>(
            r#"
            SELECT parent_id, COUNT(*) AS count
            FROM comments
            WHERE parent_id = ANY($1)
            GROUP BY parent_id
            "#,
        )
        .bind(parent_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn attachments_for_comments(
        &self,
        comment_ids: &[Uuid],
    ) -> Result<Vec<CommentAttachmentRow>, error::SystemError> {
        if comment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, CommentAttachmentRow>(
            r#"
            SELECT
                ca.comment_id,
                ca.id AS attachment_id,
                f.id AS file_id,
                f.filename,
                f.original_filename,
                f.mime_type,
                f.mime_category,
                f.file_size,
                f.created_at
            FROM comment_attachments ca
            JOIN files f ON f.id = ca.file_id
            WHERE ca.comment_id = ANY($1)
            "#,
        )
        .bind(comment_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete_tree_reactions<'e, E>(
        &self,
        comment_id: &Uuid,
        tx: E,
    ) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send,
    {
        sqlx::query(
            r#"
            WITH RECURSIVE subtree AS (
                SELECT id FROM comments WHERE id = $1
                UNION ALL
                SELECT c.id FROM comments c JOIN subtree s ON c.parent_id = s.id
            )
            DELETE FROM reactions
            WHERE (owner_kind = 'comment' AND owner_id IN (SELECT id FROM subtree))
               OR (owner_kind = 'comment_attachment'
                   AND owner_id IN (
                       SELECT ca.id
                       FROM comment_attachments ca
                       WHERE ca.comment_id IN (SELECT id FROM subtree)
                   ))
            "#,
        )
        .bind(comment_id)
        .execute(tx)
        .await?;

        Ok(())
    }

    async fn delete<'e, E>(&self, comment_id: &Uuid, tx: E) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send,
    {
        sqlx::query("DELETE FROM comments WHERE id = $1").bind(comment_id).execute(tx).await?;
        Ok(())
    }
}
