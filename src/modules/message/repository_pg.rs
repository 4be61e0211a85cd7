use uuid::Uuid;

use crate::{
    api::error,
    modules::message::{
        model::{CreateMessageFields, MessageAttachmentRow, MessageRow, MessageSearchQuery},
        repository::MessageRepository,
        schema::{MessageAttachmentEntity, MessageEntity},
    },
};

const MESSAGE_COLUMNS: &str = r#"
    m.id,
    m.room_id,
    m.sender_id,
    m.content,
    m.status,
    m.is_deleted,
    m.replied_target_id,
    m.replied_target_type,
    m.created_at,
    m.updated_at,
    u.username AS sender_username,
    u.display_name AS sender_display_name,
    u.avatar_url AS sender_avatar_url
"#;

const ATTACHMENT_COLUMNS: &str = r#"
    ma.message_id,
    ma.id AS attachment_id,
    f.id AS file_id,
    f.filename,
    f.original_filename,
    f.mime_type,
    f.mime_category,
    f.file_size,
    f.created_at
"#;

#[derive(Clone)]
pub struct MessageRepositoryPg {
    pool: sqlx::PgPool,
}

impl MessageRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(
        builder: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>,
        query: &MessageSearchQuery,
        viewer_id: &Uuid,
    ) {
        match query.room_id {
            Some(room_id) => {
                builder.push(" AND m.room_id = ").push_bind(room_id);
            }
            None => {
                builder
                    .push(" AND m.room_id IN (SELECT room_id FROM chat_room_members WHERE user_id = ")
                    .push_bind(*viewer_id)
                    .push(")");
            }
        }
        if let Some(sender_id) = query.sender_id {
            builder.push(" AND m.sender_id = ").push_bind(sender_id);
        }
        if let Some(status) = query.status {
            builder.push(" AND m.status = ").push_bind(status);
        }
        if let Some(is_deleted) = query.is_deleted {
            builder.push(" AND m.is_deleted = ").push_bind(is_deleted);
        }
        if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            builder.push(" AND m.content ILIKE ").push_bind(format!("%{}%", keyword.trim()));
        }
        if let Some(has_files) = query.has_files {
            if has_files {
                builder.push(
                    " AND EXISTS (SELECT 1 FROM message_attachments ma WHERE ma.message_id = m.id)",
                );
            } else {
                builder.push(
                    " AND NOT EXISTS (SELECT 1 FROM message_attachments ma WHERE ma.message_id = m.id)",
                );
            }
        }
        if let Some(date_from) = query.date_from {
            builder.push(" AND m.created_at >= ").push_bind(date_from);
        }
        if let Some(date_to) = query.date_to {
            builder.push(" AND m.created_at <= ").push_bind(date_to);
        }
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessageRepositoryPg {
    fn get_pool(&self) -> &sqlx::PgPool {
        &self.pool
    }

    async fn create<'e, E>(
        &self,
        fields: &CreateMessageFields,
        sender_id: &Uuid,
        tx: E,
    ) -> Result<MessageEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send,
    {
        let message = sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO messages (id, room_id, sender_id, content, replied_target_id, replied_target_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(fields.room_id)
        .bind(sender_id)
        .bind(fields.content.as_deref())
        .bind(fields.replied_target_id)
        .bind(fields.replied_target_type)
        .fetch_one(tx)
        .await?;

        Ok(message)
    }

    async fn add_attachment<'e, E>(
        &self,
        message_id: &Uuid,
        file_id: &Uuid,
        tx: E,
    ) -> Result<MessageAttachmentEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send,
    {
        let attachment = sqlx::query_as::<_, MessageAttachmentEntity>(
            r#"
            INSERT INTO message_attachments (id, message_id, file_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(message_id)
        .bind(file_id)
        .fetch_one(tx)
        .await?;

        Ok(attachment)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MessageEntity>, error::SystemError> {
        let message = sqlx::query_as::<_, MessageEntity>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(message)
    }

    async fn find_row_by_id(&self, id: &Uuid) -> Result<Option<MessageRow>, error::SystemError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages m JOIN users u ON u.id = m.sender_id WHERE m.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_attachment_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<MessageAttachmentEntity>, error::SystemError> {
        let attachment = sqlx::query_as::<_, MessageAttachmentEntity>(
            "SELECT * FROM message_attachments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attachment)
    }

    async fn search(
        &self,
        query: &MessageSearchQuery,
        viewer_id: &Uuid,
        order_by: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageRow>, error::SystemError> {
        let mut builder = sqlx::QueryBuilder::new(format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages m JOIN users u ON u.id = m.sender_id WHERE 1=1"
        ));
        Self::push_filters(&mut builder, query, viewer_id);
        builder.push(format!(" ORDER BY {order_by}"));
        builder.push(" LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);

        let rows = builder.build_query_as::<MessageRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn count(
        &self,
        query: &MessageSearchQuery,
        viewer_id: &Uuid,
    ) -> Result<i64, error::SystemError> {
        let mut builder = sqlx::QueryBuilder::new("SELECT COUNT(*) FROM messages m WHERE 1=1");
        Self::push_filters(&mut builder, query, viewer_id);

        let count: (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(count.0)
    }

    async fn messages_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let messages =
            sqlx::query_as::<_, MessageEntity>("SELECT * FROM messages WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;

        Ok(messages)
    }

    async fn attachments_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<MessageAttachmentRow>, error::SystemError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, MessageAttachmentRow>(&format!(
            r#"
            SELECT {ATTACHMENT_COLUMNS}
            FROM message_attachments ma
            JOIN files f ON f.id = ma.file_id
            WHERE ma.id = ANY($1)
            "#
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn attachments_for_messages(
        &self,
        message_ids: &[Uuid],
    ) -> Result<Vec<MessageAttachmentRow>, error::SystemError> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, MessageAttachmentRow>(&format!(
            r#"
            SELECT {ATTACHMENT_COLUMNS}
            FROM message_attachments ma
            JOIN files f ON f.id = ma.file_id
            WHERE ma.message_id = ANY($1)
            "#
        ))
        .bind(message_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn soft_delete(&self, id: &Uuid) -> Result<(), error::SystemError> {
        sqlx::query("UPDATE messages SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete<'e, E>(&self, id: &Uuid, tx: E) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send,
    {
        sqlx::query("DELETE FROM messages WHERE id = $1").bind(id).execute(tx).await?;
        Ok(())
    }
}
