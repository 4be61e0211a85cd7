use uuid::Uuid;

use crate::{
    api::error,
    modules::message::{
        model::{CreateMessageFields, MessageAttachmentRow, MessageRow, MessageSearchQuery},
        schema::{MessageAttachmentEntity, MessageEntity},
    },
};

#[async_trait::async_trait]
pub trait MessageRepository {
    fn get_pool(&self) -> &sqlx::Pool<sqlx::Postgres>;

    async fn create<'e, E>(
        &self,
        fields: &CreateMessageFields,
        sender_id: &Uuid,
        tx: E,
    ) -> Result<MessageEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send;

    async fn add_attachment<'e, E>(
        &self,
        message_id: &Uuid,
        file_id: &Uuid,
        tx: E,
    ) -> Result<MessageAttachmentEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MessageEntity>, error::SystemError>;

    /// The message with its sender columns joined in.
    async fn find_row_by_id(&self, id: &Uuid) -> Result<Option<MessageRow>, error::SystemError>;

    async fn find_attachment_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<MessageAttachmentEntity>, error::SystemError>;

    /// Filtered page. When no room filter is given, results are scoped
    /// to rooms the viewer belongs to.
    async fn search(
        &self,
        query: &MessageSearchQuery,
        viewer_id: &Uuid,
        order_by: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageRow>, error::SystemError>;

    async fn count(
        &self,
        query: &MessageSearchQuery,
        viewer_id: &Uuid,
    ) -> Result<i64, error::SystemError>;

    async fn messages_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<MessageEntity>, error::SystemError>;

    async fn attachments_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<MessageAttachmentRow>, error::SystemError>;

    async fn attachments_for_messages(
        &self,
        message_ids: &[Uuid],
    ) -> Result<Vec<MessageAttachmentRow>, error::SystemError>;

    async fn soft_delete(&self, id: &Uuid) -> Result<(), error::SystemError>;

    async fn delete<'e, E>(&self, id: &Uuid, tx: E) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send;
}
