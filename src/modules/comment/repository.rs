use uuid::Uuid;

use crate::{
    api::error,
    modules::comment::{
        model::{ChildCountRow, CommentAttachmentRow, CommentRow},
        schema::{CommentAttachmentEntity, CommentEntity},
    },
};

#[async_trait::async_trait]
pub trait CommentRepository {
    fn get_pool(&self) -> &sqlx::PgPool;

    async fn create<'e, E>(
        &self,
        post_id: &Uuid,
        creator_id: &Uuid,
        parent_id: Option<&Uuid>,
        content: Option<&str>,
        tx: E,
    ) -> Result<CommentEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send;

    async fn add_attachment<'e, E>(
        &self,
        comment_id: &Uuid,
        file_id: &Uuid,
        tx: E,
    ) -> Result<CommentAttachmentEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send;

    async fn find_by_id(
        &self,
        comment_id: &Uuid,
    ) -> Result<Option<CommentEntity>, error::SystemError>;

    async fn find_attachment_by_id(
        &self,
        attachment_id: &Uuid,
    ) -> Result<Option<CommentAttachmentEntity>, error::SystemError>;

    /// `parent_id` None selects root comments; `post_id` narrows
    /// independently. `order_by` comes pre-whitelisted.
    async fn list(
        &self,
        post_id: Option<&Uuid>,
        parent_id: Option<&Uuid>,
        order_by: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentRow>, error::SystemError>;

    async fn count(
        &self,
        post_id: Option<&Uuid>,
        parent_id: Option<&Uuid>,
    ) -> Result<i64, error::SystemError>;

    async fn child_counts(
        &self,
        parent_ids: &[Uuid],
    ) -> Result<Vec<ChildCountRow>, error::SystemError>;

    async fn attachments_for_comments(
        &self,
        comment_ids: &[Uuid],
    ) -> Result<Vec<CommentAttachmentRow>, error::SystemError>;

    /// Sweeps reaction rows for the comment, its descendants and their
    /// attachments; FK cascades handle the comment rows themselves.
    async fn delete_tree_reactions<'e, E>(
        &self,
        comment_id: &Uuid,
        tx: E,
    ) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send;

    async fn delete<'e, E>(&self, comment_id: &Uuid, tx: E) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send;
}
