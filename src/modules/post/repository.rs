use uuid::Uuid;

use crate::{
    api::error,
    modules::post::{
        model::{PostAttachmentRow, RankedPostRow},
        schema::PostEntity,
    },
};

#[async_trait::async_trait]
pub trait PostRepository {
    fn get_pool(&self) -> &sqlx::PgPool;

    async fn create<'e, E>(
        &self,
        creator_id: &Uuid,
        content: &str,
        shared_post_id: Option<&Uuid>,
        tx: E,
    ) -> Result<PostEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send;

    async fn add_attachment<'e, E>(
        &self,
        post_id: &Uuid,
        file_id: &Uuid,
        tx: E,
    ) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send;

    async fn find_by_id(&self, post_id: &Uuid) -> Result<Option<PostEntity>, error::SystemError>;

    /// Ranked page: own posts, then friends', then everyone else's,
    /// each tier ordered by reactions, comments, recency.
    async fn ranked_feed(
        &self,
        viewer_id: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RankedPostRow>, error::SystemError>;

    async fn count_all(&self) -> Result<i64, error::SystemError>;

    async fn posts_by_creator(
        &self,
        creator_id: &Uuid,
        viewer_id: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RankedPostRow>, error::SystemError>;

    async fn count_by_creator(&self, creator_id: &Uuid) -> Result<i64, error::SystemError>;

    async fn attachments_for_posts(
        &self,
        post_ids: &[Uuid],
    ) -> Result<Vec<PostAttachmentRow>, error::SystemError>;

    /// Reaction rows under the post's comment tree have no FK back to
    /// the post, so the delete transaction sweeps them explicitly.
    async fn delete_comment_tree_reactions<'e, E>(
        &self,
        post_id: &Uuid,
        tx: E,
    ) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send;

    async fn delete<'e, E>(&self, post_id: &Uuid, tx: E) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Send;
}
