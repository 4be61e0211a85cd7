use uuid::Uuid;

use crate::{
    api::error,
    modules::reaction::{
        model::{ReactionSummaryRow, ViewerReactionRow},
        schema::{OwnerKind, ReactionEntity},
    },
};

#[async_trait::async_trait]
pub trait ReactionRepository {
    fn get_pool(&self) -> &sqlx::Pool<sqlx::Postgres>;

    async fn create(
        &self,
        owner_kind: OwnerKind,
        owner_id: &Uuid,
        creator_id: &Uuid,
        emoji: &str,
    ) -> Result<ReactionEntity, error::SystemError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ReactionEntity>, error::SystemError>;

    async fn exists_by_owner_and_creator(
        &self,
        owner_kind: OwnerKind,
        owner_id: &Uuid,
        creator_id: &Uuid,
    ) -> Result<bool, error::SystemError>;

    async fn update_emoji(
        &self,
        id: &Uuid,
        emoji: &str,
    ) -> Result<ReactionEntity, error::SystemError>;

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;

    /// One grouped query for a whole page of owners.
    async fn summaries_for_owners(
        &self,
        owner_kind: OwnerKind,
        owner_ids: &[Uuid],
    ) -> Result<Vec<ReactionSummaryRow>, error::SystemError>;

    /// The viewer's reactions across a page of owners, one query.
    async fn viewer_reactions_for_owners(
        &self,
        owner_kind: OwnerKind,
        owner_ids: &[Uuid],
        viewer_id: &Uuid,
    ) -> Result<Vec<ViewerReactionRow>, error::SystemError>;

    /// Cleanup hook for owner delete transactions.
    async fn delete_for_owner<'e, E>(
        &self,
        owner_kind: OwnerKind,
        owner_id: &Uuid,
        tx: E,
    ) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>;
}
