use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::reaction::{
        model::ReactionResponse,
        repository::ReactionRepository,
        schema::OwnerKind,
    },
};

#[derive(Clone)]
pub struct ReactionService<R>
where
    R: ReactionRepository + Send + Sync,
{
    reaction_repo: Arc<R>,
}

impl<R> ReactionService<R>
where
    R: ReactionRepository + Send + Sync,
{
    pub fn with_dependencies(reaction_repo: Arc<R>) -> Self {
        ReactionService { reaction_repo }
    }

    /// One reaction per (owner, creator). The existence check gives
    /// the friendly error; the unique constraint is the backstop under
    /// concurrent duplicates and also surfaces as Conflict.
    pub async fn create_reaction(
        &self,
        owner_kind: OwnerKind,
        owner_id: Uuid,
        creator_id: Uuid,
        emoji: &str,
    ) -> Result<ReactionResponse, error::SystemError> {
        if emoji.trim().is_empty() {
            return Err(error::SystemError::bad_request("Emoji must not be blank"));
        }

        if self
            .reaction_repo
            .exists_by_owner_and_creator(owner_kind, &owner_id, &creator_id)
            .await?
        {
            return Err(error::SystemError::conflict_with("Reaction already exists"));
        }

        let reaction =
            self.reaction_repo.create(owner_kind, &owner_id, &creator_id, emoji).await?;

        Ok(ReactionResponse::from(reaction))
    }

    pub async fn update_reaction(
        &self,
        reaction_id: Uuid,
        user_id: Uuid,
        emoji: &str,
    ) -> Result<ReactionResponse, error::SystemError> {
        let reaction = self
            .reaction_repo
            .find_by_id(&reaction_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Reaction not found"))?;

        if reaction.creator_id != user_id {
            return Err(error::SystemError::forbidden("You can only update your own reactions"));
        }

        let updated = self.reaction_repo.update_emoji(&reaction_id, emoji).await?;
        Ok(ReactionResponse::from(updated))
    }

    pub async fn delete_reaction(
        &self,
        reaction_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let reaction = self
            .reaction_repo
            .find_by_id(&reaction_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Reaction not found"))?;

        if reaction.creator_id != user_id {
            return Err(error::SystemError::forbidden("You can only delete your own reactions"));
        }

        self.reaction_repo.delete(&reaction_id).await?;
        Ok(())
    }
}
