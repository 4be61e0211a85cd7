use actix_web::{HttpRequest, delete, patch, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::reaction::{
        model::{CreateReactionModel, ReactionResponse},
        repository_pg::ReactionRepositoryPg,
        service::ReactionService,
    },
    utils::ValidatedJson,
};

type ReactionSvc = ReactionService<ReactionRepositoryPg>;

#[patch("/{id}")]
pub async fn update_reaction(
    reaction_service: web::Data<ReactionSvc>,
    reaction_id: web::Path<Uuid>,
    body: ValidatedJson<CreateReactionModel>,
    req: HttpRequest,
) -> Result<success::Success<ReactionResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let reaction =
        reaction_service.update_reaction(reaction_id.into_inner(), user_id, &body.0.emoji).await?;
    Ok(success::Success::ok(Some(reaction)).message("Reaction updated successfully"))
}

#[delete("/{id}")]
pub async fn delete_reaction(
    reaction_service: web::Data<ReactionSvc>,
    reaction_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    reaction_service.delete_reaction(reaction_id.into_inner(), user_id).await?;
    Ok(success::Success::no_content())
}
