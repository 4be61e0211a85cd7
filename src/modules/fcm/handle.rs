use actix_web::{HttpRequest, delete, get, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::fcm::{
        model::{FcmTokenResponse, RegisterTokenModel},
        repository_pg::FcmTokenRepositoryPg,
        service::FcmService,
    },
    utils::ValidatedJson,
};

pub type FcmSvc = FcmService<FcmTokenRepositoryPg>;

#[post("/tokens")]
pub async fn register_token(
    fcm_service: web::Data<FcmSvc>,
    body: ValidatedJson<RegisterTokenModel>,
    req: HttpRequest,
) -> Result<success::Success<FcmTokenResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let token = fcm_service.register_token(user_id, &body.0.token).await?;
    Ok(success::Success::created(Some(token)).message("Token registered successfully"))
}

#[get("/tokens")]
pub async fn list_tokens(
    fcm_service: web::Data<FcmSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FcmTokenResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let tokens = fcm_service.list_tokens(user_id).await?;
    Ok(success::Success::ok(Some(tokens)).message("Tokens retrieved successfully"))
}

#[delete("/tokens/{token_id}")]
pub async fn delete_token(
    fcm_service: web::Data<FcmSvc>,
    token_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    fcm_service.delete_token(user_id, *token_id).await?;
    Ok(success::Success::no_content())
}
