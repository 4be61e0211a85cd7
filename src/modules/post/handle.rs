use actix_multipart::Multipart;
use actix_web::{HttpRequest, delete, get, post, web};
use uuid::Uuid;

use crate::{
    api::{error, page::Page, page::PageQuery, success},
    middlewares::get_claims,
    modules::{
        file_upload::{handle::collect_multipart, repository_pg::FileRepositoryPg},
        post::{
            model::{CreatePostFields, PostResponse},
            repository_pg::PostRepositoryPg,
            service::PostService,
        },
        reaction::{
            model::{CreateReactionModel, ReactionResponse},
            repository_pg::ReactionRepositoryPg,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::{ValidatedJson, ValidatedQuery},
};

pub type PostSvc =
    PostService<PostRepositoryPg, ReactionRepositoryPg, FileRepositoryPg, UserRepositoryPg>;

#[post("")]
pub async fn create_post(
    post_service: web::Data<PostSvc>,
    payload: Multipart,
    req: HttpRequest,
) -> Result<success::Success<PostResponse>, error::Error> {
    let creator_id = get_claims(&req)?.sub;
    let (fields, parts) = collect_multipart(payload).await?;

    let shared_post_id = match fields.get("sharedPostId") {
        Some(raw) => Some(
            raw.parse::<Uuid>()
                .map_err(|_| error::Error::bad_request("Invalid sharedPostId"))?,
        ),
        None => None,
    };

    let fields = CreatePostFields {
        content: fields.get("content").cloned().unwrap_or_default(),
        shared_post_id,
    };

    let response = post_service.create_post(creator_id, fields, parts).await?;
    Ok(success::Success::created(Some(response)).message("Post created successfully"))
}

#[get("/feed")]
pub async fn get_feed(
    post_service: web::Data<PostSvc>,
    query: ValidatedQuery<PageQuery>,
    req: HttpRequest,
) -> Result<success::Success<Page<PostResponse>>, error::Error> {
    let viewer_id = get_claims(&req)?.sub;
    let page = post_service.get_ranked_feed(viewer_id, &query.0).await?;
    Ok(success::Success::ok(Some(page)).message("Feed retrieved successfully"))
}

#[get("/user/{user_id}")]
pub async fn get_user_posts(
    post_service: web::Data<PostSvc>,
    user_id: web::Path<Uuid>,
    query: ValidatedQuery<PageQuery>,
    req: HttpRequest,
) -> Result<success::Success<Page<PostResponse>>, error::Error> {
    let viewer_id = get_claims(&req)?.sub;
    let page = post_service.get_user_posts(*user_id, viewer_id, &query.0).await?;
    Ok(success::Success::ok(Some(page)).message("Posts retrieved successfully"))
}

#[delete("/{post_id}")]
pub async fn delete_post(
    post_service: web::Data<PostSvc>,
    post_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    post_service.delete_post(*post_id, user_id).await?;
    Ok(success::Success::no_content())
}

#[post("/{post_id}/reactions")]
pub async fn react_to_post(
    post_service: web::Data<PostSvc>,
    post_id: web::Path<Uuid>,
    body: ValidatedJson<CreateReactionModel>,
    req: HttpRequest,
) -> Result<success::Success<ReactionResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let reaction = post_service.react_to_post(*post_id, user_id, &body.0.emoji).await?;
    Ok(success::Success::created(Some(reaction)).message("Reaction created successfully"))
}

#[delete("/{post_id}/reactions/{reaction_id}")]
pub async fn remove_post_reaction(
    post_service: web::Data<PostSvc>,
    path: web::Path<(Uuid, Uuid)>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let (_post_id, reaction_id) = path.into_inner();
    post_service.remove_post_reaction(reaction_id, user_id).await?;
    Ok(success::Success::no_content())
}
