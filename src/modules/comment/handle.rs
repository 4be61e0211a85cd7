use actix_multipart::Multipart;
use actix_web::{HttpRequest, delete, get, post, web};
use uuid::Uuid;

use crate::{
    api::{error, page::Page, success},
    middlewares::get_claims,
    modules::{
        comment::{
            model::{CommentResponse, CommentsQuery, CreateCommentFields},
            repository_pg::CommentRepositoryPg,
            service::CommentService,
        },
        file_upload::{handle::collect_multipart, repository_pg::FileRepositoryPg},
        post::repository_pg::PostRepositoryPg,
        reaction::{
            model::{CreateReactionModel, ReactionResponse},
            repository_pg::ReactionRepositoryPg,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::{ValidatedJson, ValidatedQuery},
};

pub type CommentSvc = CommentService<
    CommentRepositoryPg,
    ReactionRepositoryPg,
    FileRepositoryPg,
    PostRepositoryPg,
    UserRepositoryPg,
>;

#[get("")]
pub async fn get_comments(
    comment_service: web::Data<CommentSvc>,
    query: ValidatedQuery<CommentsQuery>,
    req: HttpRequest,
) -> Result<success::Success<Page<CommentResponse>>, error::Error> {
    let viewer_id = get_claims(&req)?.sub;
    let page = comment_service.get_comments(&query.0, viewer_id).await?;
    Ok(success::Success::ok(Some(page)).message("Comments retrieved successfully"))
}

#[post("")]
pub async fn create_comment(
    comment_service: web::Data<CommentSvc>,
    payload: Multipart,
    req: HttpRequest,
) -> Result<success::Success<CommentResponse>, error::Error> {
    let creator_id = get_claims(&req)?.sub;
    let (fields, mut parts) = collect_multipart(payload).await?;

    let post_id = fields
        .get("postId")
        .ok_or_else(|| error::Error::bad_request("postId is required"))?
        .parse::<Uuid>()
        .map_err(|_| error::Error::bad_request("Invalid postId"))?;

    let parent_id = match fields.get("parentId") {
        Some(raw) => {
            Some(raw.parse::<Uuid>().map_err(|_| error::Error::bad_request("Invalid parentId"))?)
        }
        None => None,
    };

    if parts.len() > 1 {
        return Err(error::Error::bad_request("A comment takes at most one attachment"));
    }

    let fields =
        CreateCommentFields { post_id, parent_id, content: fields.get("content").cloned() };

    let response = comment_service.create_comment(creator_id, fields, parts.pop()).await?;
    Ok(success::Success::created(Some(response)).message("Comment created successfully"))
}

#[delete("/{comment_id}")]
pub async fn delete_comment(
    comment_service: web::Data<CommentSvc>,
    comment_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    comment_service.delete_comment(*comment_id, user_id).await?;
    Ok(success::Success::no_content())
}

#[post("/{comment_id}/reactions")]
pub async fn react_to_comment(
    comment_service: web::Data<CommentSvc>,
    comment_id: web::Path<Uuid>,
    body: ValidatedJson<CreateReactionModel>,
    req: HttpRequest,
) -> Result<success::Success<ReactionResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let reaction = comment_service.react_to_comment(*comment_id, user_id, &body.0.emoji).await?;
    Ok(success::Success::created(Some(reaction)).message("Reaction created successfully"))
}

#[post("/attachments/{attachment_id}/reactions")]
pub async fn react_to_comment_attachment(
    comment_service: web::Data<CommentSvc>,
    attachment_id: web::Path<Uuid>,
    body: ValidatedJson<CreateReactionModel>,
    req: HttpRequest,
) -> Result<success::Success<ReactionResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let reaction =
        comment_service.react_to_attachment(*attachment_id, user_id, &body.0.emoji).await?;
    Ok(success::Success::created(Some(reaction)).message("Reaction created successfully"))
}
