use actix_multipart::Multipart;
use actix_web::{HttpRequest, delete, get, post, web};
use uuid::Uuid;

use crate::{
    api::{error, page::Page, success},
    middlewares::get_claims,
    modules::{
        chat::repository_pg::ChatRepositoryPg,
        file_upload::{handle::collect_multipart, repository_pg::FileRepositoryPg},
        message::{
            model::{CreateMessageFields, MessageResponse, MessageSearchQuery},
            repository_pg::MessageRepositoryPg,
            schema::ReplyTargetType,
            service::MessageService,
        },
        reaction::{
            model::{CreateReactionModel, ReactionResponse},
            repository_pg::ReactionRepositoryPg,
        },
    },
    utils::{ValidatedJson, ValidatedQuery},
};

pub type MessageSvc =
    MessageService<MessageRepositoryPg, ChatRepositoryPg, ReactionRepositoryPg, FileRepositoryPg>;

#[post("")]
pub async fn create_message(
    message_service: web::Data<MessageSvc>,
    payload: Multipart,
    req: HttpRequest,
) -> Result<success::Success<MessageResponse>, error::Error> {
    let sender_id = get_claims(&req)?.sub;
    let (fields, parts) = collect_multipart(payload).await?;

    let room_id = fields
        .get("roomId")
        .ok_or_else(|| error::Error::bad_request("roomId is required"))?
        .parse::<Uuid>()
        .map_err(|_| error::Error::bad_request("Invalid roomId"))?;

    let replied_target_id = match fields.get("repliedTargetId") {
        Some(raw) => Some(
            raw.parse::<Uuid>()
                .map_err(|_| error::Error::bad_request("Invalid repliedTargetId"))?,
        ),
        None => None,
    };

    let replied_target_type = match fields.get("repliedTargetType").map(String::as_str) {
        Some("message") => Some(ReplyTargetType::Message),
        Some("attachment") => Some(ReplyTargetType::Attachment),
        Some(_) => return Err(error::Error::bad_request("Invalid repliedTargetType")),
        None => None,
    };

    let fields = CreateMessageFields {
        room_id,
        content: fields.get("content").cloned(),
        replied_target_id,
        replied_target_type,
    };

    let response = message_service.create_message(sender_id, fields, parts).await?;
    Ok(success::Success::created(Some(response)).message("Message sent successfully"))
}

#[get("")]
pub async fn search_messages(
    message_service: web::Data<MessageSvc>,
    query: ValidatedQuery<MessageSearchQuery>,
    req: HttpRequest,
) -> Result<success::Success<Page<MessageResponse>>, error::Error> {
    let viewer_id = get_claims(&req)?.sub;
    let page = message_service.search_messages(&query.0, viewer_id).await?;
    Ok(success::Success::ok(Some(page)).message("Messages retrieved successfully"))
}

#[delete("/{message_id}")]
pub async fn soft_delete_message(
    message_service: web::Data<MessageSvc>,
    message_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    message_service.soft_delete_message(*message_id, user_id).await?;
    Ok(success::Success::no_content())
}

#[delete("/{message_id}/permanent")]
pub async fn delete_message(
    message_service: web::Data<MessageSvc>,
    message_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    message_service.delete_message(*message_id, user_id).await?;
    Ok(success::Success::no_content())
}

#[post("/{message_id}/reactions")]
pub async fn react_to_message(
    message_service: web::Data<MessageSvc>,
    message_id: web::Path<Uuid>,
    body: ValidatedJson<CreateReactionModel>,
    req: HttpRequest,
) -> Result<success::Success<ReactionResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let reaction = message_service.react_to_message(*message_id, user_id, &body.0.emoji).await?;
    Ok(success::Success::created(Some(reaction)).message("Reaction created successfully"))
}
