use actix_web::{HttpRequest, get, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::chat::{
        model::{CreateRoomModel, RoomResponse},
        repository_pg::ChatRepositoryPg,
        service::ChatService,
    },
    utils::ValidatedJson,
};

pub type ChatSvc = ChatService<ChatRepositoryPg>;

#[post("")]
pub async fn create_room(
    chat_service: web::Data<ChatSvc>,
    body: ValidatedJson<CreateRoomModel>,
    req: HttpRequest,
) -> Result<success::Success<RoomResponse>, error::Error> {
    let creator_id = get_claims(&req)?.sub;
    let room = chat_service.create_room(creator_id, body.0).await?;
    Ok(success::Success::created(Some(room)).message("Room created successfully"))
}

#[get("")]
pub async fn list_rooms(
    chat_service: web::Data<ChatSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<RoomResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let rooms = chat_service.my_rooms(user_id).await?;
    Ok(success::Success::ok(Some(rooms)).message("Rooms retrieved successfully"))
}

#[get("/{room_id}")]
pub async fn get_room(
    chat_service: web::Data<ChatSvc>,
    room_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<RoomResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let room = chat_service.get_room(*room_id, user_id).await?;
    Ok(success::Success::ok(Some(room)).message("Room retrieved successfully"))
}
