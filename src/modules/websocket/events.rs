//! Actor messages exchanged between session actors and the server
//! actor.

use actix::prelude::*;
use uuid::Uuid;

use super::message::ServerMessage;
use super::session::WebSocketSession;

#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub id: Uuid,
    pub addr: Addr<WebSocketSession>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: Uuid,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Authenticate {
    pub session_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct JoinRoom {
    pub user_id: Uuid,
    pub room_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct LeaveRoom {
    pub user_id: Uuid,
    pub room_id: Uuid,
}

/// Fan a message out to every user currently joined to the room,
/// optionally skipping one (usually the sender).
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct BroadcastToRoom {
    pub room_id: Uuid,
    pub message: ServerMessage,
    pub skip_user_id: Option<Uuid>,
}
