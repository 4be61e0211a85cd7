use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages the client may send over the socket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Auth { token: String },
    JoinRoom { room_id: Uuid },
    LeaveRoom { room_id: Uuid },
    Ping,
}

/// Messages pushed from the server to connected clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    AuthSuccess { user_id: Uuid },
    AuthFailed { reason: String },
    NewMessage { room_id: Uuid, message: serde_json::Value },
    MessageDeleted { room_id: Uuid, message_id: Uuid },
    Pong,
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_auth_deserializes() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"auth","token":"abc"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Auth { token } if token == "abc"));
    }

    #[test]
    fn client_join_room_deserializes() {
        let room_id = Uuid::now_v7();
        let raw = format!(r#"{{"type":"join_room","room_id":"{room_id}"}}"#);
        let msg: ClientMessage = serde_json::from_str(&raw).unwrap();
        assert!(matches!(msg, ClientMessage::JoinRoom { room_id: r } if r == room_id));
    }

    #[test]
    fn unknown_client_message_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"shutdown"}"#).is_err());
    }

    #[test]
    fn server_message_tags_are_snake_case() {
        let room_id = Uuid::now_v7();
        let message_id = Uuid::now_v7();
        let json =
            serde_json::to_value(ServerMessage::MessageDeleted { room_id, message_id }).unwrap();
        assert_eq!(json["type"], "message_deleted");
        assert_eq!(json["message_id"], message_id.to_string());
    }

    #[test]
    fn pong_serializes_without_payload() {
        let json = serde_json::to_string(&ServerMessage::Pong).unwrap();
        assert_eq!(json, r#"{"type":"pong"}"#);
    }
}
