/// WebSocket session actor, one per connection.
///
/// The session tracks auth state and bridges outbound messages to the
/// client through the mpsc channel owned by handler.rs. Messages are
/// created over REST; the socket only authenticates, subscribes to
/// rooms and receives pushes.
use actix::prelude::*;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::ENV;
use crate::utils::{Claims, TypeClaims};

use super::events::*;
use super::message::{ClientMessage, ServerMessage};
use super::server::WebSocketServer;

pub struct WebSocketSession {
    pub id: Uuid,

    /// Set once the client has presented a valid access token.
    pub user_id: Option<Uuid>,

    pub server: Addr<WebSocketServer>,

    /// Outbound channel towards the client socket.
    pub tx: mpsc::UnboundedSender<String>,
}

impl WebSocketSession {
    pub fn new(server: Addr<WebSocketServer>, tx: mpsc::UnboundedSender<String>) -> Self {
        Self { id: Uuid::now_v7(), user_id: None, server, tx }
    }

    fn send_to_client(&self, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = self.tx.send(json) {
                    tracing::error!("Failed to push message to client (session {}): {}", self.id, e);
                }
            }
            Err(e) => {
                tracing::error!("Failed to serialize ServerMessage (session {}): {}", self.id, e);
            }
        }
    }

    fn send_error(&self, message: &str) {
        self.send_to_client(&ServerMessage::Error { message: message.to_string() });
    }

    fn require_auth(&self) -> Option<Uuid> {
        if self.user_id.is_none() {
            self.send_error("You must authenticate first");
            tracing::warn!("Session {} not authenticated, request rejected", self.id);
        }
        self.user_id
    }

    fn handle_client_message(&mut self, msg: &ClientMessage) {
        match msg {
            ClientMessage::Auth { token } => self.handle_auth(token),
            ClientMessage::JoinRoom { room_id } => self.handle_join_room(*room_id),
            ClientMessage::LeaveRoom { room_id } => self.handle_leave_room(*room_id),
            ClientMessage::Ping => self.send_to_client(&ServerMessage::Pong),
        }
    }

    fn handle_auth(&mut self, token: &str) {
        if self.user_id.is_some() {
            self.send_error("Session is already authenticated");
            return;
        }

        let claims = match Claims::decode(token, ENV.jwt_secret.as_ref()) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("JWT verification failed (session {}): {}", self.id, e);
                self.send_to_client(&ServerMessage::AuthFailed {
                    reason: "Invalid or expired token".to_string(),
                });
                return;
            }
        };

        if claims._type.as_ref() != Some(&TypeClaims::AccessToken) {
            self.send_to_client(&ServerMessage::AuthFailed {
                reason: "Only access tokens are accepted".to_string(),
            });
            return;
        }

        let user_id = claims.sub;
        self.user_id = Some(user_id);
        self.server.do_send(Authenticate { session_id: self.id, user_id });
        self.send_to_client(&ServerMessage::AuthSuccess { user_id });

        tracing::info!("User {} authenticated on session {}", user_id, self.id);
    }

    fn handle_join_room(&self, room_id: Uuid) {
        let Some(user_id) = self.require_auth() else {
            return;
        };

        self.server.do_send(JoinRoom { user_id, room_id });
    }

    fn handle_leave_room(&self, room_id: Uuid) {
        let Some(user_id) = self.require_auth() else {
            return;
        };

        self.server.do_send(LeaveRoom { user_id, room_id });
    }
}

impl Actor for WebSocketSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session started: {}", self.id);
        self.server.do_send(Connect { id: self.id, addr: ctx.address() });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session stopped: {}", self.id);
        self.server.do_send(Disconnect { id: self.id });
    }
}

impl Message for ClientMessage {
    type Result = ();
}

impl Handler<ClientMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ClientMessage, _ctx: &mut Context<Self>) {
        self.handle_client_message(&msg);
    }
}

/// Server actor pushes land here, get serialized and go out over the
/// channel to the client socket.
impl Handler<ServerMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, _ctx: &mut Context<Self>) {
        self.send_to_client(&msg);
    }
}
