/// WebSocket server actor.
///
/// Owns the realtime state: every live session, which sessions belong
/// to which user, and which users are subscribed to which room. All
/// routing of server-pushed messages goes through here.
use actix::prelude::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::events::*;
use super::message::ServerMessage;
use super::session::WebSocketSession;

pub struct WebSocketServer {
    /// session_id -> session actor address
    sessions: HashMap<Uuid, Addr<WebSocketSession>>,

    /// user_id -> session_ids; a user may be connected from several
    /// devices at once
    users: HashMap<Uuid, HashSet<Uuid>>,

    /// room_id -> user_ids currently joined
    rooms: HashMap<Uuid, HashSet<Uuid>>,
}

impl WebSocketServer {
    pub fn new() -> Self {
        Self { sessions: HashMap::new(), users: HashMap::new(), rooms: HashMap::new() }
    }

    fn send_to_session(&self, session_id: &Uuid, message: ServerMessage) {
        if let Some(session_addr) = self.sessions.get(session_id) {
            session_addr.do_send(message);
        }
    }

}

impl Actor for WebSocketServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server stopped");
    }
}

impl Handler<Connect> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        tracing::debug!("New WebSocket session connected: {}", msg.id);
        self.sessions.insert(msg.id, msg.addr);
    }
}

impl Handler<Disconnect> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        tracing::debug!("WebSocket session disconnected: {}", msg.id);

        self.sessions.remove(&msg.id);

        // Detach the session from its user; drop the user entirely when
        // this was their last session.
        let mut user_to_remove: Option<Uuid> = None;
        for (&user_id, sessions) in self.users.iter_mut() {
            if sessions.remove(&msg.id) {
                if sessions.is_empty() {
                    user_to_remove = Some(user_id);
                }
                break;
            }
        }

        if let Some(user_id) = user_to_remove {
            self.users.remove(&user_id);

            for room_users in self.rooms.values_mut() {
                room_users.remove(&user_id);
            }
            self.rooms.retain(|_, users| !users.is_empty());

            tracing::info!("User {} fully disconnected, removed from all rooms", user_id);
        }
    }
}

impl Handler<Authenticate> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Authenticate, _: &mut Context<Self>) {
        let sessions = self.users.entry(msg.user_id).or_default();
        sessions.insert(msg.session_id);

        tracing::info!("User {} now has {} active session(s)", msg.user_id, sessions.len());
    }
}

impl Handler<JoinRoom> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: JoinRoom, _: &mut Context<Self>) {
        self.rooms.entry(msg.room_id).or_default().insert(msg.user_id);

        tracing::debug!(
            "User {} joined room {} ({} users in room)",
            msg.user_id,
            msg.room_id,
            self.rooms.get(&msg.room_id).map_or(0, HashSet::len)
        );
    }
}

impl Handler<LeaveRoom> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: LeaveRoom, _: &mut Context<Self>) {
        if let Some(room) = self.rooms.get_mut(&msg.room_id) {
            room.remove(&msg.user_id);

            tracing::debug!(
                "User {} left room {} ({} users remaining)",
                msg.user_id,
                msg.room_id,
                room.len()
            );

            if room.is_empty() {
                self.rooms.remove(&msg.room_id);
            }
        }
    }
}

impl Handler<BroadcastToRoom> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: BroadcastToRoom, _: &mut Context<Self>) {
        let Some(room_users) = self.rooms.get(&msg.room_id) else {
            tracing::debug!("Broadcast to room {} with no joined users", msg.room_id);
            return;
        };

        let mut sent_count = 0;
        for &user_id in room_users {
            if msg.skip_user_id == Some(user_id) {
                continue;
            }

            if let Some(session_ids) = self.users.get(&user_id) {
                for session_id in session_ids {
                    self.send_to_session(session_id, msg.message.clone());
                    sent_count += 1;
                }
            }
        }

        tracing::debug!("Broadcast to room {}: sent to {} sessions", msg.room_id, sent_count);
    }
}

impl Message for ServerMessage {
    type Result = ();
}

impl Default for WebSocketServer {
    fn default() -> Self {
        Self::new()
    }
}
