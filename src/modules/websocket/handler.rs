/// WebSocket HTTP handler.
///
/// Handles the HTTP upgrade and the bidirectional message flow:
/// - Inbound:  client -> WebSocket -> parse ClientMessage -> session actor
/// - Outbound: server actor -> session actor -> mpsc channel -> WebSocket
use actix::{Actor, Addr};
use actix_web::{Error, HttpRequest, HttpResponse, web};
use actix_ws::Message;
use tokio::sync::mpsc;

use super::message::ClientMessage;
use super::server::WebSocketServer;
use super::session::WebSocketSession;

/// GET /ws: upgrade the connection and run the message loop until
/// either side closes.
pub async fn websocket_handler(
    req: HttpRequest,
    stream: web::Payload,
    server: web::Data<Addr<WebSocketServer>>,
) -> Result<HttpResponse, Error> {
    tracing::debug!("WebSocket upgrade request from {:?}", req.peer_addr());

    let (response, mut ws_session, mut msg_stream) = actix_ws::handle(&req, stream)?;

    // Session actor sends JSON through this channel; the spawned task
    // forwards it onto the socket.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let addr = WebSocketSession::new(server.get_ref().clone(), tx).start();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                msg = msg_stream.recv() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let text_str = text.to_string();

                            match serde_json::from_str::<ClientMessage>(&text_str) {
                                Ok(client_msg) => addr.do_send(client_msg),
                                Err(e) => {
                                    tracing::warn!(
                                        "Unparseable client message: {} - raw: {}",
                                        e,
                                        &text_str[..100.min(text_str.len())]
                                    );
                                }
                            }
                        }

                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = ws_session.pong(&data).await {
                                tracing::error!("Failed to send pong: {}", e);
                                break;
                            }
                        }

                        Some(Ok(Message::Pong(_))) => {}

                        Some(Ok(Message::Close(reason))) => {
                            tracing::info!("WebSocket close frame: {:?}", reason);
                            break;
                        }

                        Some(Ok(Message::Binary(_))) => {
                            tracing::warn!("Binary messages are not supported");
                        }

                        Some(Ok(Message::Continuation(_) | Message::Nop)) => {}

                        Some(Err(e)) => {
                            tracing::error!("WebSocket protocol error: {}", e);
                            break;
                        }

                        None => break,
                    }
                }

                Some(json) = rx.recv() => {
                    if ws_session.text(json).await.is_err() {
                        tracing::error!("Failed to write to WebSocket client");
                        break;
                    }
                }
            }
        }

        let _ = ws_session.close(None).await;
        tracing::debug!("WebSocket message loop finished");
    });

    Ok(response)
}
