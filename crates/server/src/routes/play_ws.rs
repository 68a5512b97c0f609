//! Websocket play route. One connection is one player: it waits in the
//! lobby, gets seated, then relays frames between the socket and its match.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    Extension,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::ids::PlayerId;
use crate::lobby::{Lobby, Seat};
use crate::protocol::{parse_promotion, ClientMessage, ServerMessage};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(lobby): Extension<Arc<Lobby>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, lobby))
}

async fn handle_socket(socket: WebSocket, lobby: Arc<Lobby>) {
    let (mut sender, mut receiver) = socket.split();
    let player = PlayerId::new();
    let (outbox, mut inbox) = mpsc::unbounded_channel::<ServerMessage>();

    let writer = tokio::spawn(async move {
        while let Some(msg) = inbox.recv().await {
            if let Err(e) = send_msg(&mut sender, &msg).await {
                tracing::warn!(player = %player, "Websocket send failed: {e}");
                break;
            }
        }
    });

    let mut seat_rx = lobby.join(player, outbox.clone()).await;
    let mut awaiting_seat = true;
    let mut seat: Option<Seat> = None;

    loop {
        tokio::select! {
            biased;

            assigned = &mut seat_rx, if awaiting_seat => {
                awaiting_seat = false;
                match assigned {
                    Ok(s) => {
                        tracing::info!(player = %player, session_id = %s.handle.id(), color = %s.color, "Player seated");
                        seat = Some(s);
                    }
                    Err(_) => break,
                }
            }
            frame = receiver.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(t))) => t.to_string(),
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                };
                if let Some(reply) = handle_frame(&text, player, seat.as_ref()) {
                    let _ = outbox.send(reply);
                }
            }
        }
    }

    match seat {
        Some(seat) => {
            tracing::info!(player = %player, session_id = %seat.handle.id(), "Player disconnected, resigning");
            let _ = seat.handle.resign(player);
        }
        None if awaiting_seat => lobby.abandon(player, seat_rx).await,
        None => lobby.leave(player).await,
    }
    writer.abort();
}

/// Route one client frame. Returns a reply only for input the match never sees.
fn handle_frame(text: &str, player: PlayerId, seat: Option<&Seat>) -> Option<ServerMessage> {
    let msg = match ClientMessage::parse(text) {
        Ok(m) => m,
        Err(e) => return Some(ServerMessage::error(e.to_string())),
    };
    let Some(seat) = seat else {
        return Some(ServerMessage::error("Waiting for an opponent"));
    };

    let sent = match msg {
        ClientMessage::Move {
            from,
            to,
            promotion,
        } => match parse_promotion(promotion.as_deref()) {
            Ok(promotion) => seat.handle.submit_move(player, from, to, promotion),
            Err(e) => return Some(ServerMessage::error(e.to_string())),
        },
        ClientMessage::Resign => seat.handle.resign(player),
    };
    sent.err().map(|e| ServerMessage::error(e.to_string()))
}

async fn send_msg(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<()> {
    let json = serde_json::to_string(msg)?;
    sender.send(Message::Text(json.into())).await?;
    Ok(())
}
