//! Waiting queue and registry of live matches.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chess_core::Color;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::ids::{PlayerId, SessionId};
use crate::protocol::ServerMessage;
use crate::session::{spawn_match, MatchHandle, MatchSettings, Participant};

/// Where a paired player ended up.
#[derive(Debug, Clone)]
pub struct Seat {
    pub color: Color,
    pub handle: MatchHandle,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub white: PlayerId,
    pub black: PlayerId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LobbySummary {
    pub waiting: usize,
    pub sessions: Vec<SessionInfo>,
}

struct Waiting {
    player: PlayerId,
    outbox: mpsc::UnboundedSender<ServerMessage>,
    seat_tx: oneshot::Sender<Seat>,
}

impl Waiting {
    fn is_gone(&self) -> bool {
        self.outbox.is_closed() || self.seat_tx.is_closed()
    }
}

#[derive(Default)]
struct LobbyState {
    waiting: VecDeque<Waiting>,
    sessions: HashMap<SessionId, SessionInfo>,
}

pub struct Lobby {
    settings: MatchSettings,
    inner: Mutex<LobbyState>,
}

impl Lobby {
    pub fn new(settings: MatchSettings) -> Arc<Self> {
        Arc::new(Self {
            settings,
            inner: Mutex::new(LobbyState::default()),
        })
    }

    /// Queue `player`. The receiver resolves once an opponent is found;
    /// the earlier arrival plays white.
    pub async fn join(
        self: &Arc<Self>,
        player: PlayerId,
        outbox: mpsc::UnboundedSender<ServerMessage>,
    ) -> oneshot::Receiver<Seat> {
        let (seat_tx, seat_rx) = oneshot::channel();
        let _ = outbox.send(ServerMessage::Waiting);

        let mut state = self.inner.lock().await;
        state.waiting.retain(|w| !w.is_gone());
        state.waiting.push_back(Waiting {
            player,
            outbox,
            seat_tx,
        });
        tracing::info!(player = %player, waiting = state.waiting.len(), "Player joined lobby");

        while state.waiting.len() >= 2 {
            let (Some(white), Some(black)) = (state.waiting.pop_front(), state.waiting.pop_front())
            else {
                break;
            };
            self.start_match(&mut state, white, black);
        }
        seat_rx
    }

    /// Drop `player` from the queue if still waiting.
    pub async fn leave(&self, player: PlayerId) {
        let mut state = self.inner.lock().await;
        let before = state.waiting.len();
        state.waiting.retain(|w| w.player != player);
        if state.waiting.len() < before {
            tracing::info!(player = %player, "Player left lobby");
        }
    }

    /// Disconnect of a player who never picked up a seat. A seat handed out
    /// after the socket closed forfeits that match.
    pub async fn abandon(&self, player: PlayerId, mut seat_rx: oneshot::Receiver<Seat>) {
        self.leave(player).await;
        seat_rx.close();
        if let Ok(seat) = seat_rx.try_recv() {
            tracing::info!(player = %player, session_id = %seat.handle.id(), "Seated player already gone, resigning");
            let _ = seat.handle.resign(player);
        }
    }

    pub async fn summary(&self) -> LobbySummary {
        let state = self.inner.lock().await;
        let mut sessions: Vec<SessionInfo> = state.sessions.values().cloned().collect();
        sessions.sort_by_key(|s| s.created_at);
        LobbySummary {
            waiting: state.waiting.len(),
            sessions,
        }
    }

    pub async fn session(&self, id: SessionId) -> Option<SessionInfo> {
        self.inner.lock().await.sessions.get(&id).cloned()
    }

    fn start_match(self: &Arc<Self>, state: &mut LobbyState, white: Waiting, black: Waiting) {
        let id = SessionId::new();
        let info = SessionInfo {
            id,
            white: white.player,
            black: black.player,
            created_at: Utc::now(),
        };
        let (handle, task) = spawn_match(
            id,
            Participant {
                player: white.player,
                outbox: white.outbox,
            },
            Participant {
                player: black.player,
                outbox: black.outbox,
            },
            &self.settings,
        );
        state.sessions.insert(id, info);

        for (seat_tx, player, color) in [
            (white.seat_tx, white.player, Color::White),
            (black.seat_tx, black.player, Color::Black),
        ] {
            let seat = Seat {
                color,
                handle: handle.clone(),
            };
            if seat_tx.send(seat).is_err() {
                // Gone between pairing and seating: forfeit.
                let _ = handle.resign(player);
            }
        }

        let lobby = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = task.await {
                tracing::error!(session_id = %id, "Match task failed: {e}");
            }
            lobby.inner.lock().await.sessions.remove(&id);
        });
    }
}
