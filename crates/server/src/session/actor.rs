//! One tokio task per match. Moves, alarms and resignations all arrive on
//! the same channel, so they are applied strictly one after another.

use chess_core::{Color, PieceType, Square};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{sleep_until, Instant};

use super::snapshot::board_state;
use super::state::{GameResult, MatchEvent, MatchState};
use super::MatchSettings;
use crate::ids::{PlayerId, SessionId};
use crate::protocol::ServerMessage;

#[derive(Debug)]
pub enum MatchCommand {
    SubmitMove {
        player: PlayerId,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    },
    AlarmFired {
        color: Color,
        generation: u64,
    },
    Resign {
        player: PlayerId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Session {0} has ended")]
    Closed(SessionId),
}

/// Cheap to clone; every clone feeds the same actor.
#[derive(Debug, Clone)]
pub struct MatchHandle {
    id: SessionId,
    tx: mpsc::UnboundedSender<MatchCommand>,
}

impl MatchHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn submit_move(
        &self,
        player: PlayerId,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> Result<(), SessionError> {
        self.send(MatchCommand::SubmitMove {
            player,
            from,
            to,
            promotion,
        })
    }

    pub fn tick_alarm(&self, color: Color, generation: u64) -> Result<(), SessionError> {
        self.send(MatchCommand::AlarmFired { color, generation })
    }

    pub fn resign(&self, player: PlayerId) -> Result<(), SessionError> {
        self.send(MatchCommand::Resign { player })
    }

    fn send(&self, command: MatchCommand) -> Result<(), SessionError> {
        self.tx
            .send(command)
            .map_err(|_| SessionError::Closed(self.id))
    }
}

/// A seat at the board and where its messages go.
#[derive(Debug)]
pub struct Participant {
    pub player: PlayerId,
    pub outbox: mpsc::UnboundedSender<ServerMessage>,
}

struct ArmedAlarm {
    generation: u64,
    task: AbortHandle,
}

struct MatchActor {
    state: MatchState,
    seats: [Participant; 2],
    rx: mpsc::UnboundedReceiver<MatchCommand>,
    // Weak so pending alarms alone never keep an abandoned match alive.
    alarm_tx: mpsc::WeakUnboundedSender<MatchCommand>,
    armed: Option<ArmedAlarm>,
}

/// Start a match with `white` to move. The task resolves to the result,
/// or `None` if every handle was dropped before the game ended.
pub fn spawn_match(
    id: SessionId,
    white: Participant,
    black: Participant,
    settings: &MatchSettings,
) -> (MatchHandle, JoinHandle<Option<GameResult>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let state = MatchState::new(id, white.player, black.player, settings, Instant::now());
    let actor = MatchActor {
        state,
        seats: [white, black],
        rx,
        alarm_tx: tx.downgrade(),
        armed: None,
    };
    let task = tokio::spawn(actor.run());
    (MatchHandle { id, tx }, task)
}

impl MatchActor {
    async fn run(mut self) -> Option<GameResult> {
        let id = self.state.id();
        tracing::info!(
            session_id = %id,
            white = %self.state.player(Color::White),
            black = %self.state.player(Color::Black),
            "Match started"
        );

        for color in Color::ALL {
            self.send(color, ServerMessage::MatchFound { session_id: id, color });
        }
        self.broadcast_board(Instant::now());
        if let Some(result) = self.state.result() {
            self.broadcast_result(result);
        }
        self.arm_alarm();

        while !self.state.is_terminal() {
            let Some(command) = self.rx.recv().await else {
                break;
            };
            let now = Instant::now();
            let events = match command {
                MatchCommand::SubmitMove {
                    player,
                    from,
                    to,
                    promotion,
                } => self.state.submit_move(player, from, to, promotion, now),
                MatchCommand::AlarmFired { color, generation } => {
                    let events = self.state.tick_alarm(color, generation);
                    if events.is_empty() {
                        tracing::debug!(session_id = %id, color = %color, generation, "Discarded stale alarm");
                    }
                    events
                }
                MatchCommand::Resign { player } => self.state.resign(player),
            };
            self.dispatch(events, now);
            self.arm_alarm();
        }

        self.disarm();
        match self.state.result() {
            Some(result) => tracing::info!(session_id = %id, %result, "Match finished"),
            None => tracing::info!(session_id = %id, "Match abandoned"),
        }
        self.state.result()
    }

    fn dispatch(&mut self, events: Vec<MatchEvent>, now: Instant) {
        let id = self.state.id();
        let mut board_changed = false;
        let mut finished = None;

        for event in events {
            match event {
                MatchEvent::Committed { mv, source } => {
                    tracing::debug!(session_id = %id, mv = %mv, ?source, "Move committed");
                    board_changed = true;
                }
                MatchEvent::PremoveQueued { color, premove } => {
                    self.send(
                        color,
                        ServerMessage::PremoveQueued {
                            from: premove.from,
                            to: premove.to,
                            promotion: premove.promotion,
                        },
                    );
                }
                MatchEvent::PremoveDropped { color, reason } => {
                    tracing::debug!(session_id = %id, color = %color, %reason, "Premove dropped");
                    self.send(color, ServerMessage::error(format!("Premove failed: {reason}")));
                }
                MatchEvent::Rejected { color, reason } => {
                    tracing::debug!(session_id = %id, color = %color, %reason, "Move rejected");
                    self.send(color, ServerMessage::error(reason));
                }
                MatchEvent::Finished(result) => finished = Some(result),
            }
        }

        if board_changed || finished.is_some() {
            self.broadcast_board(now);
        }
        if let Some(result) = finished {
            self.broadcast_result(result);
        }
    }

    fn broadcast_result(&self, result: GameResult) {
        for color in Color::ALL {
            self.send(
                color,
                ServerMessage::GameOver {
                    result: result.to_string(),
                    winner: result.winner(),
                    is_checkmate: matches!(result, GameResult::Checkmate { .. }),
                    is_stalemate: matches!(result, GameResult::Stalemate),
                },
            );
        }
    }

    fn broadcast_board(&self, now: Instant) {
        for color in Color::ALL {
            let view = board_state(&self.state, color, now);
            self.send(color, ServerMessage::BoardState(Box::new(view)));
        }
    }

    fn send(&self, color: Color, message: ServerMessage) {
        if self.seats[color.index()].outbox.send(message).is_err() {
            tracing::warn!(session_id = %self.state.id(), color = %color, "Seat outbox closed, dropping message");
        }
    }

    /// Keep exactly one sleeper armed, for the clock's current generation.
    fn arm_alarm(&mut self) {
        let wanted = self.state.pending_alarm();
        if let (Some(armed), Some(alarm)) = (&self.armed, wanted) {
            if armed.generation == alarm.generation {
                return;
            }
        }
        self.disarm();

        let Some(alarm) = wanted else {
            return;
        };
        let tx = self.alarm_tx.clone();
        let task = tokio::spawn(async move {
            sleep_until(alarm.deadline).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(MatchCommand::AlarmFired {
                    color: alarm.color,
                    generation: alarm.generation,
                });
            }
        });
        self.armed = Some(ArmedAlarm {
            generation: alarm.generation,
            task: task.abort_handle(),
        });
    }

    fn disarm(&mut self) {
        if let Some(armed) = self.armed.take() {
            armed.task.abort();
        }
    }
}
