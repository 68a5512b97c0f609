//! Synchronous match state machine. The actor feeds it one command at a time
//! and relays the events it returns.

use std::fmt;

use chess_core::{Color, Game, Move, Outcome, PieceType, Square};
use serde::Serialize;
use tokio::time::Instant;

use super::clock::{Alarm, MoveSource, SessionClock};
use super::premove::{Premove, PremoveSlots};
use super::MatchSettings;
use crate::ids::{PlayerId, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GameResult {
    Checkmate { winner: Color },
    Stalemate,
    Timeout { winner: Color },
    Resignation { winner: Color },
}

impl GameResult {
    pub fn winner(&self) -> Option<Color> {
        match *self {
            Self::Checkmate { winner } | Self::Timeout { winner } | Self::Resignation { winner } => {
                Some(winner)
            }
            Self::Stalemate => None,
        }
    }
}

impl From<Outcome> for GameResult {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Checkmate { winner } => Self::Checkmate { winner },
            Outcome::Stalemate => Self::Stalemate,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkmate { winner } => write!(f, "{winner} wins by checkmate"),
            Self::Stalemate => f.write_str("draw by stalemate"),
            Self::Timeout { winner } => write!(f, "{winner} wins on time"),
            Self::Resignation { winner } => write!(f, "{winner} wins by resignation"),
        }
    }
}

/// Something the seats need to hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvent {
    Committed { mv: Move, source: MoveSource },
    PremoveQueued { color: Color, premove: Premove },
    PremoveDropped { color: Color, reason: String },
    Rejected { color: Color, reason: String },
    Finished(GameResult),
}

#[derive(Debug)]
pub struct MatchState {
    id: SessionId,
    players: [PlayerId; 2],
    game: Game,
    clock: SessionClock,
    premoves: PremoveSlots,
    result: Option<GameResult>,
}

impl MatchState {
    /// Set up the board and start the clock of the side to move. A start
    /// position that is already mate or stalemate is terminal from the outset.
    pub fn new(
        id: SessionId,
        white: PlayerId,
        black: PlayerId,
        settings: &MatchSettings,
        now: Instant,
    ) -> Self {
        let game = Game::from_board(settings.start_board.clone(), Color::White, settings.options);
        let result = game.outcome().map(GameResult::from);
        let mut clock = SessionClock::new(settings.clock, now);
        if result.is_none() {
            clock.start(game.current_turn(), now);
        }
        Self {
            id,
            players: [white, black],
            game,
            clock,
            premoves: PremoveSlots::default(),
            result,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn player(&self, color: Color) -> PlayerId {
        self.players[color.index()]
    }

    pub fn color_of(&self, player: PlayerId) -> Option<Color> {
        Color::ALL
            .into_iter()
            .find(|&color| self.players[color.index()] == player)
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn pending_premove(&self, color: Color) -> Option<Premove> {
        self.premoves.get(color)
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn is_terminal(&self) -> bool {
        self.result.is_some()
    }

    pub fn pending_alarm(&self) -> Option<Alarm> {
        if self.is_terminal() {
            return None;
        }
        self.clock.pending_alarm()
    }

    /// A move from either seat. On turn it is played now, off turn it is
    /// queued as that seat's premove.
    pub fn submit_move(
        &mut self,
        player: PlayerId,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
        now: Instant,
    ) -> Vec<MatchEvent> {
        let mut events = Vec::new();
        if self.is_terminal() {
            return events;
        }
        let Some(color) = self.color_of(player) else {
            return events;
        };

        if color != self.game.current_turn() {
            match self.game.piece_at(from) {
                Some(piece) if piece.color == color => {
                    let premove = Premove {
                        from,
                        to,
                        promotion,
                    };
                    self.premoves.set(color, premove);
                    events.push(MatchEvent::PremoveQueued { color, premove });
                }
                _ => events.push(MatchEvent::Rejected {
                    color,
                    reason: format!("No piece of yours on {from}"),
                }),
            }
            return events;
        }

        match self.game.apply(from, to, promotion) {
            Ok(mv) => {
                self.commit(color, mv, MoveSource::Player, now, &mut events);
                if !self.is_terminal() {
                    self.play_premove(now, &mut events);
                }
            }
            Err(e) => events.push(MatchEvent::Rejected {
                color,
                reason: e.to_string(),
            }),
        }
        events
    }

    /// A clock alarm for `color`. Stale generations and late alarms do nothing.
    pub fn tick_alarm(&mut self, color: Color, generation: u64) -> Vec<MatchEvent> {
        let mut events = Vec::new();
        if self.is_terminal() || !self.clock.expire(color, generation) {
            return events;
        }
        self.finish(
            GameResult::Timeout {
                winner: color.opposite(),
            },
            &mut events,
        );
        events
    }

    pub fn resign(&mut self, player: PlayerId) -> Vec<MatchEvent> {
        let mut events = Vec::new();
        if self.is_terminal() {
            return events;
        }
        if let Some(color) = self.color_of(player) {
            self.finish(
                GameResult::Resignation {
                    winner: color.opposite(),
                },
                &mut events,
            );
        }
        events
    }

    fn commit(
        &mut self,
        color: Color,
        mv: Move,
        source: MoveSource,
        now: Instant,
        events: &mut Vec<MatchEvent>,
    ) {
        self.clock.charge(color, now, source);
        events.push(MatchEvent::Committed { mv, source });
        match self.game.outcome() {
            Some(outcome) => self.finish(outcome.into(), events),
            None => {
                self.clock.start(self.game.current_turn(), now);
            }
        }
    }

    // At most one premove per player commit; its own commit never chains.
    fn play_premove(&mut self, now: Instant, events: &mut Vec<MatchEvent>) {
        let color = self.game.current_turn();
        let Some(premove) = self.premoves.take(color) else {
            return;
        };
        match self.game.apply(premove.from, premove.to, premove.promotion) {
            Ok(mv) => self.commit(color, mv, MoveSource::Premove, now, events),
            Err(e) => events.push(MatchEvent::PremoveDropped {
                color,
                reason: e.to_string(),
            }),
        }
    }

    fn finish(&mut self, result: GameResult, events: &mut Vec<MatchEvent>) {
        self.result = Some(result);
        self.clock.stop();
        self.premoves.clear();
        events.push(MatchEvent::Finished(result));
    }
}
