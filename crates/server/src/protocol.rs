//! Websocket frames exchanged with players. Every frame carries a `type` tag.

use std::collections::BTreeMap;

use chess_core::{Color, Move, PieceType, Square};
use serde::{Deserialize, Serialize};

use crate::ids::SessionId;
use crate::session::Premove;

/// Client → Server messages
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Move {
        from: Square,
        to: Square,
        /// Piece token such as `"knight"` or `"giraffe"`. Absent means queen.
        #[serde(default)]
        promotion: Option<String>,
    },
    Resign,
}

/// Server → Client messages
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Waiting,
    MatchFound {
        session_id: SessionId,
        color: Color,
    },
    BoardState(Box<BoardState>),
    PremoveQueued {
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    },
    Error {
        message: String,
    },
    GameOver {
        result: String,
        winner: Option<Color>,
        is_checkmate: bool,
        is_stalemate: bool,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CellView {
    pub piece_type: PieceType,
    pub color: Color,
    pub symbol: char,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PerColor<T> {
    pub white: T,
    pub black: T,
}

impl<T> PerColor<T> {
    pub fn from_fn(mut f: impl FnMut(Color) -> T) -> Self {
        Self {
            white: f(Color::White),
            black: f(Color::Black),
        }
    }
}

/// Everything one seat needs to redraw its view of the match.
#[derive(Debug, Clone, Serialize)]
pub struct BoardState {
    pub session_id: SessionId,
    /// Keyed by `"rank,file"`.
    pub board: BTreeMap<String, CellView>,
    pub current_turn: Color,
    pub player_color: Color,
    /// Seconds left on each clock.
    pub time_remaining: PerColor<f64>,
    pub last_move: Option<LastMove>,
    pub in_check: PerColor<bool>,
    /// Legal destinations, only when it is this seat's turn.
    pub available_moves: BTreeMap<String, Vec<Square>>,
    /// Pseudo-legal destinations, only while this seat waits.
    pub premove_hints: BTreeMap<String, Vec<Square>>,
    /// Piece types taken by each color.
    pub captured: PerColor<Vec<PieceType>>,
    pub pending_premove: Option<Premove>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LastMove {
    pub notation: String,
    #[serde(flatten)]
    pub mv: Move,
}

impl From<&Move> for LastMove {
    fn from(mv: &Move) -> Self {
        Self {
            notation: mv.to_string(),
            mv: *mv,
        }
    }
}

pub fn square_key(square: Square) -> String {
    format!("{},{}", square.rank(), square.file())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Invalid message: {0}")]
    Malformed(String),

    #[error("Invalid promotion type: {0}")]
    UnknownPromotion(String),
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

/// Resolve a promotion token. Pawn and king never qualify.
pub fn parse_promotion(token: Option<&str>) -> Result<Option<PieceType>, ProtocolError> {
    let Some(token) = token else {
        return Ok(None);
    };
    token
        .trim()
        .to_ascii_lowercase()
        .parse::<PieceType>()
        .ok()
        .filter(|kind| kind.is_promotable())
        .map(Some)
        .ok_or_else(|| ProtocolError::UnknownPromotion(token.to_string()))
}
