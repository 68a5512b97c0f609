//! Committed move records and long algebraic notation ("e2e4", "e7e8q").

use std::fmt;

use serde::Serialize;

use crate::error::ParseError;
use crate::piece::{Piece, PieceType};
use crate::square::Square;

/// One committed ply. Appended to the game history, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    /// The mover as it stood before the move.
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub is_castling: bool,
    pub is_en_passant: bool,
    /// Only set when a pawn actually promoted.
    pub promotion: Option<PieceType>,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.code())?;
        }
        Ok(())
    }
}

/// Split long algebraic text into origin, destination and optional
/// promotion letter.
pub fn parse_long_algebraic(text: &str) -> Result<(Square, Square, Option<PieceType>), ParseError> {
    let text = text.trim();
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(ParseError::Move(text.to_string()));
    }
    let from: Square = text[0..2].parse()?;
    let to: Square = text[2..4].parse()?;
    let promotion = match text[4..].chars().next() {
        None => None,
        Some(c) => Some(
            PieceType::from_code(c)
                .filter(|k| k.is_promotable())
                .ok_or_else(|| ParseError::Move(text.to_string()))?,
        ),
    };
    Ok((from, to, promotion))
}
