//! Engine error types

use thiserror::Error;

use crate::piece::PieceType;
use crate::square::{Color, Square};

/// Why a move was refused. The game is left untouched in every case.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("No piece on {0}")]
    EmptySquare(Square),

    #[error("It is {expected}'s turn")]
    WrongMover { expected: Color },

    #[error("Illegal move {from}{to}")]
    IllegalDestination { from: Square, to: Square },

    #[error("Cannot promote to {0}")]
    InvalidPromotion(PieceType),
}

/// Text that could not be turned into a square, piece or position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid square: {0:?}")]
    Square(String),

    #[error("Unknown piece type: {0:?}")]
    PieceType(String),

    #[error("Invalid placement: {0}")]
    Placement(String),

    #[error("Invalid move notation: {0:?}")]
    Move(String),
}
