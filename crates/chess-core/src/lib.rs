//! Rule engine for two-player chess with optional fairy pieces.

pub mod board;
pub mod chess_move;
pub mod error;
pub mod game;
pub mod movement;
pub mod piece;
pub mod square;

pub use board::{Board, STANDARD_PLACEMENT};
pub use chess_move::{parse_long_algebraic, Move};
pub use error::{MoveError, ParseError};
pub use game::{DestinationMap, Game, GameOptions, Outcome};
pub use piece::{Piece, PieceType};
pub use square::{Color, Square};
