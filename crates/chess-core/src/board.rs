//! Flat 64-cell board with an undo log for trial moves.

use std::fmt;

use crate::error::ParseError;
use crate::piece::{placement_char, Piece, PieceType};
use crate::square::{Color, Square};

/// Board field of the standard starting position, rank 8 first.
pub const STANDARD_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Piece>; 64],
}

/// Cells overwritten by a trial move, in the order they were touched.
/// A move touches at most four cells (castling).
#[derive(Debug, Default)]
pub struct UndoLog {
    entries: [Option<(Square, Option<Piece>)>; 4],
    len: usize,
}

impl UndoLog {
    fn push(&mut self, square: Square, previous: Option<Piece>) {
        debug_assert!(self.len < self.entries.len(), "undo log overflow");
        if self.len < self.entries.len() {
            self.entries[self.len] = Some((square, previous));
            self.len += 1;
        }
    }
}

impl Board {
    pub fn empty() -> Self {
        Self { cells: [None; 64] }
    }

    pub fn standard() -> Self {
        let mut board = Self::empty();
        for (file, kind) in BACK_RANK.into_iter().enumerate() {
            let file = file as u8;
            board.put(Square::new(0, file), Piece::new(kind, Color::White));
            board.put(Square::new(1, file), Piece::new(PieceType::Pawn, Color::White));
            board.put(Square::new(6, file), Piece::new(PieceType::Pawn, Color::Black));
            board.put(Square::new(7, file), Piece::new(kind, Color::Black));
        }
        board
    }

    fn put(&mut self, square: Option<Square>, piece: Piece) {
        if let Some(sq) = square {
            self.cells[sq.index()] = Some(piece);
        }
    }

    /// Parse a FEN-style board field. Letters follow [`PieceType::code`],
    /// uppercase for white.
    ///
    /// Moved flags are inferred: pawns off their home rank, and kings or rooks
    /// off their home squares, count as moved.
    pub fn from_placement(placement: &str) -> Result<Self, ParseError> {
        let rows: Vec<&str> = placement.trim().split('/').collect();
        if rows.len() != 8 {
            return Err(ParseError::Placement(format!(
                "expected 8 ranks, found {}",
                rows.len()
            )));
        }

        let mut board = Self::empty();
        for (i, row) in rows.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file: u8 = 0;
            for c in row.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file = file
                        .checked_add(skip as u8)
                        .filter(|&f| f <= 8)
                        .ok_or_else(|| {
                            ParseError::Placement(format!("rank {} is too long", rank + 1))
                        })?;
                    continue;
                }
                let kind = PieceType::from_code(c).ok_or_else(|| {
                    ParseError::Placement(format!("unknown piece letter {c:?}"))
                })?;
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                let square = Square::new(rank, file).ok_or_else(|| {
                    ParseError::Placement(format!("rank {} is too long", rank + 1))
                })?;
                let mut piece = Piece::new(kind, color);
                piece.has_moved = !on_home_square(square, piece);
                board.set(square, Some(piece));
                file += 1;
            }
            if file != 8 {
                return Err(ParseError::Placement(format!(
                    "rank {} has {} files",
                    rank + 1,
                    file
                )));
            }
        }

        for color in Color::ALL {
            let kings = board
                .pieces_of(color)
                .filter(|(_, p)| p.kind == PieceType::King)
                .count();
            if kings > 1 {
                return Err(ParseError::Placement(format!("more than one {color} king")));
            }
        }
        Ok(board)
    }

    pub fn to_placement(&self) -> String {
        let mut out = String::new();
        for rank in (0..8u8).rev() {
            let mut gap = 0;
            for file in 0..8u8 {
                match Square::new(rank, file).and_then(|sq| self.get(sq)) {
                    Some(piece) => {
                        if gap > 0 {
                            out.push_str(&gap.to_string());
                            gap = 0;
                        }
                        out.push(placement_char(piece.color, piece.kind));
                    }
                    None => gap += 1,
                }
            }
            if gap > 0 {
                out.push_str(&gap.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }

    pub fn get(&self, square: Square) -> Option<Piece> {
        self.cells[square.index()]
    }

    pub fn get_mut(&mut self, square: Square) -> Option<&mut Piece> {
        self.cells[square.index()].as_mut()
    }

    /// Overwrite a cell, returning what was there.
    pub fn set(&mut self, square: Square, piece: Option<Piece>) -> Option<Piece> {
        std::mem::replace(&mut self.cells[square.index()], piece)
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.cells[square.index()].is_none()
    }

    /// Same as [`Board::set`], but remembers the old value in `log`.
    pub fn set_logged(&mut self, square: Square, piece: Option<Piece>, log: &mut UndoLog) {
        let previous = self.set(square, piece);
        log.push(square, previous);
    }

    /// Restore every cell recorded in `log`, newest first.
    pub fn revert(&mut self, log: UndoLog) {
        for (square, previous) in log.entries[..log.len].iter().rev().flatten() {
            self.cells[square.index()] = *previous;
        }
    }

    /// Occupied squares in index order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| Some((Square::from_index(i)?, (*cell)?)))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|(_, p)| p.kind == PieceType::King)
            .map(|(sq, _)| sq)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

fn on_home_square(square: Square, piece: Piece) -> bool {
    let back = match piece.color {
        Color::White => 0,
        Color::Black => 7,
    };
    match piece.kind {
        PieceType::Pawn => square.rank() as i8 == back as i8 + piece.color.forward(),
        PieceType::King => square.rank() == back && square.file() == 4,
        PieceType::Rook => square.rank() == back && (square.file() == 0 || square.file() == 7),
        _ => true,
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  a b c d e f g h")?;
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                match Square::new(rank, file).and_then(|sq| self.get(sq)) {
                    Some(piece) => write!(f, "{} ", piece.symbol())?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f, "{}", rank + 1)?;
        }
        write!(f, "  a b c d e f g h")
    }
}
