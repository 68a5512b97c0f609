//! Piece types, including the fairy catalogue.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::square::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
    Mann,
    Elephant,
    Giraffe,
    Unicorn,
    Centaur,
    Champion,
    Wizard,
    Amazon,
    Dragon,
    Zebra,
    Chancellor,
    Archbishop,
    Ship,
}

impl PieceType {
    pub const ALL: [PieceType; 19] = [
        PieceType::Pawn,
        PieceType::Rook,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Queen,
        PieceType::King,
        PieceType::Mann,
        PieceType::Elephant,
        PieceType::Giraffe,
        PieceType::Unicorn,
        PieceType::Centaur,
        PieceType::Champion,
        PieceType::Wizard,
        PieceType::Amazon,
        PieceType::Dragon,
        PieceType::Zebra,
        PieceType::Chancellor,
        PieceType::Archbishop,
        PieceType::Ship,
    ];

    /// Lowercase name used on the wire ("queen", "giraffe", ...).
    pub fn token(self) -> &'static str {
        match self {
            PieceType::Pawn => "pawn",
            PieceType::Rook => "rook",
            PieceType::Knight => "knight",
            PieceType::Bishop => "bishop",
            PieceType::Queen => "queen",
            PieceType::King => "king",
            PieceType::Mann => "mann",
            PieceType::Elephant => "elephant",
            PieceType::Giraffe => "giraffe",
            PieceType::Unicorn => "unicorn",
            PieceType::Centaur => "centaur",
            PieceType::Champion => "champion",
            PieceType::Wizard => "wizard",
            PieceType::Amazon => "amazon",
            PieceType::Dragon => "dragon",
            PieceType::Zebra => "zebra",
            PieceType::Chancellor => "chancellor",
            PieceType::Archbishop => "archbishop",
            PieceType::Ship => "ship",
        }
    }

    /// Lowercase letter used in placement strings and move notation.
    pub fn code(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Rook => 'r',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
            PieceType::Mann => 'x',
            PieceType::Elephant => 'e',
            PieceType::Giraffe => 'g',
            PieceType::Unicorn => 'i',
            PieceType::Centaur => 'u',
            PieceType::Champion => 'h',
            PieceType::Wizard => 'w',
            PieceType::Amazon => 'm',
            PieceType::Dragon => 'd',
            PieceType::Zebra => 'z',
            PieceType::Chancellor => 'c',
            PieceType::Archbishop => 'a',
            PieceType::Ship => 's',
        }
    }

    pub fn from_code(c: char) -> Option<Self> {
        let lower = c.to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.code() == lower)
    }

    pub fn is_fairy(self) -> bool {
        !matches!(
            self,
            PieceType::Pawn
                | PieceType::Rook
                | PieceType::Knight
                | PieceType::Bishop
                | PieceType::Queen
                | PieceType::King
        )
    }

    /// A pawn may turn into anything except another pawn or a king.
    pub fn is_promotable(self) -> bool {
        !matches!(self, PieceType::Pawn | PieceType::King)
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for PieceType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.token() == s)
            .ok_or_else(|| ParseError::PieceType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Piece {
    pub kind: PieceType,
    pub color: Color,
    pub has_moved: bool,
}

impl Piece {
    pub fn new(kind: PieceType, color: Color) -> Self {
        Self {
            kind,
            color,
            has_moved: false,
        }
    }

    /// Board glyph: unicode figurines for the standard set, the placement
    /// letter (uppercase for white) for fairy pieces.
    pub fn symbol(self) -> char {
        match (self.color, self.kind) {
            (Color::White, PieceType::King) => '♔',
            (Color::White, PieceType::Queen) => '♕',
            (Color::White, PieceType::Rook) => '♖',
            (Color::White, PieceType::Bishop) => '♗',
            (Color::White, PieceType::Knight) => '♘',
            (Color::White, PieceType::Pawn) => '♙',
            (Color::Black, PieceType::King) => '♚',
            (Color::Black, PieceType::Queen) => '♛',
            (Color::Black, PieceType::Rook) => '♜',
            (Color::Black, PieceType::Bishop) => '♝',
            (Color::Black, PieceType::Knight) => '♞',
            (Color::Black, PieceType::Pawn) => '♟',
            (color, kind) => placement_char(color, kind),
        }
    }
}

/// Placement letter with case carrying the color.
pub fn placement_char(color: Color, kind: PieceType) -> char {
    match color {
        Color::White => kind.code().to_ascii_uppercase(),
        Color::Black => kind.code(),
    }
}
