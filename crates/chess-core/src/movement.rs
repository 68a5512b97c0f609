//! Movement rule table.
//!
//! Every piece type maps to a [`Movement`]. Apart from pawns, a movement is a
//! static list of [`Step`] primitives: fixed-offset leaps and (optionally
//! bounded) slides. Compound pieces simply list several steps, so adding a
//! piece type is one new row in [`PieceType::movement`].
//!
//! All generators here are pseudo-legal: they respect occupancy and
//! own-color blocking but never look at check. Castling is the one exception
//! that consults the attack oracle, and it is only produced by
//! [`candidates`], never by [`attacks`].

use crate::board::Board;
use crate::piece::{Piece, PieceType};
use crate::square::{Color, Square};

/// (rank delta, file delta)
pub type Offset = (i8, i8);

#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Jump straight to each offset.
    Leap(&'static [Offset]),
    /// Repeat each offset until blocked. `max == 0` means unbounded.
    Slide(&'static [Offset], u8),
}

#[derive(Debug, Clone, Copy)]
pub enum Movement {
    Pawn,
    /// Like `Pattern`, plus castling.
    Royal(&'static [Step]),
    Pattern(&'static [Step]),
}

pub const ORTHOGONAL: &[Offset] = &[(0, 1), (0, -1), (1, 0), (-1, 0)];
pub const DIAGONAL: &[Offset] = &[(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const ALL_DIRECTIONS: &[Offset] = &[
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
pub const KNIGHT: &[Offset] = &[
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];
const CAMEL: &[Offset] = &[
    (3, 1),
    (3, -1),
    (-3, 1),
    (-3, -1),
    (1, 3),
    (1, -3),
    (-1, 3),
    (-1, -3),
];
const ZEBRA: &[Offset] = &[
    (3, 2),
    (3, -2),
    (-3, 2),
    (-3, -2),
    (2, 3),
    (2, -3),
    (-2, 3),
    (-2, -3),
];
const GIRAFFE: &[Offset] = &[
    (4, 1),
    (4, -1),
    (-4, 1),
    (-4, -1),
    (1, 4),
    (1, -4),
    (-1, 4),
    (-1, -4),
];
const DABBABA: &[Offset] = &[(0, 2), (0, -2), (2, 0), (-2, 0)];
const ALFIL: &[Offset] = &[(2, 2), (2, -2), (-2, 2), (-2, -2)];

const ROOK_STEPS: &[Step] = &[Step::Slide(ORTHOGONAL, 0)];
const BISHOP_STEPS: &[Step] = &[Step::Slide(DIAGONAL, 0)];
const QUEEN_STEPS: &[Step] = &[Step::Slide(ALL_DIRECTIONS, 0)];
const KNIGHT_STEPS: &[Step] = &[Step::Leap(KNIGHT)];
const KING_STEPS: &[Step] = &[Step::Leap(ALL_DIRECTIONS)];
const ELEPHANT_STEPS: &[Step] = &[Step::Slide(DIAGONAL, 2)];
const GIRAFFE_STEPS: &[Step] = &[Step::Leap(GIRAFFE)];
const UNICORN_STEPS: &[Step] = &[Step::Slide(KNIGHT, 0)];
const CENTAUR_STEPS: &[Step] = &[Step::Leap(ALL_DIRECTIONS), Step::Leap(KNIGHT)];
const CHAMPION_STEPS: &[Step] = &[
    Step::Leap(ALL_DIRECTIONS),
    Step::Leap(DABBABA),
    Step::Leap(ALFIL),
];
const WIZARD_STEPS: &[Step] = &[Step::Leap(DIAGONAL), Step::Leap(CAMEL)];
const AMAZON_STEPS: &[Step] = &[Step::Slide(ALL_DIRECTIONS, 0), Step::Leap(KNIGHT)];
const DRAGON_STEPS: &[Step] = &[Step::Slide(ORTHOGONAL, 0), Step::Leap(DIAGONAL)];
const ZEBRA_STEPS: &[Step] = &[Step::Leap(ZEBRA)];
const CHANCELLOR_STEPS: &[Step] = &[Step::Slide(ORTHOGONAL, 0), Step::Leap(KNIGHT)];
const ARCHBISHOP_STEPS: &[Step] = &[Step::Slide(DIAGONAL, 0), Step::Leap(KNIGHT)];
const SHIP_STEPS: &[Step] = &[Step::Leap(ALFIL)];

impl PieceType {
    pub fn movement(self) -> Movement {
        match self {
            PieceType::Pawn => Movement::Pawn,
            PieceType::King => Movement::Royal(KING_STEPS),
            PieceType::Rook => Movement::Pattern(ROOK_STEPS),
            PieceType::Knight => Movement::Pattern(KNIGHT_STEPS),
            PieceType::Bishop => Movement::Pattern(BISHOP_STEPS),
            PieceType::Queen => Movement::Pattern(QUEEN_STEPS),
            PieceType::Mann => Movement::Pattern(KING_STEPS),
            PieceType::Elephant => Movement::Pattern(ELEPHANT_STEPS),
            PieceType::Giraffe => Movement::Pattern(GIRAFFE_STEPS),
            PieceType::Unicorn => Movement::Pattern(UNICORN_STEPS),
            PieceType::Centaur => Movement::Pattern(CENTAUR_STEPS),
            PieceType::Champion => Movement::Pattern(CHAMPION_STEPS),
            PieceType::Wizard => Movement::Pattern(WIZARD_STEPS),
            PieceType::Amazon => Movement::Pattern(AMAZON_STEPS),
            PieceType::Dragon => Movement::Pattern(DRAGON_STEPS),
            PieceType::Zebra => Movement::Pattern(ZEBRA_STEPS),
            PieceType::Chancellor => Movement::Pattern(CHANCELLOR_STEPS),
            PieceType::Archbishop => Movement::Pattern(ARCHBISHOP_STEPS),
            PieceType::Ship => Movement::Pattern(SHIP_STEPS),
        }
    }
}

/// Pseudo-legal destinations for `piece` standing on `from`.
pub fn candidates(
    board: &Board,
    from: Square,
    piece: Piece,
    en_passant: Option<Square>,
) -> Vec<Square> {
    let mut out = Vec::new();
    match piece.kind.movement() {
        Movement::Pawn => pawn_moves(board, from, piece, en_passant, &mut out),
        Movement::Royal(steps) => {
            walk_steps(board, from, piece.color, steps, &mut out);
            castling_moves(board, from, piece, &mut out);
        }
        Movement::Pattern(steps) => walk_steps(board, from, piece.color, steps, &mut out),
    }
    out
}

/// Squares `piece` attacks from `from`: pawn diagonals, king neighbours
/// without castling, and the plain table walk for everything else.
pub fn attacks(board: &Board, from: Square, piece: Piece) -> Vec<Square> {
    let mut out = Vec::new();
    match piece.kind.movement() {
        Movement::Pawn => out.extend(pawn_diagonals(from, piece.color)),
        Movement::Royal(steps) | Movement::Pattern(steps) => {
            walk_steps(board, from, piece.color, steps, &mut out)
        }
    }
    out
}

/// Whether any piece of `by` attacks `target`.
pub fn is_attacked(board: &Board, target: Square, by: Color) -> bool {
    board
        .pieces_of(by)
        .any(|(from, piece)| attacks(board, from, piece).contains(&target))
}

pub fn in_check(board: &Board, color: Color) -> bool {
    board
        .king_square(color)
        .is_some_and(|king| is_attacked(board, king, color.opposite()))
}

fn walk_steps(board: &Board, from: Square, color: Color, steps: &[Step], out: &mut Vec<Square>) {
    for step in steps {
        match *step {
            Step::Leap(offsets) => {
                for &(dr, df) in offsets {
                    if let Some(to) = from.offset(dr, df) {
                        if board.get(to).map_or(true, |p| p.color != color) {
                            out.push(to);
                        }
                    }
                }
            }
            Step::Slide(offsets, max) => {
                for &(dr, df) in offsets {
                    slide(board, from, color, (dr, df), max, out);
                }
            }
        }
    }
}

fn slide(board: &Board, from: Square, color: Color, dir: Offset, max: u8, out: &mut Vec<Square>) {
    let mut current = from;
    let mut distance = 0u8;
    while max == 0 || distance < max {
        let Some(next) = current.offset(dir.0, dir.1) else {
            break;
        };
        distance += 1;
        match board.get(next) {
            None => out.push(next),
            Some(p) if p.color != color => {
                out.push(next);
                break;
            }
            Some(_) => break,
        }
        current = next;
    }
}

fn pawn_diagonals(from: Square, color: Color) -> impl Iterator<Item = Square> {
    let dr = color.forward();
    [-1, 1].into_iter().filter_map(move |df| from.offset(dr, df))
}

fn pawn_moves(
    board: &Board,
    from: Square,
    piece: Piece,
    en_passant: Option<Square>,
    out: &mut Vec<Square>,
) {
    let dr = piece.color.forward();

    if let Some(one) = from.offset(dr, 0).filter(|&sq| board.is_empty(sq)) {
        out.push(one);
        if !piece.has_moved {
            if let Some(two) = from.offset(2 * dr, 0).filter(|&sq| board.is_empty(sq)) {
                out.push(two);
            }
        }
    }

    for diag in pawn_diagonals(from, piece.color) {
        let enemy = board.get(diag).is_some_and(|p| p.color != piece.color);
        if enemy || en_passant == Some(diag) {
            out.push(diag);
        }
    }
}

fn castling_moves(board: &Board, from: Square, king: Piece, out: &mut Vec<Square>) {
    if king.has_moved || in_check(board, king.color) {
        return;
    }
    let enemy = king.color.opposite();

    for (rook_file, dir) in [(7u8, 1i8), (0u8, -1i8)] {
        let Some(rook_sq) = Square::new(from.rank(), rook_file) else {
            continue;
        };
        let rook_ready = board.get(rook_sq).is_some_and(|r| {
            r.kind == PieceType::Rook && r.color == king.color && !r.has_moved
        });
        if !rook_ready {
            continue;
        }

        let (lo, hi) = if dir > 0 {
            (from.file() + 1, rook_file)
        } else {
            (rook_file + 1, from.file())
        };
        let path_clear = (lo..hi)
            .filter_map(|file| Square::new(from.rank(), file))
            .all(|sq| board.is_empty(sq));
        if !path_clear {
            continue;
        }

        let (Some(cross), Some(dest)) = (from.offset(0, dir), from.offset(0, 2 * dir)) else {
            continue;
        };
        if !is_attacked(board, cross, enemy) && !is_attacked(board, dest, enemy) {
            out.push(dest);
        }
    }
}
