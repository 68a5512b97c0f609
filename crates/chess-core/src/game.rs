//! Game state machine: legality filter, move executor and terminal detection.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::board::{Board, UndoLog};
use crate::chess_move::Move;
use crate::error::{MoveError, ParseError};
use crate::movement;
use crate::piece::{Piece, PieceType};
use crate::square::{Color, Square};

/// Origin square -> destinations.
pub type DestinationMap = BTreeMap<Square, Vec<Square>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOptions {
    /// Whether pawns may promote into fairy pieces.
    pub fairy_promotions: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            fairy_promotions: true,
        }
    }
}

impl GameOptions {
    pub fn allows_promotion(&self, kind: PieceType) -> bool {
        kind.is_promotable() && (self.fairy_promotions || !kind.is_fairy())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Checkmate { winner } => write!(f, "{winner} wins by checkmate"),
            Outcome::Stalemate => f.write_str("draw by stalemate"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    current_turn: Color,
    history: Vec<Move>,
    en_passant_target: Option<Square>,
    /// Pieces taken by each color, indexed by [`Color::index`].
    captured: [Vec<Piece>; 2],
    options: GameOptions,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameOptions::default())
    }
}

impl Game {
    pub fn new(options: GameOptions) -> Self {
        Self::from_board(Board::standard(), Color::White, options)
    }

    pub fn from_board(board: Board, current_turn: Color, options: GameOptions) -> Self {
        Self {
            board,
            current_turn,
            history: Vec::new(),
            en_passant_target: None,
            captured: [Vec::new(), Vec::new()],
            options,
        }
    }

    pub fn from_placement(
        placement: &str,
        current_turn: Color,
        options: GameOptions,
    ) -> Result<Self, ParseError> {
        Ok(Self::from_board(
            Board::from_placement(placement)?,
            current_turn,
            options,
        ))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> Color {
        self.current_turn
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    pub fn captured_by(&self, color: Color) -> &[Piece] {
        &self.captured[color.index()]
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.get(square)
    }

    pub fn in_check(&self, color: Color) -> bool {
        movement::in_check(&self.board, color)
    }

    /// Legal destinations for the piece on `from`. Empty unless that piece
    /// belongs to the side to move.
    ///
    /// Each candidate is tried on a private copy of the board, including the
    /// en passant removal and castling rook hop, and kept only if the mover's
    /// king is safe afterwards.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let Some(piece) = self.board.get(from) else {
            return Vec::new();
        };
        if piece.color != self.current_turn {
            return Vec::new();
        }

        let mut scratch = self.board.clone();
        movement::candidates(&self.board, from, piece, self.en_passant_target)
            .into_iter()
            .filter(|&to| {
                let mut log = UndoLog::default();
                play_on(&mut scratch, from, to, piece, self.en_passant_target, &mut log);
                let safe = !movement::in_check(&scratch, piece.color);
                scratch.revert(log);
                safe
            })
            .collect()
    }

    /// Legal destinations for every piece of the side to move that has any.
    pub fn all_legal_destinations(&self) -> DestinationMap {
        self.board
            .pieces_of(self.current_turn)
            .filter_map(|(from, _)| {
                let dests = self.legal_destinations(from);
                (!dests.is_empty()).then_some((from, dests))
            })
            .collect()
    }

    /// Where `color`'s pieces could go if it were their turn, ignoring check.
    /// Pawn diagonals are always included since a capture may appear there by
    /// the time a premove is played. Used for premove hints only.
    pub fn theoretical_destinations(&self, color: Color) -> DestinationMap {
        self.board
            .pieces_of(color)
            .filter_map(|(from, piece)| {
                let mut dests = movement::candidates(&self.board, from, piece, None);
                if piece.kind == PieceType::Pawn {
                    dests.extend(movement::attacks(&self.board, from, piece));
                }
                dests.sort();
                dests.dedup();
                (!dests.is_empty()).then_some((from, dests))
            })
            .collect()
    }

    pub fn has_legal_move(&self) -> bool {
        self.board
            .pieces_of(self.current_turn)
            .any(|(from, _)| !self.legal_destinations(from).is_empty())
    }

    pub fn is_checkmate(&self) -> bool {
        self.in_check(self.current_turn) && !self.has_legal_move()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.in_check(self.current_turn) && !self.has_legal_move()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        if self.has_legal_move() {
            return None;
        }
        if self.in_check(self.current_turn) {
            Some(Outcome::Checkmate {
                winner: self.current_turn.opposite(),
            })
        } else {
            Some(Outcome::Stalemate)
        }
    }

    /// Commit a move for the side to move. On error nothing changes.
    ///
    /// `promotion` only matters when a pawn reaches its last rank and
    /// defaults to a queen there; an unpromotable type is refused either way.
    pub fn apply(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> Result<Move, MoveError> {
        let piece = self.board.get(from).ok_or(MoveError::EmptySquare(from))?;
        if piece.color != self.current_turn {
            return Err(MoveError::WrongMover {
                expected: self.current_turn,
            });
        }
        if let Some(kind) = promotion {
            if !self.options.allows_promotion(kind) {
                return Err(MoveError::InvalidPromotion(kind));
            }
        }
        if !self.legal_destinations(from).contains(&to) {
            return Err(MoveError::IllegalDestination { from, to });
        }

        let file_jump = to.file() as i8 - from.file() as i8;
        let is_castling = piece.kind == PieceType::King && file_jump.abs() == 2;
        let is_en_passant =
            piece.kind == PieceType::Pawn && self.en_passant_target == Some(to);

        let mut log = UndoLog::default();
        let captured = play_on(
            &mut self.board,
            from,
            to,
            piece,
            self.en_passant_target,
            &mut log,
        );

        let promoted = (piece.kind == PieceType::Pawn && to.rank() == piece.color.last_rank())
            .then(|| promotion.unwrap_or(PieceType::Queen));
        if let Some(kind) = promoted {
            self.board.set(to, Some(Piece::new(kind, piece.color)));
        }

        let rank_jump = to.rank() as i8 - from.rank() as i8;
        self.en_passant_target = if piece.kind == PieceType::Pawn && rank_jump.abs() == 2 {
            from.offset(piece.color.forward(), 0)
        } else {
            None
        };

        if let Some(moved) = self.board.get_mut(to) {
            moved.has_moved = true;
        }
        if is_castling {
            if let Some(rook) = from
                .offset(0, file_jump.signum())
                .and_then(|sq| self.board.get_mut(sq))
            {
                rook.has_moved = true;
            }
        }

        if let Some(taken) = captured {
            self.captured[piece.color.index()].push(taken);
        }
        let record = Move {
            from,
            to,
            piece,
            captured,
            is_castling,
            is_en_passant,
            promotion: promoted,
        };
        self.history.push(record);
        self.current_turn = self.current_turn.opposite();
        Ok(record)
    }
}

/// Board-level part of a move: en passant removal, castling rook hop and the
/// piece itself. Returns the captured piece. Promotion and flags are left to
/// the caller.
fn play_on(
    board: &mut Board,
    from: Square,
    to: Square,
    piece: Piece,
    en_passant: Option<Square>,
    log: &mut UndoLog,
) -> Option<Piece> {
    let mut captured = board.get(to);

    if piece.kind == PieceType::Pawn && en_passant == Some(to) {
        if let Some(victim) = to.offset(-piece.color.forward(), 0) {
            captured = board.get(victim);
            board.set_logged(victim, None, log);
        }
    }

    if piece.kind == PieceType::King {
        let file_jump = to.file() as i8 - from.file() as i8;
        if file_jump.abs() == 2 {
            let corner = if file_jump > 0 { 7 } else { 0 };
            let rook_from = Square::new(from.rank(), corner);
            let rook_to = from.offset(0, file_jump.signum());
            if let (Some(rook_from), Some(rook_to)) = (rook_from, rook_to) {
                let rook = board.get(rook_from);
                board.set_logged(rook_from, None, log);
                board.set_logged(rook_to, rook, log);
            }
        }
    }

    board.set_logged(from, None, log);
    board.set_logged(to, Some(piece), log);
    captured
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_move::parse_long_algebraic;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn play(game: &mut Game, moves: &[&str]) {
        for text in moves {
            let (from, to, promo) = parse_long_algebraic(text).unwrap();
            game.apply(from, to, promo)
                .unwrap_or_else(|e| panic!("{text} rejected: {e}"));
        }
    }

    fn position(placement: &str, turn: Color) -> Game {
        Game::from_placement(placement, turn, GameOptions::default()).unwrap()
    }

    #[test]
    fn test_opening_position() {
        let game = Game::default();
        let map = game.all_legal_destinations();
        let total: usize = map.values().map(Vec::len).sum();
        assert_eq!(total, 20);
        assert_eq!(map.len(), 10);
        assert!(game.legal_destinations(sq("e7")).is_empty(), "not black's turn");
        assert!(game.legal_destinations(sq("e4")).is_empty(), "empty square");
        assert_eq!(game.outcome(), None);
    }

    #[test]
    fn test_turn_alternates_and_history_grows() {
        let mut game = Game::default();
        play(&mut game, &["e2e4", "e7e5", "g1f3"]);
        assert_eq!(game.current_turn(), Color::Black);
        assert_eq!(game.history().len(), 3);
        assert_eq!(game.last_move().unwrap().to_string(), "g1f3");
        let knight = game.piece_at(sq("f3")).unwrap();
        assert!(knight.has_moved);
    }

    #[test]
    fn test_rejections_leave_state_untouched() {
        let mut game = Game::default();
        assert_eq!(
            game.apply(sq("e4"), sq("e5"), None),
            Err(MoveError::EmptySquare(sq("e4")))
        );
        assert_eq!(
            game.apply(sq("e7"), sq("e5"), None),
            Err(MoveError::WrongMover { expected: Color::White })
        );
        assert_eq!(
            game.apply(sq("e2"), sq("e5"), None),
            Err(MoveError::IllegalDestination { from: sq("e2"), to: sq("e5") })
        );
        assert_eq!(
            game.apply(sq("e2"), sq("e4"), Some(PieceType::King)),
            Err(MoveError::InvalidPromotion(PieceType::King))
        );
        assert_eq!(game.board(), &Board::standard());
        assert_eq!(game.current_turn(), Color::White);
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_pinned_piece_cannot_leave_the_line() {
        // white bishop on e2 pinned by the rook on e8
        let game = position("4r1k1/8/8/8/8/8/4B3/4K3", Color::White);
        assert!(game.legal_destinations(sq("e2")).is_empty());
    }

    #[test]
    fn test_king_never_steps_next_to_enemy_king() {
        let game = position("8/8/8/3k4/8/3K4/8/8", Color::White);
        let dests = game.legal_destinations(sq("d3"));
        let black_king = sq("d5");
        for to in &dests {
            let dr = (to.rank() as i8 - black_king.rank() as i8).abs();
            let df = (to.file() as i8 - black_king.file() as i8).abs();
            assert!(dr > 1 || df > 1, "{to} touches the black king");
        }
        assert_eq!(dests.len(), 5);
    }

    #[test]
    fn test_en_passant_window() {
        let mut game = Game::default();
        play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5"]);
        assert_eq!(game.en_passant_target(), Some(sq("d6")));
        assert!(game.legal_destinations(sq("e5")).contains(&sq("d6")));

        let mut capture = game.clone();
        let mv = capture.apply(sq("e5"), sq("d6"), None).unwrap();
        assert!(mv.is_en_passant);
        assert_eq!(mv.captured.map(|p| p.kind), Some(PieceType::Pawn));
        assert!(capture.piece_at(sq("d5")).is_none());
        assert_eq!(capture.captured_by(Color::White).len(), 1);

        play(&mut game, &["h2h3"]);
        assert_eq!(game.en_passant_target(), None);
        play(&mut game, &["h7h6"]);
        assert!(!game.legal_destinations(sq("e5")).contains(&sq("d6")));
    }

    #[test]
    fn test_en_passant_cannot_expose_the_king() {
        // capturing d5 would clear the fifth rank between the rook and the king
        let mut game = position("4k3/3p4/8/r3P2K/8/8/8/8", Color::Black);
        play(&mut game, &["d7d5"]);
        assert_eq!(game.en_passant_target(), Some(sq("d6")));
        assert!(!game.legal_destinations(sq("e5")).contains(&sq("d6")));
        assert!(game.legal_destinations(sq("e5")).contains(&sq("e6")));
    }

    #[test]
    fn test_castling_moves_both_pieces() {
        let mut game = position("r3k2r/8/8/8/8/8/8/R3K2R", Color::White);
        let mv = game.apply(sq("e1"), sq("g1"), None).unwrap();
        assert!(mv.is_castling);
        let rook = game.piece_at(sq("f1")).unwrap();
        assert_eq!(rook.kind, PieceType::Rook);
        assert!(rook.has_moved);
        assert!(game.piece_at(sq("h1")).is_none());

        game.apply(sq("e8"), sq("c8"), None).unwrap();
        assert_eq!(game.piece_at(sq("d8")).map(|p| p.kind), Some(PieceType::Rook));
        assert!(game.piece_at(sq("a8")).is_none());
    }

    #[test]
    fn test_castling_gone_after_king_moves_back() {
        let mut game = position("4k3/8/8/8/8/8/8/R3K2R", Color::White);
        play(&mut game, &["e1f1", "e8d8", "f1e1", "d8e8"]);
        let dests = game.legal_destinations(sq("e1"));
        assert!(!dests.contains(&sq("g1")));
        assert!(!dests.contains(&sq("c1")));
    }

    #[test]
    fn test_default_promotion_is_queen() {
        let mut game = position("8/4P3/8/8/8/k7/8/4K3", Color::White);
        let mv = game.apply(sq("e7"), sq("e8"), None).unwrap();
        assert_eq!(mv.promotion, Some(PieceType::Queen));
        let queen = game.piece_at(sq("e8")).unwrap();
        assert_eq!((queen.kind, queen.color), (PieceType::Queen, Color::White));
    }

    #[test]
    fn test_promoted_piece_moves_by_its_own_rule() {
        let mut game = position("8/4P3/8/8/8/k7/8/4K3", Color::White);
        game.apply(sq("e7"), sq("e8"), Some(PieceType::Knight)).unwrap();
        assert_eq!(game.piece_at(sq("e8")).map(|p| p.kind), Some(PieceType::Knight));
        play(&mut game, &["a3a2"]);
        let mut dests = game.legal_destinations(sq("e8"));
        dests.sort();
        assert_eq!(dests, vec![sq("f6"), sq("d6"), sq("c7"), sq("g7")].tap_sort());

        let mut game = position("8/4P3/8/8/8/k7/8/4K3", Color::White);
        game.apply(sq("e7"), sq("e8"), Some(PieceType::Giraffe)).unwrap();
        play(&mut game, &["a3a2"]);
        let dests = game.legal_destinations(sq("e8"));
        assert!(dests.contains(&sq("d4")));
        assert!(dests.contains(&sq("f4")));
        assert!(dests.contains(&sq("a7")));
    }

    #[test]
    fn test_fairy_promotion_can_be_disabled() {
        let options = GameOptions {
            fairy_promotions: false,
        };
        let mut game = Game::from_placement("8/4P3/8/8/8/k7/8/4K3", Color::White, options).unwrap();
        assert_eq!(
            game.apply(sq("e7"), sq("e8"), Some(PieceType::Amazon)),
            Err(MoveError::InvalidPromotion(PieceType::Amazon))
        );
        assert!(game.apply(sq("e7"), sq("e8"), Some(PieceType::Rook)).is_ok());
    }

    #[test]
    fn test_fools_mate_is_checkmate() {
        let mut game = Game::default();
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert!(game.in_check(Color::White));
        assert!(game.is_checkmate());
        assert!(!game.is_stalemate());
        assert!(game.all_legal_destinations().is_empty());
        let outcome = game.outcome().unwrap();
        assert_eq!(outcome, Outcome::Checkmate { winner: Color::Black });
        assert_eq!(outcome.to_string(), "black wins by checkmate");
    }

    #[test]
    fn test_stalemate_is_not_checkmate() {
        let game = position("7k/5Q2/6K1/8/8/8/8/8", Color::Black);
        assert!(!game.in_check(Color::Black));
        assert!(game.is_stalemate());
        assert!(!game.is_checkmate());
        assert_eq!(game.outcome().map(|o| o.to_string()), Some("draw by stalemate".into()));
    }

    #[test]
    fn test_check_with_escape_is_not_mate() {
        let game = position("4k3/8/8/8/8/8/8/4RK2", Color::Black);
        assert!(game.in_check(Color::Black));
        assert!(!game.is_checkmate());
        assert_eq!(game.outcome(), None);
    }

    #[test]
    fn test_fairy_piece_can_deliver_mate() {
        // amazon on g7 covers every flight square and is protected by the king
        let game = position("7k/6M1/6K1/8/8/8/8/8", Color::Black);
        assert!(game.is_checkmate());
    }

    #[test]
    fn test_theoretical_destinations_include_pawn_diagonals() {
        let game = Game::default();
        let hints = game.theoretical_destinations(Color::Black);
        assert_eq!(hints[&sq("e7")], vec![sq("d6"), sq("e6"), sq("f6"), sq("e5")].tap_sort());
        assert!(hints.contains_key(&sq("g8")));
        assert!(!hints.contains_key(&sq("a8")));
    }

    trait TapSort {
        fn tap_sort(self) -> Self;
    }

    impl TapSort for Vec<Square> {
        fn tap_sort(mut self) -> Self {
            self.sort();
            self
        }
    }
}
