//! Per-seat `board_state` views.

use std::collections::BTreeMap;

use chess_core::{Color, DestinationMap, Square};
use tokio::time::Instant;

use super::state::MatchState;
use crate::protocol::{square_key, BoardState, CellView, LastMove, PerColor};

fn keyed(map: DestinationMap) -> BTreeMap<String, Vec<Square>> {
    map.into_iter()
        .map(|(from, dests)| (square_key(from), dests))
        .collect()
}

/// The match as `seat` sees it at `now`. Move maps are only filled for
/// the side they concern, so a seat never learns the other side's hints.
pub fn board_state(state: &MatchState, seat: Color, now: Instant) -> BoardState {
    let game = state.game();
    let on_turn = game.current_turn() == seat && !state.is_terminal();
    let waiting = game.current_turn() != seat && !state.is_terminal();

    let board = game
        .board()
        .pieces()
        .map(|(square, piece)| {
            (
                square_key(square),
                CellView {
                    piece_type: piece.kind,
                    color: piece.color,
                    symbol: piece.symbol(),
                },
            )
        })
        .collect();

    BoardState {
        session_id: state.id(),
        board,
        current_turn: game.current_turn(),
        player_color: seat,
        time_remaining: PerColor::from_fn(|c| state.clock().remaining_at(c, now).as_secs_f64()),
        last_move: game.last_move().map(LastMove::from),
        in_check: PerColor::from_fn(|c| game.in_check(c)),
        available_moves: if on_turn {
            keyed(game.all_legal_destinations())
        } else {
            BTreeMap::new()
        },
        premove_hints: if waiting {
            keyed(game.theoretical_destinations(seat))
        } else {
            BTreeMap::new()
        },
        captured: PerColor::from_fn(|c| game.captured_by(c).iter().map(|p| p.kind).collect()),
        pending_premove: state.pending_premove(seat),
    }
}
