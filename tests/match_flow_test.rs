//! End-to-end match scenarios: lobby pairing, the session actor and the
//! rule engine working together, with tokio's clock paused.

mod common;

use std::time::Duration;

use chess_core::{Board, Color, PieceType};
use common::{drain, errors, participant, quick_settings, results, sq};
use server::ids::{PlayerId, SessionId};
use server::lobby::Lobby;
use server::protocol::ServerMessage;
use server::session::{spawn_match, GameResult};
use tokio::sync::mpsc;

#[tokio::test(start_paused = true)]
async fn test_lobby_pairing_to_checkmate() {
    let lobby = Lobby::new(quick_settings(60));
    let (a, b) = (PlayerId::new(), PlayerId::new());
    let (a_tx, mut a_rx) = mpsc::unbounded_channel();
    let (b_tx, mut b_rx) = mpsc::unbounded_channel();

    let a_seat = lobby.join(a, a_tx).await;
    let b_seat = lobby.join(b, b_tx).await;
    let white = a_seat.await.unwrap();
    let black = b_seat.await.unwrap();
    assert_eq!(white.color, Color::White);

    white.handle.submit_move(a, sq("f2"), sq("f3"), None).unwrap();
    black.handle.submit_move(b, sq("e7"), sq("e5"), None).unwrap();
    white.handle.submit_move(a, sq("g2"), sq("g4"), None).unwrap();
    black.handle.submit_move(b, sq("d8"), sq("h4"), None).unwrap();

    let a_msgs = drain(&mut a_rx).await;
    let b_msgs = drain(&mut b_rx).await;
    assert!(matches!(a_msgs.first(), Some(ServerMessage::Waiting)));
    assert_eq!(results(&a_msgs), vec!["black wins by checkmate"]);
    assert_eq!(results(&b_msgs), vec!["black wins by checkmate"]);
    assert!(errors(&a_msgs).is_empty());

    match a_msgs.iter().rev().find(|m| matches!(m, ServerMessage::BoardState(_))) {
        Some(ServerMessage::BoardState(view)) => {
            assert!(view.in_check.white);
            assert!(view.available_moves.is_empty());
        }
        _ => panic!("no board_state sent"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_clock_with_increment_and_premove_penalty() {
    let (white, _white_rx) = participant();
    let (black, mut black_rx) = participant();
    let (w, b) = (white.player, black.player);
    let (handle, task) = spawn_match(SessionId::new(), white, black, &quick_settings(30));

    // Black queues a reply, white thinks for 10 seconds.
    handle.submit_move(b, sq("e7"), sq("e5"), None).unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    handle.submit_move(w, sq("e2"), sq("e4"), None).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.resign(w).unwrap();
    assert_eq!(
        task.await.unwrap(),
        Some(GameResult::Resignation { winner: Color::Black })
    );

    let final_view = drain(&mut black_rx)
        .await
        .into_iter()
        .rev()
        .find_map(|m| match m {
            ServerMessage::BoardState(view) => Some(view),
            _ => None,
        })
        .unwrap();
    // White: 30 - 10 + 1, then the clock is stopped by the resignation.
    assert_eq!(final_view.time_remaining.white, 21.0);
    // Black: 30 - 0.1 + 1 for the premove.
    assert!((final_view.time_remaining.black - 30.9).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn test_move_just_before_flag_beats_the_alarm() {
    let (white, mut white_rx) = participant();
    let (black, _black_rx) = participant();
    let w = white.player;
    let (handle, task) = spawn_match(SessionId::new(), white, black, &quick_settings(5));

    tokio::time::sleep(Duration::from_millis(4_999)).await;
    handle.submit_move(w, sq("g1"), sq("f3"), None).unwrap();

    assert_eq!(
        task.await.unwrap(),
        Some(GameResult::Timeout { winner: Color::White })
    );
    assert_eq!(results(&drain(&mut white_rx).await), vec!["white wins on time"]);
}

#[tokio::test(start_paused = true)]
async fn test_fairy_promotion_through_a_session() {
    let mut settings = quick_settings(60);
    settings.start_board = Board::from_placement("7k/P7/8/8/8/8/8/K7").unwrap();
    let (white, mut white_rx) = participant();
    let (black, _black_rx) = participant();
    let (w, b) = (white.player, black.player);
    let (handle, task) = spawn_match(SessionId::new(), white, black, &settings);

    handle
        .submit_move(w, sq("a7"), sq("a8"), Some(PieceType::Champion))
        .unwrap();
    handle.submit_move(b, sq("h8"), sq("g7"), None).unwrap();
    // Champion jumps two squares orthogonally.
    handle.submit_move(w, sq("a8"), sq("c8"), None).unwrap();
    handle.resign(b).unwrap();
    task.await.unwrap();

    let messages = drain(&mut white_rx).await;
    assert!(errors(&messages).is_empty(), "{:?}", errors(&messages));
    let view = messages
        .iter()
        .rev()
        .find_map(|m| match m {
            ServerMessage::BoardState(view) => Some(view),
            _ => None,
        })
        .unwrap();
    assert_eq!(view.board["7,2"].piece_type, PieceType::Champion);
    assert_eq!(view.last_move.as_ref().unwrap().notation, "a8c8");
}

#[tokio::test(start_paused = true)]
async fn test_fairy_promotion_can_be_disabled() {
    let mut settings = quick_settings(60);
    settings.start_board = Board::from_placement("7k/P7/8/8/8/8/8/K7").unwrap();
    settings.options.fairy_promotions = false;
    let (white, mut white_rx) = participant();
    let (black, _black_rx) = participant();
    let w = white.player;
    let (handle, task) = spawn_match(SessionId::new(), white, black, &settings);

    handle
        .submit_move(w, sq("a7"), sq("a8"), Some(PieceType::Giraffe))
        .unwrap();
    handle.submit_move(w, sq("a7"), sq("a8"), Some(PieceType::Rook)).unwrap();
    handle.resign(w).unwrap();
    task.await.unwrap();

    let messages = drain(&mut white_rx).await;
    assert_eq!(errors(&messages), vec!["Cannot promote to giraffe"]);
    let promoted = messages.iter().any(|m| {
        matches!(m, ServerMessage::BoardState(view)
            if view.board.get("7,0").is_some_and(|c| c.piece_type == PieceType::Rook))
    });
    assert!(promoted);
}
