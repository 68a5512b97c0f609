#![allow(dead_code)]

use std::time::Duration;

use chess_core::Square;
use server::ids::PlayerId;
use server::protocol::ServerMessage;
use server::session::{ClockSettings, MatchSettings, Participant};
use tokio::sync::mpsc;

pub fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

/// Match settings with a short clock and one-second increment.
pub fn quick_settings(seconds: u64) -> MatchSettings {
    MatchSettings {
        clock: ClockSettings {
            initial: Duration::from_secs(seconds),
            increment: Duration::from_secs(1),
            premove_penalty: Duration::from_millis(100),
        },
        ..MatchSettings::default()
    }
}

/// A fresh participant plus the receiving end of its outbox.
pub fn participant() -> (Participant, mpsc::UnboundedReceiver<ServerMessage>) {
    let (outbox, inbox) = mpsc::unbounded_channel();
    (
        Participant {
            player: PlayerId::new(),
            outbox,
        },
        inbox,
    )
}

/// Collect everything until the sender side is gone.
pub async fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Some(msg) = rx.recv().await {
        out.push(msg);
    }
    out
}

pub fn results(messages: &[ServerMessage]) -> Vec<String> {
    messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::GameOver { result, .. } => Some(result.clone()),
            _ => None,
        })
        .collect()
}

pub fn errors(messages: &[ServerMessage]) -> Vec<String> {
    messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::Error { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}
