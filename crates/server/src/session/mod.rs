//! Live matches: clock, premove slot and the single-writer actor that owns
//! each game.

pub mod actor;
pub mod clock;
pub mod premove;
pub mod snapshot;
pub mod state;

use chess_core::{Board, GameOptions};

pub use actor::{spawn_match, MatchCommand, MatchHandle, Participant, SessionError};
pub use clock::{Alarm, ClockSettings, MoveSource, SessionClock};
pub use premove::{Premove, PremoveSlots};
pub use state::{GameResult, MatchEvent, MatchState};

/// Everything fixed for the lifetime of a match.
#[derive(Debug, Clone, Default)]
pub struct MatchSettings {
    pub clock: ClockSettings,
    pub options: GameOptions,
    pub start_board: Board,
}
