use std::env;
use std::time::Duration;

use chess_core::{Board, GameOptions};

use crate::session::{ClockSettings, MatchSettings};

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub initial_seconds: u64,
    pub increment_seconds: u64,
    pub premove_penalty_ms: u64,
    pub fairy_promotions: bool,
    /// Board field every match starts from. `None` means the standard setup.
    pub start_position: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            initial_seconds: 300,
            increment_seconds: 3,
            premove_penalty_ms: 100,
            fairy_promotions: true,
            start_position: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parsed("PORT").unwrap_or(defaults.port),
            initial_seconds: parsed("INITIAL_SECONDS").unwrap_or(defaults.initial_seconds),
            increment_seconds: parsed("INCREMENT_SECONDS").unwrap_or(defaults.increment_seconds),
            premove_penalty_ms: parsed("PREMOVE_PENALTY_MS").unwrap_or(defaults.premove_penalty_ms),
            fairy_promotions: parsed("FAIRY_PROMOTIONS").unwrap_or(defaults.fairy_promotions),
            start_position: env::var("START_POSITION")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }

    /// Everything a new match needs. An unusable `start_position` falls
    /// back to the standard setup.
    pub fn match_settings(&self) -> MatchSettings {
        let start_board = match &self.start_position {
            Some(placement) => Board::from_placement(placement).unwrap_or_else(|e| {
                tracing::warn!("Ignoring START_POSITION {placement:?}: {e}");
                Board::standard()
            }),
            None => Board::standard(),
        };

        MatchSettings {
            clock: ClockSettings {
                initial: Duration::from_secs(self.initial_seconds),
                increment: Duration::from_secs(self.increment_seconds),
                premove_penalty: Duration::from_millis(self.premove_penalty_ms),
            },
            options: GameOptions {
                fairy_promotions: self.fairy_promotions,
            },
            start_board,
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_match_settings() {
        let settings = Config::default().match_settings();
        assert_eq!(settings.clock.initial, Duration::from_secs(300));
        assert_eq!(settings.clock.increment, Duration::from_secs(3));
        assert_eq!(settings.clock.premove_penalty, Duration::from_millis(100));
        assert!(settings.options.fairy_promotions);
        assert_eq!(settings.start_board, Board::standard());
    }

    #[test]
    fn test_custom_start_position() {
        let config = Config {
            start_position: Some("4k3/8/8/8/8/8/8/3ZK3".to_string()),
            ..Config::default()
        };
        let board = config.match_settings().start_board;
        assert_eq!(board.to_placement(), "4k3/8/8/8/8/8/8/3ZK3");
    }

    #[test]
    fn test_bad_start_position_falls_back() {
        let config = Config {
            start_position: Some("not a board".to_string()),
            ..Config::default()
        };
        assert_eq!(config.match_settings().start_board, Board::standard());
    }
}
