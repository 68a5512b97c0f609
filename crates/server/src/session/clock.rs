//! Per-match clock with Fischer increment and a flat premove charge.

use std::time::Duration;

use chess_core::Color;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSettings {
    pub initial: Duration,
    pub increment: Duration,
    /// Charged instead of thinking time when a premove is applied.
    pub premove_penalty: Duration,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(300),
            increment: Duration::from_secs(3),
            premove_penalty: Duration::from_millis(100),
        }
    }
}

/// How the committed move reached the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    Player,
    Premove,
}

/// Timeout that should fire for `color` at `deadline`, unless the clock's
/// generation has moved on by then.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alarm {
    pub color: Color,
    pub generation: u64,
    pub deadline: Instant,
}

// Roughly thirty years; the cap for clocks too large to represent as an instant.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn deadline_after(from: Instant, remaining: Duration) -> Instant {
    from.checked_add(remaining)
        .or_else(|| from.checked_add(FAR_FUTURE))
        .unwrap_or(from)
}

#[derive(Debug, Clone)]
pub struct SessionClock {
    settings: ClockSettings,
    remaining: [Duration; 2],
    last_commit: Instant,
    running: Option<Color>,
    generation: u64,
}

impl SessionClock {
    pub fn new(settings: ClockSettings, now: Instant) -> Self {
        Self {
            settings,
            remaining: [settings.initial; 2],
            last_commit: now,
            running: None,
            generation: 0,
        }
    }

    pub fn remaining(&self, color: Color) -> Duration {
        self.remaining[color.index()]
    }

    /// Remaining time with the running side's elapsed thinking time taken off.
    pub fn remaining_at(&self, color: Color, now: Instant) -> Duration {
        let stored = self.remaining(color);
        if self.running == Some(color) {
            stored.saturating_sub(now.saturating_duration_since(self.last_commit))
        } else {
            stored
        }
    }

    /// Start `color`'s clock. Any alarm armed for an earlier generation
    /// becomes stale.
    pub fn start(&mut self, color: Color, now: Instant) -> Alarm {
        self.generation += 1;
        self.running = Some(color);
        self.last_commit = now;
        Alarm {
            color,
            generation: self.generation,
            deadline: deadline_after(now, self.remaining(color)),
        }
    }

    /// Charge `color` for the move it just committed and add the increment.
    pub fn charge(&mut self, color: Color, now: Instant, source: MoveSource) {
        let spent = match source {
            MoveSource::Player => now.saturating_duration_since(self.last_commit),
            MoveSource::Premove => self.settings.premove_penalty,
        };
        let slot = &mut self.remaining[color.index()];
        *slot = slot.saturating_sub(spent).saturating_add(self.settings.increment);
        self.last_commit = now;
    }

    /// The alarm for the running side, if any.
    pub fn pending_alarm(&self) -> Option<Alarm> {
        self.running.map(|color| Alarm {
            color,
            generation: self.generation,
            deadline: deadline_after(self.last_commit, self.remaining(color)),
        })
    }

    /// Flag `color` if the alarm is still current. Returns whether it was.
    pub fn expire(&mut self, color: Color, generation: u64) -> bool {
        if generation != self.generation || self.running != Some(color) {
            return false;
        }
        self.remaining[color.index()] = Duration::ZERO;
        self.stop();
        true
    }

    pub fn stop(&mut self) {
        self.generation += 1;
        self.running = None;
    }
}
