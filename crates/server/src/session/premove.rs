use chess_core::{Color, PieceType, Square};
use serde::Serialize;

/// A move queued by the player who is not on turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Premove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

/// One slot per color; a new premove replaces the old one.
#[derive(Debug, Default, Clone)]
pub struct PremoveSlots {
    slots: [Option<Premove>; 2],
}

impl PremoveSlots {
    pub fn set(&mut self, color: Color, premove: Premove) {
        self.slots[color.index()] = Some(premove);
    }

    pub fn get(&self, color: Color) -> Option<Premove> {
        self.slots[color.index()]
    }

    pub fn take(&mut self, color: Color) -> Option<Premove> {
        self.slots[color.index()].take()
    }

    pub fn clear(&mut self) {
        self.slots = [None; 2];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn premove(from: &str, to: &str) -> Premove {
        Premove {
            from: from.parse().unwrap(),
            to: to.parse().unwrap(),
            promotion: None,
        }
    }

    #[test]
    fn test_overwrite_and_take() {
        let mut slots = PremoveSlots::default();
        slots.set(Color::Black, premove("e7", "e5"));
        slots.set(Color::Black, premove("d7", "d5"));
        assert_eq!(slots.get(Color::White), None);
        assert_eq!(slots.take(Color::Black), Some(premove("d7", "d5")));
        assert_eq!(slots.take(Color::Black), None);
    }
}
