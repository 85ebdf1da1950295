use core::fmt;
use serde::{Deserialize, Serialize};

/// Index of an agent in seating order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Seat(pub usize);

impl Seat {
    pub const fn index(self) -> usize {
        self.0
    }

    pub const fn next(self, seats: usize) -> Seat {
        Seat((self.0 + 1) % seats)
    }

    /// Every other seat in order, starting immediately after `self`.
    pub fn others_after(self, seats: usize) -> impl Iterator<Item = Seat> {
        (1..seats).map(move |offset| Seat((self.0 + offset) % seats))
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Who may hold a card: a seated player or the face-down envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Holder {
    Player(Seat),
    Envelope,
}

impl Holder {
    pub const fn seat(self) -> Option<Seat> {
        match self {
            Holder::Player(seat) => Some(seat),
            Holder::Envelope => None,
        }
    }

    pub const fn is_envelope(self) -> bool {
        matches!(self, Holder::Envelope)
    }
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Holder::Player(seat) => seat.fmt(f),
            Holder::Envelope => f.write_str("Envelope"),
        }
    }
}
