use std::fmt::Display;
use std::ops::Neg;

use crate::chess::core::Player;

/// The score represents the relative value of the position in centipawn units
/// from White's perspective (positive values mean White is better), or a
/// checkmate.
///
/// Checkmates are reported with fixed sentinel values, the distance to the
/// mate is not tracked.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score {
    value: i32,
}

impl Score {
    /// Bound that no real score reaches. Used as the initial search window.
    pub const INFINITY: Self = Self {
        value: 2_000_000_000,
    };
    /// White has checkmated Black.
    pub const CHECKMATE: Self = Self { value: 1_000_000 };
    /// Stalemate and other draws.
    pub const DRAW: Self = Self { value: 0 };

    /// Creates a new score in centipawn units.
    #[must_use]
    pub const fn cp(value: i32) -> Self {
        Self { value }
    }

    /// Returns the score in centipawn units.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.value
    }

    /// Returns `true` if the score represents a checkmate, not centipawn
    /// evaluation.
    #[must_use]
    pub const fn is_mate(self) -> bool {
        self.value.abs() >= Self::CHECKMATE.value
    }

    /// Converts White's perspective into the given player's perspective (as
    /// UCI expects).
    #[must_use]
    pub fn relative_to(self, player: Player) -> Self {
        match player {
            Player::White => self,
            Player::Black => -self,
        }
    }
}

impl Neg for Score {
    type Output = Self;

    /// Mirrors evaluation to other player's perspective.
    fn neg(self) -> Self::Output {
        Self { value: -self.value }
    }
}

impl From<i32> for Score {
    fn from(value: i32) -> Self {
        Self { value }
    }
}

impl Display for Score {
    /// Formats the score as centipawn units for UCI interface.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cp {}", self.value)
    }
}
