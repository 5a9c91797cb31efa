//! Legal move generation and [Perft] (*per*formance *t*esting), which checks
//! the correctness of move generation and move making by counting the leaf
//! nodes of the game tree.
//!
//! The generator is exhaustive: every (origin, destination) pair of the
//! player's pieces is checked against the movement rules and king safety. The
//! order is deterministic (board scan order of origins, then destinations).
//!
//! [Perft]: https://www.chessprogramming.org/Perft

use crate::chess::core::{Move, Player, Square};
use crate::chess::position::Position;
use crate::chess::rules;

fn candidates(position: &Position, player: Player) -> impl Iterator<Item = Move> + '_ {
    position
        .pieces()
        .filter(move |(_, piece)| piece.owner == player)
        .flat_map(move |(from, _)| {
            Square::iter()
                .filter(move |&to| rules::is_legal(position, from, to))
                .filter(move |&to| rules::is_safe(position, from, to, player))
                .map(move |to| Move::new(from, to))
        })
}

/// Returns all legal moves of the player in the position.
#[must_use]
pub fn generate_legal_moves(position: &Position, player: Player) -> Vec<Move> {
    candidates(position, player).collect()
}

/// Returns `true` if the player has at least one legal move. Stops at the
/// first one.
#[must_use]
pub fn has_legal_move(position: &Position, player: Player) -> bool {
    candidates(position, player).next().is_some()
}

/// Destinations the piece on `from` can legally move to. Empty if the square
/// is empty or the piece does not belong to the side to move.
#[must_use]
pub fn legal_destinations(position: &Position, from: Square) -> Vec<Square> {
    Square::iter()
        .filter(|&to| rules::is_legal_move(position, from, to))
        .collect()
}

/// Counts the number of leaf nodes at the given depth for the side to move.
#[must_use]
pub fn perft(position: &Position, depth: u8) -> u64 {
    let moves = generate_legal_moves(position, position.side_to_move());
    if depth <= 1 {
        return if depth == 0 { 1 } else { moves.len() as u64 };
    }
    moves
        .into_iter()
        .filter_map(|next_move| {
            let mut next = position.clone();
            next.make_move(next_move).map(|_| perft(&next, depth - 1))
        })
        .sum()
}
