//! [Standard Algebraic Notation] (SAN) for recording and reading moves.
//!
//! [Standard Algebraic Notation]: https://www.chessprogramming.org/Algebraic_Chess_Notation#Standard_Algebraic_Notation_.28SAN.29

use anyhow::bail;

use crate::chess::core::{file_symbol, rank_symbol, Move, PieceKind, Square};
use crate::chess::movegen::{generate_legal_moves, has_legal_move};
use crate::chess::position::Position;
use crate::chess::rules::{self, CastleSide, KING_FILE};

/// Serializes a move that is about to be made in the position: piece letter,
/// disambiguation, capture marker, destination, promotion and check or
/// checkmate suffix. Castling is written as "O-O" and "O-O-O".
///
/// # Errors
///
/// Returns an error if there is no piece to move.
pub fn to_san(position: &Position, next_move: Move) -> anyhow::Result<String> {
    let (from, to) = (next_move.from(), next_move.to());
    let Some(piece) = position.at(from) else {
        bail!("no piece to move on {from}");
    };
    let mut result = String::new();
    let castle = match piece.kind {
        PieceKind::King
            if piece.move_count == 0
                && from.file() == KING_FILE
                && from.rank() == to.rank()
                && from.file().abs_diff(to.file()) == 2 =>
        {
            CastleSide::from_king_target(to.file())
        },
        _ => None,
    };
    match (castle, piece.kind.san_symbol()) {
        (Some(CastleSide::King), _) => result.push_str("O-O"),
        (Some(CastleSide::Queen), _) => result.push_str("O-O-O"),
        (None, None) => {
            if position.at(to).is_some() || rules::is_en_passant(position, from, to) {
                result.push(file_symbol(from.file()));
                result.push('x');
            }
            result.push_str(&to.to_string());
            if to.rank() == piece.owner.promotion_rank() {
                result.push_str("=Q");
            }
        },
        (None, Some(symbol)) => {
            result.push(symbol);
            result.push_str(&disambiguation(position, from, to));
            if position.at(to).is_some() {
                result.push('x');
            }
            result.push_str(&to.to_string());
        },
    }

    let mut next = position.clone();
    if next.make_move(next_move).is_some() {
        let opponent = piece.owner.opponent();
        if rules::is_in_check(&next, opponent) {
            result.push(if has_legal_move(&next, opponent) {
                '+'
            } else {
                '#'
            });
        }
    }
    Ok(result)
}

/// Origin file, rank or both: whatever distinguishes the moving piece from the
/// other pieces of the same kind that can reach the same destination.
fn disambiguation(position: &Position, from: Square, to: Square) -> String {
    let Some(piece) = position.at(from) else {
        return String::new();
    };
    let rivals = position
        .pieces()
        .filter(|&(square, other)| {
            square != from
                && other.owner == piece.owner
                && other.kind == piece.kind
                && rules::is_legal(position, square, to)
                && rules::is_safe(position, square, to, piece.owner)
        })
        .map(|(square, _)| square)
        .collect::<Vec<_>>();
    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|rival| rival.file() != from.file()) {
        file_symbol(from.file()).to_string()
    } else if rivals.iter().all(|rival| rival.rank() != from.rank()) {
        rank_symbol(from.rank()).to_string()
    } else {
        from.to_string()
    }
}

fn strip_annotations(san: &str) -> &str {
    san.trim()
        .trim_end_matches(|c: char| matches!(c, '+' | '#' | '!' | '?'))
}

/// Finds the legal move of the side to move that the SAN string describes.
/// Check and checkmate suffixes are optional and "0-0" is accepted for
/// castling.
///
/// # Errors
///
/// Returns an error if no legal move (or more than one) matches the input.
pub fn from_san(position: &Position, san: &str) -> anyhow::Result<Move> {
    let normalized = strip_annotations(san).replace('0', "O");
    let mut matching = generate_legal_moves(position, position.side_to_move())
        .into_iter()
        .filter(|&candidate| {
            to_san(position, candidate)
                .is_ok_and(|rendered| strip_annotations(&rendered) == normalized)
        });
    match (matching.next(), matching.next()) {
        (Some(found), None) => Ok(found),
        (None, _) => bail!("no legal move matches '{san}' in {position}"),
        (Some(_), Some(_)) => bail!("'{san}' is ambiguous in {position}"),
    }
}
