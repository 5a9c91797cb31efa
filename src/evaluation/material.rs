//! Material balance using the [Simplified Evaluation Function] piece values.
//!
//! [Simplified Evaluation Function]: https://www.chessprogramming.org/Simplified_Evaluation_Function

use crate::chess::core::{PieceKind, Player};
use crate::chess::position::Position;
use crate::evaluation::Value;

const PAWN_VALUE: Value = 100;
const KNIGHT_VALUE: Value = 330;
const BISHOP_VALUE: Value = 320;
const ROOK_VALUE: Value = 500;
const QUEEN_VALUE: Value = 900;
const KING_VALUE: Value = 20_000;

/// Below this amount of non-king material on the board the game is considered
/// an endgame.
pub(crate) const ENDGAME_THRESHOLD: Value = 1300;

/// Value of a piece in centipawns.
#[must_use]
pub const fn piece_value(kind: PieceKind) -> Value {
    match kind {
        PieceKind::Pawn => PAWN_VALUE,
        PieceKind::Knight => KNIGHT_VALUE,
        PieceKind::Bishop => BISHOP_VALUE,
        PieceKind::Rook => ROOK_VALUE,
        PieceKind::Queen => QUEEN_VALUE,
        PieceKind::King => KING_VALUE,
    }
}

/// Sum of White's piece values minus the sum of Black's.
pub(crate) fn material_advantage(position: &Position) -> Value {
    position
        .pieces()
        .map(|(_, piece)| match piece.owner {
            Player::White => piece_value(piece.kind),
            Player::Black => -piece_value(piece.kind),
        })
        .sum()
}

/// Total value of all pieces except the kings, for both sides.
pub(crate) fn non_king_material(position: &Position) -> Value {
    position
        .pieces()
        .filter(|(_, piece)| piece.kind != PieceKind::King)
        .map(|(_, piece)| piece_value(piece.kind))
        .sum()
}
