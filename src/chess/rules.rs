//! Movement rules of individual pieces and the king safety checks built on top
//! of them.
//!
//! The rules are evaluated directly on the board: a move is checked against
//! the geometry of the moving piece ([`is_legal`]) and then against the safety
//! of the mover's king ([`is_safe`]). Special moves ([en passant] and
//! [castling]) have their own predicates.
//!
//! [en passant]: https://www.chessprogramming.org/En_passant
//! [castling]: https://www.chessprogramming.org/Castling

use crate::chess::core::{Move, MovementClass, Piece, PieceKind, Player, Square};
use crate::chess::position::Position;

/// Side of the board the king castles towards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastleSide {
    /// Short castle (O-O): the king goes to the g-file.
    King,
    /// Long castle (O-O-O): the king goes to the c-file.
    Queen,
}

/// File on which the kings start.
pub(crate) const KING_FILE: u8 = 4;

impl CastleSide {
    /// Returns the castle side a king move from its starting square towards the
    /// given file corresponds to.
    #[must_use]
    pub const fn from_king_target(file: u8) -> Option<Self> {
        match file {
            6 => Some(Self::King),
            2 => Some(Self::Queen),
            _ => None,
        }
    }

    /// Destination file of the king.
    #[must_use]
    pub const fn king_target_file(self) -> u8 {
        match self {
            Self::King => 6,
            Self::Queen => 2,
        }
    }

    /// Starting file of the rook that takes part in the castle.
    #[must_use]
    pub const fn rook_file(self) -> u8 {
        match self {
            Self::King => 7,
            Self::Queen => 0,
        }
    }

    /// Destination file of the rook.
    #[must_use]
    pub const fn rook_target_file(self) -> u8 {
        match self {
            Self::King => 5,
            Self::Queen => 3,
        }
    }

    /// Files between the king and the rook: these have to be empty.
    const fn gap(self) -> &'static [u8] {
        match self {
            Self::King => &[5, 6],
            Self::Queen => &[1, 2, 3],
        }
    }

    /// Files the king passes through and lands on: none of them can be
    /// attacked.
    const fn king_walk(self) -> &'static [u8] {
        match self {
            Self::King => &[5, 6],
            Self::Queen => &[3, 2],
        }
    }
}

fn delta(from: Square, to: Square) -> (i8, i8) {
    (
        to.file() as i8 - from.file() as i8,
        to.rank() as i8 - from.rank() as i8,
    )
}

/// Checks whether the piece standing on `from` can reach `to` according to its
/// movement rules. This includes the pawn rules, en passant and castling but
/// does not take the safety of the mover's king or the side to move into
/// account.
#[must_use]
pub fn is_legal(position: &Position, from: Square, to: Square) -> bool {
    if from == to {
        return false;
    }
    let Some(piece) = position.at(from) else {
        return false;
    };
    if matches!(position.at(to), Some(target) if target.owner == piece.owner) {
        return false;
    }
    match piece.kind {
        PieceKind::Pawn => is_legal_pawn_move(position, piece, from, to),
        PieceKind::King if is_castle_attempt(piece, from, to) => {
            match CastleSide::from_king_target(to.file()) {
                Some(side) => can_castle(position, piece.owner, side),
                None => false,
            }
        },
        _ => reaches(position, piece.kind, from, to),
    }
}

/// Full legality check of a player's move: the piece has to belong to the side
/// to move, follow its movement rules and not leave its own king in check.
#[must_use]
pub fn is_legal_move(position: &Position, from: Square, to: Square) -> bool {
    match position.at(from) {
        Some(piece) if piece.owner == position.side_to_move() => {
            is_legal(position, from, to) && is_safe(position, from, to, piece.owner)
        },
        _ => false,
    }
}

const fn is_castle_attempt(king: Piece, from: Square, to: Square) -> bool {
    king.move_count == 0
        && from.file() == KING_FILE
        && from.rank() == king.owner.back_rank()
        && to.rank() == from.rank()
        && from.file().abs_diff(to.file()) == 2
}

fn is_legal_pawn_move(position: &Position, pawn: Piece, from: Square, to: Square) -> bool {
    let (files, ranks) = delta(from, to);
    let forward = pawn.owner.forward();
    let target = position.at(to);
    if ranks == forward && files.abs() == 1 {
        return matches!(target, Some(victim) if victim.owner != pawn.owner)
            || is_en_passant(position, from, to);
    }
    if files != 0 || target.is_some() {
        return false;
    }
    if ranks == forward {
        return true;
    }
    ranks == 2 * forward
        && pawn.move_count == 0
        && from
            .offset(0, forward)
            .is_some_and(|middle| position.at(middle).is_none())
}

/// Geometry of the non-pawn moves: exact offsets for jumping pieces and
/// unobstructed lines for sliding ones. The king is limited to unit steps.
fn reaches(position: &Position, kind: PieceKind, from: Square, to: Square) -> bool {
    let (files, ranks) = delta(from, to);
    match kind.movement_class() {
        MovementClass::Jumping => kind.directions().contains(&(files, ranks)),
        MovementClass::Sliding => {
            if files != 0 && ranks != 0 && files.abs() != ranks.abs() {
                return false;
            }
            let step = (files.signum(), ranks.signum());
            if !kind.directions().contains(&step) {
                return false;
            }
            let mut current = from;
            while let Some(next) = current.offset(step.0, step.1) {
                if next == to {
                    return true;
                }
                if position.at(next).is_some() {
                    return false;
                }
                current = next;
            }
            false
        },
    }
}

/// Returns `true` if the piece on `from` attacks `to`. Unlike [`is_legal`],
/// pawns only attack diagonally (regardless of what occupies the target) and
/// kings never castle.
fn attacks(position: &Position, piece: Piece, from: Square, to: Square) -> bool {
    if from == to {
        return false;
    }
    match piece.kind {
        PieceKind::Pawn => {
            let (files, ranks) = delta(from, to);
            ranks == piece.owner.forward() && files.abs() == 1
        },
        _ => reaches(position, piece.kind, from, to),
    }
}

/// Returns `true` if any piece of `attacker` attacks the square.
#[must_use]
pub fn is_attacked(position: &Position, square: Square, attacker: Player) -> bool {
    position
        .pieces()
        .any(|(from, piece)| piece.owner == attacker && attacks(position, piece, from, square))
}

/// Returns `true` if the player's king is attacked by any opponent's piece.
///
/// Every position has both kings: parsing rejects boards without them and the
/// legal moves never capture one.
#[must_use]
pub fn is_in_check(position: &Position, player: Player) -> bool {
    let king = position.king_square(player);
    debug_assert!(king.is_some(), "{player:?} king is missing: {position}");
    king.is_some_and(|king| is_attacked(position, king, player.opponent()))
}

/// Checks whether making the move (including its side effects: en passant
/// capture, rook relocation, promotion) leaves the player's king out of
/// check.
#[must_use]
pub fn is_safe(position: &Position, from: Square, to: Square, player: Player) -> bool {
    let mut next = position.clone();
    next.make_move(Move::new(from, to)).is_some() && !is_in_check(&next, player)
}

/// Checks whether the piece can be relocated without any side effects while
/// keeping the player's king out of check.
fn survives_relocation(position: &Position, from: Square, to: Square, player: Player) -> bool {
    let mut next = position.clone();
    next.relocate(from, to);
    !is_in_check(&next, player)
}

/// Checks all castling conditions: neither the king nor the rook have moved,
/// the squares between them are empty, the king is not in check and does not
/// pass through or land on an attacked square.
#[must_use]
pub fn can_castle(position: &Position, player: Player, side: CastleSide) -> bool {
    let rank = player.back_rank();
    let king_square = Square::new(KING_FILE, rank);
    let unmoved = |square: Square, kind: PieceKind| {
        matches!(
            position.at(square),
            Some(piece) if piece.owner == player && piece.kind == kind && piece.move_count == 0
        )
    };
    if !unmoved(king_square, PieceKind::King)
        || !unmoved(Square::new(side.rook_file(), rank), PieceKind::Rook)
    {
        return false;
    }
    if side
        .gap()
        .iter()
        .any(|&file| position.at(Square::new(file, rank)).is_some())
    {
        return false;
    }
    if is_in_check(position, player) {
        return false;
    }
    side.king_walk().iter().all(|&file| {
        survives_relocation(position, king_square, Square::new(file, rank), player)
    })
}

/// Short castle availability.
#[must_use]
pub fn can_castle_king_side(position: &Position, player: Player) -> bool {
    can_castle(position, player, CastleSide::King)
}

/// Long castle availability.
#[must_use]
pub fn can_castle_queen_side(position: &Position, player: Player) -> bool {
    can_castle(position, player, CastleSide::Queen)
}

/// Returns `true` if the move is a pawn capturing en passant: the last move
/// was a double push of an opponent's pawn that landed right next to the
/// capturing pawn, and the capture goes to the square it passed through.
#[must_use]
pub fn is_en_passant(position: &Position, from: Square, to: Square) -> bool {
    let Some(pawn) = position.at(from) else {
        return false;
    };
    let Some(last_move) = position.last_move() else {
        return false;
    };
    let (files, ranks) = delta(from, to);
    let victim = Square::new(to.file(), from.rank());
    pawn.kind == PieceKind::Pawn
        && from.rank() == pawn.owner.en_passant_rank()
        && ranks == pawn.owner.forward()
        && files.abs() == 1
        && position.at(to).is_none()
        && last_move.piece == PieceKind::Pawn
        && last_move.is_double_push()
        && last_move.to == victim
        && matches!(
            position.at(victim),
            Some(piece) if piece.kind == PieceKind::Pawn && piece.owner != pawn.owner
        )
}
