//! Provides fully-specified [Chess Position] implementation: stores the pieces
//! on the board, whose turn it is and the information about the last moves
//! that the rules depend on (en passant, castling eligibility, repetitions).
//!
//! [Chess Position]: https://www.chessprogramming.org/Chess_Position

use std::fmt;
use std::num::NonZeroU16;

use anyhow::{bail, Context};
use arrayvec::ArrayVec;

use crate::chess::core::{
    Move,
    MoveFlags,
    MoveRecord,
    Piece,
    PieceKind,
    Player,
    Square,
    BOARD_SIZE,
    BOARD_WIDTH,
};
use crate::chess::rules::{self, CastleSide, KING_FILE};

/// Number of the most recent moves kept for repetition detection.
pub const HISTORY_LIMIT: usize = 10;

/// Reasons for rejecting a move requested by a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[allow(missing_docs)]
    #[error("coordinates ({file}, {rank}) are outside of the board")]
    OutOfBounds { file: i32, rank: i32 },
    #[allow(missing_docs)]
    #[error("there is no piece on {0}")]
    EmptySquare(Square),
    #[allow(missing_docs)]
    #[error("piece on {square} belongs to {owner:?} but it is {side_to_move:?}'s turn")]
    WrongSide {
        square: Square,
        owner: Player,
        side_to_move: Player,
    },
    #[allow(missing_docs)]
    #[error("{piece} can not move from {from} to {to}")]
    IllegalGeometry { piece: Piece, from: Square, to: Square },
    #[allow(missing_docs)]
    #[error("{from}{to} leaves the king in check")]
    LeavesKingInCheck { from: Square, to: Square },
}

/// State of the chess game: the board, the side to move and the recent move
/// history. It can be converted to and from [Forsyth-Edwards Notation] (FEN).
///
/// [`Position::try_from()`] provides a convenient interface for creating a
/// [`Position`]: it trims the input and accepts optional "fen " prefix.
///
/// Positions are cheap to copy: the search clones them to explore moves.
///
/// [Forsyth-Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
#[derive(Clone)]
pub struct Position {
    board: [Option<Piece>; BOARD_SIZE as usize],
    side_to_move: Player,
    last_move: Option<MoveRecord>,
    /// Bounded log of the most recent moves, the oldest ones are evicted.
    history: ArrayVec<MoveRecord, HISTORY_LIMIT>,
    /// [Halfmove Clock] is the number of half-moves since the last capture or
    /// pawn move. It is only tracked for FEN output.
    ///
    /// [Halfmove Clock]: https://www.chessprogramming.org/Halfmove_Clock
    halfmove_clock: u16,
    /// Starts at 1 and is incremented after each Black's move.
    fullmove_number: NonZeroU16,
}

const BACK_RANK: [PieceKind; BOARD_WIDTH as usize] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl Position {
    /// Creates the starting position of the standard chess.
    ///
    /// ```
    /// use rush::chess::position::Position;
    ///
    /// let starting_position = Position::starting();
    /// assert_eq!(
    ///     &starting_position.to_string(),
    ///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
    /// );
    /// ```
    #[must_use]
    pub fn starting() -> Self {
        let mut result = Self::empty();
        for player in [Player::White, Player::Black] {
            for (file, kind) in (0..BOARD_WIDTH).zip(BACK_RANK) {
                result.put(
                    Square::new(file, player.back_rank()),
                    Piece::new(player, kind),
                );
                result.put(
                    Square::new(file, player.pawn_rank()),
                    Piece::new(player, PieceKind::Pawn),
                );
            }
        }
        result
    }

    /// Creates a board without any pieces with White to move.
    #[must_use]
    pub(crate) fn empty() -> Self {
        Self {
            board: [None; BOARD_SIZE as usize],
            side_to_move: Player::White,
            last_move: None,
            history: ArrayVec::new(),
            halfmove_clock: 0,
            fullmove_number: NonZeroU16::MIN,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn at(&self, square: Square) -> Option<Piece> {
        self.board[square.index()]
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    /// The most recently executed move, if any.
    #[must_use]
    pub const fn last_move(&self) -> Option<&MoveRecord> {
        self.last_move.as_ref()
    }

    /// Up to [`HISTORY_LIMIT`] most recent moves, oldest first.
    #[must_use]
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn fullmove_number(&self) -> u16 {
        self.fullmove_number.get()
    }

    /// Iterates over all occupied squares in board scan order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|square| self.at(square).map(|piece| (square, piece)))
    }

    /// Finds the king of the player. Returns [`None`] if there is none.
    #[must_use]
    pub fn king_square(&self, player: Player) -> Option<Square> {
        self.pieces()
            .find(|(_, piece)| piece.owner == player && piece.kind == PieceKind::King)
            .map(|(square, _)| square)
    }

    fn put(&mut self, square: Square, piece: Piece) {
        self.board[square.index()] = Some(piece);
    }

    fn take(&mut self, square: Square) -> Option<Piece> {
        self.board[square.index()].take()
    }

    /// Moves the piece without any bookkeeping or special move handling. Used
    /// for probing king safety on intermediate squares.
    pub(crate) fn relocate(&mut self, from: Square, to: Square) {
        self.board[to.index()] = self.take(from);
    }

    /// Validates and executes a move of the side to move.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection`] describing why the move can not be made. The
    /// position is unchanged in that case.
    pub fn apply_move(&mut self, from: Square, to: Square) -> Result<MoveRecord, Rejection> {
        let Some(piece) = self.at(from) else {
            return Err(Rejection::EmptySquare(from));
        };
        if piece.owner != self.side_to_move {
            return Err(Rejection::WrongSide {
                square: from,
                owner: piece.owner,
                side_to_move: self.side_to_move,
            });
        }
        if !rules::is_legal(self, from, to) {
            return Err(Rejection::IllegalGeometry { piece, from, to });
        }
        if !rules::is_safe(self, from, to, piece.owner) {
            return Err(Rejection::LeavesKingInCheck { from, to });
        }
        Ok(self.execute(piece, from, to))
    }

    /// Same as [`Position::apply_move`] but accepts raw coordinates (file and
    /// rank indices) that may be outside the board.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::OutOfBounds`] for malformed coordinates and any
    /// other [`Rejection`] reported by [`Position::apply_move`].
    pub fn apply_move_coordinates(
        &mut self,
        from: (i32, i32),
        to: (i32, i32),
    ) -> Result<MoveRecord, Rejection> {
        let square = |(file, rank): (i32, i32)| {
            Square::from_coordinates(file, rank).ok_or(Rejection::OutOfBounds { file, rank })
        };
        self.apply_move(square(from)?, square(to)?)
    }

    /// Executes the move without checking whether it is legal. Returns [`None`]
    /// (leaving the position untouched) only if there is no piece to move.
    ///
    /// The moves produced by
    /// [`generate_legal_moves`](crate::chess::movegen::generate_legal_moves)
    /// can always be made.
    pub(crate) fn make_move(&mut self, next_move: Move) -> Option<MoveRecord> {
        let piece = self.at(next_move.from)?;
        Some(self.execute(piece, next_move.from, next_move.to))
    }

    fn execute(&mut self, piece: Piece, from: Square, to: Square) -> MoveRecord {
        let mut flags = MoveFlags::empty();
        let mut captured = self.at(to).map(|victim| victim.kind);
        match piece.kind {
            PieceKind::Pawn if rules::is_en_passant(self, from, to) => {
                let victim = Square::new(to.file(), from.rank());
                captured = self.take(victim).map(|victim| victim.kind);
                flags |= MoveFlags::EN_PASSANT;
            },
            PieceKind::Pawn if from.rank().abs_diff(to.rank()) == 2 => {
                flags |= MoveFlags::DOUBLE_PUSH;
            },
            PieceKind::King
                if piece.move_count == 0
                    && from.file() == KING_FILE
                    && from.rank() == to.rank()
                    && from.file().abs_diff(to.file()) == 2 =>
            {
                if let Some(side) = CastleSide::from_king_target(to.file()) {
                    let rank = from.rank();
                    if let Some(rook) = self.take(Square::new(side.rook_file(), rank)) {
                        self.put(Square::new(side.rook_target_file(), rank), rook.moved());
                    }
                    flags |= MoveFlags::CASTLE;
                }
            },
            _ => (),
        }
        if captured.is_some() {
            flags |= MoveFlags::CAPTURE;
        }
        let moved = if piece.kind == PieceKind::Pawn && to.rank() == piece.owner.promotion_rank()
        {
            flags |= MoveFlags::PROMOTION;
            piece.promoted()
        } else {
            piece.moved()
        };
        let _ = self.take(from);
        self.put(to, moved);

        let record = MoveRecord {
            from,
            to,
            piece: piece.kind,
            flags,
            captured,
        };
        self.record(record);
        if piece.kind == PieceKind::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if self.side_to_move == Player::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.side_to_move = self.side_to_move.opponent();
        record
    }

    fn record(&mut self, record: MoveRecord) {
        if self.history.is_full() {
            let _ = self.history.remove(0);
        }
        self.history.push(record);
        self.last_move = Some(record);
    }

    /// Parses board from Forsyth-Edwards Notation.
    ///
    /// FEN does not carry the information about how many times each piece has
    /// moved, so it is reconstructed from the castling rights (king and rook
    /// that can not castle are considered moved) and pawn placement (pawns
    /// outside of their starting rank are considered moved). The en passant
    /// square is converted into the double push that has just happened.
    ///
    /// Halfmove clock and fullmove number are optional (EPD-style input).
    ///
    /// NOTE: This expects properly-formatted inputs: no extra symbols or
    /// additional whitespace. Use [`Position::try_from`] for cleaning up the
    /// input.
    pub fn from_fen(input: &str) -> anyhow::Result<Self> {
        let mut parts = input.split(' ');
        let mut result = Self::empty();
        let Some(placement) = parts.next() else {
            bail!("incorrect FEN: missing pieces placement");
        };
        let ranks = placement.split('/').collect::<Vec<_>>();
        if ranks.len() != BOARD_WIDTH as usize {
            bail!("incorrect FEN: there should be 8 ranks, got {placement}");
        }
        for (rank, rank_fen) in (0..BOARD_WIDTH).zip(ranks) {
            let mut file: u8 = 0;
            for symbol in rank_fen.chars() {
                if file >= BOARD_WIDTH {
                    bail!("incorrect FEN: rank {rank_fen} exceeds {BOARD_WIDTH} files");
                }
                match symbol {
                    '1'..='8' => file += symbol as u8 - b'0',
                    _ => {
                        result.put(Square::new(file, rank), Piece::try_from(symbol)?);
                        file += 1;
                    },
                }
            }
            if file != BOARD_WIDTH {
                bail!(
                    "incorrect FEN: rank size should be exactly {BOARD_WIDTH}, got {rank_fen} of length {file}"
                );
            }
        }
        result.validate()?;
        result.side_to_move = match parts.next() {
            Some(value) => value.try_into()?,
            None => bail!("incorrect FEN: missing side to move"),
        };
        let waiting = result.side_to_move.opponent();
        if rules::is_in_check(&result, waiting) {
            bail!("the {} king can be captured", player_name(waiting));
        }
        match parts.next() {
            Some(value) => result.set_castling_rights(value)?,
            None => bail!("incorrect FEN: missing castling rights"),
        };
        result.mark_moved_pawns();
        match parts.next() {
            Some("-") => (),
            Some(value) => result.set_en_passant(Square::try_from(value)?)?,
            None => bail!("incorrect FEN: missing en passant square"),
        };
        result.halfmove_clock = match parts.next() {
            Some(value) => parse_counter(value)
                .with_context(|| format!("incorrect FEN: halfmove clock can not be parsed {value}"))?,
            // This is a correct EPD: exit early.
            None => return Ok(result),
        };
        result.fullmove_number = match parts.next() {
            Some(value) => NonZeroU16::new(parse_counter(value).with_context(|| {
                format!("incorrect FEN: fullmove number can not be parsed {value}")
            })?)
            .context("incorrect FEN: fullmove number should start at 1")?,
            None => bail!("incorrect FEN: missing fullmove number"),
        };
        match parts.next() {
            None => Ok(result),
            Some(_) => bail!("trailing symbols are not allowed in FEN"),
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        for player in [Player::White, Player::Black] {
            let kings = self
                .pieces()
                .filter(|(_, piece)| piece.owner == player && piece.kind == PieceKind::King)
                .count();
            if kings != 1 {
                bail!("expected 1 {} king, got {kings}", player_name(player));
            }
        }
        if let Some((square, _)) = self.pieces().find(|(square, piece)| {
            piece.kind == PieceKind::Pawn
                && (square.rank() == Player::White.back_rank()
                    || square.rank() == Player::Black.back_rank())
        }) {
            bail!("pawns can not be placed on backranks, got one on {square}");
        }
        Ok(())
    }

    /// Kings and rooks that lost the right to castle are considered moved.
    fn set_castling_rights(&mut self, rights: &str) -> anyhow::Result<()> {
        if rights != "-" && (rights.is_empty() || !rights.chars().all(|c| "KQkq".contains(c))) {
            bail!("castling rights should be '-' or a subset of \"KQkq\", got '{rights}'");
        }
        for player in [Player::White, Player::Black] {
            let rank = player.back_rank();
            let mut any_right = false;
            for side in [CastleSide::King, CastleSide::Queen] {
                let symbol = castle_symbol(player, side);
                let rook_square = Square::new(side.rook_file(), rank);
                let has_right = rights.contains(symbol);
                if has_right {
                    if !matches!(self.at(rook_square), Some(p) if p.owner == player && p.kind == PieceKind::Rook)
                    {
                        bail!("castling right '{symbol}' requires a rook on {rook_square}");
                    }
                    any_right = true;
                } else {
                    self.mark_moved(rook_square, PieceKind::Rook);
                }
            }
            let king_square = Square::new(KING_FILE, rank);
            if any_right {
                if !matches!(self.at(king_square), Some(p) if p.owner == player && p.kind == PieceKind::King)
                {
                    bail!("castling requires the {} king on {king_square}", player_name(player));
                }
            } else {
                self.mark_moved(king_square, PieceKind::King);
            }
        }
        // Kings and rooks away from their initial squares can not castle.
        for (square, piece) in self.pieces().collect::<Vec<_>>() {
            let home = match piece.kind {
                PieceKind::King => square.file() == KING_FILE,
                PieceKind::Rook => {
                    square.file() == CastleSide::King.rook_file()
                        || square.file() == CastleSide::Queen.rook_file()
                },
                _ => true,
            };
            if !home || square.rank() != piece.owner.back_rank() {
                self.mark_moved(square, piece.kind);
            }
        }
        Ok(())
    }

    fn mark_moved(&mut self, square: Square, kind: PieceKind) {
        if let Some(piece) = self.board[square.index()].as_mut() {
            if piece.kind == kind {
                piece.move_count = piece.move_count.max(1);
            }
        }
    }

    fn mark_moved_pawns(&mut self) {
        for (square, piece) in self.pieces().collect::<Vec<_>>() {
            if piece.kind == PieceKind::Pawn && square.rank() != piece.owner.pawn_rank() {
                self.mark_moved(square, PieceKind::Pawn);
            }
        }
    }

    /// Restores the double push that made the en passant capture possible.
    fn set_en_passant(&mut self, square: Square) -> anyhow::Result<()> {
        let pusher = self.side_to_move.opponent();
        let forward = pusher.forward();
        let expected_rank = i32::from(pusher.pawn_rank()) + i32::from(forward);
        if i32::from(square.rank()) != expected_rank {
            bail!("en passant square {square} is on the wrong rank");
        }
        let (Some(from), Some(to)) = (square.offset(0, -forward), square.offset(0, forward)) else {
            bail!("en passant square {square} is on the wrong rank");
        };
        if !matches!(self.at(to), Some(p) if p.owner == pusher && p.kind == PieceKind::Pawn)
            || self.at(square).is_some()
            || self.at(from).is_some()
        {
            bail!("en passant square {square} should be right behind a pushed pawn");
        }
        self.last_move = Some(MoveRecord {
            from,
            to,
            piece: PieceKind::Pawn,
            flags: MoveFlags::DOUBLE_PUSH,
            captured: None,
        });
        Ok(())
    }

    fn castling_rights(&self) -> String {
        let rights = [Player::White, Player::Black]
            .into_iter()
            .flat_map(|player| {
                [CastleSide::King, CastleSide::Queen]
                    .into_iter()
                    .filter(move |&side| self.has_castling_right(player, side))
                    .map(move |side| castle_symbol(player, side))
            })
            .collect::<String>();
        if rights.is_empty() {
            "-".to_string()
        } else {
            rights
        }
    }

    fn has_castling_right(&self, player: Player, side: CastleSide) -> bool {
        let rank = player.back_rank();
        let unmoved = |square: Square, kind: PieceKind| {
            matches!(
                self.at(square),
                Some(p) if p.owner == player && p.kind == kind && p.move_count == 0
            )
        };
        unmoved(Square::new(KING_FILE, rank), PieceKind::King)
            && unmoved(Square::new(side.rook_file(), rank), PieceKind::Rook)
    }

    fn en_passant_square(&self) -> Option<Square> {
        self.last_move
            .filter(MoveRecord::is_double_push)
            .map(|last| Square::new(last.to.file(), (last.from.rank() + last.to.rank()) / 2))
    }
}

fn parse_counter(value: &str) -> anyhow::Result<u16> {
    if !value.bytes().all(|c| c.is_ascii_digit()) {
        bail!("counters can not contain anything other than digits");
    }
    Ok(value.parse::<u16>()?)
}

const fn castle_symbol(player: Player, side: CastleSide) -> char {
    match (player, side) {
        (Player::White, CastleSide::King) => 'K',
        (Player::White, CastleSide::Queen) => 'Q',
        (Player::Black, CastleSide::King) => 'k',
        (Player::Black, CastleSide::Queen) => 'q',
    }
}

const fn player_name(player: Player) -> &'static str {
    match player {
        Player::White => "white",
        Player::Black => "black",
    }
}

impl TryFrom<&str> for Position {
    type Error = anyhow::Error;

    fn try_from(input: &str) -> anyhow::Result<Self> {
        let input = input.trim();
        match input.strip_prefix("fen ") {
            Some(stripped) => Self::from_fen(stripped),
            None => Self::from_fen(input),
        }
    }
}

impl fmt::Display for Position {
    /// Prints board in Forsyth-Edwards Notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in 0..BOARD_WIDTH {
            let mut empty_squares = 0;
            for file in 0..BOARD_WIDTH {
                match self.at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty_squares != 0 {
                            write!(f, "{empty_squares}")?;
                            empty_squares = 0;
                        }
                        write!(f, "{piece}")?;
                    },
                    None => empty_squares += 1,
                }
            }
            if empty_squares != 0 {
                write!(f, "{empty_squares}")?;
            }
            if rank != BOARD_WIDTH - 1 {
                write!(f, "/")?;
            }
        }
        write!(f, " {} {} ", self.side_to_move, self.castling_rights())?;
        match self.en_passant_square() {
            Some(square) => write!(f, "{square} "),
            None => write!(f, "- "),
        }?;
        write!(f, "{} {}", self.halfmove_clock, self.fullmove_number)
    }
}

impl fmt::Debug for Position {
    /// Prints the board diagram (White at the bottom) followed by the state.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in 0..BOARD_WIDTH {
            let row = (0..BOARD_WIDTH)
                .map(|file| match self.at(Square::new(file, rank)) {
                    Some(piece) => piece.to_string(),
                    None => ".".to_string(),
                })
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{row}")?;
        }
        writeln!(f)?;
        writeln!(f, "Player to move: {:?}", &self.side_to_move)?;
        writeln!(f, "Fullmove number: {}", &self.fullmove_number)?;
        writeln!(f, "En Passant: {:?}", &self.en_passant_square())?;
        writeln!(f, "FEN: {self}")
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn setup(fen: &str) -> Position {
        let position = Position::try_from(fen);
        assert!(position.is_ok(), "input: {fen}");
        let position = position.unwrap();
        assert_eq!(position.to_string(), fen);
        position
    }

    fn square(input: &str) -> Square {
        Square::try_from(input).unwrap()
    }

    #[test]
    #[allow(unused_results)]
    fn correct_fen() {
        setup("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        setup("2r3r1/p3k3/1p3pp1/1B5p/5P2/2P1p1P1/PP4KP/3R4 w - - 0 34");
        setup("rnbqk1nr/p3bppp/1p2p3/2ppP3/3P4/P7/1PP1NPPP/R1BQKBNR w KQkq c6 0 7");
        setup("r2qkb1r/1pp1pp1p/p1np1np1/1B6/3PP1b1/2N1BN2/PPP2PPP/R2QK2R w KQkq - 0 7");
        setup("r3k3/5p2/2p5/p7/P3r3/2N2n2/1PP2P2/2K2B2 w q - 0 24");
        setup("r1b1qrk1/ppp2pbp/n2p1np1/4p1B1/2PPP3/2NB1N1P/PP3PP1/R2QK2R w KQ e6 0 9");
    }

    #[test]
    fn epd_and_prefix() {
        let position =
            Position::try_from("fen rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -\n")
                .unwrap();
        assert_eq!(
            position.to_string(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[test]
    fn starting_position() {
        let position = Position::starting();
        assert_eq!(position.pieces().count(), 32);
        assert_eq!(position.side_to_move(), Player::White);
        assert_eq!(position.king_square(Player::White), Some(square("e1")));
        assert_eq!(position.king_square(Player::Black), Some(square("e8")));
        assert!(position.last_move().is_none());
        assert!(position.history().is_empty());
    }

    #[test]
    fn incorrect_fen() {
        for input in [
            "",
            "8/8/8/8/8/8/8/8 w - - 0 1",
            "4k3/8/8/8/8/8/8/4KK2 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 x - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w K - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w - e3 0 1",
            "4k3/8/8/8/8/8/8/4K3 w - - 0 0",
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1 extra",
            "4k3/8/8/8/8/8/8/4K4 w - - 0 1",
            "3kP3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w",
            // The king that is not to move could be captured.
            "4k3/8/8/8/8/8/8/r3K3 b - - 0 1",
            "4k3/4R3/8/8/8/8/8/4K3 w - - 0 1",
        ] {
            assert!(Position::try_from(input).is_err(), "input: {input}");
        }
    }

    #[test]
    fn king_count_message() {
        assert_eq!(
            Position::try_from("4k3/8/8/8/8/8/8/8 w - - 0 1")
                .err()
                .map(|e| e.to_string()),
            Some("expected 1 white king, got 0".to_string())
        );
    }

    #[test]
    fn move_counts_from_fen() {
        let position = setup("r3k2r/8/8/8/3P4/8/4P3/R3K2R w Kq - 0 1");
        assert_eq!(position.at(square("e2")).unwrap().move_count, 0);
        assert_eq!(position.at(square("d4")).unwrap().move_count, 1);
        assert_eq!(position.at(square("h1")).unwrap().move_count, 0);
        assert_eq!(position.at(square("a1")).unwrap().move_count, 1);
        assert_eq!(position.at(square("e1")).unwrap().move_count, 0);
        assert_eq!(position.at(square("h8")).unwrap().move_count, 1);
        assert_eq!(position.at(square("a8")).unwrap().move_count, 0);
    }

    #[test]
    fn en_passant_from_fen() {
        let position = setup("rnbqkbnr/pppp1ppp/8/8/3pP3/8/PPP2PPP/RNBQKBNR b KQkq e3 0 3");
        let last = position.last_move().unwrap();
        assert!(last.is_double_push());
        assert_eq!(last.from, square("e2"));
        assert_eq!(last.to, square("e4"));
    }

    #[test]
    fn make_moves() {
        let mut position = Position::starting();
        let record = position.apply_move(square("e2"), square("e4")).unwrap();
        assert!(record.is_double_push());
        assert_eq!(record.piece, PieceKind::Pawn);
        assert_eq!(
            position.to_string(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        let _ = position.apply_move(square("g8"), square("f6")).unwrap();
        assert_eq!(
            position.to_string(),
            "rnbqkb1r/pppppppp/5n2/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 1 2"
        );
        assert_eq!(position.history().len(), 2);
        assert_eq!(position.fullmove_number(), 2);
    }

    #[test]
    fn rejections() {
        let mut position = Position::starting();
        assert_eq!(
            position.apply_move(square("e4"), square("e5")),
            Err(Rejection::EmptySquare(square("e4")))
        );
        assert!(matches!(
            position.apply_move(square("e7"), square("e5")),
            Err(Rejection::WrongSide { .. })
        ));
        assert!(matches!(
            position.apply_move(square("e2"), square("e5")),
            Err(Rejection::IllegalGeometry { .. })
        ));
        assert_eq!(
            position.apply_move_coordinates((4, 6), (4, 8)),
            Err(Rejection::OutOfBounds { file: 4, rank: 8 })
        );
        assert_eq!(position.to_string(), Position::starting().to_string());

        let mut pinned = setup("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1");
        assert_eq!(
            pinned.apply_move(square("e2"), square("d3")),
            Err(Rejection::LeavesKingInCheck {
                from: square("e2"),
                to: square("d3"),
            })
        );
    }

    #[test]
    fn castling_moves_rook() {
        let mut position = setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let record = position.apply_move(square("e1"), square("g1")).unwrap();
        assert!(record.is_castle());
        assert_eq!(
            position.to_string(),
            "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1"
        );
        let record = position.apply_move(square("e8"), square("c8")).unwrap();
        assert!(record.is_castle());
        assert_eq!(position.to_string(), "2kr3r/8/8/8/8/8/8/R4RK1 w - - 2 2");
    }

    #[test]
    fn promotion() {
        let mut position = setup("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1");
        let record = position.apply_move(square("b7"), square("b8")).unwrap();
        assert!(record.is_promotion());
        assert_eq!(record.piece, PieceKind::Pawn);
        assert_eq!(
            position.at(square("b8")),
            Some(Piece {
                owner: Player::White,
                kind: PieceKind::Queen,
                move_count: 2,
            })
        );
    }

    #[test]
    fn bounded_history() {
        let mut position = Position::starting();
        for _ in 0..3 {
            for (from, to) in [("g1", "f3"), ("g8", "f6"), ("f3", "g1"), ("f6", "g8")] {
                let _ = position.apply_move(square(from), square(to)).unwrap();
            }
        }
        assert_eq!(position.history().len(), HISTORY_LIMIT);
        // The first two moves were evicted.
        assert_eq!(position.history()[0].from, square("f3"));
        assert_eq!(position.history()[0].to, square("g1"));
        assert_eq!(position.last_move().unwrap().from, square("f6"));
    }
}
