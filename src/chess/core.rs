//! Chess primitives commonly used within [`crate::chess`].

use std::fmt::{self, Write};

use anyhow::bail;
use itertools::Itertools;

#[allow(missing_docs)]
pub const BOARD_WIDTH: u8 = 8;
#[allow(missing_docs)]
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_WIDTH;

/// A square on the board, stored as a compact index.
///
/// Files go from left to right (`a` is file 0) and ranks go from the top of the
/// board to the bottom: rank 0 is Black's back rank (the 8th rank in algebraic
/// notation) and rank 7 is White's back rank.
///
/// ```
/// use rush::chess::core::Square;
///
/// let square = Square::try_from("e4").unwrap();
/// assert_eq!(square.file(), 4);
/// assert_eq!(square.rank(), 4);
/// assert_eq!(Square::try_from("a8").unwrap().rank(), 0);
/// assert_eq!(std::mem::size_of::<Square>(), 1);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    index: u8,
}

impl Square {
    /// Connects file (column) and rank (row) to form a full square. Both have
    /// to be within `0..BOARD_WIDTH`.
    #[must_use]
    pub(crate) const fn new(file: u8, rank: u8) -> Self {
        debug_assert!(file < BOARD_WIDTH && rank < BOARD_WIDTH);
        Self {
            index: rank * BOARD_WIDTH + file,
        }
    }

    /// Creates a square from raw (possibly malformed) coordinates. Returns
    /// [`None`] if any of them is outside the board.
    #[must_use]
    pub fn from_coordinates(file: i32, rank: i32) -> Option<Self> {
        let width = i32::from(BOARD_WIDTH);
        if (0..width).contains(&file) && (0..width).contains(&rank) {
            Some(Self::new(file as u8, rank as u8))
        } else {
            None
        }
    }

    /// Returns file (column) on which the square is located.
    #[must_use]
    pub const fn file(self) -> u8 {
        self.index % BOARD_WIDTH
    }

    /// Returns rank (row) on which the square is located.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.index / BOARD_WIDTH
    }

    #[must_use]
    pub(crate) const fn index(self) -> usize {
        self.index as usize
    }

    /// Moves the square by the given number of files and ranks, returning
    /// [`None`] when the result falls off the board.
    #[must_use]
    pub fn offset(self, files: i8, ranks: i8) -> Option<Self> {
        Self::from_coordinates(
            i32::from(self.file()) + i32::from(files),
            i32::from(self.rank()) + i32::from(ranks),
        )
    }

    /// Iterates over all squares in board scan order: rank by rank starting
    /// from Black's back rank, file by file within each rank.
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..BOARD_SIZE).map(|index| Self { index })
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    /// Parses a square in algebraic notation, e.g. "e4".
    fn try_from(square: &str) -> anyhow::Result<Self> {
        let Some((file, rank)) = square.chars().collect_tuple() else {
            bail!(
                "square should be two-char, got {square} with {} chars",
                square.chars().count()
            )
        };
        let file = match file {
            'a'..='h' => file as u8 - b'a',
            _ => bail!("file should be within 'a'..='h', got '{file}'"),
        };
        let rank = match rank {
            '1'..='8' => b'8' - rank as u8,
            _ => bail!("rank should be within '1'..='8', got '{rank}'"),
        };
        Ok(Self::new(file, rank))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(file_symbol(self.file()))?;
        f.write_char(rank_symbol(self.rank()))
    }
}

/// Lowercase letter of the file in algebraic notation.
pub(crate) const fn file_symbol(file: u8) -> char {
    (b'a' + file) as char
}

/// Digit of the rank in algebraic notation.
pub(crate) const fn rank_symbol(rank: u8) -> char {
    (b'8' - rank) as char
}

/// A standard game of chess is played between two players: White (having the
/// advantage of the first turn) and Black.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// "Flips" the color.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Rank delta of a single pawn push.
    #[must_use]
    pub const fn forward(self) -> i8 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }

    /// The rank on which the king and rooks start.
    #[must_use]
    pub const fn back_rank(self) -> u8 {
        match self {
            Self::White => 7,
            Self::Black => 0,
        }
    }

    /// The rank on which pawns start and may double push from.
    #[must_use]
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Self::White => 6,
            Self::Black => 1,
        }
    }

    /// Pawns of this player can only capture en passant from this rank.
    #[must_use]
    pub const fn en_passant_rank(self) -> u8 {
        match self {
            Self::White => 3,
            Self::Black => 4,
        }
    }

    /// Pawns reaching this rank are promoted.
    #[must_use]
    pub const fn promotion_rank(self) -> u8 {
        self.opponent().back_rank()
    }
}

impl TryFrom<&str> for Player {
    type Error = anyhow::Error;

    fn try_from(player: &str) -> anyhow::Result<Self> {
        match player {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => bail!("player should be 'w' or 'b', got '{player}'"),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match &self {
            Self::White => 'w',
            Self::Black => 'b',
        })
    }
}

/// How a piece travels across the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementClass {
    /// Moves any number of squares along a line until blocked.
    Sliding,
    /// Moves by a fixed offset, ignoring intermediate squares.
    Jumping,
}

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROYAL_DIRECTIONS: [(i8, i8); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// Standard [chess pieces].
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Movement class used by the geometry rules. Pawns have their own rule
    /// and are considered jumping.
    #[must_use]
    pub const fn movement_class(self) -> MovementClass {
        match self {
            Self::Bishop | Self::Rook | Self::Queen => MovementClass::Sliding,
            Self::Pawn | Self::Knight | Self::King => MovementClass::Jumping,
        }
    }

    /// Unit directions for sliding pieces and exact offsets for jumping ones.
    /// Pawns are handled separately and have none.
    #[must_use]
    pub const fn directions(self) -> &'static [(i8, i8)] {
        match self {
            Self::Pawn => &[],
            Self::Knight => &KNIGHT_OFFSETS,
            Self::Bishop => &BISHOP_DIRECTIONS,
            Self::Rook => &ROOK_DIRECTIONS,
            Self::Queen | Self::King => &ROYAL_DIRECTIONS,
        }
    }

    /// Uppercase letter used in Standard Algebraic Notation. Pawns have none.
    #[must_use]
    pub const fn san_symbol(self) -> Option<char> {
        match self {
            Self::Pawn => None,
            Self::Knight => Some('N'),
            Self::Bishop => Some('B'),
            Self::Rook => Some('R'),
            Self::Queen => Some('Q'),
            Self::King => Some('K'),
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match &self {
            Self::King => 'k',
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
            Self::Pawn => 'p',
        })
    }
}

/// Represents a specific piece owned by a player.
///
/// Pieces are plain values: "changing" a piece (moving it or promoting it)
/// produces a new record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    #[allow(missing_docs)]
    pub owner: Player,
    #[allow(missing_docs)]
    pub kind: PieceKind,
    /// Number of moves this piece took part in (castling counts for both the
    /// king and the rook).
    pub move_count: u16,
}

impl Piece {
    /// Creates a piece that has not moved yet.
    #[must_use]
    pub const fn new(owner: Player, kind: PieceKind) -> Self {
        Self {
            owner,
            kind,
            move_count: 0,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn movement_class(self) -> MovementClass {
        self.kind.movement_class()
    }

    /// The same piece after one more move.
    #[must_use]
    pub const fn moved(self) -> Self {
        Self {
            move_count: self.move_count + 1,
            ..self
        }
    }

    /// The queen a pawn turns into on the move that reaches the last rank.
    #[must_use]
    pub const fn promoted(self) -> Self {
        Self {
            kind: PieceKind::Queen,
            move_count: self.move_count + 1,
            ..self
        }
    }
}

impl TryFrom<char> for Piece {
    type Error = anyhow::Error;

    fn try_from(symbol: char) -> anyhow::Result<Self> {
        let owner = if symbol.is_ascii_uppercase() {
            Player::White
        } else {
            Player::Black
        };
        let kind = match symbol.to_ascii_lowercase() {
            'k' => PieceKind::King,
            'q' => PieceKind::Queen,
            'r' => PieceKind::Rook,
            'b' => PieceKind::Bishop,
            'n' => PieceKind::Knight,
            'p' => PieceKind::Pawn,
            _ => bail!("piece symbol should be within \"KQRBNPkqrbnp\", got '{symbol}'"),
        };
        Ok(Self::new(owner, kind))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.kind.to_string();
        match self.owner {
            // White player: uppercase symbols.
            Player::White => f.write_str(&symbol.to_ascii_uppercase()),
            // Black player: lowercase symbols.
            Player::Black => f.write_str(&symbol),
        }
    }
}

/// A candidate move: a piece travels from one square to another. Castling is
/// encoded as the king move, promotion is implied by a pawn reaching the last
/// rank.
///
/// The move has one-to-one correspondence with the UCI move representation
/// (always promoting to a queen).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub(crate) from: Square,
    pub(crate) to: Square,
}

impl Move {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn from(&self) -> Square {
        self.from
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// Parses a move in UCI format, e.g. "e2e4" or "e7e8q".
    ///
    /// # Errors
    ///
    /// Returns an error if the squares are malformed or an under-promotion is
    /// requested.
    pub fn from_uci(input: &str) -> anyhow::Result<Self> {
        if !input.is_ascii() || !(4..=5).contains(&input.len()) {
            bail!("UCI move should be 4 or 5 ASCII chars, got '{input}'");
        }
        let from = Square::try_from(&input[..2])?;
        let to = Square::try_from(&input[2..4])?;
        match input.as_bytes().get(4) {
            None | Some(b'q') => Ok(Self::new(from, to)),
            Some(promotion) => bail!(
                "only promotion to a queen is supported, got '{}'",
                *promotion as char
            ),
        }
    }
}

impl fmt::Display for Move {
    /// Serializes a move in [UCI format] (without the promotion suffix).
    ///
    /// [UCI format]: http://wbec-ridderkerk.nl/html/UCIProtocol.html
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

bitflags::bitflags! {
    /// More information about an executed move that makes it possible to
    /// reason about it later (en passant eligibility, notation, repetition).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MoveFlags: u8 {
        /// The move removed an opponent's piece.
        const CAPTURE = 0b0000_0001;
        /// Pawn capture "in passing" of a pawn that has just advanced two
        /// squares.
        const EN_PASSANT = 0b0000_0010;
        /// King and rook moved simultaneously.
        const CASTLE = 0b0000_0100;
        /// The pawn reached the last rank and became a queen.
        const PROMOTION = 0b0000_1000;
        /// Pawn advancement by 2 squares from its starting rank.
        const DOUBLE_PUSH = 0b0001_0000;
    }
}

/// A move that has been executed on a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MoveRecord {
    #[allow(missing_docs)]
    pub from: Square,
    #[allow(missing_docs)]
    pub to: Square,
    /// Kind of the moving piece before the move (a promoting pawn is a
    /// [`PieceKind::Pawn`]).
    pub piece: PieceKind,
    #[allow(missing_docs)]
    pub flags: MoveFlags,
    #[allow(missing_docs)]
    pub captured: Option<PieceKind>,
}

impl MoveRecord {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn as_move(&self) -> Move {
        Move::new(self.from, self.to)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_en_passant(&self) -> bool {
        self.flags.contains(MoveFlags::EN_PASSANT)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_castle(&self) -> bool {
        self.flags.contains(MoveFlags::CASTLE)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_capture(&self) -> bool {
        self.flags.contains(MoveFlags::CAPTURE)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_promotion(&self) -> bool {
        self.flags.contains(MoveFlags::PROMOTION)
    }

    /// Returns `true` if a pawn has just advanced two squares.
    #[must_use]
    pub const fn is_double_push(&self) -> bool {
        self.flags.contains(MoveFlags::DOUBLE_PUSH)
    }
}

#[cfg(test)]
mod test {
    use std::mem::size_of;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn square_from_str() {
        assert_eq!(Square::try_from("a8").unwrap(), Square::new(0, 0));
        assert_eq!(Square::try_from("h1").unwrap(), Square::new(7, 7));
        assert_eq!(Square::try_from("e2").unwrap(), Square::new(4, 6));
        assert_eq!(Square::try_from("c5").unwrap().to_string(), "c5");
    }

    #[test]
    #[should_panic(expected = "file should be within 'a'..='h', got 'i'")]
    fn square_from_incorrect_file() {
        let _ = Square::try_from("i4").unwrap();
    }

    #[test]
    #[should_panic(expected = "rank should be within '1'..='8', got '9'")]
    fn square_from_incorrect_rank() {
        let _ = Square::try_from("a9").unwrap();
    }

    #[test]
    fn malformed_coordinates() {
        assert_eq!(Square::from_coordinates(-1, 0), None);
        assert_eq!(Square::from_coordinates(0, 8), None);
        assert_eq!(Square::from_coordinates(8, 3), None);
        assert_eq!(Square::from_coordinates(8, 8), None);
        assert_eq!(Square::from_coordinates(i32::MAX, i32::MIN), None);
        assert_eq!(Square::from_coordinates(7, 7), Some(Square::new(7, 7)));
    }

    #[test]
    fn offsets() {
        let square = Square::try_from("e4").unwrap();
        assert_eq!(square.offset(0, -1), Square::try_from("e5").ok());
        assert_eq!(square.offset(-1, 1), Square::try_from("d3").ok());
        assert_eq!(Square::try_from("a1").unwrap().offset(-1, 0), None);
        assert_eq!(Square::try_from("h8").unwrap().offset(0, -1), None);
    }

    #[test]
    fn scan_order() {
        let squares = Square::iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(squares.len(), BOARD_SIZE as usize);
        assert_eq!(squares[0], "a8");
        assert_eq!(squares[7], "h8");
        assert_eq!(squares[8], "a7");
        assert_eq!(squares[63], "h1");
    }

    #[test]
    fn pieces() {
        let piece = Piece::try_from('N').unwrap();
        assert_eq!(piece, Piece::new(Player::White, PieceKind::Knight));
        assert_eq!(piece.to_string(), "N");
        assert_eq!(Piece::try_from('q').unwrap().to_string(), "q");
        assert!(Piece::try_from('x').is_err());

        let pawn = Piece::new(Player::Black, PieceKind::Pawn);
        assert_eq!(pawn.moved().move_count, 1);
        let queen = pawn.moved().promoted();
        assert_eq!(queen.kind, PieceKind::Queen);
        assert_eq!(queen.owner, Player::Black);
        assert_eq!(queen.move_count, 2);
        assert_eq!(queen.movement_class(), MovementClass::Sliding);
    }

    #[test]
    fn uci_moves() {
        let parsed = Move::from_uci("e2e4").unwrap();
        assert_eq!(parsed.from(), Square::try_from("e2").unwrap());
        assert_eq!(parsed.to(), Square::try_from("e4").unwrap());
        assert_eq!(parsed.to_string(), "e2e4");
        assert!(Move::from_uci("e7e8q").is_ok());
        assert!(Move::from_uci("e7e8n").is_err());
        assert!(Move::from_uci("e2").is_err());
        assert!(Move::from_uci("e2e9").is_err());
    }

    #[test]
    fn player_geometry() {
        assert_eq!(Player::White.promotion_rank(), 0);
        assert_eq!(Player::Black.promotion_rank(), 7);
        assert_eq!(Player::White.opponent(), Player::Black);
        assert_eq!(
            i32::from(Player::White.pawn_rank()) + 2 * i32::from(Player::White.forward()),
            4
        );
    }

    #[test]
    fn primitive_size() {
        assert_eq!(size_of::<Square>(), 1);
        assert_eq!(size_of::<Piece>(), size_of::<Option<Piece>>());
    }
}
