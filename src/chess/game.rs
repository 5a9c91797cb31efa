//! Terminal states of the game (checkmate, stalemate and draws) and the
//! [`Game`] that drives a position from the start to the end while keeping a
//! record of the played moves.

use std::fmt;

use itertools::Itertools;

use crate::chess::core::{Move, MoveRecord, PieceKind, Player, Square};
use crate::chess::movegen::has_legal_move;
use crate::chess::notation;
use crate::chess::position::{Position, Rejection, HISTORY_LIMIT};
use crate::chess::rules;

/// State of the game from the perspective of the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    /// The game continues and the side to move is not in check.
    InProgress,
    /// The side to move is in check but can escape it.
    Check,
    /// The given player has been checkmated.
    Checkmate(Player),
    /// The side to move has no legal moves but is not in check.
    Stalemate,
    /// Neither side can deliver a checkmate.
    InsufficientMaterial,
    /// The same moves have been repeated three times.
    ThreefoldRepetition,
}

impl GameStatus {
    /// Returns `true` if the game is over.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress | Self::Check)
    }

    /// Result token in [PGN] format: "1-0", "0-1", "1/2-1/2" or "*" for the
    /// games that are still in progress.
    ///
    /// [PGN]: https://www.chessprogramming.org/Portable_Game_Notation
    #[must_use]
    pub const fn result(self) -> &'static str {
        match self {
            Self::InProgress | Self::Check => "*",
            Self::Checkmate(Player::White) => "0-1",
            Self::Checkmate(Player::Black) => "1-0",
            Self::Stalemate | Self::InsufficientMaterial | Self::ThreefoldRepetition => "1/2-1/2",
        }
    }
}

/// Why the game ended in a draw.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    ThreefoldRepetition,
}

/// The player is in check and has no legal moves.
#[must_use]
pub fn is_checkmate(position: &Position, player: Player) -> bool {
    rules::is_in_check(position, player) && !has_legal_move(position, player)
}

/// The player is not in check and has no legal moves.
#[must_use]
pub fn is_stalemate(position: &Position, player: Player) -> bool {
    !rules::is_in_check(position, player) && !has_legal_move(position, player)
}

/// Returns the reason the game is drawn for the player, if it is.
#[must_use]
pub fn draw_reason(position: &Position, player: Player) -> Option<DrawReason> {
    if is_stalemate(position, player) {
        Some(DrawReason::Stalemate)
    } else if has_insufficient_material(position) {
        Some(DrawReason::InsufficientMaterial)
    } else if is_threefold_repetition(position) {
        Some(DrawReason::ThreefoldRepetition)
    } else {
        None
    }
}

#[allow(missing_docs)]
#[must_use]
pub fn is_draw(position: &Position, player: Player) -> bool {
    draw_reason(position, player).is_some()
}

/// Only kings are left, or kings with a single minor piece, or kings with two
/// bishops.
#[must_use]
pub fn has_insufficient_material(position: &Position) -> bool {
    let kinds = position
        .pieces()
        .map(|(_, piece)| piece.kind)
        .sorted()
        .collect::<Vec<_>>();
    matches!(
        kinds.as_slice(),
        [PieceKind::King, PieceKind::King]
            | [PieceKind::Knight | PieceKind::Bishop, PieceKind::King, PieceKind::King]
            | [PieceKind::Bishop, PieceKind::Bishop, PieceKind::King, PieceKind::King]
    )
}

/// Approximates threefold repetition on the bounded move history: both players
/// have been shuffling the same pair of moves back and forth, i.e. the last
/// move matches the moves 4 and 8 plies earlier and the move before it matches
/// the moves 5 and 9 plies earlier.
///
/// This is a heuristic over moves rather than positions and may miss
/// repetitions reached through different move orders.
#[must_use]
pub fn is_threefold_repetition(position: &Position) -> bool {
    let history = position.history();
    let n = history.len();
    if n < HISTORY_LIMIT {
        return false;
    }
    let at = |back: usize| &history[n - back];
    at(1) == at(5) && at(2) == at(6) && at(1) == at(9) && at(2) == at(10)
}

/// Reports the state of the game for the side to move.
#[must_use]
pub fn status(position: &Position) -> GameStatus {
    let us = position.side_to_move();
    let in_check = rules::is_in_check(position, us);
    if !has_legal_move(position, us) {
        return if in_check {
            GameStatus::Checkmate(us)
        } else {
            GameStatus::Stalemate
        };
    }
    if has_insufficient_material(position) {
        GameStatus::InsufficientMaterial
    } else if is_threefold_repetition(position) {
        GameStatus::ThreefoldRepetition
    } else if in_check {
        GameStatus::Check
    } else {
        GameStatus::InProgress
    }
}

/// The Seven Tag Roster without `Result`, with the values for unknown data.
const ROSTER: [(&str, &str); 6] = [
    ("Event", "?"),
    ("Site", "?"),
    ("Date", "????.??.??"),
    ("Round", "?"),
    ("White", "?"),
    ("Black", "?"),
];

/// Moves of the game in Standard Algebraic Notation and the [PGN] tags
/// describing it.
///
/// [PGN]: https://www.chessprogramming.org/Portable_Game_Notation
#[derive(Clone, Debug)]
pub struct GameRecord {
    /// Tag pairs. The roster tags are printed first in their standard order
    /// followed by `Result`, the other tags keep their insertion order.
    /// `Result` itself always follows the game status.
    pub tags: Vec<(String, String)>,
    /// FEN of the initial position if the game did not start from the
    /// standard starting position.
    setup: Option<String>,
    first_player: Player,
    first_move_number: u16,
    moves: Vec<String>,
    result: GameStatus,
}

impl GameRecord {
    fn new(initial: &Position) -> Self {
        let setup = initial.to_string();
        let tags = ROSTER
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Self {
            tags,
            setup: (setup != Position::starting().to_string()).then_some(setup),
            first_player: initial.side_to_move(),
            first_move_number: initial.fullmove_number(),
            moves: Vec::new(),
            result: status(initial),
        }
    }

    /// Moves played so far in Standard Algebraic Notation.
    #[must_use]
    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    /// Sets the value of an existing tag or appends a new one.
    pub fn set_tag(&mut self, name: &str, value: &str) {
        match self.tags.iter_mut().find(|(tag, _)| tag == name) {
            Some((_, old)) => *old = value.to_string(),
            None => self.tags.push((name.to_string(), value.to_string())),
        }
    }
}

impl fmt::Display for GameRecord {
    /// Prints the game in Portable Game Notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let in_roster = |tag: &str| ROSTER.iter().any(|(name, _)| *name == tag);
        for (name, _) in ROSTER {
            if let Some((_, value)) = self.tags.iter().find(|(tag, _)| tag == name) {
                writeln!(f, "[{name} \"{value}\"]")?;
            }
        }
        writeln!(f, "[Result \"{}\"]", self.result.result())?;
        if let Some(fen) = &self.setup {
            writeln!(f, "[SetUp \"1\"]")?;
            writeln!(f, "[FEN \"{fen}\"]")?;
        }
        for (name, value) in &self.tags {
            if !in_roster(name.as_str()) && name != "Result" {
                writeln!(f, "[{name} \"{value}\"]")?;
            }
        }
        writeln!(f)?;
        let mut number = self.first_move_number;
        let mut player = self.first_player;
        for (index, san) in self.moves.iter().enumerate() {
            match player {
                Player::White => write!(f, "{number}. ")?,
                Player::Black if index == 0 => write!(f, "{number}... ")?,
                Player::Black => (),
            }
            write!(f, "{san} ")?;
            if player == Player::Black {
                number += 1;
            }
            player = player.opponent();
        }
        write!(f, "{}", self.result.result())
    }
}

/// A game played from some initial position: validates the moves of both
/// players, tracks the status and records the moves.
#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    record: GameRecord,
}

impl Game {
    /// Starts a new game from the standard starting position.
    #[must_use]
    pub fn new() -> Self {
        Self::from_position(Position::starting())
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn from_position(position: Position) -> Self {
        let record = GameRecord::new(&position);
        Self { position, record }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn record(&self) -> &GameRecord {
        &self.record
    }

    #[allow(missing_docs)]
    pub fn record_mut(&mut self) -> &mut GameRecord {
        &mut self.record
    }

    /// Status of the game after the last move.
    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.record.result
    }

    /// Validates and makes the move of the side to move and records it.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection`] if the move is illegal; the game is unchanged.
    pub fn play(&mut self, from: Square, to: Square) -> Result<MoveRecord, Rejection> {
        let san = notation::to_san(&self.position, Move::new(from, to));
        let record = self.position.apply_move(from, to)?;
        if let Ok(san) = san {
            self.record.moves.push(san);
        }
        self.record.result = status(&self.position);
        tracing::debug!(
            "{from}{to} played, status: {:?}, position: {}",
            self.record.result,
            self.position
        );
        Ok(record)
    }

    /// Plays a move given in UCI format.
    ///
    /// # Errors
    ///
    /// Returns an error if the move is malformed or illegal.
    pub fn play_uci(&mut self, next_move: &str) -> anyhow::Result<MoveRecord> {
        let next_move = Move::from_uci(next_move)?;
        Ok(self.play(next_move.from(), next_move.to())?)
    }

    /// Plays a move given in Standard Algebraic Notation.
    ///
    /// # Errors
    ///
    /// Returns an error if the move is malformed or illegal.
    pub fn play_san(&mut self, next_move: &str) -> anyhow::Result<MoveRecord> {
        let next_move = notation::from_san(&self.position, next_move)?;
        Ok(self.play(next_move.from(), next_move.to())?)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn setup(fen: &str) -> Position {
        Position::try_from(fen).unwrap()
    }

    #[test]
    fn detect_repetition() {
        let mut game = Game::new();
        for _ in 0..2 {
            for next_move in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                let _ = game.play_uci(next_move).unwrap();
                assert_eq!(game.status(), GameStatus::InProgress);
            }
        }
        let _ = game.play_uci("g1f3").unwrap();
        assert_eq!(game.status(), GameStatus::InProgress);
        let _ = game.play_uci("g8f6").unwrap();
        assert_eq!(game.status(), GameStatus::ThreefoldRepetition);
        assert_eq!(
            draw_reason(game.position(), Player::White),
            Some(DrawReason::ThreefoldRepetition)
        );
    }

    #[test]
    fn different_moves_are_not_repetitions() {
        let mut game = Game::new();
        for next_move in [
            "g1f3", "g8f6", "f3g1", "f6g8", "b1c3", "b8c6", "c3b1", "c6b8", "g1f3", "g8f6",
        ] {
            let _ = game.play_uci(next_move).unwrap();
        }
        assert_eq!(game.position().history().len(), HISTORY_LIMIT);
        assert!(!is_threefold_repetition(game.position()));
    }

    #[test]
    fn stalemate() {
        let mut game = Game::from_position(setup("3b2qk/p6p/1p3Q1P/8/8/n7/PP6/K7 b - - 3 2"));
        assert_eq!(game.status(), GameStatus::Check);

        // White has no moves and is not in check.
        let _ = game.play_uci("d8f6").unwrap();
        assert_eq!(game.status(), GameStatus::Stalemate);
        assert!(is_stalemate(game.position(), Player::White));
        assert_eq!(
            draw_reason(game.position(), Player::White),
            Some(DrawReason::Stalemate)
        );
    }

    #[test]
    fn checkmate() {
        let mut game = Game::from_position(setup("3b3k/p5qp/1p3Q1P/8/8/n7/PP6/K7 w - - 4 3"));
        assert_eq!(game.status(), GameStatus::InProgress);

        let _ = game.play_uci("f6g7").unwrap();
        assert_eq!(game.status(), GameStatus::Checkmate(Player::Black));
        assert!(is_checkmate(game.position(), Player::Black));
        assert!(!is_draw(game.position(), Player::Black));
        assert!(game.status().is_terminal());
    }

    #[test]
    fn check() {
        let position = setup("4k3/8/8/8/8/8/8/R3K3 b - - 0 1");
        assert_eq!(status(&position), GameStatus::InProgress);
        let position = setup("R3k3/8/8/8/8/8/8/4K3 b - - 0 1");
        assert_eq!(status(&position), GameStatus::Check);
    }

    #[test]
    fn insufficient_material() {
        for fen in [
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/2B1K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K1n1 w - - 0 1",
            "4kb2/8/8/8/8/8/8/2B1K3 w - - 0 1",
        ] {
            let position = setup(fen);
            assert!(has_insufficient_material(&position), "{fen}");
            assert_eq!(status(&position), GameStatus::InsufficientMaterial);
            assert_eq!(
                draw_reason(&position, Player::White),
                Some(DrawReason::InsufficientMaterial)
            );
        }
        for fen in [
            "4k3/8/8/8/8/8/8/3QK3 w - - 0 1",
            "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/1NN1K3 w - - 0 1",
            "4k1n1/8/8/8/8/8/8/2B1K3 w - - 0 1",
        ] {
            assert!(!has_insufficient_material(&setup(fen)), "{fen}");
        }
    }

    #[test]
    fn game_record() {
        let mut game = Game::new();
        game.record_mut().set_tag("TimeControl", "-");
        game.record_mut().set_tag("White", "Rush");
        for next_move in ["f3", "e5", "g4", "Qh4#"] {
            let _ = game.play_san(next_move).unwrap();
        }
        assert_eq!(game.status(), GameStatus::Checkmate(Player::White));
        assert_eq!(game.record().moves(), &["f3", "e5", "g4", "Qh4#"]);
        assert_eq!(
            game.record().to_string(),
            "[Event \"?\"]\n[Site \"?\"]\n[Date \"????.??.??\"]\n[Round \"?\"]\n[White \
             \"Rush\"]\n[Black \"?\"]\n[Result \"0-1\"]\n[TimeControl \"-\"]\n\n1. f3 e5 2. g4 \
             Qh4# 0-1"
        );
    }

    #[test]
    fn game_record_from_position() {
        let fen = "4k3/8/8/8/8/8/8/R3K3 b - - 0 7";
        let mut game = Game::from_position(setup(fen));
        let _ = game.play_uci("e8d7").unwrap();
        let _ = game.play_uci("a1a7").unwrap();
        assert_eq!(game.status(), GameStatus::Check);
        assert!(game
            .record()
            .to_string()
            .ends_with(&format!("[FEN \"{fen}\"]\n\n7... Kd7 8. Ra7+ *")));
    }

    #[test]
    fn rejected_moves_are_not_recorded() {
        let mut game = Game::new();
        assert!(game.play_uci("e2e5").is_err());
        assert!(game.play_uci("e7e5").is_err());
        assert!(game.play_san("Nf4").is_err());
        assert!(game.record().moves().is_empty());
        assert_eq!(game.position().to_string(), Position::starting().to_string());
    }
}
