//! [Search] is a "dynamic" position evaluation and one of the most important
//! parts of the engine. It uses move generation and knowledge about the chess
//! rules to look ahead into possible continuations and their respective static
//! evaluation to combine them into a final score that the engine assigns to the
//! position and the move it picks.
//!
//! [Search]: https://www.chessprogramming.org/Search

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::chess::core::{Move, Player};
use crate::chess::position::Position;
use crate::evaluation::{EvalConfig, Score};

mod minimax;
mod state;

use state::State;

/// Search depth in plies.
pub type Depth = u8;

/// Depth used when the caller does not specify one.
pub const DEFAULT_DEPTH: Depth = 2;

/// Constraints of a single search. Only the depth is mandatory; node and time
/// budgets stop the search early.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    #[allow(missing_docs)]
    pub depth: Depth,
    /// Maximum number of visited positions.
    pub nodes: Option<u64>,
    /// Wall-clock budget.
    pub movetime: Option<Duration>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            nodes: None,
            movetime: None,
        }
    }
}

/// Score of the position (from White's perspective) and the move that
/// achieves it. There is no move if the position is terminal or the depth is
/// 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchResult {
    #[allow(missing_docs)]
    pub score: Score,
    #[allow(missing_docs)]
    pub best_move: Option<Move>,
}

/// Summary of a finished search, reported to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchInfo {
    #[allow(missing_docs)]
    pub result: SearchResult,
    #[allow(missing_docs)]
    pub depth: Depth,
    /// Number of visited positions.
    pub nodes: u64,
    #[allow(missing_docs)]
    pub elapsed: Duration,
    /// The search ran out of its node or time budget.
    pub stopped: bool,
}

/// Picks moves for the automated player.
///
/// Moves of equal value are picked at random: the searcher owns the random
/// number generator, and seeding it makes the choice reproducible.
#[derive(Clone, Debug)]
pub struct Searcher {
    rng: StdRng,
    config: EvalConfig,
}

impl Searcher {
    /// Creates a searcher with a randomly seeded generator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            config: EvalConfig::default(),
        }
    }

    /// Creates a searcher that makes the same choices given the same seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config: EvalConfig::default(),
        }
    }

    /// Replaces the evaluation settings.
    #[must_use]
    pub const fn with_config(self, config: EvalConfig) -> Self {
        Self { config, ..self }
    }

    /// Restarts the random number generator from the seed.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn config(&self) -> &EvalConfig {
        &self.config
    }

    #[allow(missing_docs)]
    pub fn config_mut(&mut self) -> &mut EvalConfig {
        &mut self.config
    }

    /// Runs the search for the side to move in the position.
    pub fn search(&mut self, position: &Position, limits: &Limits) -> SearchInfo {
        let mut state = State::new(&mut self.rng, &self.config, limits);
        let result = minimax::minimax(
            &mut state,
            position,
            limits.depth,
            -Score::INFINITY,
            Score::INFINITY,
            position.side_to_move() == Player::White,
        );
        let info = SearchInfo {
            result,
            depth: limits.depth,
            nodes: state.searched_nodes(),
            elapsed: state.elapsed(),
            stopped: state.stopped(),
        };
        tracing::debug!(
            "searched {} nodes in {:?} to depth {}: {:?}",
            info.nodes,
            info.elapsed,
            info.depth,
            info.result
        );
        info
    }

    /// Searches the position to the given depth and returns the best move.
    #[must_use]
    pub fn best_move(&mut self, position: &Position, depth: Depth) -> Option<Move> {
        let limits = Limits {
            depth,
            ..Limits::default()
        };
        self.search(position, &limits).result.best_move
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Picks the best move for the side to move with a fresh [`Searcher`]. Returns
/// [`None`] if there are no legal moves or the depth is 0.
#[must_use]
pub fn best_move(position: &Position, depth: Depth) -> Option<Move> {
    Searcher::new().best_move(position, depth)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::chess::movegen::generate_legal_moves;

    fn setup(fen: &str) -> Position {
        Position::try_from(fen).unwrap()
    }

    fn uci(input: &str) -> Move {
        Move::from_uci(input).unwrap()
    }

    #[test]
    fn mate_in_one() {
        let position = setup("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1");
        let info = Searcher::with_seed(0).search(
            &position,
            &Limits {
                depth: 1,
                ..Limits::default()
            },
        );
        assert_eq!(info.result.best_move, Some(uci("a1a8")));
        assert_eq!(info.result.score, Score::CHECKMATE);
        assert!(!info.stopped);
    }

    #[test]
    fn black_mates_too() {
        let position = setup("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2");
        let info = Searcher::with_seed(0).search(
            &position,
            &Limits {
                depth: 1,
                ..Limits::default()
            },
        );
        assert_eq!(info.result.best_move, Some(uci("d8h4")));
        assert_eq!(info.result.score, -Score::CHECKMATE);
    }

    #[test]
    fn takes_hanging_queen() {
        let position = setup("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1");
        for seed in 0..3 {
            assert_eq!(
                Searcher::with_seed(seed).best_move(&position, 2),
                Some(uci("d1d5"))
            );
        }
    }

    #[test]
    fn returns_legal_moves() {
        let position = Position::starting();
        let legal = generate_legal_moves(&position, Player::White);
        let mut searcher = Searcher::with_seed(3);
        for depth in 1..=2 {
            let best = searcher.best_move(&position, depth);
            assert!(best.is_some_and(|m| legal.contains(&m)));
        }
    }

    #[test]
    fn no_moves() {
        let stalemate = setup("k7/2Q5/1K6/8/8/8/8/8 b - - 0 1");
        assert_eq!(best_move(&stalemate, 2), None);
        assert_eq!(best_move(&Position::starting(), 0), None);
    }

    #[test]
    fn reproducible() {
        let position =
            setup("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4");
        let limits = Limits::default();
        let first = Searcher::with_seed(42).search(&position, &limits);
        let second = Searcher::with_seed(42).search(&position, &limits);
        assert_eq!(first.result, second.result);
        assert_eq!(first.nodes, second.nodes);

        let mut searcher = Searcher::with_seed(1);
        let _ = searcher.search(&position, &limits);
        searcher.reseed(42);
        assert_eq!(searcher.search(&position, &limits).result, first.result);
    }

    #[test]
    fn node_budget() {
        let position = Position::starting();
        let full = Searcher::with_seed(0).search(
            &position,
            &Limits {
                depth: 3,
                ..Limits::default()
            },
        );
        let limited = Searcher::with_seed(0).search(
            &position,
            &Limits {
                depth: 3,
                nodes: Some(100),
                movetime: None,
            },
        );
        assert!(!full.stopped);
        assert!(limited.stopped);
        assert!(limited.nodes < full.nodes);
        assert!(limited.result.best_move.is_some());
    }

    #[test]
    fn time_budget() {
        let info = Searcher::with_seed(0).search(
            &Position::starting(),
            &Limits {
                depth: 4,
                nodes: None,
                movetime: Some(Duration::ZERO),
            },
        );
        assert!(info.stopped);
        assert!(info.result.best_move.is_some());
    }
}
