//! Implementation of [Minimax] algorithm with [Alpha-Beta pruning].
//!
//! White is the maximizing player: the scores are always from White's
//! perspective.
//!
//! [Minimax]: https://en.wikipedia.org/wiki/Minimax
//! [Alpha-Beta pruning]: https://en.wikipedia.org/wiki/Alpha%E2%80%93beta_pruning

use std::cmp::Reverse;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::chess::core::{Move, PieceKind};
use crate::chess::movegen::generate_legal_moves;
use crate::chess::position::Position;
use crate::chess::rules;
use crate::evaluation::material::piece_value;
use crate::evaluation::{evaluate, Score, Value};
use crate::search::state::State;
use crate::search::{Depth, SearchResult};

/// Value of the piece the move captures (0 for quiet moves).
fn capture_value(position: &Position, next_move: Move) -> Value {
    match position.at(next_move.to()) {
        Some(victim) => piece_value(victim.kind),
        None if rules::is_en_passant(position, next_move.from(), next_move.to()) => {
            piece_value(PieceKind::Pawn)
        },
        None => 0,
    }
}

/// Shuffles the moves so that equally good moves are picked at random and then
/// puts the most valuable captures first. The sort is stable: quiet moves stay
/// shuffled.
pub(super) fn order_moves(moves: &mut [Move], position: &Position, rng: &mut impl Rng) {
    moves.shuffle(rng);
    moves.sort_by_key(|&next_move| Reverse(capture_value(position, next_move)));
}

/// Searches the position `depth` plies deep within the (`alpha`, `beta`)
/// window.
///
/// Positions without legal moves are scored directly: a checkmate is the worst
/// outcome for the player who is mated and a stalemate is a draw. Leaves are
/// scored with the static [`evaluate`].
///
/// The budgets in [`State`] are checked between sibling moves: the first move
/// of each node is always searched, so the result always contains a move if
/// there is one. Other moves whose subtrees were interrupted are ignored.
pub(super) fn minimax(
    state: &mut State<'_>,
    position: &Position,
    depth: Depth,
    mut alpha: Score,
    mut beta: Score,
    maximizing: bool,
) -> SearchResult {
    state.visit();
    let us = position.side_to_move();
    let mut moves = generate_legal_moves(position, us);
    if moves.is_empty() {
        let score = if !rules::is_in_check(position, us) {
            Score::DRAW
        } else if maximizing {
            -Score::CHECKMATE
        } else {
            Score::CHECKMATE
        };
        return SearchResult {
            score,
            best_move: None,
        };
    }
    if depth == 0 {
        return SearchResult {
            score: evaluate(position, state.config),
            best_move: None,
        };
    }
    order_moves(&mut moves, position, state.rng);

    let mut best = SearchResult {
        score: if maximizing {
            -Score::INFINITY
        } else {
            Score::INFINITY
        },
        best_move: None,
    };
    for (index, next_move) in moves.into_iter().enumerate() {
        if index > 0 && state.should_stop() {
            break;
        }
        let mut next = position.clone();
        if next.make_move(next_move).is_none() {
            continue;
        }
        let score = minimax(state, &next, depth - 1, alpha, beta, !maximizing).score;
        // The subtree was cut short: its score is only a bound.
        if index > 0 && state.stopped() {
            break;
        }
        if maximizing {
            if score > best.score {
                best = SearchResult {
                    score,
                    best_move: Some(next_move),
                };
            }
            alpha = alpha.max(score);
        } else {
            if score < best.score {
                best = SearchResult {
                    score,
                    best_move: Some(next_move),
                };
            }
            beta = beta.min(score);
        }
        if beta <= alpha {
            break;
        }
    }
    best
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::chess::core::Player;
    use crate::evaluation::EvalConfig;
    use crate::search::Limits;

    /// Exhaustive minimax without pruning.
    fn plain_minimax(position: &Position, depth: Depth, config: &EvalConfig) -> Score {
        let us = position.side_to_move();
        let maximizing = us == Player::White;
        let moves = generate_legal_moves(position, us);
        if moves.is_empty() {
            return if !rules::is_in_check(position, us) {
                Score::DRAW
            } else if maximizing {
                -Score::CHECKMATE
            } else {
                Score::CHECKMATE
            };
        }
        if depth == 0 {
            return evaluate(position, config);
        }
        let scores = moves.into_iter().map(|next_move| {
            let mut next = position.clone();
            let _ = next.make_move(next_move).unwrap();
            plain_minimax(&next, depth - 1, config)
        });
        if maximizing {
            scores.max().unwrap()
        } else {
            scores.min().unwrap()
        }
    }

    fn search(position: &Position, depth: Depth, seed: u64) -> SearchResult {
        search_with_limits(position, depth, seed, &Limits::default())
    }

    fn search_with_limits(
        position: &Position,
        depth: Depth,
        seed: u64,
        limits: &Limits,
    ) -> SearchResult {
        let mut rng = StdRng::seed_from_u64(seed);
        let config = EvalConfig::default();
        let mut state = State::new(&mut rng, &config, limits);
        minimax(
            &mut state,
            position,
            depth,
            -Score::INFINITY,
            Score::INFINITY,
            position.side_to_move() == Player::White,
        )
    }

    #[test]
    fn pruning_keeps_the_score() {
        let config = EvalConfig::default();
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
            "4k3/8/8/3q4/8/8/3P4/3RK3 b - - 0 1",
        ] {
            let position = Position::try_from(fen).unwrap();
            for depth in 1..=2 {
                assert_eq!(
                    search(&position, depth, 42).score,
                    plain_minimax(&position, depth, &config),
                    "{fen} at depth {depth}"
                );
            }
        }
    }

    #[test]
    fn interrupted_moves_are_not_picked() {
        // Ra8# is the only mate; most other moves lose nothing either.
        let position = Position::try_from("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
        let config = EvalConfig::default();
        for seed in 0..4 {
            // The root orders its moves with the first values of the generator.
            let mut moves = generate_legal_moves(&position, Player::White);
            order_moves(&mut moves, &position, &mut StdRng::seed_from_u64(seed));
            for nodes in 1..150 {
                let limits = Limits {
                    nodes: Some(nodes),
                    ..Limits::default()
                };
                let result = search_with_limits(&position, 2, seed, &limits);
                let best_move = result.best_move.unwrap();
                if best_move == moves[0] {
                    continue;
                }
                // Any other pick has been searched completely.
                let mut next = position.clone();
                let _ = next.make_move(best_move).unwrap();
                assert_eq!(
                    result.score,
                    plain_minimax(&next, 1, &config),
                    "{best_move} with seed {seed} and {nodes} nodes"
                );
            }
        }
    }

    #[test]
    fn leaves() {
        let position = Position::starting();
        let result = search(&position, 0, 0);
        assert_eq!(result.score, evaluate(&position, &EvalConfig::default()));
        assert_eq!(result.best_move, None);
    }

    #[test]
    fn terminal_positions() {
        // White is checkmated.
        let position =
            Position::try_from("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        assert_eq!(
            search(&position, 3, 0),
            SearchResult {
                score: -Score::CHECKMATE,
                best_move: None,
            }
        );
        // Black is stalemated.
        let position = Position::try_from("k7/2Q5/1K6/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(
            search(&position, 3, 0),
            SearchResult {
                score: Score::DRAW,
                best_move: None,
            }
        );
    }

    #[test]
    fn captures_first() {
        let position = Position::try_from("4k3/8/8/3q4/8/8/3P4/3RK3 b - - 0 1").unwrap();
        let mut moves = generate_legal_moves(&position, Player::Black);
        let mut rng = StdRng::seed_from_u64(7);
        order_moves(&mut moves, &position, &mut rng);
        // Queen takes pawn is the only capture.
        assert_eq!(capture_value(&position, moves[0]), piece_value(PieceKind::Pawn));
        assert_eq!(moves[0].to_string(), "d5d2");
        assert!(moves[1..]
            .iter()
            .all(|&next_move| capture_value(&position, next_move) == 0));
    }

    #[test]
    fn en_passant_counts_as_capture() {
        let position = Position::try_from("4k3/8/8/3Pp3/8/8/8/4K3 w - e6 0 1").unwrap();
        assert_eq!(
            capture_value(&position, Move::from_uci("d5e6").unwrap()),
            piece_value(PieceKind::Pawn)
        );
        assert_eq!(capture_value(&position, Move::from_uci("d5d6").unwrap()), 0);
    }
}
