//! This module implements "static" [evaluation], i.e. predicting the relative
//! value/score of given position without [`crate::search`].
//!
//! The evaluation sums up the material balance and the [piece-square
//! tables](pst) bonuses, optionally adds mobility and then adjusts the result
//! for checks and draws. The score is returned in centipawn units from
//! White's perspective.
//!
//! [evaluation]: https://www.chessprogramming.org/Evaluation

pub mod material;
pub(crate) mod pst;
mod score;

pub use score::Score;

use crate::chess::core::Player;
use crate::chess::game;
use crate::chess::movegen::generate_legal_moves;
use crate::chess::position::Position;
use crate::chess::rules;

/// Centipawn values are stored as plain integers.
pub type Value = i32;

/// Tunable terms of the evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Adds the difference in the number of legal moves. Expensive: requires
    /// generating the moves of both players in every evaluated position.
    pub mobility: bool,
    /// Centipawns per each extra legal move.
    pub mobility_weight: Value,
    /// Penalty for the side that is in check.
    pub check_penalty: Value,
    /// The kings switch to the endgame table once the non-king material drops
    /// below this value.
    pub endgame_threshold: Value,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            mobility: false,
            mobility_weight: 5,
            check_penalty: 100,
            endgame_threshold: material::ENDGAME_THRESHOLD,
        }
    }
}

/// Returns `true` if the non-king material is below the threshold.
#[must_use]
pub fn is_endgame(position: &Position, config: &EvalConfig) -> bool {
    material::non_king_material(position) < config.endgame_threshold
}

/// Difference between White's and Black's number of legal moves, scaled by
/// the weight.
#[must_use]
pub fn mobility(position: &Position, config: &EvalConfig) -> Value {
    let moves = |player| generate_legal_moves(position, player).len() as Value;
    (moves(Player::White) - moves(Player::Black)) * config.mobility_weight
}

/// Evaluates the position from White's perspective.
///
/// The side in check receives a penalty (White's check is considered first).
/// Positions drawn by insufficient material or repetition are scored as 0.
/// Checkmates and stalemates are detected by the search and are not
/// evaluated here.
#[must_use]
pub fn evaluate(position: &Position, config: &EvalConfig) -> Score {
    let endgame = is_endgame(position, config);
    let mut value =
        material::material_advantage(position) + pst::positional_advantage(position, endgame);
    if config.mobility {
        value += mobility(position, config);
    }
    if rules::is_in_check(position, Player::White) {
        value -= config.check_penalty;
    } else if rules::is_in_check(position, Player::Black) {
        value += config.check_penalty;
    } else if game::has_insufficient_material(position) || game::is_threefold_repetition(position)
    {
        return Score::DRAW;
    }
    Score::cp(value)
}
