#![no_main]
use itertools::Itertools;
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;
use rush::chess::movegen::generate_legal_moves;
use rush::chess::position::Position;
use shakmaty::{CastlingMode, Chess, Position as ShakmatyPosition};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(position) = Position::from_fen(input) else {
        return;
    };
    let Ok(shakmaty_setup) = input.parse::<shakmaty::fen::Fen>() else {
        return;
    };
    // shakmaty rejects more positions (e.g. impossible checks).
    let Ok(shakmaty_position) = shakmaty_setup.into_position::<Chess>(CastlingMode::Standard)
    else {
        return;
    };
    assert_eq!(
        generate_legal_moves(&position, position.side_to_move())
            .iter()
            .map(ToString::to_string)
            .sorted()
            .collect::<Vec<_>>(),
        shakmaty_position
            .legal_moves()
            .iter()
            // Pawns always promote to a queen.
            .map(|m| m.to_uci(CastlingMode::Standard).to_string()[..4].to_string())
            .sorted()
            .dedup()
            .collect::<Vec<_>>()
    );
});
