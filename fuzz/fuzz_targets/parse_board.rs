#![no_main]
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;
use rush::chess::position::Position;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(position) = Position::try_from(input) else {
        return;
    };
    // Printing the position back to FEN and parsing it again is lossless.
    let fen = position.to_string();
    let reparsed = Position::try_from(fen.as_str())
        .expect("printed positions should be accepted by the parser");
    assert_eq!(reparsed.to_string(), fen);
});
