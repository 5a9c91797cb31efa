//! Parsing of the commands the engine understands: a subset of [UCI] plus a
//! few debugging commands.
//!
//! [UCI]: https://www.chessprogramming.org/UCI

use crate::search::Depth;

#[derive(Debug, PartialEq, Eq)]
pub(super) enum Command {
    Uci,
    IsReady,
    SetOption(EngineOption),
    SetPosition {
        fen: Option<String>,
        moves: Vec<String>,
    },
    NewGame,
    Go {
        depth: Option<Depth>,
        nodes: Option<u64>,
        movetime: Option<u64>,
    },
    Stop,
    Quit,
    /// Prints the board and the status of the game.
    Board,
    /// Lists legal moves of the side to move.
    Moves,
    /// Prints the game record.
    Record,
    Unknown(String),
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum EngineOption {
    Depth(Depth),
    Seed(u64),
    Mobility(bool),
}

fn parse_go(parts: &[&str]) -> Command {
    let mut depth = None;
    let mut nodes = None;
    let mut movetime = None;

    let mut i = 1;

    while i < parts.len() {
        match parts[i] {
            "depth" if i + 1 < parts.len() => depth = parts[i + 1].parse().ok(),
            "nodes" if i + 1 < parts.len() => nodes = parts[i + 1].parse().ok(),
            "movetime" if i + 1 < parts.len() => movetime = parts[i + 1].parse().ok(),
            _ => {},
        }
        // Flags without values (e.g. "infinite") are ignored.
        if matches!(parts[i], "infinite" | "ponder") {
            i += 1;
        } else {
            i += 2;
        }
    }

    Command::Go {
        depth,
        nodes,
        movetime,
    }
}

fn parse_setoption(parts: &[&str]) -> Command {
    if parts.len() > 4 && parts[1] == "name" {
        let name_end = parts
            .iter()
            .position(|&x| x == "value")
            .unwrap_or(parts.len());
        let name = parts[2..name_end].join(" ");
        let value = parts.get(name_end + 1..).unwrap_or_default().join(" ");
        let option = match name.to_lowercase().as_str() {
            "depth" => value.parse().ok().map(EngineOption::Depth),
            "seed" => value.parse().ok().map(EngineOption::Seed),
            "mobility" => value.parse().ok().map(EngineOption::Mobility),
            _ => None,
        };
        match option {
            Some(option) => Command::SetOption(option),
            None => Command::Unknown(parts.join(" ")),
        }
    } else {
        Command::Unknown(parts.join(" "))
    }
}

fn parse_setposition(parts: &[&str]) -> Command {
    let moves_index = parts.iter().position(|&x| x == "moves");
    let fen = match parts.get(1) {
        Some(&"startpos") => None,
        Some(&"fen") => Some(parts[2..moves_index.unwrap_or(parts.len())].join(" ")),
        _ => return Command::Unknown(parts.join(" ")),
    };
    let moves = if let Some(moves_index) = moves_index {
        parts[moves_index + 1..]
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    } else {
        vec![]
    };
    Command::SetPosition { fen, moves }
}

impl Command {
    pub(super) fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();

        let Some(&command) = parts.first() else {
            return Self::Unknown(input.to_string());
        };

        match command {
            "uci" => Self::Uci,
            "isready" => Self::IsReady,
            "setoption" => parse_setoption(&parts),
            "position" => parse_setposition(&parts),
            "ucinewgame" => Self::NewGame,
            "go" => parse_go(&parts),
            "stop" => Self::Stop,
            "quit" => Self::Quit,
            "d" => Self::Board,
            "moves" => Self::Moves,
            "pgn" => Self::Record,
            _ => Self::Unknown(input.trim().to_string()),
        }
    }
}
