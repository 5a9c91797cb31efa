//! The engine puts all pieces together. It implements a subset of the
//! [Universal Chess Interface] (UCI) for communication with the client (e.g. a
//! GUI or a tournament runner).
//!
//! [`Engine::uci_loop`] is the "main loop" of the engine which communicates
//! with the environment and executes commands from the input stream.
//!
//! [Universal Chess Interface]: https://www.chessprogramming.org/UCI

use std::io::{BufRead, Write};
use std::time::Duration;

use itertools::Itertools;

use crate::chess::core::{Move, PieceKind};
use crate::chess::game::Game;
use crate::chess::movegen::generate_legal_moves;
use crate::chess::notation::to_san;
use crate::chess::position::Position;
use crate::engine::uci::{Command, EngineOption};
use crate::evaluation::EvalConfig;
use crate::search::{Limits, Searcher};

mod uci;

/// The Engine connects everything together and handles commands sent by the
/// client, including I/O.
pub struct Engine<'a, R: BufRead, W: Write> {
    game: Game,
    searcher: Searcher,
    limits: Limits,
    seed: Option<u64>,
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> Engine<'a, R, W> {
    /// Creates a new instance of the engine with starting position and provided
    /// I/O. `limits` are used for every `go` command that does not override
    /// them. Without a seed, equally good moves are picked at random.
    #[must_use]
    pub fn new(
        input: &'a mut R,
        output: &'a mut W,
        limits: Limits,
        config: EvalConfig,
        seed: Option<u64>,
    ) -> Self {
        let searcher = seed.map_or_else(Searcher::new, Searcher::with_seed);
        Self {
            game: Game::new(),
            searcher: searcher.with_config(config),
            limits,
            seed,
            input,
            output,
        }
    }

    /// Continuously reads the input stream and executes sent commands until
    /// "quit" is sent or the input is closed.
    ///
    /// The input is trusted to be mostly correct: malformed commands are
    /// reported with `info string` and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the input or writing the output fails.
    pub fn uci_loop(&mut self) -> anyhow::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            match Command::parse(&line) {
                Command::Uci => self.handle_uci()?,
                Command::IsReady => self.handle_isready()?,
                Command::SetOption(option) => self.handle_setoption(option),
                Command::SetPosition { fen, moves } => self.handle_position(fen, &moves)?,
                Command::NewGame => self.handle_ucinewgame(),
                Command::Go {
                    depth,
                    nodes,
                    movetime,
                } => self.handle_go(Limits {
                    depth: depth.unwrap_or(self.limits.depth),
                    nodes: nodes.or(self.limits.nodes),
                    movetime: movetime.map(Duration::from_millis).or(self.limits.movetime),
                })?,
                // The search is synchronous: by the time "stop" is read, it
                // has already finished.
                Command::Stop => {},
                Command::Quit => break,
                Command::Board => self.handle_board()?,
                Command::Moves => self.handle_moves()?,
                Command::Record => writeln!(self.output, "{}", self.game.record())?,
                Command::Unknown(command) => {
                    tracing::warn!("unsupported command: {command}");
                    writeln!(self.output, "info string Unsupported command: {command}")?;
                },
            }
            self.output.flush()?;
        }
        Ok(())
    }

    /// Responds to the `uci` handshake command by identifying the engine and
    /// listing the options.
    fn handle_uci(&mut self) -> anyhow::Result<()> {
        writeln!(
            self.output,
            "id name {} {}",
            env!("CARGO_PKG_NAME"),
            crate::engine_version()
        )?;
        writeln!(self.output, "id author {}", env!("CARGO_PKG_AUTHORS"))?;
        writeln!(
            self.output,
            "option name Depth type spin default {} min 0 max 255",
            self.limits.depth
        )?;
        writeln!(
            self.output,
            "option name Mobility type check default {}",
            self.searcher.config().mobility
        )?;
        writeln!(self.output, "option name Seed type string default <random>")?;
        writeln!(self.output, "uciok")?;
        Ok(())
    }

    /// Syncs with the client by responding with `readyok`.
    fn handle_isready(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "readyok")?;
        Ok(())
    }

    fn handle_setoption(&mut self, option: EngineOption) {
        tracing::debug!("setting {option:?}");
        match option {
            EngineOption::Depth(depth) => self.limits.depth = depth,
            EngineOption::Seed(seed) => {
                self.seed = Some(seed);
                self.searcher.reseed(seed);
            },
            EngineOption::Mobility(enabled) => self.searcher.config_mut().mobility = enabled,
        }
    }

    /// Starts a new game. A seeded searcher starts over, so that the same
    /// games are played again.
    fn handle_ucinewgame(&mut self) {
        self.game = Game::new();
        if let Some(seed) = self.seed {
            self.searcher.reseed(seed);
        }
    }

    /// Sets up the position and plays the moves. Stops at the first illegal
    /// move: the moves before it are kept.
    fn handle_position(&mut self, fen: Option<String>, moves: &[String]) -> anyhow::Result<()> {
        let position = match fen {
            None => Position::starting(),
            Some(fen) => match Position::try_from(fen.as_str()) {
                Ok(position) => position,
                Err(e) => {
                    tracing::warn!("rejected position {fen}: {e:#}");
                    writeln!(self.output, "info string Invalid position: {e:#}")?;
                    return Ok(());
                },
            },
        };
        self.game = Game::from_position(position);
        for next_move in moves {
            if let Err(e) = self.game.play_uci(next_move) {
                tracing::warn!("rejected move {next_move}: {e:#}");
                writeln!(self.output, "info string Illegal move {next_move}: {e:#}")?;
                break;
            }
        }
        Ok(())
    }

    /// Searches the current position and reports the best move. Replies with
    /// the null move "0000" if there are no legal moves.
    fn handle_go(&mut self, limits: Limits) -> anyhow::Result<()> {
        let position = self.game.position();
        let info = self.searcher.search(position, &limits);
        writeln!(
            self.output,
            "info depth {} score {} nodes {} time {}",
            info.depth,
            info.result.score.relative_to(position.side_to_move()),
            info.nodes,
            info.elapsed.as_millis()
        )?;
        match info.result.best_move {
            // Clients expect the promotion piece to be spelled out.
            Some(best_move) if is_promotion(position, best_move) => {
                writeln!(self.output, "bestmove {best_move}q")?;
            },
            Some(best_move) => writeln!(self.output, "bestmove {best_move}")?,
            None => writeln!(self.output, "bestmove 0000")?,
        }
        Ok(())
    }

    fn handle_board(&mut self) -> anyhow::Result<()> {
        write!(self.output, "{:?}", self.game.position())?;
        writeln!(self.output, "Status: {:?}", self.game.status())?;
        Ok(())
    }

    /// Lists the legal moves in Standard Algebraic Notation.
    fn handle_moves(&mut self) -> anyhow::Result<()> {
        let position = self.game.position();
        let moves = generate_legal_moves(position, position.side_to_move())
            .into_iter()
            .filter_map(|next_move| to_san(position, next_move).ok())
            .sorted()
            .join(" ");
        writeln!(self.output, "{moves}")?;
        Ok(())
    }
}

fn is_promotion(position: &Position, next_move: Move) -> bool {
    position.at(next_move.from()).is_some_and(|piece| {
        piece.kind == PieceKind::Pawn && next_move.to().rank() == piece.owner.promotion_rank()
    })
}
