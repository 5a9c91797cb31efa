use std::time::{Duration, Instant};

use rand::rngs::StdRng;

use crate::evaluation::EvalConfig;
use crate::search::Limits;

/// Shared state of a single search: the tools needed to evaluate and order the
/// moves and the bookkeeping that decides when to stop.
pub(super) struct State<'a> {
    pub(super) rng: &'a mut StdRng,
    pub(super) config: &'a EvalConfig,
    timer: Instant,
    deadline: Option<Duration>,
    node_limit: Option<u64>,
    searched_nodes: u64,
    stopped: bool,
}

impl<'a> State<'a> {
    pub(super) fn new(rng: &'a mut StdRng, config: &'a EvalConfig, limits: &Limits) -> Self {
        Self {
            rng,
            config,
            timer: Instant::now(),
            deadline: limits.movetime,
            node_limit: limits.nodes,
            searched_nodes: 0,
            stopped: false,
        }
    }

    pub(super) fn visit(&mut self) {
        self.searched_nodes += 1;
    }

    #[must_use]
    pub(super) const fn searched_nodes(&self) -> u64 {
        self.searched_nodes
    }

    #[must_use]
    pub(super) fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    #[must_use]
    pub(super) const fn stopped(&self) -> bool {
        self.stopped
    }

    /// Checks the node and time budgets. Once exhausted, the search stays
    /// stopped.
    #[must_use]
    pub(super) fn should_stop(&mut self) -> bool {
        if !self.stopped {
            self.stopped = self
                .node_limit
                .is_some_and(|limit| self.searched_nodes >= limit)
                || self
                    .deadline
                    .is_some_and(|deadline| self.timer.elapsed() >= deadline);
        }
        self.stopped
    }
}
