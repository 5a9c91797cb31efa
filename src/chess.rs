//! Implementation of chess game, its rules and specifics.

pub mod core;
pub mod game;
pub mod movegen;
pub mod notation;
pub mod position;
pub mod rules;
