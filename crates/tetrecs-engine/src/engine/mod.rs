//! Game rules, state and the machinery that drives a running game.
//!
//! - [`GameController`] - One game: grid, live pieces, statistics and countdown
//! - [`GameStats`] - Score, level, lives and streak multiplier
//! - [`GameClock`] - Restartable countdown behind the penalty ticks
//! - [`PieceQueue`] - The current/next pieces and their seeded generator
//! - [`GameRules`] - Tunable parameters (grid size, lives, delay curve)
//! - [`GameEvent`] - Everything a game reports to the outside
//! - [`GameDriver`] - Runs a controller on its own thread against the wall clock
//!
//! # Game Flow
//!
//! 1. Create a [`GameController`]; the first game starts immediately
//! 2. The player places the current piece anywhere it fits
//! 3. Full rows and columns clear, the score and multiplier update
//! 4. The next piece moves up and the countdown restarts
//! 5. If the countdown runs out first, a life is lost and the piece is skipped
//! 6. The game ends when the last life is lost
//!
//! The controller itself never reads the clock. Tests and simulations drive it with
//! arbitrary [`std::time::Instant`]s, while [`GameDriver`] feeds it real time.

pub use self::{
    game_clock::*, game_controller::*, game_driver::*, game_event::*, game_rules::*,
    game_stats::*, piece_queue::*,
};

mod game_clock;
mod game_controller;
mod game_driver;
mod game_event;
mod game_rules;
mod game_stats;
mod piece_queue;
