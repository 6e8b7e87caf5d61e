pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PlacementError {
    #[display("piece does not fit inside the grid")]
    OutOfBounds,
    #[display("piece overlaps an occupied cell")]
    Occupied,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum CommandError {
    #[display("game is over; start a new game")]
    GameOver,
    #[display("placement rejected: {_0}")]
    Placement(PlacementError),
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid game rules: {reason}")]
pub struct RulesError {
    reason: String,
}

impl RulesError {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("game command loop has shut down")]
pub struct DriverClosedError;
