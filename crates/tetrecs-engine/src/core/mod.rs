pub use self::{grid::*, line_clear::*, piece::*};

pub(crate) mod grid;
pub(crate) mod line_clear;
pub(crate) mod piece;
