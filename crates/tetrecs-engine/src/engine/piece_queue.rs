use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::piece::{Piece, PieceKind};

/// Seed for deterministic piece generation.
///
/// 128 bits, written as 32 hexadecimal digits. The same seed always yields the same
/// piece sequence, which makes games reproducible.
///
/// ```
/// use tetrecs_engine::PieceSeed;
///
/// let seed: PieceSeed = "0123456789abcdeffedcba9876543210".parse().unwrap();
/// assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
/// assert!("xyz".parse::<PieceSeed>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed {input:?}: expected 32 hexadecimal digits")]
pub struct ParsePieceSeedError {
    input: String,
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePieceSeedError {
            input: s.to_owned(),
        };
        // from_str_radix accepts a leading '+', which is not a hex digit
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| err())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

/// The two live pieces of a game and the generator behind them.
///
/// There is always a `current` piece (the one being placed) and a `next` piece
/// (shown as a preview). Kinds are drawn uniformly from all fifteen kinds.
///
/// # Example
///
/// ```
/// use tetrecs_engine::{PieceQueue, PieceSeed};
///
/// let seed = PieceSeed::from_bytes([7; 16]);
/// let mut queue = PieceQueue::with_seed(seed);
/// let (current, next) = (*queue.current(), *queue.next());
///
/// queue.swap();
/// assert_eq!(*queue.current(), next);
/// queue.swap();
/// assert_eq!(*queue.current(), current);
///
/// queue.advance();
/// assert_eq!(*queue.current(), next);
/// ```
#[derive(Debug, Clone)]
pub struct PieceQueue {
    seed: PieceSeed,
    rng: Pcg32,
    current: Piece,
    next: Piece,
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceQueue {
    /// Creates a queue with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic generation.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let mut rng = Pcg32::from_seed(seed.0);
        let current = Piece::new(rng.random());
        let next = Piece::new(rng.random());
        Self {
            seed,
            rng,
            current,
            next,
        }
    }

    /// The seed this queue was created with.
    #[must_use]
    pub const fn seed(&self) -> PieceSeed {
        self.seed
    }

    #[must_use]
    pub const fn current(&self) -> &Piece {
        &self.current
    }

    #[must_use]
    pub const fn next(&self) -> &Piece {
        &self.next
    }

    /// Draws a fresh piece in its spawn orientation.
    pub fn spawn(&mut self) -> Piece {
        Piece::new(self.rng.random::<PieceKind>())
    }

    /// Consumes the current piece: `current <- next`, `next <- spawn()`.
    pub fn advance(&mut self) {
        let spawned = self.spawn();
        self.current = std::mem::replace(&mut self.next, spawned);
    }

    /// Exchanges `current` and `next` without drawing.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Replaces both live pieces with fresh draws, continuing the same sequence.
    pub fn refill(&mut self) {
        self.current = self.spawn();
        self.next = self.spawn();
    }

    pub fn rotate_current_right(&mut self) {
        self.current.rotate_right();
    }

    pub fn rotate_current_left(&mut self) {
        self.current.rotate_left();
    }
}
