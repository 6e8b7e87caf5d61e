use std::fmt;

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Side length of every piece footprint.
pub const FOOTPRINT_SIZE: usize = 3;

/// A placeable piece: its kind plus the current (possibly rotated) footprint.
///
/// The colour identifier written to the grid on placement is derived from the kind
/// and never changes with rotation.
///
/// # Example
///
/// ```
/// use tetrecs_engine::{Piece, PieceKind};
///
/// let piece = Piece::new(PieceKind::L);
/// let rotated = piece.rotated_right().rotated_right().rotated_right().rotated_right();
/// assert_eq!(rotated, piece);
/// assert_eq!(piece.colour(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    kind: PieceKind,
    footprint: Footprint,
}

impl Piece {
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            footprint: kind.footprint(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn colour(&self) -> u8 {
        self.kind.colour()
    }

    #[must_use]
    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    /// Returns the occupied `(col, row)` offsets of the footprint.
    pub fn occupied_offsets(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.footprint.occupied_offsets()
    }

    #[must_use]
    pub fn rotated_right(&self) -> Self {
        Self {
            kind: self.kind,
            footprint: self.footprint.rotated_right(),
        }
    }

    #[must_use]
    pub fn rotated_left(&self) -> Self {
        Self {
            kind: self.kind,
            footprint: self.footprint.rotated_left(),
        }
    }

    /// Rotates the footprint 90° clockwise in place.
    pub fn rotate_right(&mut self) {
        self.footprint = self.footprint.rotated_right();
    }

    /// Rotates the footprint 90° counter-clockwise in place.
    pub fn rotate_left(&mut self) {
        self.footprint = self.footprint.rotated_left();
    }
}

/// Enum representing the kind of piece.
///
/// The discriminant is the piece id (0..15); the colour identifier is `id + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    Line = 0,
    C = 1,
    Plus = 2,
    Dot = 3,
    Square = 4,
    L = 5,
    J = 6,
    S = 7,
    Z = 8,
    T = 9,
    X = 10,
    Corner = 11,
    InverseCorner = 12,
    Diagonal = 13,
    Double = 14,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece kinds (15).
    pub const LEN: usize = 15;

    pub const ALL: [Self; Self::LEN] = [
        Self::Line,
        Self::C,
        Self::Plus,
        Self::Dot,
        Self::Square,
        Self::L,
        Self::J,
        Self::S,
        Self::Z,
        Self::T,
        Self::X,
        Self::Corner,
        Self::InverseCorner,
        Self::Diagonal,
        Self::Double,
    ];

    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Colour identifier written into grid cells (1..=15).
    #[must_use]
    pub const fn colour(self) -> u8 {
        self as u8 + 1
    }

    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        if (id as usize) < Self::LEN {
            Some(Self::ALL[id as usize])
        } else {
            None
        }
    }

    /// Inverse of [`Self::colour`].
    ///
    /// ```
    /// use tetrecs_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_colour(1), Some(PieceKind::Line));
    /// assert_eq!(PieceKind::from_colour(0), None);
    /// assert_eq!(PieceKind::from_colour(16), None);
    /// ```
    #[must_use]
    pub const fn from_colour(colour: u8) -> Option<Self> {
        match colour.checked_sub(1) {
            Some(id) => Self::from_id(id),
            None => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Line => "Line",
            Self::C => "C",
            Self::Plus => "Plus",
            Self::Dot => "Dot",
            Self::Square => "Square",
            Self::L => "L",
            Self::J => "J",
            Self::S => "S",
            Self::Z => "Z",
            Self::T => "T",
            Self::X => "X",
            Self::Corner => "Corner",
            Self::InverseCorner => "Inverse Corner",
            Self::Diagonal => "Diagonal",
            Self::Double => "Double",
        }
    }

    /// Footprint in spawn orientation.
    #[must_use]
    pub const fn footprint(self) -> Footprint {
        FOOTPRINTS[self as usize]
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Occupancy pattern of a piece within its 3×3 box.
///
/// Stored row-major: `rows[row][col]`. The centre cell `(1, 1)` is the anchor used
/// when a piece is placed on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Footprint {
    rows: [[bool; FOOTPRINT_SIZE]; FOOTPRINT_SIZE],
}

impl Footprint {
    #[must_use]
    pub const fn from_rows(rows: [[bool; FOOTPRINT_SIZE]; FOOTPRINT_SIZE]) -> Self {
        Self { rows }
    }

    /// Returns whether the cell at `(col, row)` is occupied.
    ///
    /// # Panics
    ///
    /// Panics if `col` or `row` is outside the 3×3 box.
    #[must_use]
    pub const fn is_occupied(&self, col: usize, row: usize) -> bool {
        assert!(col < FOOTPRINT_SIZE && row < FOOTPRINT_SIZE);
        self.rows[row][col]
    }

    /// Returns the occupied `(col, row)` offsets in row-major order.
    pub fn occupied_offsets(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, occupied)| **occupied)
                .map(move |(col, _)| (col, row))
        })
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.rows.iter().flatten().filter(|c| **c).count()
    }

    /// Rotates 90° clockwise: the top row becomes the right column.
    #[must_use]
    pub const fn rotated_right(&self) -> Self {
        let mut rows = [[false; FOOTPRINT_SIZE]; FOOTPRINT_SIZE];
        let mut y = 0;
        while y < FOOTPRINT_SIZE {
            let mut x = 0;
            while x < FOOTPRINT_SIZE {
                rows[y][x] = self.rows[FOOTPRINT_SIZE - 1 - x][y];
                x += 1;
            }
            y += 1;
        }
        Self { rows }
    }

    /// Rotates 90° counter-clockwise; the inverse of [`Self::rotated_right`].
    #[must_use]
    pub const fn rotated_left(&self) -> Self {
        let mut rows = [[false; FOOTPRINT_SIZE]; FOOTPRINT_SIZE];
        let mut y = 0;
        while y < FOOTPRINT_SIZE {
            let mut x = 0;
            while x < FOOTPRINT_SIZE {
                rows[y][x] = self.rows[x][FOOTPRINT_SIZE - 1 - y];
                x += 1;
            }
            y += 1;
        }
        Self { rows }
    }

    fn row_string(&self, row: usize) -> String {
        self.rows[row]
            .iter()
            .map(|&c| if c { '#' } else { '.' })
            .collect()
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..FOOTPRINT_SIZE {
            if row > 0 {
                writeln!(f)?;
            }
            f.write_str(&self.row_string(row))?;
        }
        Ok(())
    }
}

// Format: three row strings of '#' (occupied) and '.' (empty), e.g. [".#.", "###", ".#."]
impl Serialize for Footprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let rows: [String; FOOTPRINT_SIZE] = std::array::from_fn(|row| self.row_string(row));
        rows.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Footprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let strings = Vec::<String>::deserialize(deserializer)?;
        if strings.len() != FOOTPRINT_SIZE {
            return Err(de::Error::custom(format!(
                "footprint must have {FOOTPRINT_SIZE} rows, got {}",
                strings.len()
            )));
        }

        let mut rows = [[false; FOOTPRINT_SIZE]; FOOTPRINT_SIZE];
        for (y, s) in strings.iter().enumerate() {
            let chars: Vec<char> = s.chars().collect();
            if chars.len() != FOOTPRINT_SIZE {
                return Err(de::Error::custom(format!(
                    "footprint row must have {FOOTPRINT_SIZE} cells, got '{s}'"
                )));
            }
            for (x, c) in chars.into_iter().enumerate() {
                rows[y][x] = match c {
                    '#' => true,
                    '.' => false,
                    _ => {
                        return Err(de::Error::custom(format!(
                            "invalid footprint cell '{c}' in row '{s}'"
                        )));
                    }
                };
            }
        }
        Ok(Self { rows })
    }
}

const FOOTPRINTS: [Footprint; PieceKind::LEN] = {
    const fn f(rows: [&[u8; FOOTPRINT_SIZE]; FOOTPRINT_SIZE]) -> Footprint {
        let mut cells = [[false; FOOTPRINT_SIZE]; FOOTPRINT_SIZE];
        let mut y = 0;
        while y < FOOTPRINT_SIZE {
            let mut x = 0;
            while x < FOOTPRINT_SIZE {
                cells[y][x] = rows[y][x] == b'#';
                x += 1;
            }
            y += 1;
        }
        Footprint::from_rows(cells)
    }

    [
        f([b"...", b"###", b"..."]), // Line
        f([b"...", b"###", b"#.#"]), // C
        f([b".#.", b"###", b".#."]), // Plus
        f([b"...", b".#.", b"..."]), // Dot
        f([b"##.", b"##.", b"..."]), // Square
        f([b"...", b"###", b"..#"]), // L
        f([b"..#", b"###", b"..."]), // J
        f([b"...", b".##", b"##."]), // S
        f([b"##.", b".##", b"..."]), // Z
        f([b"#..", b"##.", b"#.."]), // T
        f([b"#.#", b".#.", b"#.#"]), // X
        f([b"...", b"##.", b"#.."]), // Corner
        f([b"#..", b"##.", b"..."]), // InverseCorner
        f([b"#..", b".#.", b"..#"]), // Diagonal
        f([b".#.", b".#.", b"..."]), // Double
    ]
};
