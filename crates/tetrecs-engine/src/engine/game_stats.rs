use serde::Serialize;

use crate::core::line_clear::LineClear;

use super::game_rules::GameRules;

/// Points awarded for one clearing placement.
///
/// `lines * blocks * 10 * multiplier`, saturating.
#[must_use]
pub fn clear_points(lines: usize, blocks: usize, multiplier: u32) -> usize {
    let multiplier = usize::try_from(multiplier).unwrap_or(usize::MAX);
    lines
        .saturating_mul(blocks)
        .saturating_mul(10)
        .saturating_mul(multiplier)
}

/// Score, level, lives and streak multiplier of one game, plus running counters.
///
/// Driven by two inputs: the clear result of every committed placement
/// ([`Self::apply_clear`]) and every penalty tick of the clock ([`Self::apply_penalty`]).
///
/// # Example
///
/// ```
/// use tetrecs_engine::{GameRules, GameStats};
///
/// let mut stats = GameStats::new(&GameRules::default());
/// assert_eq!((stats.score(), stats.lives(), stats.multiplier()), (0, 3, 0));
///
/// stats.apply_penalty();
/// assert_eq!(stats.lives(), 2);
/// assert_eq!(stats.penalties(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    score: usize,
    level: usize,
    lives: u8,
    multiplier: u32,
    placements: usize,
    total_lines: usize,
    total_blocks: usize,
    penalties: usize,
    #[serde(skip)]
    baseline_multiplier: u32,
    #[serde(skip)]
    points_per_level: usize,
}

impl GameStats {
    /// Fresh statistics for a new game under `rules`.
    ///
    /// # Panics
    ///
    /// Panics if `rules.points_per_level` is zero; validated rules never are.
    #[must_use]
    pub fn new(rules: &GameRules) -> Self {
        assert!(rules.points_per_level > 0, "points per level must be positive");
        Self {
            score: 0,
            level: 0,
            lives: rules.initial_lives,
            multiplier: rules.baseline_multiplier,
            placements: 0,
            total_lines: 0,
            total_blocks: 0,
            penalties: 0,
            baseline_multiplier: rules.baseline_multiplier,
            points_per_level: rules.points_per_level,
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// `score / points_per_level`. Never decreases during a game.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    #[must_use]
    pub const fn lives(&self) -> u8 {
        self.lives
    }

    #[must_use]
    pub const fn multiplier(&self) -> u32 {
        self.multiplier
    }

    /// Number of committed placements.
    #[must_use]
    pub const fn placements(&self) -> usize {
        self.placements
    }

    #[must_use]
    pub const fn total_lines(&self) -> usize {
        self.total_lines
    }

    #[must_use]
    pub const fn total_blocks(&self) -> usize {
        self.total_blocks
    }

    /// Number of penalty ticks taken.
    #[must_use]
    pub const fn penalties(&self) -> usize {
        self.penalties
    }

    #[must_use]
    pub const fn is_out_of_lives(&self) -> bool {
        self.lives == 0
    }

    /// Records a committed placement and its clear result. Returns the points gained.
    ///
    /// A clearing placement raises the multiplier by one before scoring; any other
    /// placement drops it back to the baseline.
    ///
    /// ```
    /// use tetrecs_engine::{GameRules, GameStats, Grid, Piece, PieceKind, clear_full_lines};
    ///
    /// let mut grid = Grid::new(3, 3);
    /// grid.place(&Piece::new(PieceKind::Line), 1, 1);
    /// let cleared = clear_full_lines(&mut grid);
    ///
    /// let mut stats = GameStats::new(&GameRules::default());
    /// assert_eq!(stats.apply_clear(&cleared), 30); // 1 line * 3 blocks * 10 * 1
    /// assert_eq!(stats.multiplier(), 1);
    /// ```
    pub fn apply_clear(&mut self, cleared: &LineClear) -> usize {
        self.placements += 1;
        let lines = cleared.lines_cleared();
        if lines == 0 {
            self.multiplier = self.baseline_multiplier;
            return 0;
        }

        let blocks = cleared.blocks_cleared();
        self.multiplier = self.multiplier.saturating_add(1);
        let points = clear_points(lines, blocks, self.multiplier);
        self.score = self.score.saturating_add(points);
        self.level = self.score / self.points_per_level;
        self.total_lines += lines;
        self.total_blocks += blocks;
        points
    }

    /// Records a penalty tick: the streak ends and one life is lost. Returns the lives left.
    pub fn apply_penalty(&mut self) -> u8 {
        self.penalties += 1;
        self.multiplier = self.baseline_multiplier;
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{
        grid::{Cell, Grid},
        line_clear::clear_full_lines,
        piece::PieceKind,
    };

    use super::*;

    /// A clear result of `rows` full rows on a `cols`-wide grid.
    fn cleared_rows(cols: usize, rows: usize) -> LineClear {
        let mut grid = Grid::new(cols, rows.max(1) + 1);
        for y in 0..rows {
            for x in 0..cols {
                grid.set(x, y, Cell::Block(PieceKind::Line));
            }
        }
        clear_full_lines(&mut grid)
    }

    #[test]
    fn test_clear_points_formula() {
        assert_eq!(clear_points(2, 10, 3), 600);
        assert_eq!(clear_points(1, 5, 1), 50);
        assert_eq!(clear_points(0, 0, 7), 0);
        assert_eq!(clear_points(3, 5, 0), 0);
        assert_eq!(clear_points(usize::MAX, 2, 2), usize::MAX);
    }

    #[test]
    fn test_streak_grows_per_clearing_placement() {
        let mut stats = GameStats::new(&GameRules::default());
        let one_row = cleared_rows(5, 1);

        assert_eq!(stats.apply_clear(&one_row), 50);
        assert_eq!(stats.multiplier(), 1);
        assert_eq!(stats.apply_clear(&one_row), 100);
        assert_eq!(stats.multiplier(), 2);
        assert_eq!(stats.apply_clear(&one_row), 150);
        assert_eq!(stats.multiplier(), 3);
        assert_eq!(stats.score(), 300);
        assert_eq!(stats.placements(), 3);
        assert_eq!(stats.total_lines(), 3);
        assert_eq!(stats.total_blocks(), 15);
    }

    #[test]
    fn test_non_clearing_placement_resets_multiplier_only() {
        let mut stats = GameStats::new(&GameRules::default());
        stats.apply_clear(&cleared_rows(5, 2));
        stats.apply_clear(&cleared_rows(5, 2));
        let score = stats.score();
        assert_eq!(stats.multiplier(), 2);

        assert_eq!(stats.apply_clear(&LineClear::default()), 0);
        assert_eq!(stats.multiplier(), 0);
        assert_eq!(stats.score(), score);
        assert_eq!(stats.placements(), 3);
    }

    #[test]
    fn test_custom_baseline_multiplier() {
        let rules = GameRules {
            baseline_multiplier: 1,
            ..GameRules::default()
        };
        let mut stats = GameStats::new(&rules);
        assert_eq!(stats.apply_clear(&cleared_rows(5, 1)), 100);
        assert_eq!(stats.multiplier(), 2);
        stats.apply_penalty();
        assert_eq!(stats.multiplier(), 1);
    }

    #[test]
    fn test_level_follows_score() {
        let mut stats = GameStats::new(&GameRules::default());
        let mut last_level = 0;
        for _ in 0..12 {
            stats.apply_clear(&cleared_rows(5, 2));
            assert_eq!(stats.level(), stats.score() / 1000);
            assert!(stats.level() >= last_level);
            last_level = stats.level();
        }
        assert!(stats.level() > 0);
    }

    #[test]
    fn test_penalty_costs_a_life_and_ends_streak() {
        let mut stats = GameStats::new(&GameRules::default());
        stats.apply_clear(&cleared_rows(5, 1));
        let score = stats.score();

        assert_eq!(stats.apply_penalty(), 2);
        assert_eq!(stats.multiplier(), 0);
        assert_eq!(stats.score(), score);
        assert_eq!(stats.apply_penalty(), 1);
        assert!(!stats.is_out_of_lives());
        assert_eq!(stats.apply_penalty(), 0);
        assert!(stats.is_out_of_lives());
        assert_eq!(stats.apply_penalty(), 0);
        assert_eq!(stats.penalties(), 4);
    }

    #[test]
    fn test_serializes_counters_only() {
        let stats = GameStats::new(&GameRules::default());
        assert_eq!(
            serde_json::to_string(&stats).unwrap(),
            r#"{"score":0,"level":0,"lives":3,"multiplier":0,"placements":0,"total_lines":0,"total_blocks":0,"penalties":0}"#
        );
    }
}
