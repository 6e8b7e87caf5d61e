use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::RulesError;

/// Upper bound for the number of lives a game may start with.
pub const MAX_LIVES: u8 = 3;

/// Tunable parameters of a game.
///
/// Every field has a default, so a rules file only needs to name what it changes:
///
/// ```
/// use tetrecs_engine::GameRules;
///
/// let rules: GameRules = serde_json::from_str(r#"{ "cols": 6, "initial_lives": 1 }"#).unwrap();
/// assert_eq!(rules.cols, 6);
/// assert_eq!(rules.rows, 5);
/// assert_eq!(rules.initial_lives, 1);
/// assert!(rules.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameRules {
    /// Grid width.
    pub cols: usize,
    /// Grid height.
    pub rows: usize,
    /// Lives at game start.
    pub initial_lives: u8,
    /// Multiplier value with no active streak.
    pub baseline_multiplier: u32,
    /// Score needed per level.
    pub points_per_level: usize,
    /// Countdown length per level.
    pub delay: DelayCurve,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            cols: 5,
            rows: 5,
            initial_lives: MAX_LIVES,
            baseline_multiplier: 0,
            points_per_level: 1000,
            delay: DelayCurve::default(),
        }
    }
}

impl GameRules {
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(RulesError::new(format!(
                "grid must be at least 1x1, got {}x{}",
                self.cols, self.rows
            )));
        }
        if self.initial_lives == 0 || self.initial_lives > MAX_LIVES {
            return Err(RulesError::new(format!(
                "initial lives must be within 1..={MAX_LIVES}, got {}",
                self.initial_lives
            )));
        }
        if self.points_per_level == 0 {
            return Err(RulesError::new("points per level must be positive"));
        }
        self.delay.validate()
    }

    #[must_use]
    pub fn level_for_score(&self, score: usize) -> usize {
        score / self.points_per_level
    }
}

/// Countdown length as a function of level: shrinks linearly, then stays at a floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DelayCurve {
    pub initial_ms: u64,
    pub step_ms: u64,
    pub min_ms: u64,
}

impl Default for DelayCurve {
    fn default() -> Self {
        Self {
            initial_ms: 12_000,
            step_ms: 500,
            min_ms: 2_500,
        }
    }
}

impl DelayCurve {
    /// `max(min_ms, initial_ms - step_ms * level)`.
    ///
    /// ```
    /// use std::time::Duration;
    /// use tetrecs_engine::DelayCurve;
    ///
    /// let curve = DelayCurve::default();
    /// assert_eq!(curve.delay_for_level(0), Duration::from_millis(12_000));
    /// assert_eq!(curve.delay_for_level(4), Duration::from_millis(10_000));
    /// assert_eq!(curve.delay_for_level(40), Duration::from_millis(2_500));
    /// ```
    #[must_use]
    pub fn delay_for_level(&self, level: usize) -> Duration {
        let level = u64::try_from(level).unwrap_or(u64::MAX);
        let millis = self
            .initial_ms
            .saturating_sub(self.step_ms.saturating_mul(level))
            .max(self.min_ms);
        Duration::from_millis(millis)
    }

    fn validate(&self) -> Result<(), RulesError> {
        if self.min_ms == 0 {
            return Err(RulesError::new("minimum delay must be positive"));
        }
        if self.min_ms > self.initial_ms {
            return Err(RulesError::new(format!(
                "minimum delay {}ms exceeds initial delay {}ms",
                self.min_ms, self.initial_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        let rules = GameRules::default();
        assert!(rules.validate().is_ok());
        assert_eq!((rules.cols, rules.rows), (5, 5));
        assert_eq!(rules.initial_lives, 3);
        assert_eq!(rules.baseline_multiplier, 0);
    }

    #[test]
    fn test_delay_curve_shrinks_then_floors() {
        let curve = DelayCurve::default();
        assert_eq!(curve.delay_for_level(0).as_millis(), 12_000);
        assert_eq!(curve.delay_for_level(1).as_millis(), 11_500);
        assert_eq!(curve.delay_for_level(4).as_millis(), 10_000);
        assert_eq!(curve.delay_for_level(18).as_millis(), 3_000);
        assert_eq!(curve.delay_for_level(19).as_millis(), 2_500);
        assert_eq!(curve.delay_for_level(20).as_millis(), 2_500);
        assert_eq!(curve.delay_for_level(usize::MAX).as_millis(), 2_500);
    }

    #[test]
    fn test_delay_never_increases_with_level() {
        let curve = DelayCurve::default();
        for level in 0..50 {
            assert!(curve.delay_for_level(level + 1) <= curve.delay_for_level(level));
        }
    }

    #[test]
    fn test_level_for_score() {
        let rules = GameRules::default();
        assert_eq!(rules.level_for_score(0), 0);
        assert_eq!(rules.level_for_score(999), 0);
        assert_eq!(rules.level_for_score(1000), 1);
        assert_eq!(rules.level_for_score(4321), 4);
    }

    #[test]
    fn test_invalid_rules_are_rejected() {
        let cases = [
            GameRules {
                cols: 0,
                ..GameRules::default()
            },
            GameRules {
                initial_lives: 0,
                ..GameRules::default()
            },
            GameRules {
                initial_lives: 4,
                ..GameRules::default()
            },
            GameRules {
                points_per_level: 0,
                ..GameRules::default()
            },
            GameRules {
                delay: DelayCurve {
                    min_ms: 20_000,
                    ..DelayCurve::default()
                },
                ..GameRules::default()
            },
        ];
        for rules in cases {
            let err = rules.validate().unwrap_err();
            assert!(err.to_string().starts_with("invalid game rules"), "{err}");
        }
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: Result<GameRules, _> = serde_json::from_str(r#"{ "colz": 6 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_nested_delay_defaults() {
        let rules: GameRules = serde_json::from_str(r#"{ "delay": { "min_ms": 1000 } }"#).unwrap();
        assert_eq!(rules.delay.initial_ms, 12_000);
        assert_eq!(rules.delay.min_ms, 1_000);
    }
}
