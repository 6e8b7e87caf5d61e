use std::time::{Duration, Instant};

use crate::{
    CommandError, RulesError,
    core::{
        grid::{CellPos, Grid},
        line_clear::{LineClear, clear_full_lines},
        piece::Piece,
    },
};

use super::{
    game_clock::GameClock,
    game_event::GameEvent,
    game_rules::GameRules,
    game_stats::GameStats,
    piece_queue::{PieceQueue, PieceSeed},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum ControllerState {
    Active,
    /// Terminal until the next [`GameController::start_game`].
    GameOver,
}

/// A player command, as posted by an input collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCommand {
    PlaceAt { x: usize, y: usize },
    MoveCursor { dx: isize, dy: isize },
    ConfirmAtCursor,
    RotateRight,
    RotateLeft,
    SwapPieces,
    StartGame,
}

/// Owns one running game and applies every command and clock expiry to it.
///
/// The controller is a plain single-threaded state machine: callers pass the current
/// time into every time-sensitive operation and call [`Self::tick`] when the clock
/// deadline ([`Self::next_deadline`]) has passed. Observable changes are queued as
/// [`GameEvent`]s and collected with [`Self::drain_events`].
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use tetrecs_engine::{CommandError, GameController, GameRules, PieceSeed, PlacementError};
///
/// let start = Instant::now();
/// let mut game = GameController::new(GameRules::default(), PieceSeed::from_bytes([1; 16]), start)?;
///
/// // Every piece fits in the middle of an empty 5x5 grid, but not twice.
/// game.place_at(2, 2, start).unwrap();
/// assert_eq!(
///     game.place_at(2, 2, start),
///     Err(CommandError::Placement(PlacementError::Occupied))
/// );
///
/// // Idling past the deadline costs a life.
/// let deadline = game.next_deadline().unwrap();
/// assert_eq!(game.tick(deadline + Duration::from_millis(1)), 1);
/// assert_eq!(game.stats().lives(), 2);
/// # Ok::<(), tetrecs_engine::RulesError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GameController {
    rules: GameRules,
    grid: Grid,
    queue: PieceQueue,
    stats: GameStats,
    clock: GameClock,
    cursor: CellPos,
    state: ControllerState,
    high_score: Option<usize>,
    high_score_beaten: bool,
    events: Vec<GameEvent>,
}

fn delay_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

impl GameController {
    /// Validates `rules` and starts the first game at `now`.
    pub fn new(rules: GameRules, seed: PieceSeed, now: Instant) -> Result<Self, RulesError> {
        rules.validate()?;
        let mut this = Self {
            grid: Grid::new(rules.cols, rules.rows),
            queue: PieceQueue::with_seed(seed),
            stats: GameStats::new(&rules),
            clock: GameClock::stopped(),
            cursor: CellPos::new(0, 0),
            state: ControllerState::Active,
            high_score: None,
            high_score_beaten: false,
            events: Vec::new(),
            rules,
        };
        this.begin(now);
        Ok(this)
    }

    #[must_use]
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.state
    }

    #[must_use]
    pub fn current_piece(&self) -> &Piece {
        self.queue.current()
    }

    #[must_use]
    pub fn next_piece(&self) -> &Piece {
        self.queue.next()
    }

    #[must_use]
    pub fn seed(&self) -> PieceSeed {
        self.queue.seed()
    }

    #[must_use]
    pub fn cursor(&self) -> CellPos {
        self.cursor
    }

    #[must_use]
    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// When the pending countdown expires, or `None` once the game is over.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.clock.deadline()
    }

    #[must_use]
    pub fn high_score(&self) -> Option<usize> {
        self.high_score
    }

    /// Sets the score to beat, as known by the persistence collaborator.
    ///
    /// [`GameEvent::HighScoreBeaten`] fires once per game, the first time the score
    /// strictly exceeds it. `None` disables the event.
    pub fn set_high_score(&mut self, high_score: Option<usize>) {
        self.high_score = high_score;
    }

    /// Takes the events queued since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Discards the current game and starts a new one. Accepted in any state.
    pub fn start_game(&mut self, now: Instant) {
        self.grid.clear();
        self.queue.refill();
        self.stats = GameStats::new(&self.rules);
        self.cursor = CellPos::new(0, 0);
        self.state = ControllerState::Active;
        self.high_score_beaten = false;
        self.begin(now);
    }

    fn begin(&mut self, now: Instant) {
        self.events.push(GameEvent::GameStarted);
        self.push_queue_changed();
        self.push_stats_changed();
        self.restart_clock(now);
    }

    fn ensure_active(&self) -> Result<(), CommandError> {
        match self.state {
            ControllerState::Active => Ok(()),
            ControllerState::GameOver => Err(CommandError::GameOver),
        }
    }

    /// Places the current piece centred on `(x, y)`.
    ///
    /// An expired countdown is settled first, so an overdue placement still costs its
    /// penalties and uses whatever piece is current afterwards. On success the full lines
    /// are cleared, the score updated, the queue advanced and the countdown restarted. On
    /// failure nothing else changes.
    pub fn place_at(&mut self, x: usize, y: usize, now: Instant) -> Result<LineClear, CommandError> {
        self.tick(now);
        self.ensure_active()?;
        let piece = *self.queue.current();
        self.grid.check_placement(&piece, x, y)?;

        self.grid.clear_cursor();
        self.grid.place(&piece, x, y);
        self.events.push(GameEvent::PiecePlaced {
            x,
            y,
            kind: piece.kind(),
        });

        let cleared = clear_full_lines(&mut self.grid);
        if !cleared.is_empty() {
            self.events.push(GameEvent::CellsCleared {
                cells: cleared.cells().to_vec(),
            });
        }
        self.grid.mark_cursor(self.cursor);

        let level_before = self.stats.level();
        self.stats.apply_clear(&cleared);
        self.push_stats_changed();
        if self.stats.level() > level_before {
            self.events.push(GameEvent::LevelUp {
                level: self.stats.level(),
            });
        }
        self.check_high_score();

        self.queue.advance();
        self.push_queue_changed();
        self.restart_clock(now);
        Ok(cleared)
    }

    /// Same as [`Self::place_at`] on the cursor position.
    pub fn confirm_at_cursor(&mut self, now: Instant) -> Result<LineClear, CommandError> {
        let CellPos { x, y } = self.cursor;
        self.place_at(x, y, now)
    }

    /// Moves the keyboard cursor, clamped to the grid. Returns the new position.
    pub fn move_cursor(&mut self, dx: isize, dy: isize) -> Result<CellPos, CommandError> {
        self.ensure_active()?;
        let x = self
            .cursor
            .x
            .saturating_add_signed(dx)
            .min(self.grid.cols() - 1);
        let y = self
            .cursor
            .y
            .saturating_add_signed(dy)
            .min(self.grid.rows() - 1);
        self.cursor = CellPos::new(x, y);
        self.grid.mark_cursor(self.cursor);
        self.events.push(GameEvent::CursorMoved { x, y });
        Ok(self.cursor)
    }

    pub fn rotate_right(&mut self) -> Result<(), CommandError> {
        self.ensure_active()?;
        self.queue.rotate_current_right();
        self.push_rotated();
        Ok(())
    }

    pub fn rotate_left(&mut self) -> Result<(), CommandError> {
        self.ensure_active()?;
        self.queue.rotate_current_left();
        self.push_rotated();
        Ok(())
    }

    /// Exchanges the current and next pieces. The countdown keeps running.
    pub fn swap_pieces(&mut self) -> Result<(), CommandError> {
        self.ensure_active()?;
        self.queue.swap();
        self.push_queue_changed();
        Ok(())
    }

    /// Applies one player command at `now`, after settling any expired countdown.
    pub fn apply(&mut self, command: GameCommand, now: Instant) -> Result<(), CommandError> {
        if command != GameCommand::StartGame {
            self.tick(now);
        }
        match command {
            GameCommand::PlaceAt { x, y } => self.place_at(x, y, now).map(drop),
            GameCommand::MoveCursor { dx, dy } => self.move_cursor(dx, dy).map(drop),
            GameCommand::ConfirmAtCursor => self.confirm_at_cursor(now).map(drop),
            GameCommand::RotateRight => self.rotate_right(),
            GameCommand::RotateLeft => self.rotate_left(),
            GameCommand::SwapPieces => self.swap_pieces(),
            GameCommand::StartGame => {
                self.start_game(now);
                Ok(())
            }
        }
    }

    /// Processes every countdown expiry up to `now`. Returns the number of penalties.
    ///
    /// Each expiry costs one life and reschedules from the expired deadline, so a late
    /// call catches up one penalty per missed deadline. Stops at game over.
    pub fn tick(&mut self, now: Instant) -> usize {
        let mut penalties = 0;
        while self.state.is_active()
            && let Some(deadline) = self.clock.deadline()
            && now >= deadline
        {
            self.penalize(deadline);
            penalties += 1;
        }
        penalties
    }

    fn penalize(&mut self, deadline: Instant) {
        let lives = self.stats.apply_penalty();
        self.events.push(GameEvent::LifeLost { lives });
        self.push_stats_changed();

        if lives == 0 {
            self.clock.stop();
            self.grid.clear_cursor();
            self.state = ControllerState::GameOver;
            self.events.push(GameEvent::GameOver {
                final_score: self.stats.score(),
            });
            return;
        }

        self.queue.advance();
        self.push_queue_changed();
        self.restart_clock(deadline);
    }

    fn check_high_score(&mut self) {
        if !self.high_score_beaten
            && let Some(high_score) = self.high_score
            && self.stats.score() > high_score
        {
            self.high_score_beaten = true;
            self.events.push(GameEvent::HighScoreBeaten {
                score: self.stats.score(),
            });
        }
    }

    fn restart_clock(&mut self, from: Instant) {
        let delay = self.rules.delay.delay_for_level(self.stats.level());
        self.clock.restart(from, delay);
        self.events.push(GameEvent::DelayChanged {
            delay_ms: delay_millis(delay),
        });
    }

    fn push_queue_changed(&mut self) {
        self.events.push(GameEvent::PieceQueueChanged {
            current: *self.queue.current(),
            next: *self.queue.next(),
        });
    }

    fn push_rotated(&mut self) {
        self.events.push(GameEvent::PieceRotated {
            current: *self.queue.current(),
        });
    }

    fn push_stats_changed(&mut self) {
        self.events.push(GameEvent::StatsChanged {
            score: self.stats.score(),
            level: self.stats.level(),
            lives: self.stats.lives(),
            multiplier: self.stats.multiplier(),
        });
    }
}
