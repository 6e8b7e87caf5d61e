use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use serde::Serialize;
use tetrecs_engine::{GameController, GameRules, GameStats, Grid, Piece, PieceSeed, find_full_lines};

use crate::{command::GameArg, util::Output};

/// Virtual time the simulated player spends on each move.
const THINK_TIME: Duration = Duration::from_millis(800);

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[command(flatten)]
    game: GameArg,
    /// Stop after this many turns even if the game is still running
    #[arg(long, default_value_t = 1000)]
    max_turns: usize,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct SimulationSummary {
    seed: PieceSeed,
    turns: usize,
    game_over: bool,
    elapsed_ms: u64,
    stats: GameStats,
    grid: Grid,
}

/// Where and how the greedy player puts the current piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placement {
    rotations: usize,
    x: usize,
    y: usize,
    lines: usize,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        game,
        max_turns,
        output,
    } = arg;

    let rules = game.rules()?;
    let seed = game.seed();
    eprintln!("Simulating up to {max_turns} turns with seed {seed}");

    let summary = simulate(rules, seed, *max_turns)?;
    eprintln!(
        "Finished after {} turns: score {}, level {}",
        summary.turns,
        summary.stats.score(),
        summary.stats.level()
    );

    Output::save_json(&summary, output.clone())?;
    Ok(())
}

fn simulate(
    rules: GameRules,
    seed: PieceSeed,
    max_turns: usize,
) -> anyhow::Result<SimulationSummary> {
    let start = Instant::now();
    let mut now = start;
    let mut controller = GameController::new(rules, seed, now)?;

    let mut turns = 0;
    while turns < max_turns && controller.state().is_active() {
        turns += 1;
        now += THINK_TIME;
        // A penalty replaced the piece we were thinking about.
        if controller.tick(now) > 0 {
            continue;
        }

        match best_placement(controller.grid(), controller.current_piece()) {
            Some(placement) => {
                for _ in 0..placement.rotations {
                    controller.rotate_right()?;
                }
                controller.place_at(placement.x, placement.y, now)?;
            }
            None => {
                if let Some(deadline) = controller.next_deadline() {
                    now = now.max(deadline);
                    controller.tick(now);
                }
            }
        }
        controller.drain_events();
    }

    Ok(SimulationSummary {
        seed,
        turns,
        game_over: controller.state().is_game_over(),
        elapsed_ms: u64::try_from(now.duration_since(start).as_millis())
            .unwrap_or(u64::MAX),
        stats: controller.stats().clone(),
        grid: controller.grid().clone(),
    })
}

/// The placement clearing the most lines; the first one found wins ties.
fn best_placement(grid: &Grid, piece: &Piece) -> Option<Placement> {
    let mut best: Option<Placement> = None;
    let mut rotated = *piece;
    for rotations in 0..4 {
        for y in 0..grid.rows() {
            for x in 0..grid.cols() {
                if !grid.can_place(&rotated, x, y) {
                    continue;
                }
                let mut trial = grid.clone();
                trial.place(&rotated, x, y);
                let lines = find_full_lines(&trial).lines_cleared();
                if best.is_none_or(|best| lines > best.lines) {
                    best = Some(Placement {
                        rotations,
                        x,
                        y,
                        lines,
                    });
                }
            }
        }
        rotated.rotate_right();
    }
    best
}

#[cfg(test)]
mod tests {
    use tetrecs_engine::{Cell, PieceKind};

    use super::*;

    const SEED: PieceSeed = PieceSeed::from_bytes([0x42; 16]);

    #[test]
    fn test_best_placement_prefers_clearing_lines() {
        let mut grid = Grid::new(5, 5);
        for x in [0, 4] {
            grid.set(x, 4, Cell::Block(PieceKind::Dot));
        }
        // The vertical line only completes row 4 once rotated.
        let piece = Piece::new(PieceKind::Line).rotated_right();

        let placement = best_placement(&grid, &piece).unwrap();
        assert_eq!(placement.lines, 1);
        assert_eq!(placement.rotations, 1);
        assert_eq!((placement.x, placement.y), (2, 4));
    }

    #[test]
    fn test_best_placement_takes_first_fit_without_clears() {
        let grid = Grid::new(5, 5);
        let placement = best_placement(&grid, &Piece::new(PieceKind::Plus)).unwrap();
        assert_eq!(
            placement,
            Placement {
                rotations: 0,
                x: 1,
                y: 1,
                lines: 0,
            }
        );
    }

    #[test]
    fn test_best_placement_on_full_grid() {
        let mut grid = Grid::new(3, 3);
        grid.set(1, 1, Cell::Block(PieceKind::Dot));
        assert_eq!(best_placement(&grid, &Piece::new(PieceKind::X)), None);
        assert_eq!(best_placement(&grid, &Piece::new(PieceKind::Plus)), None);
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let a = simulate(GameRules::default(), SEED, 200).unwrap();
        let b = simulate(GameRules::default(), SEED, 200).unwrap();
        assert_eq!(a.turns, b.turns);
        assert_eq!(a.stats, b.stats);
        assert_eq!(a.grid, b.grid);
        assert!(a.turns <= 200);
    }

    #[test]
    fn test_simulation_stops_at_game_over() {
        let rules = GameRules {
            cols: 2,
            rows: 2,
            initial_lives: 1,
            ..GameRules::default()
        };
        let summary = simulate(rules, SEED, 100).unwrap();
        assert!(summary.game_over);
        assert!(summary.turns < 100);
        assert_eq!(summary.stats.lives(), 0);
    }
}
