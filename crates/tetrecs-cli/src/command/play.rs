use std::{
    io::{self, BufRead as _},
    path::{Path, PathBuf},
    str::FromStr,
    sync::mpsc::Receiver,
    thread,
    time::Instant,
};

use anyhow::Context;
use tetrecs_engine::{GameCommand, GameController, GameDriver, GameEvent};

use crate::{
    command::GameArg,
    score_file::{self, ScoreRecord, ScoreTable},
    util::Output,
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[command(flatten)]
    game: GameArg,
    /// High-score file
    #[arg(long, default_value = "scores.txt")]
    scores: PathBuf,
    /// Record the final score under this name when a game ends
    #[arg(long)]
    name: Option<String>,
}

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayerInput {
    Command(GameCommand),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unrecognized input {input:?}; {hint}")]
struct ParseInputError {
    input: String,
    hint: &'static str,
}

const USAGE: &str = "expected one of: place X Y, move DX DY, up, down, left, right, confirm, \
                     rotate, rotate-left, swap, start, quit";

impl FromStr for PlayerInput {
    type Err = ParseInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |hint| ParseInputError {
            input: s.to_owned(),
            hint,
        };
        let words: Vec<&str> = s.split_whitespace().collect();
        let command = match words.as_slice() {
            ["place", x, y] => {
                let x = x.parse().map_err(|_| err("X and Y must be cell indices"))?;
                let y = y.parse().map_err(|_| err("X and Y must be cell indices"))?;
                GameCommand::PlaceAt { x, y }
            }
            ["move", dx, dy] => {
                let dx = dx.parse().map_err(|_| err("DX and DY must be integers"))?;
                let dy = dy.parse().map_err(|_| err("DX and DY must be integers"))?;
                GameCommand::MoveCursor { dx, dy }
            }
            ["up"] => GameCommand::MoveCursor { dx: 0, dy: -1 },
            ["down"] => GameCommand::MoveCursor { dx: 0, dy: 1 },
            ["left"] => GameCommand::MoveCursor { dx: -1, dy: 0 },
            ["right"] => GameCommand::MoveCursor { dx: 1, dy: 0 },
            ["confirm"] => GameCommand::ConfirmAtCursor,
            ["rotate"] => GameCommand::RotateRight,
            ["rotate-left"] => GameCommand::RotateLeft,
            ["swap"] => GameCommand::SwapPieces,
            ["start"] => GameCommand::StartGame,
            ["quit"] => return Ok(PlayerInput::Quit),
            _ => return Err(err(USAGE)),
        };
        Ok(PlayerInput::Command(command))
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        game,
        scores,
        name,
    } = arg;

    let rules = game.rules()?;
    let seed = game.seed();
    if let Some(name) = name {
        // Fail before playing rather than after.
        ScoreRecord::new(name.as_str(), 0)
            .with_context(|| format!("Cannot record scores for {name:?}"))?;
    }
    eprintln!("Starting game with seed {seed}");

    let mut controller = GameController::new(rules, seed, Instant::now())?;
    controller.set_high_score(ScoreTable::load(scores)?.top_score());
    let (driver, events) = GameDriver::spawn(controller);

    let printer = {
        let scores = scores.clone();
        let name = name.clone();
        thread::spawn(move || print_events(&events, &scores, name.as_deref()))
    };

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        match line.parse() {
            Ok(PlayerInput::Quit) => break,
            Ok(PlayerInput::Command(command)) => {
                if command == GameCommand::StartGame {
                    driver.set_high_score(ScoreTable::load(scores)?.top_score())?;
                }
                driver.send(command)?;
            }
            Err(e) => eprintln!("{e}"),
        }
    }

    let controller = driver.shutdown();
    printer
        .join()
        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))?;
    eprintln!(
        "Final score {} (level {}, {} lives left)",
        controller.stats().score(),
        controller.stats().level(),
        controller.stats().lives()
    );
    Ok(())
}

/// Prints every event as a JSON line until the game loop shuts down.
fn print_events(
    events: &Receiver<GameEvent>,
    scores: &Path,
    name: Option<&str>,
) -> anyhow::Result<()> {
    let mut output = Output::stdout();
    for event in events {
        output.write_json_line(&event)?;
        if let GameEvent::GameOver { final_score } = event
            && let Some(name) = name
        {
            let record = ScoreRecord::new(name, final_score)?;
            let rank = score_file::append_score(scores, record)?;
            eprintln!(
                "Recorded {name} at rank {} in {}",
                rank + 1,
                scores.display()
            );
        }
    }
    Ok(())
}
