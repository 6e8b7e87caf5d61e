use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::Rng as _;
use tetrecs_engine::{GameRules, PieceSeed};

use crate::util;

use self::{play::PlayArg, scores::ScoresArg, simulate::SimulateArg};

mod play;
mod scores;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play a game with line commands on stdin; events are printed as JSON lines
    Play(#[clap(flatten)] PlayArg),
    /// Let a greedy player play a game on a virtual clock
    Simulate(#[clap(flatten)] SimulateArg),
    /// Show or edit the high-score file
    Scores(#[clap(flatten)] ScoresArg),
}

/// Options shared by every mode that starts a game.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct GameArg {
    /// Rules file (JSON); unspecified fields keep their defaults
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Piece seed (32 hex digits); random if omitted
    #[arg(long)]
    seed: Option<PieceSeed>,
}

impl GameArg {
    pub(crate) fn rules(&self) -> anyhow::Result<GameRules> {
        util::read_rules_file(self.rules.as_ref())
    }

    pub(crate) fn seed(&self) -> PieceSeed {
        self.seed.unwrap_or_else(|| rand::rng().random())
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Scores(arg) => scores::run(&arg)?,
    }
    Ok(())
}
