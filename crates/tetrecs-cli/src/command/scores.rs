use std::path::PathBuf;

use anyhow::Context;

use crate::score_file::{self, ScoreRecord, ScoreTable};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ScoresArg {
    /// High-score file
    #[arg(long, default_value = "scores.txt", global = true)]
    scores: PathBuf,
    #[command(subcommand)]
    action: ScoresAction,
}

#[derive(Debug, Clone, clap::Subcommand)]
enum ScoresAction {
    /// Print the scores, best first
    List,
    /// Record a score
    Add {
        /// Player name (no ':' or line breaks)
        name: String,
        score: usize,
    },
}

pub(crate) fn run(arg: &ScoresArg) -> anyhow::Result<()> {
    let ScoresArg { scores, action } = arg;

    match action {
        ScoresAction::List => {
            let table = ScoreTable::load(scores)?;
            if table.records().is_empty() {
                eprintln!("No scores recorded in {}", scores.display());
            }
            for (rank, record) in table.records().iter().enumerate() {
                println!("{:>3}. {:<20} {:>8}", rank + 1, record.name(), record.score());
            }
        }
        ScoresAction::Add { name, score } => {
            let record = ScoreRecord::new(name.as_str(), *score)
                .with_context(|| format!("Cannot record score for {name:?}"))?;
            let rank = score_file::append_score(scores, record)?;
            eprintln!("Recorded {name} at rank {} in {}", rank + 1, scores.display());
        }
    }

    Ok(())
}
