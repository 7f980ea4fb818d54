use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rivaltris_arena::MatchConfig;
use rivaltris_engine::MatchSeed;
use rivaltris_evaluator::Strategy;

use crate::util;

use self::{batch::BatchArg, run::RunArg};

mod batch;
mod run;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play one match and print the result
    Run(#[clap(flatten)] RunArg),
    /// Play many independent matches in parallel and tally the winners
    Batch(#[clap(flatten)] BatchArg),
}

/// Match settings shared by every mode.
///
/// Flags override the values of `--config`, which in turn override the defaults.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct MatchArg {
    /// JSON file with a match configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Strategy of side A (greedy, defensive, aggressive, other)
    #[arg(long)]
    strategy_a: Option<Strategy>,
    /// Strategy of side B (greedy, defensive, aggressive, other)
    #[arg(long)]
    strategy_b: Option<Strategy>,
    #[arg(long)]
    name_a: Option<String>,
    #[arg(long)]
    name_b: Option<String>,
    /// Initial count of every piece kind in the shared pool
    #[arg(long)]
    pool_count: Option<u32>,
    /// Number of turns before the score decides the match
    #[arg(long, conflicts_with = "long")]
    turn_limit: Option<usize>,
    /// Use the long turn limit (1000 turns)
    #[arg(long)]
    long: bool,
    #[arg(long)]
    width: Option<usize>,
    #[arg(long)]
    height: Option<usize>,
    /// Seed as 32 hex digits; random when omitted
    #[arg(long)]
    seed: Option<MatchSeed>,
}

impl MatchArg {
    fn to_config(&self) -> anyhow::Result<MatchConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file("match config", path)?,
            None => MatchConfig::default(),
        };
        if let Some(strategy) = self.strategy_a {
            config.side_a.strategy = strategy;
        }
        if let Some(strategy) = self.strategy_b {
            config.side_b.strategy = strategy;
        }
        if let Some(name) = &self.name_a {
            config.side_a.name.clone_from(name);
        }
        if let Some(name) = &self.name_b {
            config.side_b.name.clone_from(name);
        }
        if let Some(count) = self.pool_count {
            config.pool_count = count;
        }
        if self.long {
            config.turn_limit = MatchConfig::LONG_TURN_LIMIT;
        }
        if let Some(limit) = self.turn_limit {
            config.turn_limit = limit;
        }
        if let Some(width) = self.width {
            config.grid_width = width;
        }
        if let Some(height) = self.height {
            config.grid_height = height;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Run(RunArg::default())) {
        Mode::Run(arg) => run::run(&arg)?,
        Mode::Batch(arg) => batch::run(&arg)?,
    }
    Ok(())
}
