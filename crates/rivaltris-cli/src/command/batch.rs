use std::{num::NonZero, path::PathBuf, thread};

use chrono::{DateTime, Utc};
use rand::Rng as _;
use rivaltris_arena::{Arena, FinishReason, InvalidConfigError, MatchConfig, MatchOutcome, SideId};
use rivaltris_engine::MatchSeed;
use serde::Serialize;

use super::MatchArg;
use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BatchArg {
    #[clap(flatten)]
    pub(super) match_arg: MatchArg,
    /// Number of matches to play
    #[arg(long, default_value_t = 100)]
    matches: usize,
    /// Number of worker threads (defaults to the available parallelism)
    #[arg(long)]
    jobs: Option<NonZero<usize>>,
    /// Write every match result as JSON to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct MatchResult {
    index: usize,
    seed: MatchSeed,
    outcome: MatchOutcome,
    turns: usize,
    /// Scores of side A and side B
    scores: [usize; 2],
}

#[derive(Debug, Serialize)]
struct BatchSummary {
    recorded_at: DateTime<Utc>,
    /// Seed every match seed is derived from
    seed: MatchSeed,
    config: MatchConfig,
    /// Wins of side A and side B
    wins: [usize; 2],
    results: Vec<MatchResult>,
}

pub(crate) fn run(arg: &BatchArg) -> anyhow::Result<()> {
    let config = arg.match_arg.to_config()?;
    let base_seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let jobs = arg
        .jobs
        .or_else(|| thread::available_parallelism().ok())
        .map_or(1, NonZero::get);
    let chunk_size = arg.matches.div_ceil(jobs).max(1);

    eprintln!(
        "Playing {} matches on {jobs} threads (seed {base_seed})...",
        arg.matches
    );

    let mut slots: Vec<Option<Result<MatchResult, InvalidConfigError>>> = vec![None; arg.matches];
    thread::scope(|s| {
        for (chunk_index, chunk) in slots.chunks_mut(chunk_size).enumerate() {
            let config = &config;
            s.spawn(move || {
                let start = chunk_index * chunk_size;
                for (offset, slot) in chunk.iter_mut().enumerate() {
                    let index = start + offset;
                    *slot = Some(play_match(config, base_seed.derive(index as u64), index));
                }
            });
        }
    });

    let results = slots
        .into_iter()
        .flatten()
        .collect::<Result<Vec<_>, _>>()?;

    let mut wins = [0; 2];
    let mut turn_limit_finishes = 0;
    for result in &results {
        wins[result.outcome.winner.index()] += 1;
        if result.outcome.reason == FinishReason::TurnLimit {
            turn_limit_finishes += 1;
        }
    }

    eprintln!();
    for side in SideId::ALL {
        let name = match side {
            SideId::A => &config.side_a.name,
            SideId::B => &config.side_b.name,
        };
        eprintln!("{name} (side {side}): {} wins", wins[side.index()]);
    }
    eprintln!(
        "Decided by turn limit: {turn_limit_finishes} / {}",
        results.len()
    );
    if let Some(mean) = mean_turns(&results) {
        eprintln!("Average match length: {mean:.1} turns");
    }

    if let Some(path) = &arg.output {
        let summary = BatchSummary {
            recorded_at: Utc::now(),
            seed: base_seed,
            config,
            wins,
            results,
        };
        util::save_json(&summary, Some(path))?;
        eprintln!("Results saved to {}", path.display());
    }

    Ok(())
}

fn play_match(
    config: &MatchConfig,
    seed: MatchSeed,
    index: usize,
) -> Result<MatchResult, InvalidConfigError> {
    let mut arena = Arena::new(config.clone().with_seed(seed))?;
    let outcome = arena.run_match();
    log::info!(
        "match {index}: {} wins by {} after {} turns",
        outcome.winner_name,
        outcome.reason,
        arena.turn()
    );
    Ok(MatchResult {
        index,
        seed,
        turns: arena.turn(),
        scores: [arena.grid(SideId::A).score(), arena.grid(SideId::B).score()],
        outcome,
    })
}

#[expect(clippy::cast_precision_loss)]
fn mean_turns(results: &[MatchResult]) -> Option<f64> {
    if results.is_empty() {
        return None;
    }
    let total: usize = results.iter().map(|result| result.turns).sum();
    Some(total as f64 / results.len() as f64)
}
