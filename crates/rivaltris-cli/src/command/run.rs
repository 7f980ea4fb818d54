use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use rivaltris_arena::{Arena, SideId};

use super::MatchArg;
use crate::{record::MatchRecord, util};

const RULE_WIDTH: usize = 60;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct RunArg {
    #[clap(flatten)]
    pub(super) match_arg: MatchArg,
    /// Write the event log as JSON to this file
    #[arg(long)]
    log: Option<PathBuf>,
    /// Print the match state after every turn
    #[arg(long)]
    watch: bool,
}

pub(crate) fn run(arg: &RunArg) -> anyhow::Result<()> {
    let config = arg.match_arg.to_config()?;
    let mut arena = Arena::new(config).context("Invalid match configuration")?;

    print_banner("RIVALTRIS ARENA - ASCII MODE");
    for side in SideId::ALL {
        let engine = arena.engine(side);
        println!("{} strategy: {}", engine.name(), engine.strategy());
    }
    println!("Seed: {}", arena.seed());
    println!();

    let outcome = loop {
        if let Some(outcome) = arena.play_turn() {
            break outcome;
        }
        if arg.watch {
            print_turn(&arena);
        }
    };

    print_banner("MATCH COMPLETE");
    println!(
        "Winner: {} (side {}, by {}) after {} turns",
        outcome.winner_name,
        outcome.winner,
        outcome.reason,
        arena.turn()
    );
    println!();
    println!("Final scores:");
    for side in SideId::ALL {
        let grid = arena.grid(side);
        println!(
            "  {}: {} (lines: {})",
            arena.engine(side).name(),
            grid.score(),
            grid.total_cleared_lines()
        );
    }
    println!();
    println!("Average decision times:");
    for side in SideId::ALL {
        let engine = arena.engine(side);
        println!(
            "  {}: {}",
            engine.name(),
            format_seconds(engine.average_decision_time())
        );
    }
    println!();
    println!("{}", arena.pool());

    print_banner("FINAL BOARDS");
    for side in SideId::ALL {
        println!("{} board:", arena.engine(side).name());
        println!("{}", arena.grid(side));
        println!();
    }

    if let Some(path) = &arg.log {
        let record = MatchRecord::new(&arena, outcome);
        util::save_json(&record, Some(path))?;
        eprintln!("Match log saved to {}", path.display());
    }

    Ok(())
}

fn print_banner(title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("{rule}");
    println!("{title}");
    println!("{rule}");
}

fn print_turn(arena: &Arena) {
    println!("Turn {}", arena.turn());
    for side in SideId::ALL {
        let grid = arena.grid(side);
        let piece = arena
            .current_piece(side)
            .map_or_else(|| "-".to_owned(), |kind| kind.to_string());
        println!(
            "  {}: score {} lines {} next {} garbage {}",
            arena.engine(side).name(),
            grid.score(),
            grid.total_cleared_lines(),
            piece,
            arena.pending_garbage(side)
        );
    }
}

fn format_seconds(duration: Duration) -> String {
    format!("{:.4}s", duration.as_secs_f64())
}
