use chrono::{DateTime, Utc};
use rivaltris_arena::{Arena, MatchConfig, MatchEvent, MatchOutcome};
use rivaltris_engine::MatchSeed;
use serde::{Deserialize, Serialize};

/// Event log of one finished match, as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct MatchRecord {
    /// Timestamp when the record was created (ISO 8601 format)
    pub recorded_at: DateTime<Utc>,
    /// Seed of the match's random source
    pub seed: MatchSeed,
    /// Configuration the match was played with
    pub config: MatchConfig,
    pub outcome: MatchOutcome,
    /// Every turn record followed by the closing record
    pub events: Vec<MatchEvent>,
}

impl MatchRecord {
    pub fn new(arena: &Arena, outcome: MatchOutcome) -> Self {
        Self {
            recorded_at: Utc::now(),
            seed: arena.seed(),
            config: arena.config().clone().with_seed(arena.seed()),
            outcome,
            events: arena.events().to_vec(),
        }
    }
}
