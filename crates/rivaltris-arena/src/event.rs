//! In-memory record of a match, one entry per side per turn plus a closing entry.

use std::time::Duration;

use rivaltris_engine::{PieceKind, PieceOrigin, PoolSnapshot};
use rivaltris_evaluator::Placement;
use serde::{Deserialize, Serialize};

use crate::arena::{FinishReason, SideId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MatchEvent {
    Turn(TurnEvent),
    GameOver(GameOverEvent),
}

/// One side's action within a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnEvent {
    /// Turn number, starting at 1
    pub turn: usize,
    pub side: SideId,
    pub player: String,
    /// Kind of the piece the side played
    pub piece: PieceKind,
    /// Position the engine chose
    pub placement: Placement,
    /// `false` when the placement was invalid and the side lost
    pub committed: bool,
    pub lines_cleared: usize,
    /// Garbage rows injected into the side's grid before it acted
    pub garbage_received: usize,
    /// Time the engine spent choosing the placement
    pub decision_time: Duration,
    /// Pool counts before the side's next piece was drawn
    pub pool: PoolSnapshot,
    /// Kind the side asked for as its next piece; only set after a line clear
    pub attack_piece: Option<PieceKind>,
    pub next_piece: PieceKind,
    pub next_piece_origin: PieceOrigin,
    /// Time since the match started
    pub elapsed: Duration,
}

/// Closing record of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOverEvent {
    pub turn: usize,
    pub winner: SideId,
    pub winner_name: String,
    pub reason: FinishReason,
    /// Scores of side A and side B
    pub scores: [usize; 2],
    /// Total cleared lines of side A and side B
    pub lines: [usize; 2],
    pub elapsed: Duration,
}

impl MatchEvent {
    #[must_use]
    pub fn turn(&self) -> usize {
        match self {
            Self::Turn(event) => event.turn,
            Self::GameOver(event) => event.turn,
        }
    }

    #[must_use]
    pub fn as_turn(&self) -> Option<&TurnEvent> {
        match self {
            Self::Turn(event) => Some(event),
            Self::GameOver(_) => None,
        }
    }

    #[must_use]
    pub fn as_game_over(&self) -> Option<&GameOverEvent> {
        match self {
            Self::Turn(_) => None,
            Self::GameOver(event) => Some(event),
        }
    }
}
