//! Two-player match orchestration for rivaltris.
//!
//! An [`Arena`] runs one match: two grids, two decision engines and one shared supply pool,
//! advanced turn by turn until a side tops out or the turn limit is reached. Every action is
//! recorded as a [`MatchEvent`], and [`Arena::snapshot`] exposes the current state to
//! presentation layers.
//!
//! - [`config`] - [`MatchConfig`] and its validation
//! - [`arena`] - the orchestrator, outcomes and snapshots
//! - [`event`] - the per-turn and closing event records

pub use self::{
    arena::{Arena, ArenaSnapshot, FinishReason, MatchOutcome, MatchState, SideId, SideSnapshot},
    config::{InvalidConfigError, MatchConfig, PlayerConfig},
    event::{GameOverEvent, MatchEvent, TurnEvent},
};

pub mod arena;
pub mod config;
pub mod event;
