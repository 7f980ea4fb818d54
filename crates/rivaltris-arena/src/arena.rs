//! Turn-exchange orchestration between two sides sharing one supply pool.
//!
//! # Turn Flow
//!
//! Each turn increments the turn counter, then lets side A and side B act in that order.
//! Acting means:
//!
//! 1. Drain the side's pending garbage into its grid
//! 2. Ask the side's engine for a placement of its current piece
//! 3. Commit the placement, or mark the grid terminal when it is invalid
//! 4. After a commit, clear lines and add them to the opponent's pending garbage; when at least
//!    one line was cleared, let the engine pick an attack piece
//! 5. Resolve the side's next piece: the attack piece if the pool still has it, otherwise a
//!    random pool draw, otherwise the unbounded fallback
//! 6. If the side is game over, the opponent wins and the turn stops there
//!
//! When the turn limit is reached, the higher score wins and ties go to side B.

use std::{
    fmt, mem,
    time::{Duration, Instant},
};

use rand::Rng as _;
use rand_pcg::Pcg32;
use rivaltris_engine::{
    DrawnPiece, Grid, MatchSeed, PieceKind, PieceOrigin, PoolSnapshot, SupplyPool,
};
use rivaltris_evaluator::{DecisionEngine, Strategy};
use serde::{Deserialize, Serialize};

use crate::{
    config::{InvalidConfigError, MatchConfig},
    event::{GameOverEvent, MatchEvent, TurnEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
pub enum SideId {
    A,
    B,
}

impl SideId {
    pub const ALL: [Self; 2] = [Self::A, Self::B];

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

impl fmt::Display for SideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The losing side topped out or made an invalid placement.
    #[display("top-out")]
    TopOut,
    /// The turn limit was reached and scores decided.
    #[display("turn limit")]
    TurnLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub winner: SideId,
    pub winner_name: String,
    pub reason: FinishReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MatchState {
    NotStarted,
    Running,
    Finished(MatchOutcome),
}

#[derive(Debug)]
struct Side {
    grid: Grid,
    engine: DecisionEngine,
    current: Option<PieceKind>,
    pending_garbage: usize,
}

/// A single match between two decision engines.
///
/// The arena owns every piece of match state: both grids and engines, the shared pool, the
/// match's random source and the event log. Independent arenas share nothing and can run on
/// different threads.
///
/// # Example
///
/// ```
/// use rivaltris_arena::{Arena, MatchConfig};
/// use rivaltris_engine::MatchSeed;
///
/// let config = MatchConfig::default().with_seed(MatchSeed::from_u128(1));
/// let mut arena = Arena::new(config).unwrap();
/// let outcome = arena.run_match();
///
/// assert!(arena.state().is_finished());
/// let game_over = arena.events().last().and_then(|e| e.as_game_over()).unwrap();
/// assert_eq!(game_over.winner, outcome.winner);
/// ```
#[derive(Debug)]
pub struct Arena {
    config: MatchConfig,
    seed: MatchSeed,
    rng: Pcg32,
    pool: SupplyPool,
    sides: [Side; 2],
    turn: usize,
    state: MatchState,
    events: Vec<MatchEvent>,
    started_at: Option<Instant>,
}

impl Arena {
    /// Builds a match from a validated configuration.
    ///
    /// A random seed is drawn when the configuration carries none.
    pub fn new(config: MatchConfig) -> Result<Self, InvalidConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let side = |name: &str, strategy: Strategy| Side {
            grid: Grid::new(config.grid_width, config.grid_height),
            engine: DecisionEngine::new(name, strategy),
            current: None,
            pending_garbage: 0,
        };
        let sides = [
            side(&config.side_a.name, config.side_a.strategy),
            side(&config.side_b.name, config.side_b.strategy),
        ];

        Ok(Self {
            rng: seed.rng(),
            pool: SupplyPool::new(config.pool_count),
            sides,
            turn: 0,
            state: MatchState::NotStarted,
            events: Vec::new(),
            started_at: None,
            seed,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Seed actually used, including a randomly drawn one.
    #[must_use]
    pub fn seed(&self) -> MatchSeed {
        self.seed
    }

    #[must_use]
    pub fn turn(&self) -> usize {
        self.turn
    }

    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&MatchOutcome> {
        match &self.state {
            MatchState::Finished(outcome) => Some(outcome),
            MatchState::NotStarted | MatchState::Running => None,
        }
    }

    #[must_use]
    pub fn pool(&self) -> &SupplyPool {
        &self.pool
    }

    #[must_use]
    pub fn grid(&self, side: SideId) -> &Grid {
        &self.sides[side.index()].grid
    }

    #[must_use]
    pub fn engine(&self, side: SideId) -> &DecisionEngine {
        &self.sides[side.index()].engine
    }

    /// Piece the side will play next, `None` before the match starts.
    #[must_use]
    pub fn current_piece(&self, side: SideId) -> Option<PieceKind> {
        self.sides[side.index()].current
    }

    #[must_use]
    pub fn pending_garbage(&self, side: SideId) -> usize {
        self.sides[side.index()].pending_garbage
    }

    #[must_use]
    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<MatchEvent> {
        self.events
    }

    /// Draws both sides' first pieces, side A first, and starts the match.
    ///
    /// Does nothing unless the match has not started yet.
    pub fn start(&mut self) {
        if !self.state.is_not_started() {
            return;
        }
        for side in SideId::ALL {
            let first = self.pool.draw_or_fallback(&mut self.rng);
            self.sides[side.index()].current = Some(first.kind);
        }
        self.state = MatchState::Running;
        self.started_at = Some(Instant::now());
        log::info!(
            "match started: {} ({}) vs {} ({}), seed {}",
            self.sides[0].engine.name(),
            self.sides[0].engine.strategy(),
            self.sides[1].engine.name(),
            self.sides[1].engine.strategy(),
            self.seed
        );
    }

    /// Plays one turn, starting the match first if needed.
    ///
    /// Returns the outcome once the match is finished. After that, further calls return the same
    /// outcome and change nothing.
    pub fn play_turn(&mut self) -> Option<MatchOutcome> {
        if let Some(outcome) = self.outcome() {
            return Some(outcome.clone());
        }
        self.start();

        if self.turn >= self.config.turn_limit {
            return Some(self.finish_by_score());
        }

        self.turn += 1;
        for side in SideId::ALL {
            self.play_side(side);
            if self.sides[side.index()].grid.is_game_over() {
                return Some(self.finish(side.opponent(), FinishReason::TopOut));
            }
        }

        if self.turn >= self.config.turn_limit {
            return Some(self.finish_by_score());
        }
        None
    }

    /// Plays until the match is finished and returns the outcome.
    pub fn run_match(&mut self) -> MatchOutcome {
        loop {
            if let Some(outcome) = self.play_turn() {
                return outcome;
            }
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> ArenaSnapshot {
        let side = |id: SideId| {
            let side = &self.sides[id.index()];
            SideSnapshot {
                side: id,
                name: side.engine.name().to_owned(),
                strategy: side.engine.strategy(),
                score: side.grid.score(),
                lines: side.grid.total_cleared_lines(),
                current_piece: side.current,
                pending_garbage: side.pending_garbage,
                terminal: side.grid.is_terminal(),
                rows: render_rows(&side.grid),
                average_decision_time: side.engine.average_decision_time(),
                last_decision_time: side.engine.last_decision_time(),
            }
        };
        ArenaSnapshot {
            turn: self.turn,
            state: self.state.clone(),
            sides: [side(SideId::A), side(SideId::B)],
            pool: self.pool.snapshot(),
        }
    }

    fn play_side(&mut self, id: SideId) {
        let elapsed = self.elapsed();
        let side = &mut self.sides[id.index()];

        let garbage_received = mem::take(&mut side.pending_garbage);
        if garbage_received > 0 {
            log::trace!(
                "{}: injecting {garbage_received} garbage rows",
                side.engine.name()
            );
            side.grid.add_garbage(garbage_received, &mut self.rng);
        }

        let piece = match side.current {
            Some(kind) => kind,
            None => self.pool.draw_or_fallback(&mut self.rng).kind,
        };
        let decision = side.engine.decide_placement(&side.grid, piece);
        let placement = decision.placement;

        let placed = placement.piece(piece);
        let (committed, lines_cleared, attack_piece) =
            match side.grid.try_place(&placed, placement.x, placement.y) {
                Ok(()) => {
                    let lines = side.grid.clear_lines();
                    let attack = if lines > 0 {
                        side.engine.choose_attack_piece(&self.pool, &mut self.rng)
                    } else {
                        None
                    };
                    (true, lines, attack)
                }
                Err(err) => {
                    log::warn!("{}: {err}, side loses", side.engine.name());
                    side.grid.mark_terminal();
                    (false, 0, None)
                }
            };
        let pool = self.pool.snapshot();

        let next = match attack_piece {
            Some(kind) if self.pool.draw(kind) => DrawnPiece {
                kind,
                origin: PieceOrigin::Pool,
            },
            _ => self.pool.draw_or_fallback(&mut self.rng),
        };
        side.current = Some(next.kind);

        log::debug!(
            "turn {} side {id} ({}): {piece} at {placement}, {lines_cleared} lines, next {}",
            self.turn,
            side.engine.name(),
            next.kind
        );

        let event = TurnEvent {
            turn: self.turn,
            side: id,
            player: side.engine.name().to_owned(),
            piece,
            placement,
            committed,
            lines_cleared,
            garbage_received,
            decision_time: decision.elapsed,
            pool,
            attack_piece,
            next_piece: next.kind,
            next_piece_origin: next.origin,
            elapsed,
        };
        self.events.push(MatchEvent::Turn(event));

        self.sides[id.opponent().index()].pending_garbage += lines_cleared;
    }

    fn finish_by_score(&mut self) -> MatchOutcome {
        let [a, b] = &self.sides;
        let winner = if a.grid.score() > b.grid.score() {
            SideId::A
        } else {
            SideId::B
        };
        self.finish(winner, FinishReason::TurnLimit)
    }

    fn finish(&mut self, winner: SideId, reason: FinishReason) -> MatchOutcome {
        let winner_name = self.sides[winner.index()].engine.name().to_owned();
        let outcome = MatchOutcome {
            winner,
            winner_name: winner_name.clone(),
            reason,
        };
        let elapsed = self.elapsed();
        let [a, b] = &self.sides;
        self.events.push(MatchEvent::GameOver(GameOverEvent {
            turn: self.turn,
            winner,
            winner_name,
            reason,
            scores: [a.grid.score(), b.grid.score()],
            lines: [a.grid.total_cleared_lines(), b.grid.total_cleared_lines()],
            elapsed,
        }));
        log::info!(
            "match finished after {} turns: {} wins by {reason} ({} - {})",
            self.turn,
            outcome.winner_name,
            a.grid.score(),
            b.grid.score()
        );
        self.state = MatchState::Finished(outcome.clone());
        outcome
    }

    fn elapsed(&self) -> Duration {
        self.started_at
            .map_or(Duration::ZERO, |started_at| started_at.elapsed())
    }
}

/// Serializable read-only view of a match, for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub turn: usize,
    pub state: MatchState,
    pub sides: [SideSnapshot; 2],
    pub pool: PoolSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideSnapshot {
    pub side: SideId,
    pub name: String,
    pub strategy: Strategy,
    pub score: usize,
    pub lines: usize,
    pub current_piece: Option<PieceKind>,
    pub pending_garbage: usize,
    pub terminal: bool,
    /// Grid rows from top to bottom, `#` for filled and `.` for empty cells
    pub rows: Vec<String>,
    pub average_decision_time: Duration,
    pub last_decision_time: Option<Duration>,
}

fn render_rows(grid: &Grid) -> Vec<String> {
    grid.rows()
        .iter()
        .map(|row| {
            row.cells(grid.width())
                .map(|filled| if filled { '#' } else { '.' })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rivaltris_evaluator::Placement;

    use super::*;

    fn config(seed: u128) -> MatchConfig {
        MatchConfig::default().with_seed(MatchSeed::from_u128(seed))
    }

    fn turn_events(arena: &Arena) -> Vec<&TurnEvent> {
        arena.events().iter().filter_map(MatchEvent::as_turn).collect()
    }

    #[test]
    fn test_start_draws_first_pieces() {
        let mut arena = Arena::new(config(1)).unwrap();
        assert!(arena.state().is_not_started());
        assert_eq!(arena.current_piece(SideId::A), None);

        arena.start();
        assert!(arena.state().is_running());
        assert!(arena.current_piece(SideId::A).is_some());
        assert!(arena.current_piece(SideId::B).is_some());
        assert_eq!(arena.pool().total_remaining(), 7 * 15 - 2);
        assert!(arena.events().is_empty());
    }

    #[test]
    fn test_sides_alternate_within_a_turn() {
        let mut arena = Arena::new(config(2)).unwrap();
        assert_eq!(arena.play_turn(), None);
        assert_eq!(arena.turn(), 1);

        let events = turn_events(&arena);
        assert_eq!(events.len(), 2);
        assert_eq!((events[0].turn, events[0].side), (1, SideId::A));
        assert_eq!((events[1].turn, events[1].side), (1, SideId::B));
        assert_eq!(events[0].player, "AI-1");
        assert_eq!(events[1].player, "AI-2");
        assert_eq!(arena.engine(SideId::A).decision_times().len(), 1);
        assert_eq!(arena.engine(SideId::B).decision_times().len(), 1);
    }

    #[test]
    fn test_same_seed_same_match() {
        let play = |seed| {
            let mut arena = Arena::new(config(seed)).unwrap();
            let outcome = arena.run_match();
            let moves: Vec<_> = turn_events(&arena)
                .into_iter()
                .map(|e| (e.side, e.piece, e.placement, e.lines_cleared, e.next_piece))
                .collect();
            (outcome, moves, arena.grid(SideId::A).clone())
        };
        assert_eq!(play(3), play(3));
    }

    #[test]
    fn test_tie_at_turn_limit_goes_to_side_b() {
        let config = MatchConfig {
            turn_limit: 0,
            ..config(4)
        };
        let mut arena = Arena::new(config).unwrap();
        let outcome = arena.run_match();
        assert_eq!(outcome.winner, SideId::B);
        assert_eq!(outcome.winner_name, "AI-2");
        assert_eq!(outcome.reason, FinishReason::TurnLimit);

        let game_over = arena.events().last().and_then(MatchEvent::as_game_over).unwrap();
        assert_eq!(game_over.scores, [0, 0]);
    }

    #[test]
    fn test_finished_match_is_frozen() {
        let mut arena = Arena::new(config(5)).unwrap();
        let outcome = arena.run_match();
        let events = arena.events().len();
        let turn = arena.turn();

        assert_eq!(arena.play_turn(), Some(outcome.clone()));
        assert_eq!(arena.run_match(), outcome);
        assert_eq!(arena.events().len(), events);
        assert_eq!(arena.turn(), turn);
    }

    #[test]
    fn test_invalid_placement_loses_immediately() {
        let config = MatchConfig {
            grid_width: 4,
            grid_height: 4,
            ..config(6)
        };
        let mut arena = Arena::new(config).unwrap();
        arena.sides[0].grid = Grid::from_ascii(
            4,
            4,
            r"
            #.##
            ##.#
            #.##
            ##.#
            ",
        );

        let outcome = arena.play_turn().unwrap();
        assert_eq!(outcome.winner, SideId::B);
        assert_eq!(outcome.reason, FinishReason::TopOut);

        let events = turn_events(&arena);
        assert_eq!(events.len(), 1, "side B must not act");
        assert!(!events[0].committed);
        assert_eq!(events[0].placement, Placement::new(2, 0, 0));
        assert_eq!(events[0].lines_cleared, 0);
        assert_eq!(events[0].attack_piece, None);
        assert!(arena.grid(SideId::A).is_terminal());
        assert_eq!(arena.pending_garbage(SideId::B), 0);
        assert_eq!(arena.engine(SideId::B).decision_times().len(), 0);
    }

    #[test]
    fn test_cleared_lines_become_opponent_garbage() {
        let config = MatchConfig {
            side_a: crate::PlayerConfig::new("attacker", Strategy::Aggressive),
            ..config(7)
        };
        let mut arena = Arena::new(config).unwrap();
        arena.start();
        arena.sides[0].grid = Grid::from_ascii(
            10,
            20,
            r"
            ####.#####
            ",
        );
        arena.sides[0].current = Some(PieceKind::I);

        assert_eq!(arena.play_turn(), None);
        let events = turn_events(&arena);
        assert_eq!(events[0].lines_cleared, 1);
        assert_eq!(events[0].garbage_received, 0);
        assert_eq!(events[1].garbage_received, 1);
        assert_eq!(arena.pending_garbage(SideId::B), 0);
        assert_eq!(arena.grid(SideId::A).score(), 100);
        assert!(events[0].attack_piece.is_some());
    }

    #[test]
    fn test_attack_piece_only_after_line_clear() {
        let config = MatchConfig {
            side_a: crate::PlayerConfig::new("AI-1", Strategy::Aggressive),
            side_b: crate::PlayerConfig::new("AI-2", Strategy::Defensive),
            ..config(1)
        };
        let mut arena = Arena::new(config).unwrap();
        arena.run_match();

        let events = turn_events(&arena);
        assert!(events.iter().any(|e| e.lines_cleared == 0));
        for event in events {
            if event.lines_cleared == 0 {
                assert_eq!(
                    event.attack_piece, None,
                    "turn {} side {} cleared nothing",
                    event.turn, event.side
                );
            }
        }
    }

    #[test]
    fn test_pool_is_recorded_before_next_piece_is_drawn() {
        let mut arena = Arena::new(config(10)).unwrap();
        arena.start();
        let before = arena.pool().snapshot();

        assert_eq!(arena.play_turn(), None);
        let event = turn_events(&arena)[0];
        assert!(event.next_piece_origin.is_pool());
        assert_eq!(event.pool, before);
        assert_eq!(arena.pool().total_remaining(), 7 * 15 - 4);
    }

    #[test]
    fn test_exhausted_pool_falls_back() {
        let config = MatchConfig {
            pool_count: 0,
            ..config(8)
        };
        let mut arena = Arena::new(config).unwrap();
        assert_eq!(arena.play_turn(), None);
        for event in turn_events(&arena) {
            assert_eq!(event.attack_piece, None);
            assert!(event.next_piece_origin.is_fallback());
        }
        assert_eq!(arena.pool().total_remaining(), 0);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut arena = Arena::new(config(9)).unwrap();
        arena.play_turn();
        let snapshot = arena.snapshot();
        assert_eq!(snapshot.turn, 1);
        assert!(snapshot.state.is_running());
        assert_eq!(snapshot.sides[0].name, "AI-1");
        assert_eq!(snapshot.sides[1].strategy, Strategy::Aggressive);
        assert_eq!(snapshot.sides[0].rows.len(), 20);
        assert!(snapshot.sides[0].rows.iter().all(|row| row.len() == 10));
        assert!(snapshot.sides[0].last_decision_time.is_some());
        assert_eq!(snapshot.pool, arena.pool().snapshot());

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: ArenaSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
