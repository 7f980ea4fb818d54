use rivaltris_engine::{Grid, MatchSeed, PieceKind, SupplyPool};
use rivaltris_evaluator::Strategy;
use serde::{Deserialize, Serialize};

/// Settings for one match.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use rivaltris_arena::MatchConfig;
/// use rivaltris_evaluator::Strategy;
///
/// let config: MatchConfig = serde_json::from_str(r#"{"turn_limit": 1000}"#).unwrap();
/// assert_eq!(config.turn_limit, MatchConfig::LONG_TURN_LIMIT);
/// assert_eq!(config.side_a.strategy, Strategy::Greedy);
/// assert_eq!(config.side_b.strategy, Strategy::Aggressive);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Player moving first in every turn
    pub side_a: PlayerConfig,
    /// Player moving second in every turn; wins ties at the turn limit
    pub side_b: PlayerConfig,
    pub grid_width: usize,
    pub grid_height: usize,
    /// Initial count of every piece kind in the shared pool
    pub pool_count: u32,
    /// Number of turns after which the higher score wins
    pub turn_limit: usize,
    /// Seed of the match's random source; a random one is drawn when absent
    pub seed: Option<MatchSeed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    pub strategy: Strategy,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidConfigError {
    #[display("grid width {width} is narrower than the widest piece ({min})")]
    GridTooNarrow { width: usize, min: usize },
    #[display("grid width {width} exceeds the maximum of {max}")]
    GridTooWide { width: usize, max: usize },
    #[display("grid height must be positive")]
    ZeroHeight,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            side_a: PlayerConfig::new("AI-1", Strategy::Greedy),
            side_b: PlayerConfig::new("AI-2", Strategy::Aggressive),
            grid_width: Grid::CANONICAL_WIDTH,
            grid_height: Grid::CANONICAL_HEIGHT,
            pool_count: SupplyPool::DEFAULT_INITIAL_COUNT,
            turn_limit: Self::SHORT_TURN_LIMIT,
            seed: None,
        }
    }
}

impl MatchConfig {
    pub const SHORT_TURN_LIMIT: usize = 100;
    pub const LONG_TURN_LIMIT: usize = 1000;

    #[must_use]
    pub fn with_seed(mut self, seed: MatchSeed) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), InvalidConfigError> {
        let min = widest_piece();
        if self.grid_width < min {
            return Err(InvalidConfigError::GridTooNarrow {
                width: self.grid_width,
                min,
            });
        }
        if self.grid_width > Grid::MAX_WIDTH {
            return Err(InvalidConfigError::GridTooWide {
                width: self.grid_width,
                max: Grid::MAX_WIDTH,
            });
        }
        if self.grid_height == 0 {
            return Err(InvalidConfigError::ZeroHeight);
        }
        Ok(())
    }
}

impl PlayerConfig {
    #[must_use]
    pub fn new(name: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            name: name.into(),
            strategy,
        }
    }
}

fn widest_piece() -> usize {
    PieceKind::ALL
        .into_iter()
        .map(|kind| kind.canonical_shape().width())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MatchConfig::default();
        assert_eq!(config.side_a, PlayerConfig::new("AI-1", Strategy::Greedy));
        assert_eq!(config.side_b, PlayerConfig::new("AI-2", Strategy::Aggressive));
        assert_eq!((config.grid_width, config.grid_height), (10, 20));
        assert_eq!(config.pool_count, 15);
        assert_eq!(config.turn_limit, 100);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_validate_rejects_bad_dimensions() {
        let narrow = MatchConfig {
            grid_width: 3,
            ..MatchConfig::default()
        };
        assert_eq!(
            narrow.validate(),
            Err(InvalidConfigError::GridTooNarrow { width: 3, min: 4 })
        );

        let wide = MatchConfig {
            grid_width: 65,
            ..MatchConfig::default()
        };
        assert!(matches!(
            wide.validate(),
            Err(InvalidConfigError::GridTooWide { .. })
        ));

        let flat = MatchConfig {
            grid_height: 0,
            ..MatchConfig::default()
        };
        assert_eq!(flat.validate(), Err(InvalidConfigError::ZeroHeight));
    }

    #[test]
    fn test_unknown_strategy_in_config_becomes_other() {
        let config: MatchConfig =
            serde_json::from_str(r#"{"side_a": {"name": "X", "strategy": "berserk"}}"#).unwrap();
        assert_eq!(config.side_a.strategy, Strategy::Other);
        assert_eq!(config.side_b.name, "AI-2");
    }
}
