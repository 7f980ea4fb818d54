//! Playing styles a decision engine can follow.
//!
//! A [`Strategy`] fixes two things for an engine:
//!
//! - the [`HeuristicWeights`] used to score candidate placements
//! - the piece kinds it prefers when picking its own next piece from the shared pool
//!
//! | strategy    | height | holes | bumpiness | full rows | attack preference |
//! |-------------|-------:|------:|----------:|----------:|-------------------|
//! | `greedy`    |     -2 |    -5 |        -1 |         0 | any               |
//! | `defensive` |     -3 |   -10 |        -2 |         0 | I, O              |
//! | `aggressive`|     -1 |    -3 |         0 |       100 | T, L, J           |
//! | `other`     |     -1 |    -1 |         0 |         0 | any               |

use std::{fmt, str::FromStr};

use rivaltris_engine::PieceKind;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Greedy,
    Defensive,
    Aggressive,
    /// Catch-all for tags outside the known set.
    Other,
}

/// Linear weights applied to the metrics of a post-placement grid.
///
/// ```text
/// score = height·h + holes·H + bumpiness·B + lines·L
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeuristicWeights {
    pub height: f32,
    pub holes: f32,
    pub bumpiness: f32,
    pub lines: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown strategy: {tag:?} (expected greedy, defensive, aggressive or other)")]
pub struct ParseStrategyError {
    tag: String,
}

impl Strategy {
    pub const ALL: [Self; 4] = [Self::Greedy, Self::Defensive, Self::Aggressive, Self::Other];

    /// Maps a tag to a strategy, case-insensitively.
    ///
    /// Unknown tags map to [`Strategy::Other`] and emit a warning.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|_| {
            log::warn!("unknown strategy tag {tag:?}, falling back to `other`");
            Self::Other
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Defensive => "defensive",
            Self::Aggressive => "aggressive",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub const fn weights(self) -> HeuristicWeights {
        match self {
            Self::Greedy => HeuristicWeights {
                height: -2.0,
                holes: -5.0,
                bumpiness: -1.0,
                lines: 0.0,
            },
            Self::Defensive => HeuristicWeights {
                height: -3.0,
                holes: -10.0,
                bumpiness: -2.0,
                lines: 0.0,
            },
            Self::Aggressive => HeuristicWeights {
                height: -1.0,
                holes: -3.0,
                bumpiness: 0.0,
                lines: 100.0,
            },
            Self::Other => HeuristicWeights {
                height: -1.0,
                holes: -1.0,
                bumpiness: 0.0,
                lines: 0.0,
            },
        }
    }

    /// Kinds this strategy tries first when choosing its next piece.
    ///
    /// An empty slice means no preference.
    #[must_use]
    pub const fn attack_preference(self) -> &'static [PieceKind] {
        match self {
            Self::Aggressive => &[PieceKind::T, PieceKind::L, PieceKind::J],
            Self::Defensive => &[PieceKind::I, PieceKind::O],
            Self::Greedy | Self::Other => &[],
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStrategyError { tag: s.to_owned() })
    }
}

impl<'de> Deserialize<'de> for Strategy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tags() {
        assert_eq!("greedy".parse(), Ok(Strategy::Greedy));
        assert_eq!("Defensive".parse(), Ok(Strategy::Defensive));
        assert_eq!(" AGGRESSIVE ".parse(), Ok(Strategy::Aggressive));
        assert_eq!("other".parse(), Ok(Strategy::Other));
    }

    #[test]
    fn test_strict_parse_rejects_unknown_tag() {
        let err = "balanced".parse::<Strategy>().unwrap_err();
        assert!(err.to_string().contains("balanced"));
    }

    #[test]
    fn test_unknown_tag_maps_to_other() {
        assert_eq!(Strategy::from_tag("balanced"), Strategy::Other);
        assert_eq!(Strategy::from_tag(""), Strategy::Other);
        assert_eq!(Strategy::from_tag("greedy"), Strategy::Greedy);
    }

    #[test]
    fn test_serde_uses_lowercase_tags() {
        assert_eq!(
            serde_json::to_string(&Strategy::Aggressive).unwrap(),
            r#""aggressive""#
        );
        let parsed: Strategy = serde_json::from_str(r#""Defensive""#).unwrap();
        assert_eq!(parsed, Strategy::Defensive);
        let unknown: Strategy = serde_json::from_str(r#""chaotic""#).unwrap();
        assert_eq!(unknown, Strategy::Other);
    }

    #[test]
    fn test_attack_preferences() {
        assert_eq!(
            Strategy::Aggressive.attack_preference(),
            &[PieceKind::T, PieceKind::L, PieceKind::J]
        );
        assert_eq!(
            Strategy::Defensive.attack_preference(),
            &[PieceKind::I, PieceKind::O]
        );
        assert!(Strategy::Greedy.attack_preference().is_empty());
        assert!(Strategy::Other.attack_preference().is_empty());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse(), Ok(strategy));
        }
    }
}
