use std::{collections::BTreeMap, fmt};

use arrayvec::ArrayVec;
use rand::{Rng, seq::IndexedRandom as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeMap as _};

use crate::PieceKind;

/// Finite per-kind supply of pieces shared by both sides of a match.
///
/// The pool starts with the same count for every kind and is never replenished. A draw
/// succeeds only while the count for that kind is positive, and each successful draw removes
/// exactly one piece.
///
/// Once the pool is exhausted, [`SupplyPool::draw_or_fallback`] keeps handing out pieces from
/// an unbounded uniform source that bypasses the pool entirely. The pool's finiteness is
/// therefore only enforced until the last piece is drawn.
///
/// # Example
///
/// ```
/// use rivaltris_engine::{PieceKind, SupplyPool};
///
/// let mut pool = SupplyPool::new(1);
/// assert!(pool.draw(PieceKind::T));
/// assert!(!pool.draw(PieceKind::T));
/// assert!(!pool.is_available(PieceKind::T));
/// assert_eq!(pool.total_remaining(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyPool {
    initial_count: u32,
    counts: [u32; PieceKind::LEN],
}

/// Where a piece handed out by [`SupplyPool::draw_or_fallback`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum PieceOrigin {
    /// Drawn from the pool, which lost one piece of that kind.
    Pool,
    /// Chosen uniformly from all kinds because the pool was exhausted.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawnPiece {
    pub kind: PieceKind,
    pub origin: PieceOrigin,
}

impl SupplyPool {
    pub const DEFAULT_INITIAL_COUNT: u32 = 15;

    #[must_use]
    pub fn new(initial_count: u32) -> Self {
        Self {
            initial_count,
            counts: [initial_count; PieceKind::LEN],
        }
    }

    #[must_use]
    pub fn initial_count(&self) -> u32 {
        self.initial_count
    }

    #[must_use]
    pub fn count(&self, kind: PieceKind) -> u32 {
        self.counts[kind.index()]
    }

    /// Takes one piece of `kind` out of the pool.
    ///
    /// Returns `false` without touching the pool when none is left.
    pub fn draw(&mut self, kind: PieceKind) -> bool {
        let count = &mut self.counts[kind.index()];
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }

    #[must_use]
    pub fn is_available(&self, kind: PieceKind) -> bool {
        self.count(kind) > 0
    }

    /// Kinds with a positive count, in canonical order.
    #[must_use]
    pub fn available_kinds(&self) -> ArrayVec<PieceKind, { PieceKind::LEN }> {
        PieceKind::ALL
            .into_iter()
            .filter(|kind| self.is_available(*kind))
            .collect()
    }

    /// Uniform choice among available kinds, or `None` when the pool is exhausted.
    ///
    /// Does not draw.
    pub fn random_available<R>(&self, rng: &mut R) -> Option<PieceKind>
    where
        R: Rng + ?Sized,
    {
        self.available_kinds().choose(rng).copied()
    }

    /// Draws a random available kind, or picks one uniformly from all kinds once the pool is
    /// exhausted.
    pub fn draw_or_fallback<R>(&mut self, rng: &mut R) -> DrawnPiece
    where
        R: Rng + ?Sized,
    {
        if let Some(kind) = self.random_available(rng) {
            let drawn = self.draw(kind);
            debug_assert!(drawn);
            return DrawnPiece {
                kind,
                origin: PieceOrigin::Pool,
            };
        }
        let kind = rng.random();
        log::trace!("supply pool exhausted, handing out {kind} from the fallback source");
        DrawnPiece {
            kind,
            origin: PieceOrigin::Fallback,
        }
    }

    #[must_use]
    pub fn total_remaining(&self) -> u32 {
        self.counts.iter().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|c| *c == 0)
    }

    #[must_use]
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            counts: self.counts,
        }
    }
}

impl fmt::Display for SupplyPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SUPPLY POOL:")?;
        for kind in PieceKind::ALL {
            let count = self.count(kind);
            let bar = "|".repeat(count as usize);
            writeln!(f, "{kind}: {bar} ({count})")?;
        }
        write!(f, "Total: {}", self.total_remaining())
    }
}

/// Per-kind remaining counts at one point in time.
///
/// Serializes as a map keyed by piece letter in canonical order, e.g.
/// `{"I": 15, "O": 14, ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    counts: [u32; PieceKind::LEN],
}

impl PoolSnapshot {
    #[must_use]
    pub fn count(&self, kind: PieceKind) -> u32 {
        self.counts[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (PieceKind, u32)> + '_ {
        PieceKind::ALL.into_iter().map(|kind| (kind, self.count(kind)))
    }
}

impl Serialize for PoolSnapshot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(PieceKind::LEN))?;
        for (kind, count) in self.iter() {
            map.serialize_entry(&kind.to_string(), &count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PoolSnapshot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, u32>::deserialize(deserializer)?;
        let mut counts = [0; PieceKind::LEN];
        for (key, count) in raw {
            let kind: PieceKind = key.parse().map_err(serde::de::Error::custom)?;
            counts[kind.index()] = count;
        }
        Ok(Self { counts })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_draw_until_exhausted() {
        let mut pool = SupplyPool::new(15);
        for _ in 0..15 {
            assert!(pool.draw(PieceKind::I));
        }
        assert!(!pool.is_available(PieceKind::I));
        assert!(!pool.draw(PieceKind::I));
        assert_eq!(pool.count(PieceKind::I), 0);
        assert_eq!(pool.total_remaining(), 6 * 15);
    }

    #[test]
    fn test_available_kinds_in_canonical_order() {
        let mut pool = SupplyPool::new(1);
        assert!(pool.draw(PieceKind::O));
        assert!(pool.draw(PieceKind::Z));
        assert_eq!(
            pool.available_kinds().as_slice(),
            &[
                PieceKind::I,
                PieceKind::T,
                PieceKind::S,
                PieceKind::L,
                PieceKind::J
            ]
        );
    }

    #[test]
    fn test_random_available_only_returns_available_kinds() {
        let mut pool = SupplyPool::new(1);
        for kind in [PieceKind::I, PieceKind::O, PieceKind::T, PieceKind::S] {
            assert!(pool.draw(kind));
        }
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..50 {
            let kind = pool.random_available(&mut rng).unwrap();
            assert!(matches!(kind, PieceKind::Z | PieceKind::L | PieceKind::J));
        }
    }

    #[test]
    fn test_draw_or_fallback_switches_source_on_exhaustion() {
        let mut pool = SupplyPool::new(1);
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..PieceKind::LEN {
            assert!(pool.draw_or_fallback(&mut rng).origin.is_pool());
        }
        assert!(pool.is_empty());
        assert_eq!(pool.random_available(&mut rng), None);
        for _ in 0..20 {
            assert!(pool.draw_or_fallback(&mut rng).origin.is_fallback());
        }
        assert_eq!(pool.total_remaining(), 0);
    }

    #[test]
    fn test_zero_initial_count_starts_exhausted() {
        let pool = SupplyPool::new(0);
        assert!(pool.is_empty());
        assert!(pool.available_kinds().is_empty());
    }

    #[test]
    fn test_snapshot_serialization() {
        let mut pool = SupplyPool::new(2);
        assert!(pool.draw(PieceKind::J));
        let serialized = serde_json::to_string(&pool.snapshot()).unwrap();
        assert_eq!(
            serialized,
            r#"{"I":2,"O":2,"T":2,"S":2,"Z":2,"L":2,"J":1}"#
        );
        let deserialized: PoolSnapshot = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, pool.snapshot());
    }

    #[test]
    fn test_display_renders_bars() {
        let mut pool = SupplyPool::new(3);
        assert!(pool.draw(PieceKind::I));
        let rendered = pool.to_string();
        assert!(rendered.starts_with("SUPPLY POOL:\nI: || (2)\nO: ||| (3)\n"));
        assert!(rendered.ends_with("Total: 20"));
    }
}
