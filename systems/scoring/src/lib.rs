#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic reference scoring oracle.
//!
//! [`TableOracle`] stands in for an external fuzzy-inference engine so the
//! battle can be played without one. Scores are piecewise-linear blends of the
//! two health ratios, clamped to `0.0..=100.0`; higher scores mean a more
//! aggressive enemy.

use std::collections::BTreeSet;

use skirmish_core::{
    Archetype, Behavior, HealVerdict, InferenceMethod, ScoreQuery, ScoreTable, ScoringOracle, Tile,
};

const DEFAULT_PLAYER_MAX_HEALTH: u32 = 20;
const MIN_HEAL_RESOURCE: u32 = 20;
const HEAL_THRESHOLD_PERCENT: u32 = 40;

/// Piecewise-linear oracle with fixed per-archetype behavior thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableOracle {
    player_max_health: u32,
}

impl TableOracle {
    /// Creates an oracle that assumes the default player health pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            player_max_health: DEFAULT_PLAYER_MAX_HEALTH,
        }
    }

    /// Returns the oracle normalising player health against the provided maximum.
    #[must_use]
    pub const fn with_player_max_health(mut self, player_max_health: u32) -> Self {
        self.player_max_health = player_max_health;
        self
    }

    fn score(&self, method: InferenceMethod, query: &ScoreQuery) -> f64 {
        let player = ratio(query.player_health, self.player_max_health);
        let enemy = ratio(query.enemy_health, query.archetype.stats().health);
        let pool = query
            .archetype
            .stats()
            .resource
            .map_or(0.0, |maximum| ratio(query.resource, maximum));

        let blended = match method {
            InferenceMethod::Mamdani => 0.6 * enemy + 0.4 * (1.0 - player),
            InferenceMethod::Sugeno => 0.5 * enemy + 0.4 * (1.0 - player) + 0.1 * pool,
            InferenceMethod::Tsukamoto => enemy * (1.0 - 0.5 * player),
        };
        (blended * 100.0).clamp(0.0, 100.0)
    }
}

impl Default for TableOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringOracle for TableOracle {
    fn heal_priority_check(
        &self,
        archetype: Archetype,
        current_health: u32,
        current_resource: u32,
    ) -> HealVerdict {
        let stats = archetype.stats();
        if stats.resource.is_none() {
            return HealVerdict::decline("no resource pool");
        }
        if current_resource < MIN_HEAL_RESOURCE {
            return HealVerdict::decline("resource exhausted");
        }

        let wounded = u64::from(current_health) * 100
            <= u64::from(stats.health) * u64::from(HEAL_THRESHOLD_PERCENT);
        if wounded {
            HealVerdict::heal("critical health")
        } else {
            HealVerdict::decline("healthy")
        }
    }

    fn pick_adjacent_farther(
        &self,
        from: Tile,
        away_from: Tile,
        occupied: &BTreeSet<Tile>,
        width: u32,
        height: u32,
    ) -> Option<Tile> {
        let current = from.manhattan_distance(away_from);
        free_neighbors(from, occupied, width, height)
            .filter(|tile| tile.manhattan_distance(away_from) > current)
            .fold(None, |best: Option<Tile>, tile| match best {
                Some(kept)
                    if kept.manhattan_distance(away_from) >= tile.manhattan_distance(away_from) =>
                {
                    Some(kept)
                }
                _ => Some(tile),
            })
    }

    fn pick_adjacent_closer(
        &self,
        from: Tile,
        toward: Tile,
        occupied: &BTreeSet<Tile>,
        width: u32,
        height: u32,
    ) -> Option<Tile> {
        let current = from.manhattan_distance(toward);
        free_neighbors(from, occupied, width, height)
            .filter(|tile| tile.manhattan_distance(toward) < current)
            .fold(None, |best: Option<Tile>, tile| match best {
                Some(kept)
                    if kept.manhattan_distance(toward) <= tile.manhattan_distance(toward) =>
                {
                    Some(kept)
                }
                _ => Some(tile),
            })
    }

    fn all_scores(&self, query: &ScoreQuery) -> ScoreTable {
        InferenceMethod::ALL
            .into_iter()
            .map(|method| (method.as_str(), self.score(method, query)))
            .collect()
    }

    fn map_score_to_behavior(&self, score: f64, archetype: Archetype) -> Behavior {
        if !score.is_finite() {
            return Behavior::Wait;
        }

        let ladder: &[(f64, Behavior)] = match archetype {
            Archetype::Zombie => &[(40.0, Behavior::MoveClose)],
            Archetype::Skeleton => &[(50.0, Behavior::RangedAttack), (25.0, Behavior::MoveClose)],
            Archetype::Enderman => &[
                (60.0, Behavior::TeleportClose),
                (30.0, Behavior::MoveClose),
                (0.0, Behavior::TeleportFar),
            ],
            Archetype::Boss => &[
                (70.0, Behavior::RangedAttack),
                (45.0, Behavior::TeleportClose),
                (20.0, Behavior::MoveClose),
            ],
        };

        ladder
            .iter()
            .find(|(threshold, _)| score >= *threshold)
            .map_or(Behavior::MoveRetreat, |(_, behavior)| *behavior)
    }
}

fn ratio(value: u32, maximum: u32) -> f64 {
    if maximum == 0 {
        return 0.0;
    }
    (f64::from(value) / f64::from(maximum)).clamp(0.0, 1.0)
}

fn free_neighbors<'a>(
    from: Tile,
    occupied: &'a BTreeSet<Tile>,
    width: u32,
    height: u32,
) -> impl Iterator<Item = Tile> + 'a {
    from.neighbors().filter(move |tile| {
        tile.column() < width && tile.row() < height && !occupied.contains(tile)
    })
}
