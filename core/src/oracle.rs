//! Contract for the external scoring oracle consumed by the decision engine.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use thiserror::Error;

use crate::{
    Archetype, BattleRules, Behavior, InferenceMethod, Tile, ENEMY_SPAWN, GRID_COLUMNS, GRID_ROWS,
    PLAYER_SPAWN,
};

/// Heal recommendation returned by [`ScoringOracle::heal_priority_check`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HealVerdict {
    /// Free-form label describing the recommendation.
    pub descriptor: String,
    /// Whether the enemy should spend its turn healing.
    pub should_heal: bool,
}

impl HealVerdict {
    /// Verdict recommending a heal.
    #[must_use]
    pub fn heal(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            should_heal: true,
        }
    }

    /// Verdict declining to heal.
    #[must_use]
    pub fn decline(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            should_heal: false,
        }
    }
}

/// Inputs forwarded to [`ScoringOracle::all_scores`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreQuery {
    /// Archetype being scored.
    pub archetype: Archetype,
    /// Current player health.
    pub player_health: u32,
    /// Current enemy health.
    pub enemy_health: u32,
    /// Opaque slot forwarded unchanged; always [`ScoreQuery::RESERVED`].
    pub reserved: u32,
    /// Current enemy resource pool, zero when the enemy has none.
    pub resource: u32,
    /// Opaque slot forwarded unchanged; always [`ScoreQuery::RESERVED_TAIL`].
    pub reserved_tail: u32,
}

impl ScoreQuery {
    /// Value carried in [`ScoreQuery::reserved`].
    pub const RESERVED: u32 = 0;

    /// Value carried in [`ScoreQuery::reserved_tail`].
    pub const RESERVED_TAIL: u32 = 5;

    /// Builds a query with the reserved slots filled in.
    #[must_use]
    pub const fn new(
        archetype: Archetype,
        player_health: u32,
        enemy_health: u32,
        resource: u32,
    ) -> Self {
        Self {
            archetype,
            player_health,
            enemy_health,
            reserved: Self::RESERVED,
            resource,
            reserved_tail: Self::RESERVED_TAIL,
        }
    }
}

/// Mapping from inference-method name to numeric score.
///
/// Keys are free-form strings because the oracle is external: a table may
/// omit methods or carry names the engine does not know. Non-finite scores
/// are treated as absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreTable {
    scores: BTreeMap<String, f64>,
}

impl ScoreTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table extended with the provided entry.
    #[must_use]
    pub fn with_score(mut self, method: impl Into<String>, score: f64) -> Self {
        let _ = self.scores.insert(method.into(), score);
        self
    }

    /// Finite score stored under the provided key.
    #[must_use]
    pub fn get(&self, method: &str) -> Option<f64> {
        self.scores
            .get(method)
            .copied()
            .filter(|score| score.is_finite())
    }

    /// Resolves the requested method, falling back to [`InferenceMethod::DEFAULT`].
    ///
    /// Returns `None` when neither key carries a finite score.
    #[must_use]
    pub fn resolve(&self, requested: InferenceMethod) -> Option<(InferenceMethod, f64)> {
        [requested, InferenceMethod::DEFAULT]
            .into_iter()
            .find_map(|method| self.get(method.as_str()).map(|score| (method, score)))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ScoreTable {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self {
            scores: iter
                .into_iter()
                .map(|(method, score)| (method.into(), score))
                .collect(),
        }
    }
}

/// Scoring capability injected into the decision engine and the session.
///
/// Implementations must be pure: identical inputs yield identical outputs.
pub trait ScoringOracle {
    /// Decides whether the enemy should heal this turn.
    fn heal_priority_check(
        &self,
        archetype: Archetype,
        current_health: u32,
        current_resource: u32,
    ) -> HealVerdict;

    /// Picks a free tile adjacent to `from` that moves away from `away_from`.
    fn pick_adjacent_farther(
        &self,
        from: Tile,
        away_from: Tile,
        occupied: &BTreeSet<Tile>,
        width: u32,
        height: u32,
    ) -> Option<Tile>;

    /// Picks a free tile adjacent to `from` that reduces the distance to `toward`.
    fn pick_adjacent_closer(
        &self,
        from: Tile,
        toward: Tile,
        occupied: &BTreeSet<Tile>,
        width: u32,
        height: u32,
    ) -> Option<Tile>;

    /// Scores the battle situation under every supported inference method.
    fn all_scores(&self, query: &ScoreQuery) -> ScoreTable;

    /// Maps a score onto a behavior tag for the archetype.
    fn map_score_to_behavior(&self, score: f64, archetype: Archetype) -> Behavior;
}

impl<O: ScoringOracle + ?Sized> ScoringOracle for &O {
    fn heal_priority_check(
        &self,
        archetype: Archetype,
        current_health: u32,
        current_resource: u32,
    ) -> HealVerdict {
        (**self).heal_priority_check(archetype, current_health, current_resource)
    }

    fn pick_adjacent_farther(
        &self,
        from: Tile,
        away_from: Tile,
        occupied: &BTreeSet<Tile>,
        width: u32,
        height: u32,
    ) -> Option<Tile> {
        (**self).pick_adjacent_farther(from, away_from, occupied, width, height)
    }

    fn pick_adjacent_closer(
        &self,
        from: Tile,
        toward: Tile,
        occupied: &BTreeSet<Tile>,
        width: u32,
        height: u32,
    ) -> Option<Tile> {
        (**self).pick_adjacent_closer(from, toward, occupied, width, height)
    }

    fn all_scores(&self, query: &ScoreQuery) -> ScoreTable {
        (**self).all_scores(query)
    }

    fn map_score_to_behavior(&self, score: f64, archetype: Archetype) -> Behavior {
        (**self).map_score_to_behavior(score, archetype)
    }
}

/// Tile selector named in contract violations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorKind {
    /// [`ScoringOracle::pick_adjacent_closer`].
    Closer,
    /// [`ScoringOracle::pick_adjacent_farther`].
    Farther,
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Closer => "pick_adjacent_closer",
            Self::Farther => "pick_adjacent_farther",
        })
    }
}

/// Violations detected while probing an oracle before use.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum OracleContractError {
    /// The oracle reported no finite default-method score for the archetype.
    #[error("oracle reports no `{method}` score for {archetype}")]
    MissingDefaultScore {
        /// Archetype whose score table was incomplete.
        archetype: Archetype,
        /// Method that was expected.
        method: InferenceMethod,
    },
    /// A tile selector returned an occupied, distant, or out-of-bounds tile.
    #[error("{selector} returned {tile} from {from}, which is not a free adjacent tile")]
    SelectorOutOfContract {
        /// Selector that misbehaved.
        selector: SelectorKind,
        /// Tile the probe started from.
        from: Tile,
        /// Tile the selector returned.
        tile: Tile,
    },
}

/// Probes an oracle and checks it honours the contract the engine relies on.
///
/// Every archetype must receive a finite default-method score at its base
/// stats against a player at full health under `rules`, and both tile
/// selectors must only return free, in-bounds tiles adjacent to the starting
/// tile.
pub fn validate_oracle<O: ScoringOracle + ?Sized>(
    oracle: &O,
    rules: &BattleRules,
) -> Result<(), OracleContractError> {
    for archetype in Archetype::ALL {
        let stats = archetype.stats();
        let query = ScoreQuery::new(
            archetype,
            rules.player_max_health,
            stats.health,
            stats.resource.unwrap_or(0),
        );
        if oracle
            .all_scores(&query)
            .get(InferenceMethod::DEFAULT.as_str())
            .is_none()
        {
            return Err(OracleContractError::MissingDefaultScore {
                archetype,
                method: InferenceMethod::DEFAULT,
            });
        }
    }

    let probes = [
        (ENEMY_SPAWN, PLAYER_SPAWN),
        (Tile::new(0, 0), Tile::new(1, 0)),
        (
            Tile::new(GRID_COLUMNS - 1, GRID_ROWS - 1),
            Tile::new(GRID_COLUMNS - 1, GRID_ROWS - 2),
        ),
    ];
    for (from, other) in probes {
        let occupied = BTreeSet::from([other]);
        let picks = [
            (
                SelectorKind::Closer,
                oracle.pick_adjacent_closer(from, other, &occupied, GRID_COLUMNS, GRID_ROWS),
            ),
            (
                SelectorKind::Farther,
                oracle.pick_adjacent_farther(from, other, &occupied, GRID_COLUMNS, GRID_ROWS),
            ),
        ];
        for (selector, pick) in picks {
            let Some(tile) = pick else {
                continue;
            };
            if !tile.is_in_bounds() || !tile.is_adjacent_to(from) || occupied.contains(&tile) {
                return Err(OracleContractError::SelectorOutOfContract {
                    selector,
                    from,
                    tile,
                });
            }
        }
    }

    Ok(())
}
