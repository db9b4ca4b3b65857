#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative battle world, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, read an immutable
//! [`BattleView`], consult the injected [`ScoringOracle`], and respond
//! exclusively with new command batches.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod oracle;
mod rules;

pub use oracle::{
    validate_oracle, HealVerdict, OracleContractError, ScoreQuery, ScoreTable, ScoringOracle,
    SelectorKind,
};
pub use rules::{BattleRules, RulesError};

/// Number of tile columns on the battle grid.
pub const GRID_COLUMNS: u32 = 8;

/// Number of tile rows on the battle grid.
pub const GRID_ROWS: u32 = 6;

/// Ranged reach assumed for a unit that carries no explicit range.
pub const DEFAULT_RANGED_REACH: u32 = 2;

/// Tile the player occupies when a battle begins.
pub const PLAYER_SPAWN: Tile = Tile::new(1, GRID_ROWS / 2);

/// Tile every freshly spawned enemy occupies.
pub const ENEMY_SPAWN: Tile = Tile::new(GRID_COLUMNS - 2, GRID_ROWS / 2);

/// Ordered enemy stages fought within a session.
pub const STAGE_SEQUENCE: [Archetype; 4] = [
    Archetype::Zombie,
    Archetype::Skeleton,
    Archetype::Enderman,
    Archetype::Boss,
];

/// Neighbor offsets in scan order: east, west, south, north.
const NEIGHBOR_OFFSETS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Reports whether signed grid coordinates fall inside the battle grid.
#[must_use]
pub fn in_bounds(column: i64, row: i64) -> bool {
    (0..i64::from(GRID_COLUMNS)).contains(&column) && (0..i64::from(GRID_ROWS)).contains(&row)
}

/// Location of a single grid tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    column: u32,
    row: u32,
}

impl Tile {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two tiles.
    #[must_use]
    pub fn manhattan_distance(self, other: Tile) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Reports whether the two tiles share an edge.
    #[must_use]
    pub fn is_adjacent_to(self, other: Tile) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Reports whether the tile lies inside the battle grid.
    #[must_use]
    pub fn is_in_bounds(self) -> bool {
        self.column < GRID_COLUMNS && self.row < GRID_ROWS
    }

    /// Returns the tile displaced by the provided offset when it stays on the grid.
    #[must_use]
    pub fn offset(self, column_delta: i64, row_delta: i64) -> Option<Tile> {
        let column = i64::from(self.column) + column_delta;
        let row = i64::from(self.row) + row_delta;
        if !in_bounds(column, row) {
            return None;
        }

        Some(Tile::new(
            u32::try_from(column).ok()?,
            u32::try_from(row).ok()?,
        ))
    }

    /// Orthogonal in-bounds neighbors in east, west, south, north order.
    pub fn neighbors(self) -> impl Iterator<Item = Tile> {
        NEIGHBOR_OFFSETS
            .into_iter()
            .filter_map(move |(column_delta, row_delta)| self.offset(column_delta, row_delta))
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Side a combatant fights for. Also names the owner of the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// The human-controlled unit.
    Player,
    /// The oracle-driven opponent.
    Enemy,
}

/// Interaction mode the player selected during their turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlayerMode {
    /// No action has been chosen yet.
    #[default]
    Idle,
    /// The player is choosing a destination tile.
    Move,
    /// The player is choosing an adjacent enemy to strike.
    Attack,
}

/// Position of the battle within the turn state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnState {
    /// The player may act using the provided interaction mode.
    Player(PlayerMode),
    /// The enemy is resolving its turn.
    Enemy,
    /// At least one combatant fell; the stage awaits advance or conclusion.
    BattleOver,
}

impl TurnState {
    /// Team that owns the turn, if the battle is still running.
    #[must_use]
    pub const fn owner(&self) -> Option<Team> {
        match self {
            Self::Player(_) => Some(Team::Player),
            Self::Enemy => Some(Team::Enemy),
            Self::BattleOver => None,
        }
    }

    /// Interaction mode while the player owns the turn.
    #[must_use]
    pub const fn player_mode(&self) -> Option<PlayerMode> {
        match self {
            Self::Player(mode) => Some(*mode),
            _ => None,
        }
    }
}

/// Fixed base statistics attached to an enemy archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArchetypeStats {
    /// Starting and maximum health.
    pub health: u32,
    /// Damage dealt by melee and ranged strikes.
    pub attack: u32,
    /// Resource pool available for healing, if the archetype has one.
    pub resource: Option<u32>,
    /// Ranged reach measured in Manhattan distance.
    pub range: u32,
}

/// The four enemy kinds fought in sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    /// Slow brawler with no resource pool.
    Zombie,
    /// Fragile archer with long reach.
    Skeleton,
    /// Teleporting melee fighter with a healing pool.
    Enderman,
    /// Final stage with the largest health and resource pool.
    Boss,
}

impl Archetype {
    /// Every archetype in stage order.
    pub const ALL: [Archetype; 4] = STAGE_SEQUENCE;

    /// Looks up the fixed statistics for the archetype.
    #[must_use]
    pub const fn stats(self) -> ArchetypeStats {
        match self {
            Self::Zombie => ArchetypeStats {
                health: 20,
                attack: 1,
                resource: None,
                range: 1,
            },
            Self::Skeleton => ArchetypeStats {
                health: 18,
                attack: 1,
                resource: None,
                range: 3,
            },
            Self::Enderman => ArchetypeStats {
                health: 22,
                attack: 2,
                resource: Some(80),
                range: 1,
            },
            Self::Boss => ArchetypeStats {
                health: 35,
                attack: 3,
                resource: Some(100),
                range: 2,
            },
        }
    }

    /// Display name used in status messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Zombie => "Zombie",
            Self::Skeleton => "Skeleton",
            Self::Enderman => "Enderman",
            Self::Boss => "Boss",
        }
    }

    /// Archetype fought at the provided stage index.
    #[must_use]
    pub fn at_stage(stage_index: usize) -> Option<Archetype> {
        STAGE_SEQUENCE.get(stage_index).copied()
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Error returned when an archetype name cannot be recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown enemy archetype `{0}`")]
pub struct ParseArchetypeError(pub String);

impl FromStr for Archetype {
    type Err = ParseArchetypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Archetype::ALL
            .into_iter()
            .find(|archetype| archetype.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseArchetypeError(trimmed.to_owned()))
    }
}

/// Named scoring strategy supported by the oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceMethod {
    /// Mamdani min-max inference.
    Mamdani,
    /// Sugeno weighted-average inference.
    Sugeno,
    /// Tsukamoto monotonic inference.
    Tsukamoto,
}

impl InferenceMethod {
    /// Method used whenever the requested one is unavailable.
    pub const DEFAULT: InferenceMethod = InferenceMethod::Mamdani;

    /// Every supported method in menu order.
    pub const ALL: [InferenceMethod; 3] = [Self::Mamdani, Self::Sugeno, Self::Tsukamoto];

    /// Key under which the oracle reports this method's score.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mamdani => "mamdani",
            Self::Sugeno => "sugeno",
            Self::Tsukamoto => "tsukamoto",
        }
    }
}

impl fmt::Display for InferenceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when an inference method name cannot be recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown inference method `{0}`")]
pub struct ParseMethodError(pub String);

impl FromStr for InferenceMethod {
    type Err = ParseMethodError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        InferenceMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseMethodError(trimmed.to_owned()))
    }
}

/// Discrete tactic produced by mapping an inference score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Behavior {
    /// Strike from range, approaching when out of reach.
    RangedAttack,
    /// Appear on a free tile next to the player.
    TeleportClose,
    /// Jump to the adjacent tile farthest from the player.
    TeleportFar,
    /// Step one tile toward the player.
    MoveClose,
    /// Step one tile away from the player.
    MoveRetreat,
    /// Any other tag: the enemy passes the turn.
    Wait,
}

impl Behavior {
    /// Parses an upper-snake behavior tag. Unknown tags map to [`Behavior::Wait`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Behavior {
        match tag.trim() {
            "RANGED_ATTACK" => Self::RangedAttack,
            "TELEPORT_CLOSE" => Self::TeleportClose,
            "TELEPORT_FAR" => Self::TeleportFar,
            "MOVE_CLOSE" => Self::MoveClose,
            "MOVE_RETREAT" => Self::MoveRetreat,
            _ => Self::Wait,
        }
    }

    /// Upper-snake tag naming the behavior.
    #[must_use]
    pub const fn as_tag(self) -> &'static str {
        match self {
            Self::RangedAttack => "RANGED_ATTACK",
            Self::TeleportClose => "TELEPORT_CLOSE",
            Self::TeleportFar => "TELEPORT_FAR",
            Self::MoveClose => "MOVE_CLOSE",
            Self::MoveRetreat => "MOVE_RETREAT",
            Self::Wait => "WAIT",
        }
    }
}

/// Distance class of an enemy strike.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reach {
    /// Strike against an adjacent player.
    Melee,
    /// Strike from within the enemy's configured range.
    Ranged,
}

/// Relocation flavour chosen by the decision engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Maneuver {
    /// One step toward the player.
    Advance,
    /// One step away from the player.
    Retreat,
    /// Jump next to the player.
    TeleportClose,
    /// Jump to the adjacent tile farthest from the player.
    TeleportFar,
}

/// Reason an enemy spent its turn without acting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HoldReason {
    /// The mapped behavior asked the enemy to wait.
    Waiting,
    /// A relocation found no free tile.
    NoRoom {
        /// Relocation that could not be performed.
        maneuver: Maneuver,
    },
    /// A ranged attack was out of reach and no approach tile was free.
    OutOfReach,
    /// One of the combatants has already fallen.
    Incapacitated,
}

/// Concrete outcome of the enemy decision engine for a single turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyAction {
    /// Restore health, optionally relocating first.
    Heal {
        /// Tile to retreat to before healing, if one was selected.
        destination: Option<Tile>,
    },
    /// Damage the player.
    Strike {
        /// Whether the strike is melee or ranged.
        reach: Reach,
    },
    /// Move the enemy to another tile.
    Relocate {
        /// Tile the enemy moves to.
        destination: Tile,
        /// Flavour of the relocation, used for reporting.
        maneuver: Maneuver,
    },
    /// Spend the turn without mutating units.
    Hold {
        /// Why the enemy did not act.
        reason: HoldReason,
    },
}

/// Reasons a player intent may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// A confirmation arrived while no mode was selected.
    NoModeSelected,
    /// The chosen tile is not a legal move destination.
    InvalidMoveTarget,
    /// The chosen tile does not hold an adjacent live enemy.
    InvalidAttackTarget,
    /// The intent arrived outside the player's turn.
    OutOfTurn,
    /// The requested starting stage does not exist.
    UnknownStage,
}

/// Outcome of a finished battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Winner {
    /// The player outlived the enemy.
    Player,
    /// The enemy outlived the player.
    Enemy,
    /// Both combatants fell in the same resolution.
    Draw,
}

impl Winner {
    /// Decides the winner from both liveness flags; `None` while both stand.
    #[must_use]
    pub const fn decide(player_alive: bool, enemy_alive: bool) -> Option<Winner> {
        match (player_alive, enemy_alive) {
            (true, true) => None,
            (true, false) => Some(Self::Player),
            (false, true) => Some(Self::Enemy),
            (false, false) => Some(Self::Draw),
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Player => "PLAYER",
            Self::Enemy => "ENEMY",
            Self::Draw => "DRAW",
        })
    }
}

/// Summary recorded once a battle ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    /// Archetype fought in the final stage.
    pub enemy: Archetype,
    /// Inference method whose score was recorded.
    pub method: InferenceMethod,
    /// Score reported by the oracle at battle end.
    pub score: f64,
    /// Player health when the battle ended.
    pub player_health: u32,
    /// Enemy health when the battle ended.
    pub enemy_health: u32,
    /// Side that won the battle.
    pub winner: Winner,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resets the player and spawns the enemy for the provided starting stage.
    BeginBattle {
        /// Index into [`STAGE_SEQUENCE`] of the first stage to fight.
        stage_index: usize,
        /// Inference method held fixed for the whole session.
        method: InferenceMethod,
    },
    /// Switches the player into move mode and caches legal destinations.
    EnterMoveMode,
    /// Switches the player into attack mode.
    EnterAttackMode,
    /// Confirms the pending move or attack against the provided tile.
    ConfirmAction {
        /// Tile chosen by the player.
        tile: Tile,
    },
    /// Ends the player's turn without requiring an action.
    EndTurn,
    /// Applies the decision engine's outcome for the current enemy turn.
    ResolveEnemyTurn {
        /// Action selected for the enemy.
        action: EnemyAction,
    },
    /// Spawns the next archetype and restores the player.
    AdvanceStage,
    /// Finalises the battle with the provided summary.
    ConcludeBattle {
        /// Summary describing the battle outcome.
        summary: ResultSummary,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A battle began against the provided stage.
    BattleBegan {
        /// Stage index of the spawned enemy.
        stage_index: usize,
        /// Archetype of the spawned enemy.
        archetype: Archetype,
        /// Inference method forced for the session.
        method: InferenceMethod,
    },
    /// The player's interaction mode changed.
    ModeChanged {
        /// Newly active mode.
        mode: PlayerMode,
    },
    /// The player moved between two tiles.
    PlayerMoved {
        /// Tile the player left.
        from: Tile,
        /// Tile the player entered.
        to: Tile,
    },
    /// A unit took damage.
    UnitDamaged {
        /// Team of the damaged unit.
        team: Team,
        /// Damage applied before clamping.
        amount: u32,
        /// Health left after clamping.
        remaining: u32,
    },
    /// The enemy restored health.
    EnemyHealed {
        /// Health restored after capping at the maximum.
        amount: u32,
        /// Health after healing.
        health: u32,
    },
    /// The enemy changed tiles.
    EnemyRelocated {
        /// Tile the enemy left.
        from: Tile,
        /// Tile the enemy entered.
        to: Tile,
        /// Relocation flavour.
        maneuver: Maneuver,
    },
    /// The enemy spent its turn without acting.
    EnemyHeld {
        /// Why the enemy did not act.
        reason: HoldReason,
    },
    /// A player intent was rejected without consuming the turn.
    ActionRejected {
        /// Specific reason for the rejection.
        reason: Rejection,
    },
    /// Ownership of the turn passed to the provided team.
    TurnPassed {
        /// Team that now owns the turn.
        to: Team,
    },
    /// At least one combatant fell during the last resolution.
    BattleOver {
        /// Whether the player is still standing.
        player_alive: bool,
        /// Whether the enemy is still standing.
        enemy_alive: bool,
    },
    /// The next stage's enemy spawned and the player was restored.
    StageAdvanced {
        /// Index of the new stage.
        stage_index: usize,
        /// Archetype of the new enemy.
        archetype: Archetype,
    },
    /// The battle finished; the summary is final.
    BattleConcluded {
        /// Summary describing the battle outcome.
        summary: ResultSummary,
    },
}

/// Immutable representation of a single unit used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitSnapshot {
    /// Side the unit fights for.
    pub team: Team,
    /// Tile the unit occupies.
    pub tile: Tile,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Damage dealt per strike.
    pub attack: u32,
    /// Whether the unit is still standing.
    pub alive: bool,
    /// Remaining resource pool, if the unit has one.
    pub resource: Option<u32>,
    /// Ranged reach, if the unit has one.
    pub range: Option<u32>,
}

/// Read-only snapshot of the battle state handed to systems and adapters.
#[derive(Clone, Debug, PartialEq)]
pub struct BattleView {
    /// The player unit.
    pub player: UnitSnapshot,
    /// The enemy unit of the current stage.
    pub enemy: UnitSnapshot,
    /// Archetype of the current enemy.
    pub archetype: Archetype,
    /// Position within the turn state machine.
    pub turn: TurnState,
    /// Cached legal move destinations, sorted; empty outside move mode.
    pub move_targets: Vec<Tile>,
    /// Free-text status line.
    pub message: String,
    /// Index of the current stage within [`STAGE_SEQUENCE`].
    pub stage_index: usize,
    /// Inference method forced for the session, if one was chosen.
    pub forced_method: Option<InferenceMethod>,
    /// Set once the final stage was cleared.
    pub victory: bool,
}

impl BattleView {
    /// Tiles held by live units other than the enemy.
    #[must_use]
    pub fn occupied_excluding_enemy(&self) -> BTreeSet<Tile> {
        let mut occupied = BTreeSet::new();
        if self.player.alive {
            let _ = occupied.insert(self.player.tile);
        }
        occupied
    }

    /// Manhattan distance separating the two combatants.
    #[must_use]
    pub fn separation(&self) -> u32 {
        self.player.tile.manhattan_distance(self.enemy.tile)
    }

    /// Reports whether another stage follows the current one.
    #[must_use]
    pub fn has_next_stage(&self) -> bool {
        self.stage_index + 1 < STAGE_SEQUENCE.len()
    }

    /// Inference method the session requested, or the default when none was chosen.
    #[must_use]
    pub fn requested_method(&self) -> InferenceMethod {
        self.forced_method.unwrap_or(InferenceMethod::DEFAULT)
    }
}
