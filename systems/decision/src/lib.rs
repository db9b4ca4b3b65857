#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that chooses the enemy's action once per enemy turn.
//!
//! The rules are evaluated in a fixed order and the first applicable rule
//! wins: a heal check, a melee strike against an adjacent player, and finally
//! the behavior mapped from the oracle's inference score.

use std::collections::BTreeSet;

use skirmish_core::{
    BattleView, Behavior, Command, EnemyAction, Event, HoldReason, Maneuver, Reach, ScoreQuery,
    ScoringOracle, Team, Tile, TurnState, DEFAULT_RANGED_REACH, GRID_COLUMNS, GRID_ROWS,
};

/// Enemy decision system that resolves each enemy turn into a single command.
#[derive(Debug, Default)]
pub struct EnemyDecision;

impl EnemyDecision {
    /// Creates a new decision system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits exactly one `Command::ResolveEnemyTurn` when the turn passes to the enemy.
    pub fn handle<O>(
        &mut self,
        events: &[Event],
        view: &BattleView,
        oracle: &O,
        out: &mut Vec<Command>,
    ) where
        O: ScoringOracle + ?Sized,
    {
        let enemy_turn_started = events
            .iter()
            .any(|event| matches!(event, Event::TurnPassed { to: Team::Enemy }));
        if !enemy_turn_started || view.turn != TurnState::Enemy {
            return;
        }

        let action = decide(view, oracle);
        out.push(Command::ResolveEnemyTurn { action });
    }
}

/// Chooses the enemy's action for the provided battle snapshot.
#[must_use]
pub fn decide<O>(view: &BattleView, oracle: &O) -> EnemyAction
where
    O: ScoringOracle + ?Sized,
{
    let enemy = &view.enemy;
    let player = &view.player;
    if !enemy.alive || !player.alive {
        return EnemyAction::Hold {
            reason: HoldReason::Incapacitated,
        };
    }

    let occupied = view.occupied_excluding_enemy();

    let verdict =
        oracle.heal_priority_check(view.archetype, enemy.health, enemy.resource.unwrap_or(0));
    if verdict.should_heal {
        tracing::debug!(descriptor = %verdict.descriptor, "enemy heals");
        let destination = oracle.pick_adjacent_farther(
            enemy.tile,
            player.tile,
            &occupied,
            GRID_COLUMNS,
            GRID_ROWS,
        );
        return EnemyAction::Heal { destination };
    }

    if view.separation() == 1 {
        tracing::debug!("enemy strikes an adjacent player");
        return EnemyAction::Strike {
            reach: Reach::Melee,
        };
    }

    let behavior = scored_behavior(view, oracle);
    tracing::debug!(behavior = behavior.as_tag(), "enemy behavior resolved");

    let closer = || {
        oracle.pick_adjacent_closer(enemy.tile, player.tile, &occupied, GRID_COLUMNS, GRID_ROWS)
    };
    let farther = || {
        oracle.pick_adjacent_farther(enemy.tile, player.tile, &occupied, GRID_COLUMNS, GRID_ROWS)
    };

    match behavior {
        Behavior::RangedAttack => {
            let reach = enemy.range.unwrap_or(DEFAULT_RANGED_REACH);
            if view.separation() <= reach {
                EnemyAction::Strike {
                    reach: Reach::Ranged,
                }
            } else {
                closer().map_or(
                    EnemyAction::Hold {
                        reason: HoldReason::OutOfReach,
                    },
                    |destination| relocate(destination, Maneuver::Advance),
                )
            }
        }
        Behavior::TeleportClose => teleport_close(player.tile, enemy.tile, &occupied),
        Behavior::TeleportFar => farther()
            .map_or(hold_without_room(Maneuver::TeleportFar), |destination| {
                relocate(destination, Maneuver::TeleportFar)
            }),
        Behavior::MoveClose => closer()
            .map_or(hold_without_room(Maneuver::Advance), |destination| {
                relocate(destination, Maneuver::Advance)
            }),
        Behavior::MoveRetreat => farther()
            .map_or(hold_without_room(Maneuver::Retreat), |destination| {
                relocate(destination, Maneuver::Retreat)
            }),
        Behavior::Wait => EnemyAction::Hold {
            reason: HoldReason::Waiting,
        },
    }
}

fn scored_behavior<O>(view: &BattleView, oracle: &O) -> Behavior
where
    O: ScoringOracle + ?Sized,
{
    let query = ScoreQuery::new(
        view.archetype,
        view.player.health,
        view.enemy.health,
        view.enemy.resource.unwrap_or(0),
    );
    let requested = view.requested_method();
    let Some((method, score)) = oracle.all_scores(&query).resolve(requested) else {
        tracing::warn!(
            method = %requested,
            "oracle returned no usable score; enemy waits"
        );
        return Behavior::Wait;
    };

    if method != requested {
        tracing::warn!(
            requested = %requested,
            fallback = %method,
            "falling back to default method"
        );
    }
    oracle.map_score_to_behavior(score, view.archetype)
}

fn teleport_close(target: Tile, acting: Tile, occupied: &BTreeSet<Tile>) -> EnemyAction {
    first_free_neighbor(target, acting, occupied)
        .map_or(hold_without_room(Maneuver::TeleportClose), |destination| {
            relocate(destination, Maneuver::TeleportClose)
        })
}

/// First tile beside `target` in scan order that no other live unit holds.
fn first_free_neighbor(
    target: Tile,
    acting: Tile,
    occupied: &BTreeSet<Tile>,
) -> Option<Tile> {
    target
        .neighbors()
        .find(|tile| *tile != acting && !occupied.contains(tile))
}

fn relocate(destination: Tile, maneuver: Maneuver) -> EnemyAction {
    EnemyAction::Relocate {
        destination,
        maneuver,
    }
}

fn hold_without_room(maneuver: Maneuver) -> EnemyAction {
    EnemyAction::Hold {
        reason: HoldReason::NoRoom { maneuver },
    }
}
