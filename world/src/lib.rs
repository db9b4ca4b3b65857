#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state management for Skirmish.

pub mod navigation;
mod unit;

use std::collections::BTreeSet;

use skirmish_core::{
    Archetype, BattleRules, Command, EnemyAction, Event, HoldReason, InferenceMethod, Maneuver,
    PlayerMode, Reach, Rejection, ResultSummary, Team, Tile, TurnState, Winner,
    DEFAULT_RANGED_REACH, ENEMY_SPAWN, PLAYER_SPAWN,
};

use crate::{navigation::reachable_tiles, unit::Unit};

const OPENING_MESSAGE: &str = "Choose an enemy and an inference method.";

/// Represents the authoritative Skirmish battle state.
#[derive(Debug)]
pub struct World {
    rules: BattleRules,
    player: Unit,
    enemy: Unit,
    archetype: Archetype,
    stage_index: usize,
    turn: TurnState,
    move_targets: BTreeSet<Tile>,
    message: String,
    forced_method: Option<InferenceMethod>,
    victory: bool,
    summary: Option<ResultSummary>,
}

impl World {
    /// Creates a world governed by the default battle rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(BattleRules::default())
    }

    /// Creates a world whose player follows the provided rules.
    ///
    /// The first stage's enemy is spawned immediately so the board can be
    /// rendered before a battle begins.
    #[must_use]
    pub fn with_rules(rules: BattleRules) -> Self {
        let archetype = Archetype::Zombie;
        Self {
            player: Unit::player(&rules, PLAYER_SPAWN),
            enemy: Unit::enemy(archetype, ENEMY_SPAWN),
            rules,
            archetype,
            stage_index: 0,
            turn: TurnState::Player(PlayerMode::Idle),
            move_targets: BTreeSet::new(),
            message: OPENING_MESSAGE.to_owned(),
            forced_method: None,
            victory: false,
            summary: None,
        }
    }

    fn occupant(&self, tile: Tile) -> Option<Team> {
        [&self.player, &self.enemy]
            .into_iter()
            .find(|unit| unit.alive && unit.tile == tile)
            .map(|unit| unit.team)
    }

    fn enemy_spawn_tile(&self) -> Tile {
        if self.occupant(ENEMY_SPAWN).is_none() {
            return ENEMY_SPAWN;
        }

        ENEMY_SPAWN
            .neighbors()
            .find(|tile| self.occupant(*tile).is_none())
            .unwrap_or(ENEMY_SPAWN)
    }

    fn reject(&mut self, reason: Rejection, message: Option<&str>, out_events: &mut Vec<Event>) {
        if let Some(message) = message {
            message.clone_into(&mut self.message);
        }
        tracing::debug!(?reason, "rejected player intent");
        out_events.push(Event::ActionRejected { reason });
    }

    fn begin_battle(
        &mut self,
        stage_index: usize,
        method: InferenceMethod,
        out_events: &mut Vec<Event>,
    ) {
        let Some(archetype) = Archetype::at_stage(stage_index) else {
            self.reject(
                Rejection::UnknownStage,
                Some("That enemy does not exist."),
                out_events,
            );
            return;
        };

        self.player = Unit::player(&self.rules, PLAYER_SPAWN);
        self.archetype = archetype;
        self.stage_index = stage_index;
        self.enemy = Unit::enemy(archetype, ENEMY_SPAWN);
        self.turn = TurnState::Player(PlayerMode::Idle);
        self.move_targets.clear();
        self.forced_method = Some(method);
        self.victory = false;
        self.summary = None;
        self.message = format!(
            "Battle vs {archetype} using {method} inference. Choose move, attack, or end turn."
        );
        out_events.push(Event::BattleBegan {
            stage_index,
            archetype,
            method,
        });
    }

    fn enter_mode(&mut self, mode: PlayerMode, out_events: &mut Vec<Event>) {
        if self.turn.owner() != Some(Team::Player) {
            self.reject(Rejection::OutOfTurn, None, out_events);
            return;
        }

        self.move_targets.clear();
        match mode {
            PlayerMode::Move => {
                let mut obstacles = BTreeSet::new();
                if self.enemy.alive {
                    let _ = obstacles.insert(self.enemy.tile);
                }
                self.move_targets =
                    reachable_tiles(self.player.tile, self.rules.move_range, &obstacles);
                "MOVE mode. Pick a destination tile.".clone_into(&mut self.message);
            }
            PlayerMode::Attack => {
                "ATTACK mode. Pick an adjacent enemy.".clone_into(&mut self.message);
            }
            PlayerMode::Idle => {}
        }

        self.turn = TurnState::Player(mode);
        out_events.push(Event::ModeChanged { mode });
    }

    fn confirm_action(&mut self, tile: Tile, out_events: &mut Vec<Event>) {
        match self.turn {
            TurnState::Player(PlayerMode::Idle) => self.reject(
                Rejection::NoModeSelected,
                Some("No action selected. Choose move or attack first."),
                out_events,
            ),
            TurnState::Player(PlayerMode::Move) => self.confirm_move(tile, out_events),
            TurnState::Player(PlayerMode::Attack) => self.confirm_attack(tile, out_events),
            TurnState::Enemy | TurnState::BattleOver => {
                self.reject(Rejection::OutOfTurn, None, out_events);
            }
        }
    }

    fn confirm_move(&mut self, tile: Tile, out_events: &mut Vec<Event>) {
        if !self.move_targets.contains(&tile) || self.occupant(tile).is_some() {
            self.reject(
                Rejection::InvalidMoveTarget,
                Some("Invalid MOVE destination."),
                out_events,
            );
            return;
        }

        let from = self.player.tile;
        self.player.tile = tile;
        out_events.push(Event::PlayerMoved { from, to: tile });
        self.message = format!("Player moved to {tile}.");
        self.pass_turn_to_enemy(out_events);
    }

    fn confirm_attack(&mut self, tile: Tile, out_events: &mut Vec<Event>) {
        let valid = self.enemy.alive
            && self.enemy.tile == tile
            && self.player.tile.is_adjacent_to(tile);
        if !valid {
            self.reject(
                Rejection::InvalidAttackTarget,
                Some("Invalid ATTACK target."),
                out_events,
            );
            return;
        }

        let amount = self.player.attack;
        let remaining = self.enemy.apply_damage(amount);
        out_events.push(Event::UnitDamaged {
            team: Team::Enemy,
            amount,
            remaining,
        });
        self.message = if self.enemy.alive {
            format!("Hit! {} HP left: {remaining}.", self.archetype)
        } else {
            format!("Hit! {} defeated!", self.archetype)
        };
        self.pass_turn_to_enemy(out_events);
    }

    fn end_turn(&mut self, out_events: &mut Vec<Event>) {
        if self.turn.owner() != Some(Team::Player) {
            self.reject(Rejection::OutOfTurn, None, out_events);
            return;
        }

        "Player ends the turn.".clone_into(&mut self.message);
        self.pass_turn_to_enemy(out_events);
    }

    fn pass_turn_to_enemy(&mut self, out_events: &mut Vec<Event>) {
        self.turn = TurnState::Enemy;
        self.move_targets.clear();
        out_events.push(Event::TurnPassed { to: Team::Enemy });
    }

    fn resolve_enemy_turn(&mut self, action: EnemyAction, out_events: &mut Vec<Event>) {
        if self.turn != TurnState::Enemy {
            tracing::debug!(?action, "ignoring enemy action outside the enemy turn");
            return;
        }

        match action {
            EnemyAction::Heal { destination } => self.heal_enemy(destination, out_events),
            EnemyAction::Strike { reach } => self.strike_player(reach, out_events),
            EnemyAction::Relocate {
                destination,
                maneuver,
            } => self.relocate_enemy(destination, maneuver, out_events),
            EnemyAction::Hold { reason } => self.hold_enemy(reason, out_events),
        }

        self.settle_enemy_turn(out_events);
    }

    fn can_enemy_enter(&self, tile: Tile) -> bool {
        tile.is_in_bounds() && tile != self.enemy.tile && self.occupant(tile).is_none()
    }

    fn heal_enemy(&mut self, destination: Option<Tile>, out_events: &mut Vec<Event>) {
        if let Some(destination) = destination {
            if self.can_enemy_enter(destination) && self.enemy.tile.is_adjacent_to(destination) {
                let from = self.enemy.tile;
                self.enemy.tile = destination;
                out_events.push(Event::EnemyRelocated {
                    from,
                    to: destination,
                    maneuver: Maneuver::Retreat,
                });
            }
        }

        let amount = self.rules.heal_amount(self.enemy.max_health);
        let restored = self.enemy.heal(amount);
        self.enemy.spend_resource(self.rules.heal_resource_cost);
        out_events.push(Event::EnemyHealed {
            amount: restored,
            health: self.enemy.health,
        });
        self.message = format!(
            "{} heals (+{amount}). HP now {}.",
            self.archetype, self.enemy.health
        );
    }

    fn strike_player(&mut self, reach: Reach, out_events: &mut Vec<Event>) {
        let separation = self.enemy.tile.manhattan_distance(self.player.tile);
        let in_reach = match reach {
            Reach::Melee => separation == 1,
            Reach::Ranged => separation <= self.enemy.range.unwrap_or(DEFAULT_RANGED_REACH),
        };
        if !in_reach || !self.player.alive {
            self.hold_enemy(HoldReason::OutOfReach, out_events);
            return;
        }

        let amount = self.enemy.attack;
        let remaining = self.player.apply_damage(amount);
        out_events.push(Event::UnitDamaged {
            team: Team::Player,
            amount,
            remaining,
        });
        self.message = match reach {
            Reach::Melee => format!("{} attacks! Player HP: {remaining}.", self.archetype),
            Reach::Ranged => format!(
                "{} fires from range! Player HP: {remaining}.",
                self.archetype
            ),
        };
    }

    fn relocate_enemy(
        &mut self,
        destination: Tile,
        maneuver: Maneuver,
        out_events: &mut Vec<Event>,
    ) {
        if !self.can_enemy_enter(destination) {
            self.hold_enemy(HoldReason::NoRoom { maneuver }, out_events);
            return;
        }

        let from = self.enemy.tile;
        self.enemy.tile = destination;
        out_events.push(Event::EnemyRelocated {
            from,
            to: destination,
            maneuver,
        });
        let archetype = self.archetype;
        self.message = match maneuver {
            Maneuver::Advance => format!("{archetype} moves closer to {destination}."),
            Maneuver::Retreat => format!("{archetype} retreats to {destination}."),
            Maneuver::TeleportClose => {
                format!("{archetype} teleports next to the player at {destination}.")
            }
            Maneuver::TeleportFar => format!("{archetype} teleports away to {destination}."),
        };
    }

    fn hold_enemy(&mut self, reason: HoldReason, out_events: &mut Vec<Event>) {
        out_events.push(Event::EnemyHeld { reason });
        let archetype = self.archetype;
        self.message = match reason {
            HoldReason::Waiting => format!("{archetype} waits."),
            HoldReason::NoRoom { maneuver } => match maneuver {
                Maneuver::Advance => format!("{archetype} wants to close in but is blocked."),
                Maneuver::Retreat => format!("{archetype} wants to retreat but is blocked."),
                Maneuver::TeleportClose => {
                    format!("{archetype} wants to teleport close but there is no room.")
                }
                Maneuver::TeleportFar => {
                    format!("{archetype} wants to teleport away but there is no room.")
                }
            },
            HoldReason::OutOfReach => {
                format!("{archetype} wants a ranged attack but the target is too far.")
            }
            // The status line keeps describing the blow that ended the fight.
            HoldReason::Incapacitated => return,
        };
    }

    fn settle_enemy_turn(&mut self, out_events: &mut Vec<Event>) {
        if self.player.alive && self.enemy.alive {
            self.turn = TurnState::Player(PlayerMode::Idle);
            out_events.push(Event::TurnPassed { to: Team::Player });
            return;
        }

        self.turn = TurnState::BattleOver;
        out_events.push(Event::BattleOver {
            player_alive: self.player.alive,
            enemy_alive: self.enemy.alive,
        });
    }

    fn advance_stage(&mut self, out_events: &mut Vec<Event>) {
        let next_stage = self.stage_index + 1;
        let ready = self.turn == TurnState::BattleOver
            && self.summary.is_none()
            && self.player.alive
            && !self.enemy.alive;
        let Some(archetype) = Archetype::at_stage(next_stage).filter(|_| ready) else {
            tracing::debug!(stage_index = self.stage_index, "stage advance not permitted");
            return;
        };

        self.stage_index = next_stage;
        self.archetype = archetype;
        self.player.restore();
        self.enemy = Unit::enemy(archetype, self.enemy_spawn_tile());
        self.turn = TurnState::Player(PlayerMode::Idle);
        self.move_targets.clear();
        self.message = format!(
            "Enemy defeated! Advancing to Stage {}: {archetype}. Player HP restored.",
            next_stage + 1
        );
        out_events.push(Event::StageAdvanced {
            stage_index: next_stage,
            archetype,
        });
    }

    fn conclude_battle(&mut self, summary: ResultSummary, out_events: &mut Vec<Event>) {
        if self.turn != TurnState::BattleOver || self.summary.is_some() {
            tracing::debug!("battle conclusion not permitted");
            return;
        }

        self.victory = summary.winner == Winner::Player;
        self.message = match summary.winner {
            Winner::Player => "All enemies defeated! You win.".to_owned(),
            Winner::Enemy => format!("You were defeated by the {}.", self.archetype),
            Winner::Draw => "Both fighters fell. The battle is a draw.".to_owned(),
        };
        self.summary = Some(summary.clone());
        out_events.push(Event::BattleConcluded { summary });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    tracing::debug!(?command, "applying command");
    match command {
        Command::BeginBattle {
            stage_index,
            method,
        } => world.begin_battle(stage_index, method, out_events),
        Command::EnterMoveMode => world.enter_mode(PlayerMode::Move, out_events),
        Command::EnterAttackMode => world.enter_mode(PlayerMode::Attack, out_events),
        Command::ConfirmAction { tile } => world.confirm_action(tile, out_events),
        Command::EndTurn => world.end_turn(out_events),
        Command::ResolveEnemyTurn { action } => world.resolve_enemy_turn(action, out_events),
        Command::AdvanceStage => world.advance_stage(out_events),
        Command::ConcludeBattle { summary } => world.conclude_battle(summary, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use skirmish_core::{BattleView, ResultSummary, TurnState};

    use super::World;

    /// Captures a read-only snapshot of the battle.
    #[must_use]
    pub fn battle_view(world: &World) -> BattleView {
        BattleView {
            player: world.player.snapshot(),
            enemy: world.enemy.snapshot(),
            archetype: world.archetype,
            turn: world.turn,
            move_targets: world.move_targets.iter().copied().collect(),
            message: world.message.clone(),
            stage_index: world.stage_index,
            forced_method: world.forced_method,
            victory: world.victory,
        }
    }

    /// Position within the turn state machine.
    #[must_use]
    pub fn turn(world: &World) -> TurnState {
        world.turn
    }

    /// Summary recorded once the battle concluded.
    #[must_use]
    pub fn summary(world: &World) -> Option<&ResultSummary> {
        world.summary.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn begun(stage_index: usize) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::BeginBattle {
                stage_index,
                method: InferenceMethod::Sugeno,
            },
            &mut events,
        );
        world
    }

    #[test]
    fn begin_battle_spawns_requested_stage() {
        let world = begun(2);
        let view = query::battle_view(&world);
        assert_eq!(view.archetype, Archetype::Enderman);
        assert_eq!(view.enemy.tile, ENEMY_SPAWN);
        assert_eq!(view.enemy.resource, Some(80));
        assert_eq!(view.player.tile, PLAYER_SPAWN);
        assert_eq!(view.forced_method, Some(InferenceMethod::Sugeno));
        assert_eq!(view.turn, TurnState::Player(PlayerMode::Idle));
    }

    #[test]
    fn begin_battle_rejects_unknown_stage() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::BeginBattle {
                stage_index: 4,
                method: InferenceMethod::Mamdani,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::ActionRejected {
                reason: Rejection::UnknownStage
            }]
        );
        assert_eq!(query::battle_view(&world).forced_method, None);
    }

    #[test]
    fn move_mode_caches_neighbors_of_the_player() {
        let mut world = begun(0);
        let mut events = Vec::new();
        apply(&mut world, Command::EnterMoveMode, &mut events);

        let view = query::battle_view(&world);
        assert_eq!(
            view.move_targets,
            vec![
                Tile::new(0, 3),
                Tile::new(1, 2),
                Tile::new(1, 3),
                Tile::new(1, 4),
                Tile::new(2, 3),
            ]
        );
        assert_eq!(events, vec![Event::ModeChanged { mode: PlayerMode::Move }]);
    }

    #[test]
    fn switching_to_attack_clears_move_cache() {
        let mut world = begun(0);
        let mut events = Vec::new();
        apply(&mut world, Command::EnterMoveMode, &mut events);
        apply(&mut world, Command::EnterAttackMode, &mut events);

        let view = query::battle_view(&world);
        assert!(view.move_targets.is_empty());
        assert_eq!(view.turn, TurnState::Player(PlayerMode::Attack));
    }

    #[test]
    fn confirming_the_current_tile_is_rejected_as_occupied() {
        let mut world = begun(0);
        let mut events = Vec::new();
        apply(&mut world, Command::EnterMoveMode, &mut events);
        events.clear();
        apply(
            &mut world,
            Command::ConfirmAction { tile: PLAYER_SPAWN },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::ActionRejected {
                reason: Rejection::InvalidMoveTarget
            }]
        );
        assert_eq!(query::turn(&world), TurnState::Player(PlayerMode::Move));
    }

    #[test]
    fn valid_move_passes_the_turn() {
        let mut world = begun(0);
        let mut events = Vec::new();
        apply(&mut world, Command::EnterMoveMode, &mut events);
        events.clear();
        apply(
            &mut world,
            Command::ConfirmAction {
                tile: Tile::new(2, 3),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::PlayerMoved {
                    from: PLAYER_SPAWN,
                    to: Tile::new(2, 3),
                },
                Event::TurnPassed { to: Team::Enemy },
            ]
        );
        let view = query::battle_view(&world);
        assert_eq!(view.turn, TurnState::Enemy);
        assert!(view.move_targets.is_empty());
    }

    #[test]
    fn enemy_actions_outside_enemy_turn_are_ignored() {
        let mut world = begun(0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ResolveEnemyTurn {
                action: EnemyAction::Hold {
                    reason: HoldReason::Waiting,
                },
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::turn(&world), TurnState::Player(PlayerMode::Idle));
    }

    #[test]
    fn out_of_reach_melee_degrades_to_hold() {
        let mut world = begun(0);
        let mut events = Vec::new();
        apply(&mut world, Command::EndTurn, &mut events);
        events.clear();
        apply(
            &mut world,
            Command::ResolveEnemyTurn {
                action: EnemyAction::Strike { reach: Reach::Melee },
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::EnemyHeld {
                    reason: HoldReason::OutOfReach
                },
                Event::TurnPassed { to: Team::Player },
            ]
        );
        assert_eq!(query::battle_view(&world).player.health, 20);
    }

    #[test]
    fn heal_restores_a_quarter_and_spends_resource() {
        let mut world = begun(3);
        world.enemy.health = 10;
        let mut events = Vec::new();
        apply(&mut world, Command::EndTurn, &mut events);
        apply(
            &mut world,
            Command::ResolveEnemyTurn {
                action: EnemyAction::Heal {
                    destination: Some(Tile::new(7, 3)),
                },
            },
            &mut events,
        );

        let view = query::battle_view(&world);
        assert_eq!(view.enemy.health, 19);
        assert_eq!(view.enemy.resource, Some(80));
        assert_eq!(view.enemy.tile, Tile::new(7, 3));
        assert_eq!(view.message, "Boss heals (+9). HP now 19.");
    }

    #[test]
    fn stage_advance_spawns_beside_a_player_on_the_spawn_tile() {
        let mut world = begun(0);
        world.player.tile = ENEMY_SPAWN;
        world.enemy.tile = Tile::new(7, 3);
        let _ = world.enemy.apply_damage(20);
        world.turn = TurnState::BattleOver;

        let mut events = Vec::new();
        apply(&mut world, Command::AdvanceStage, &mut events);

        let view = query::battle_view(&world);
        assert_eq!(view.archetype, Archetype::Skeleton);
        assert_eq!(view.enemy.tile, Tile::new(7, 3));
        assert_eq!(
            events,
            vec![Event::StageAdvanced {
                stage_index: 1,
                archetype: Archetype::Skeleton,
            }]
        );
    }
}
