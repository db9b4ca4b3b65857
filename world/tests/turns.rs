use skirmish_core::{
    Command, EnemyAction, Event, HoldReason, InferenceMethod, Maneuver, PlayerMode, Reach,
    Rejection, ResultSummary, Team, Tile, TurnState, Winner, ENEMY_SPAWN,
};
use skirmish_world::{self as world, query, World};

fn begin(stage_index: usize) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::BeginBattle {
            stage_index,
            method: InferenceMethod::Mamdani,
        },
        &mut events,
    );
    world
}

fn apply_all(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn confirm_without_mode_only_touches_the_message() {
    let mut world = begin(0);
    let before = query::battle_view(&world);

    let events = apply_all(
        &mut world,
        vec![
            Command::ConfirmAction {
                tile: Tile::new(2, 3),
            },
            Command::ConfirmAction {
                tile: Tile::new(2, 3),
            },
        ],
    );

    let after = query::battle_view(&world);
    assert_eq!(
        events,
        vec![
            Event::ActionRejected {
                reason: Rejection::NoModeSelected
            };
            2
        ]
    );
    assert_eq!(after.player, before.player);
    assert_eq!(after.enemy, before.enemy);
    assert_eq!(after.turn, before.turn);
    assert_ne!(after.message, before.message);
}

#[test]
fn player_intents_are_inert_during_enemy_turn() {
    let mut world = begin(0);
    let _ = apply_all(&mut world, vec![Command::EndTurn]);
    assert_eq!(query::turn(&world), TurnState::Enemy);

    let events = apply_all(
        &mut world,
        vec![
            Command::EnterMoveMode,
            Command::EnterAttackMode,
            Command::EndTurn,
        ],
    );
    assert!(events.iter().all(|event| matches!(
        event,
        Event::ActionRejected {
            reason: Rejection::OutOfTurn
        }
    )));
    assert_eq!(query::turn(&world), TurnState::Enemy);
}

#[test]
fn attack_on_distant_enemy_keeps_attack_mode() {
    let mut world = begin(0);
    let events = apply_all(
        &mut world,
        vec![
            Command::EnterAttackMode,
            Command::ConfirmAction { tile: ENEMY_SPAWN },
        ],
    );

    assert_eq!(
        events.last(),
        Some(&Event::ActionRejected {
            reason: Rejection::InvalidAttackTarget
        })
    );
    let view = query::battle_view(&world);
    assert_eq!(view.turn, TurnState::Player(PlayerMode::Attack));
    assert_eq!(view.enemy.health, 20);
}

#[test]
fn enemy_relocation_returns_the_turn_to_the_player() {
    let mut world = begin(0);
    let events = apply_all(
        &mut world,
        vec![
            Command::EndTurn,
            Command::ResolveEnemyTurn {
                action: EnemyAction::Relocate {
                    destination: Tile::new(5, 3),
                    maneuver: Maneuver::Advance,
                },
            },
        ],
    );

    assert_eq!(
        events,
        vec![
            Event::TurnPassed { to: Team::Enemy },
            Event::EnemyRelocated {
                from: ENEMY_SPAWN,
                to: Tile::new(5, 3),
                maneuver: Maneuver::Advance,
            },
            Event::TurnPassed { to: Team::Player },
        ]
    );
    let view = query::battle_view(&world);
    assert_eq!(view.enemy.tile, Tile::new(5, 3));
    assert_eq!(view.message, "Zombie moves closer to (5, 3).");
    assert_eq!(view.turn, TurnState::Player(PlayerMode::Idle));
}

#[test]
fn relocation_onto_the_player_is_refused() {
    let mut world = begin(2);
    let player_tile = query::battle_view(&world).player.tile;
    let events = apply_all(
        &mut world,
        vec![
            Command::EndTurn,
            Command::ResolveEnemyTurn {
                action: EnemyAction::Relocate {
                    destination: player_tile,
                    maneuver: Maneuver::TeleportClose,
                },
            },
        ],
    );

    assert!(events.contains(&Event::EnemyHeld {
        reason: HoldReason::NoRoom {
            maneuver: Maneuver::TeleportClose
        }
    }));
    assert_eq!(query::battle_view(&world).enemy.tile, ENEMY_SPAWN);
}

#[test]
fn lethal_strike_ends_the_stage_and_accepts_a_conclusion() {
    let mut world = begin(3);
    let _ = apply_all(
        &mut world,
        vec![
            Command::EndTurn,
            Command::ResolveEnemyTurn {
                action: EnemyAction::Relocate {
                    destination: Tile::new(3, 3),
                    maneuver: Maneuver::TeleportClose,
                },
            },
        ],
    );
    assert_eq!(query::battle_view(&world).enemy.tile, Tile::new(3, 3));

    // The boss now strikes from range two until the player falls.
    let mut strikes = Vec::new();
    for _ in 0..7 {
        strikes.push(Command::EndTurn);
        strikes.push(Command::ResolveEnemyTurn {
            action: EnemyAction::Strike {
                reach: Reach::Ranged,
            },
        });
    }
    let events = apply_all(&mut world, strikes);
    assert_eq!(
        events.last(),
        Some(&Event::BattleOver {
            player_alive: false,
            enemy_alive: true,
        })
    );
    assert_eq!(query::turn(&world), TurnState::BattleOver);

    let summary = ResultSummary {
        enemy: query::battle_view(&world).archetype,
        method: InferenceMethod::Mamdani,
        score: 12.5,
        player_health: 0,
        enemy_health: 35,
        winner: Winner::Enemy,
    };
    let events = apply_all(
        &mut world,
        vec![
            Command::AdvanceStage,
            Command::ConcludeBattle {
                summary: summary.clone(),
            },
        ],
    );
    assert_eq!(events, vec![Event::BattleConcluded { summary: summary.clone() }]);
    assert_eq!(query::summary(&world), Some(&summary));
    assert!(!query::battle_view(&world).victory);
}

#[test]
fn enemy_holds_explain_themselves_and_return_the_turn() {
    let cases = [
        (
            HoldReason::NoRoom {
                maneuver: Maneuver::Advance,
            },
            "Zombie wants to close in but is blocked.",
        ),
        (
            HoldReason::NoRoom {
                maneuver: Maneuver::Retreat,
            },
            "Zombie wants to retreat but is blocked.",
        ),
        (
            HoldReason::NoRoom {
                maneuver: Maneuver::TeleportClose,
            },
            "Zombie wants to teleport close but there is no room.",
        ),
        (
            HoldReason::NoRoom {
                maneuver: Maneuver::TeleportFar,
            },
            "Zombie wants to teleport away but there is no room.",
        ),
        (
            HoldReason::OutOfReach,
            "Zombie wants a ranged attack but the target is too far.",
        ),
        (HoldReason::Waiting, "Zombie waits."),
    ];

    for (reason, message) in cases {
        let mut world = begin(0);
        let events = apply_all(
            &mut world,
            vec![
                Command::EndTurn,
                Command::ResolveEnemyTurn {
                    action: EnemyAction::Hold { reason },
                },
            ],
        );

        assert_eq!(
            events,
            vec![
                Event::TurnPassed { to: Team::Enemy },
                Event::EnemyHeld { reason },
                Event::TurnPassed { to: Team::Player },
            ]
        );
        let view = query::battle_view(&world);
        assert_eq!(view.message, message);
        assert_eq!(view.turn, TurnState::Player(PlayerMode::Idle));
        assert_eq!(view.enemy.tile, ENEMY_SPAWN);
    }
}

#[test]
fn ranged_strike_out_of_reach_is_held() {
    let mut world = begin(0);
    let events = apply_all(
        &mut world,
        vec![
            Command::EndTurn,
            Command::ResolveEnemyTurn {
                action: EnemyAction::Strike {
                    reach: Reach::Ranged,
                },
            },
        ],
    );

    assert!(events.contains(&Event::EnemyHeld {
        reason: HoldReason::OutOfReach
    }));
    let view = query::battle_view(&world);
    assert_eq!(view.player.health, view.player.max_health);
    assert_eq!(
        view.message,
        "Zombie wants a ranged attack but the target is too far."
    );
    assert_eq!(view.turn, TurnState::Player(PlayerMode::Idle));
}
