//! Plain-text rendering of session state.

use std::fmt::Write as _;

use skirmish_core::{
    BattleView, InferenceMethod, PlayerMode, ResultSummary, Tile, TurnState, UnitSnapshot,
    GRID_COLUMNS, GRID_ROWS, STAGE_SEQUENCE,
};

pub(crate) fn main_menu() -> String {
    let mut text = String::from("Choose an enemy (select <n>):\n");
    for (index, archetype) in STAGE_SEQUENCE.iter().enumerate() {
        let stats = archetype.stats();
        let _ = writeln!(
            text,
            "  {}. {archetype:<9} HP {:>2}  ATK {}  RANGE {}",
            index + 1,
            stats.health,
            stats.attack,
            stats.range
        );
    }
    text
}

pub(crate) fn method_menu(stage_index: usize) -> String {
    let mut text = format!("Stage {}: choose an inference method (method <n>):\n", stage_index + 1);
    for (index, method) in InferenceMethod::ALL.iter().enumerate() {
        let _ = writeln!(text, "  {}. {method}", index + 1);
    }
    text
}

/// Draws the grid with `P` for the player, `E` for the enemy and `*` for move targets.
pub(crate) fn battle(view: &BattleView) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "Stage {}: {} | method {} | {}",
        view.stage_index + 1,
        view.archetype,
        view.requested_method(),
        turn_label(view.turn)
    );

    text.push_str("   ");
    for column in 0..GRID_COLUMNS {
        let _ = write!(text, "{column} ");
    }
    text.push('\n');

    for row in 0..GRID_ROWS {
        let _ = write!(text, "{row}  ");
        for column in 0..GRID_COLUMNS {
            let tile = Tile::new(column, row);
            let _ = write!(text, "{} ", glyph(view, tile));
        }
        text.push('\n');
    }

    let _ = writeln!(text, "{}", unit_line("Player", &view.player));
    let _ = writeln!(text, "{}", unit_line(view.archetype.name(), &view.enemy));
    let _ = writeln!(text, "> {}", view.message);
    text
}

pub(crate) fn summary(summary: &ResultSummary) -> String {
    let mut text = format!("Result: {} wins\n", summary.winner);
    let _ = writeln!(text, "  enemy      {}", summary.enemy);
    let _ = writeln!(text, "  method     {}", summary.method);
    let _ = writeln!(text, "  score      {:.2}", summary.score);
    let _ = writeln!(text, "  player HP  {}", summary.player_health);
    let _ = writeln!(text, "  enemy HP   {}", summary.enemy_health);
    text
}

fn glyph(view: &BattleView, tile: Tile) -> char {
    if view.player.alive && view.player.tile == tile {
        'P'
    } else if view.enemy.alive && view.enemy.tile == tile {
        'E'
    } else if view.move_targets.binary_search(&tile).is_ok() {
        '*'
    } else {
        '.'
    }
}

fn turn_label(turn: TurnState) -> &'static str {
    match turn.player_mode() {
        Some(PlayerMode::Idle) => "your turn",
        Some(PlayerMode::Move) => "your turn (move)",
        Some(PlayerMode::Attack) => "your turn (attack)",
        None if turn == TurnState::Enemy => "enemy turn",
        None => "battle over",
    }
}

fn unit_line(name: &str, unit: &UnitSnapshot) -> String {
    let mut line = format!(
        "{name:<8} at {} HP {}/{}",
        unit.tile, unit.health, unit.max_health
    );
    if let Some(resource) = unit.resource {
        let _ = write!(line, " MANA {resource}");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{Archetype, Team, Winner};

    fn view() -> BattleView {
        BattleView {
            player: UnitSnapshot {
                team: Team::Player,
                tile: Tile::new(1, 3),
                health: 20,
                max_health: 20,
                attack: 2,
                alive: true,
                resource: None,
                range: None,
            },
            enemy: UnitSnapshot {
                team: Team::Enemy,
                tile: Tile::new(6, 3),
                health: 22,
                max_health: 22,
                attack: 2,
                alive: true,
                resource: Some(80),
                range: Some(1),
            },
            archetype: Archetype::Enderman,
            turn: TurnState::Player(PlayerMode::Move),
            move_targets: vec![Tile::new(0, 3), Tile::new(1, 2), Tile::new(1, 4), Tile::new(2, 3)],
            message: "MOVE mode. Pick a destination tile.".to_owned(),
            stage_index: 2,
            forced_method: Some(InferenceMethod::Sugeno),
            victory: false,
        }
    }

    #[test]
    fn battle_marks_units_and_targets() {
        let text = battle(&view());
        let row_three = text
            .lines()
            .find(|line| line.starts_with("3  "))
            .expect("row three rendered");
        assert_eq!(row_three, "3  * P * . . . E . ");
        assert!(text.contains("Enderman at (6, 3) HP 22/22 MANA 80"));
        assert!(text.starts_with("Stage 3: Enderman | method sugeno | your turn (move)"));
    }

    #[test]
    fn summary_lists_the_outcome() {
        let text = summary(&ResultSummary {
            enemy: Archetype::Boss,
            method: InferenceMethod::Mamdani,
            score: 61.5,
            player_health: 4,
            enemy_health: 0,
            winner: Winner::Player,
        });
        assert!(text.starts_with("Result: PLAYER wins"));
        assert!(text.contains("score      61.50"));
    }

    #[test]
    fn turn_label_follows_the_player_mode() {
        assert_eq!(turn_label(TurnState::Player(PlayerMode::Idle)), "your turn");
        assert_eq!(
            turn_label(TurnState::Player(PlayerMode::Attack)),
            "your turn (attack)"
        );
        assert_eq!(turn_label(TurnState::Enemy), "enemy turn");
        assert_eq!(turn_label(TurnState::BattleOver), "battle over");
    }
}
