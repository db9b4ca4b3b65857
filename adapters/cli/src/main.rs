#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Skirmish in a terminal.

mod input;
mod render;

use std::{
    fs,
    io::{self, BufRead},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use skirmish_core::BattleRules;
use skirmish_session::{Session, SessionPhase};
use skirmish_system_scoring::TableOracle;
use tracing_subscriber::EnvFilter;

use crate::input::{parse_line, parse_method, parse_stage, Intent};

/// Tactical grid duel against an enemy driven by inference scores.
#[derive(Debug, Parser)]
#[command(name = "skirmish", version)]
struct Args {
    /// TOML file overriding the default battle rules.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Starting enemy as a number (1-4) or a name; skips the main menu.
    #[arg(long)]
    enemy: Option<String>,

    /// Inference method as a number (1-3) or a name; skips method selection.
    #[arg(long, requires = "enemy")]
    method: Option<String>,

    /// Read commands from a file instead of standard input.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Print the result summary as JSON once the battle ends.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Skirmish command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let rules = load_rules(args.rules.as_deref())?;
    let oracle = TableOracle::new().with_player_max_health(rules.player_max_health);
    let mut session = Session::new(oracle, rules).context("failed to start session")?;

    if let Some(enemy) = &args.enemy {
        let _ = session.select_enemy(parse_stage(enemy)?)?;
        if let Some(method) = &args.method {
            let _ = session.select_inference_method(&parse_method(method))?;
        }
    }

    let reader: Box<dyn BufRead> = match &args.script {
        Some(path) => {
            let file = fs::File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            Box::new(io::BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };
    let scripted = args.script.is_some();

    print_screen(&session);
    for (number, line) in reader.lines().enumerate() {
        let line = line.context("failed to read input")?;
        let intent = match parse_line(&line) {
            Ok(Some(intent)) => intent,
            Ok(None) => continue,
            Err(error) if scripted => bail!("script line {}: {error}", number + 1),
            Err(error) => {
                eprintln!("{error}");
                continue;
            }
        };

        if scripted {
            println!("$ {}", line.trim());
        }
        if !play(&mut session, intent) {
            break;
        }
    }

    if let (true, Some(summary)) = (args.json, session.summary()) {
        let json = serde_json::to_string_pretty(summary).context("failed to encode summary")?;
        println!("{json}");
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_rules(path: Option<&Path>) -> Result<BattleRules> {
    let Some(path) = path else {
        return Ok(BattleRules::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read rules file {}", path.display()))?;
    parse_rules(&contents).with_context(|| format!("invalid rules file {}", path.display()))
}

fn parse_rules(contents: &str) -> Result<BattleRules> {
    let rules: BattleRules = toml::from_str(contents).context("failed to parse rules")?;
    rules.validate()?;
    Ok(rules)
}

/// Applies one intent and redraws. Returns `false` once the player quits.
fn play(session: &mut Session<TableOracle>, intent: Intent) -> bool {
    let outcome = match intent {
        Intent::Quit => return false,
        Intent::Help => {
            println!("{}", input::HELP);
            return true;
        }
        Intent::Show => Ok(()),
        Intent::Menu => {
            session.restart_to_menu();
            Ok(())
        }
        Intent::Select(stage_index) => session.select_enemy(stage_index).map(|_| ()),
        Intent::Method(name) => session.select_inference_method(&name).map(|_| ()),
        Intent::Move => session.enter_move_mode().map(|_| ()),
        Intent::Attack => session.enter_attack_mode().map(|_| ()),
        Intent::Confirm(tile) => session.confirm_action(tile).map(|_| ()),
        Intent::End => session.end_turn().map(|_| ()),
    };

    if let Err(error) = outcome {
        eprintln!("{error}");
    }
    print_screen(session);
    true
}

fn print_screen(session: &Session<TableOracle>) {
    match session.phase() {
        SessionPhase::MainMenu => print!("{}", render::main_menu()),
        SessionPhase::SelectMethod { stage_index } => {
            print!("{}", render::method_menu(*stage_index));
        }
        SessionPhase::InBattle => print!("{}", render::battle(&session.battle_view())),
        SessionPhase::Result { summary } => {
            print!("{}", render::battle(&session.battle_view()));
            print!("{}", render::summary(summary));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_rules_keep_defaults() {
        let rules = parse_rules("player_attack = 4\nheal_percent = 50\n").expect("valid rules");
        assert_eq!(rules.player_attack, 4);
        assert_eq!(rules.heal_percent, 50);
        assert_eq!(rules.player_max_health, 20);
        assert_eq!(rules.move_range, 1);
    }

    #[test]
    fn unknown_and_degenerate_rules_are_rejected() {
        assert!(parse_rules("speed = 3\n").is_err());
        assert!(parse_rules("move_range = 0\n").is_err());
    }

    #[test]
    fn arguments_parse_with_method_shortcut() {
        let args = Args::try_parse_from(["skirmish", "--enemy", "boss", "--method", "2", "--json"])
            .expect("valid arguments");
        assert_eq!(args.enemy.as_deref(), Some("boss"));
        assert_eq!(args.method.as_deref(), Some("2"));
        assert!(args.json);
        assert!(Args::try_parse_from(["skirmish", "--method", "sugeno"]).is_err());
    }
}
