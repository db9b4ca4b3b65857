//! Line-oriented input parsing for the terminal adapter.
//!
//! Every line maps to at most one [`Intent`], so interactive play and
//! `--script` files share the same grammar.

use skirmish_core::{Archetype, InferenceMethod, Tile, STAGE_SEQUENCE};
use thiserror::Error;

/// High-level outcome of parsing one input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Intent {
    /// Pick the starting stage by index.
    Select(usize),
    /// Pick the inference method by name.
    Method(String),
    /// Enter move mode.
    Move,
    /// Enter attack mode.
    Attack,
    /// Confirm the pending action on the tile.
    Confirm(Tile),
    /// End the player's turn.
    End,
    /// Return to the main menu.
    Menu,
    /// Redraw the current screen.
    Show,
    /// Print the command reference.
    Help,
    /// Leave the program.
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum InputError {
    #[error("unknown command `{0}`; type `help` for the command list")]
    UnknownCommand(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` is not a tile coordinate")]
    InvalidCoordinate(String),
    #[error("`{0}` does not name an enemy; use 1-4 or a name")]
    UnknownEnemy(String),
}

pub(crate) const HELP: &str = "\
commands:
  select <1-4|name>   choose the starting enemy (menu)
  method <1-3|name>   choose mamdani, sugeno or tsukamoto (method selection)
  move | m            enter move mode
  attack | a          enter attack mode
  confirm <x> <y>     confirm the pending action on a tile (alias: c)
  end | e             end your turn
  menu | r            return to the main menu
  show                redraw the screen
  quit | q            exit";

/// Parses one line. Blank lines and `#` comments yield `None`.
pub(crate) fn parse_line(line: &str) -> Result<Option<Intent>, InputError> {
    let line = line.split('#').next().unwrap_or_default().trim();
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };

    let intent = match command.to_ascii_lowercase().as_str() {
        "select" | "s" => {
            let value = words.next().ok_or(InputError::MissingArgument("select"))?;
            Intent::Select(parse_stage(value)?)
        }
        "method" => {
            let value = words.next().ok_or(InputError::MissingArgument("method"))?;
            Intent::Method(parse_method(value))
        }
        "move" | "m" => Intent::Move,
        "attack" | "a" => Intent::Attack,
        "confirm" | "c" => {
            let column = words.next().ok_or(InputError::MissingArgument("confirm"))?;
            let row = words.next().ok_or(InputError::MissingArgument("confirm"))?;
            Intent::Confirm(Tile::new(coordinate(column)?, coordinate(row)?))
        }
        "end" | "e" => Intent::End,
        "menu" | "r" => Intent::Menu,
        "show" => Intent::Show,
        "help" | "?" => Intent::Help,
        "quit" | "q" => Intent::Quit,
        other => return Err(InputError::UnknownCommand(other.to_owned())),
    };

    Ok(Some(intent))
}

/// Resolves a one-based stage number or an archetype name to a stage index.
pub(crate) fn parse_stage(value: &str) -> Result<usize, InputError> {
    if let Ok(number) = value.trim().parse::<usize>() {
        return match number {
            1..=4 => Ok(number - 1),
            _ => Err(InputError::UnknownEnemy(value.to_owned())),
        };
    }

    let archetype = value
        .parse::<Archetype>()
        .map_err(|_| InputError::UnknownEnemy(value.to_owned()))?;
    STAGE_SEQUENCE
        .iter()
        .position(|candidate| *candidate == archetype)
        .ok_or_else(|| InputError::UnknownEnemy(value.to_owned()))
}

/// Maps a one-based menu number to its method name; anything else passes through.
pub(crate) fn parse_method(value: &str) -> String {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .and_then(|index| InferenceMethod::ALL.get(index))
        .map_or_else(|| value.trim().to_owned(), |method| method.as_str().to_owned())
}

fn coordinate(value: &str) -> Result<u32, InputError> {
    value
        .trim_matches(|c| c == '(' || c == ')' || c == ',')
        .parse()
        .map_err(|_| InputError::InvalidCoordinate(value.to_owned()))
}
