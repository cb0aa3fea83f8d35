//! Text commands accepted on the terminal.

use geocoin_core::{CellKey, Command, Direction, Position};
use thiserror::Error;

/// A single parsed line of player input.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Input {
    /// Forward the command to the world.
    Command(Command),
    /// Describe the player and the caches in view.
    Look,
    /// Print the command reference.
    Help,
    /// Leave the game.
    Quit,
}

/// Reasons a line could not be understood.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum InputError {
    #[error("unknown command `{0}` (try `help`)")]
    UnknownCommand(String),
    #[error("`{command}` expects a cell such as `0,-2`")]
    MissingCell { command: String },
    #[error("`{0}` is not a cell; expected `i,j`")]
    InvalidCell(String),
    #[error("`goto` expects a latitude and a longitude")]
    InvalidPosition,
}

pub(crate) const HELP: &str = "\
commands:
  n | north | up        move one cell north
  s | south | down      move one cell south
  e | east  | right     move one cell east
  w | west  | left      move one cell west
  goto <lat> <lng>      jump to a position
  open <i,j>            open the cache at a cell
  poke <i,j>            trade with the cache at a cell
  close <i,j>           close the cache at a cell
  look                  list the caches in view
  help                  show this text
  quit                  leave the game";

/// Parses a line; blank lines and `#` comments yield `None`.
pub(crate) fn parse(line: &str) -> Result<Option<Input>, InputError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let verb = verb.to_ascii_lowercase();

    let input = match verb.as_str() {
        "n" | "north" | "up" => movement(Direction::North),
        "s" | "south" | "down" => movement(Direction::South),
        "e" | "east" | "right" => movement(Direction::East),
        "w" | "west" | "left" => movement(Direction::West),
        "goto" => {
            let lat = words.next().and_then(|word| word.parse::<f64>().ok());
            let lng = words.next().and_then(|word| word.parse::<f64>().ok());
            match (lat, lng) {
                (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                    Input::Command(Command::Relocate {
                        position: Position::new(lat, lng),
                    })
                }
                _ => return Err(InputError::InvalidPosition),
            }
        }
        "open" => Input::Command(Command::OpenCache {
            key: cell(&verb, words.next())?,
        }),
        "poke" | "interact" => Input::Command(Command::Interact {
            key: cell(&verb, words.next())?,
        }),
        "close" => Input::Command(Command::CloseCache {
            key: cell(&verb, words.next())?,
        }),
        "look" | "l" => Input::Look,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        _ => return Err(InputError::UnknownCommand(verb)),
    };
    Ok(Some(input))
}

fn movement(direction: Direction) -> Input {
    Input::Command(Command::Move { direction })
}

fn cell(verb: &str, word: Option<&str>) -> Result<CellKey, InputError> {
    let word = word.ok_or_else(|| InputError::MissingCell {
        command: verb.to_owned(),
    })?;
    let (i, j) = word
        .split_once(',')
        .ok_or_else(|| InputError::InvalidCell(word.to_owned()))?;
    let i = i
        .trim()
        .parse()
        .map_err(|_| InputError::InvalidCell(word.to_owned()))?;
    let j = j
        .trim()
        .parse()
        .map_err(|_| InputError::InvalidCell(word.to_owned()))?;
    Ok(CellKey::new(i, j))
}
