//! Parsing of typed user input.
//!
//! Empty numeric input counts as 0; anything non-numeric is rejected with
//! `InvalidInput` so the prompt can be repeated.

use kracht_core::{Error, ExerciseSet, Result};

/// Commands accepted while a workout is in progress
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Toggle set (0-based) of the current exercise
    Toggle(usize),
    Reps { set: usize, reps: Option<u32> },
    Weight { set: usize, weight: Option<f64> },
    Next,
    Previous,
    Go(usize),
    SkipRest,
    AdjustRest(i64),
    Show,
    Finish,
    Quit,
    Help,
}

pub const REST_EXTEND_SECONDS: i64 = 30;
pub const REST_SHORTEN_SECONDS: i64 = 10;

pub const HELP: &str = "\
  <n>            toggle set n of the current exercise
  r <n> [reps]   set reps for set n (empty = 0)
  w <n> [kg]     set weight for set n (empty = 0)
  n / p          next / previous exercise
  g <n>          go to exercise n
  s              skip rest
  + [sec] / - [sec]  extend (default 30) / shorten (default 10) rest
  l              show workout
  f              finish and save
  q              quit without saving
  h              this help";

/// Parse a rep count; empty input is `None`
pub fn parse_reps(raw: &str) -> Result<Option<u32>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u32>()
        .map(Some)
        .map_err(|_| Error::InvalidInput(format!("not a rep count: '{}'", raw)))
}

/// Parse a weight in kg; accepts a decimal comma. Empty input is `None`
pub fn parse_weight(raw: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let weight: f64 = raw
        .replace(',', ".")
        .parse()
        .map_err(|_| Error::InvalidInput(format!("not a weight: '{}'", raw)))?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(Error::InvalidInput(format!("not a weight: '{}'", raw)));
    }
    Ok(Some(weight))
}

/// Parse `REPSxKG` (e.g. `12x7.5`); a missing part counts as 0
pub fn parse_set(raw: &str) -> Result<ExerciseSet> {
    let (reps, weight) = raw.split_once(['x', 'X']).unwrap_or((raw, ""));
    Ok(ExerciseSet::new(
        parse_reps(reps)?.unwrap_or(0),
        parse_weight(weight)?.unwrap_or(0.0),
    ))
}

fn parse_position(raw: Option<&str>, what: &str) -> Result<usize> {
    let raw = raw.ok_or_else(|| Error::InvalidInput(format!("missing {} number", what)))?;
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(Error::InvalidInput(format!("not a {} number: '{}'", what, raw))),
    }
}

fn parse_seconds(raw: Option<&str>, default: i64) -> Result<i64> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .parse::<i64>()
            .map(i64::abs)
            .map_err(|_| Error::InvalidInput(format!("not a number of seconds: '{}'", raw))),
    }
}

/// Parse one line typed during a session
pub fn parse_command(line: &str) -> Result<Command> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Show);
    };
    let arg = words.next();

    let command = match head.to_lowercase().as_str() {
        "r" => Command::Reps {
            set: parse_position(arg, "set")?,
            reps: parse_reps(arg.and(words.next()).unwrap_or(""))?,
        },
        "w" => Command::Weight {
            set: parse_position(arg, "set")?,
            weight: parse_weight(arg.and(words.next()).unwrap_or(""))?,
        },
        "d" => Command::Toggle(parse_position(arg, "set")?),
        "n" => Command::Next,
        "p" => Command::Previous,
        "g" => Command::Go(parse_position(arg, "exercise")?),
        "s" => Command::SkipRest,
        "+" => Command::AdjustRest(parse_seconds(arg, REST_EXTEND_SECONDS)?),
        "-" => Command::AdjustRest(-parse_seconds(arg, REST_SHORTEN_SECONDS)?),
        "l" => Command::Show,
        "f" => Command::Finish,
        "q" => Command::Quit,
        "h" | "?" | "help" => Command::Help,
        other => Command::Toggle(parse_position(Some(other), "set")?),
    };
    Ok(command)
}

/// Interpret a yes/no answer; anything but an explicit yes is no
pub fn is_yes(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes" | "j" | "ja")
}
