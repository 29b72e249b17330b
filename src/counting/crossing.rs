use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of a boundary crossing.
///
/// The line is horizontal and rows grow downwards, so `Enter` means the
/// reference point moved from above the line to at-or-below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossingDirection {
    Enter,
    Exit,
}

impl fmt::Display for CrossingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enter => f.write_str("ENTER"),
            Self::Exit => f.write_str("EXIT"),
        }
    }
}

/// Classify one track's movement between two consecutive observations.
///
/// * `Enter` iff `previous < line <= current`
/// * `Exit` iff `previous > line >= current`
///
/// A first observation (`previous == None`) never crosses, and a point resting
/// on the line needs to leave it strictly before it can cross again.
pub fn detect_crossing(previous: Option<i32>, current: i32, line: i32) -> Option<CrossingDirection> {
    let previous = previous?;
    if previous < line && line <= current {
        Some(CrossingDirection::Enter)
    } else if previous > line && line >= current {
        Some(CrossingDirection::Exit)
    } else {
        None
    }
}
