//! Shared domain enumerations used across the codebase
//!
//! Every enumeration is stored as lower snake_case text in the database and
//! emitted the same way on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every accepted textual value, in declaration order
            pub const VALUES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError { kind: $kind, value: other.to_string() }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseEnumError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }
    };
}

text_enum!(
    /// Account role. Authorization decisions are made on this alone.
    Role, "role" {
        Admin => "admin",
        Moderator => "moderator",
        Player => "player",
    }
);

text_enum!(
    TournamentStatus, "tournament status" {
        Planned => "planned",
        Registration => "registration",
        Active => "active",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

text_enum!(
    TournamentType, "tournament type" {
        Swiss => "swiss",
        RoundRobin => "round_robin",
        Knockout => "knockout",
        Arena => "arena",
    }
);

text_enum!(
    /// Game result; `InProgress` until the game is finished
    GameResult, "game result" {
        InProgress => "in_progress",
        WhiteWins => "white_wins",
        BlackWins => "black_wins",
        Draw => "draw",
    }
);

text_enum!(
    PlayerColor, "player color" {
        White => "white",
        Black => "black",
    }
);

/// Outcome of a finished game from one participant's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
    Drawn,
}

impl GameResult {
    pub fn is_finished(&self) -> bool {
        !matches!(self, GameResult::InProgress)
    }

    /// Outcome bucket for the player holding `color`, or `None` while the game is running
    pub fn outcome_for(&self, color: PlayerColor) -> Option<Outcome> {
        match (self, color) {
            (GameResult::InProgress, _) => None,
            (GameResult::Draw, _) => Some(Outcome::Drawn),
            (GameResult::WhiteWins, PlayerColor::White) | (GameResult::BlackWins, PlayerColor::Black) => {
                Some(Outcome::Won)
            }
            (GameResult::WhiteWins, PlayerColor::Black) | (GameResult::BlackWins, PlayerColor::White) => {
                Some(Outcome::Lost)
            }
        }
    }
}
