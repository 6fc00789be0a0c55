pub mod bocce;
pub mod button;
pub mod clock;
pub mod curling;
pub mod event;
pub mod router;
pub mod session;
pub mod team;

pub use bocce::{BallState, BocceMatch, BoccePhase};
pub use button::Button;
pub use clock::{ClockMode, GameClock};
pub use curling::{CurlingMatch, CurlingPhase, End, Score};
pub use event::{Indicator, Reaction, ScoreEvent};
pub use router::{ButtonRouter, Command, Direction};
pub use session::{ActiveMatch, Game, Session, SnapshotError};
pub use team::Team;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Shared domain types
// ---------------------------------------------------------------------------

/// Balls each bocce team throws per frame.
pub const MAX_BALLS_PER_TEAM: u8 = 4;

/// Stones each curling team throws per end.
pub const STONES_PER_END: u8 = 8;

/// Upper bound for a curling match length; the end-count cursor wraps within 1..=MAX_ENDS.
pub const MAX_ENDS: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    Bocce,
    Curling,
}

impl Sport {
    pub fn label(&self) -> &'static str {
        match self {
            Sport::Bocce => "Bocce",
            Sport::Curling => "Curling",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sport::Bocce => "bocce",
            Sport::Curling => "curling",
        })
    }
}

impl FromStr for Sport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bocce" => Ok(Sport::Bocce),
            "curling" => Ok(Sport::Curling),
            other => Err(format!("unsupported game: {other}")),
        }
    }
}

/// Which of the two teams. Curling calls these team A (`Home`) and team B (`Away`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Home, Side::Away];

    pub fn other(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Home => 0,
            Side::Away => 1,
        }
    }
}

/// Starting parameters for a match. Team names and colors are display tags only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub game_minutes: u8,
    pub default_ends: u8,
    pub home_name: String,
    pub away_name: String,
    pub home_ball_color: String,
    pub away_ball_color: String,
    pub home_indicator_color: String,
    pub away_indicator_color: String,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            game_minutes: 20,
            default_ends: 8,
            home_name: "Home".to_string(),
            away_name: "Away".to_string(),
            home_ball_color: "teal".to_string(),
            away_ball_color: "pink".to_string(),
            home_indicator_color: "Teal".to_string(),
            away_indicator_color: "Pink".to_string(),
        }
    }
}

/// Result handed to the persistence collaborator once a match ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScore {
    pub sport: Sport,
    pub home: TeamResult,
    pub away: TeamResult,
    /// Frames (bocce) or ends (curling) that were scored.
    pub rounds_played: u32,
}

impl FinalScore {
    /// `None` for a tie.
    pub fn winner(&self) -> Option<Side> {
        match self.home.score.cmp(&self.away.score) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamResult {
    pub name: String,
    pub score: u32,
}
