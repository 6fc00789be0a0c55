use crate::bocce::BocceMatch;
use crate::button::Button;
use crate::curling::CurlingMatch;
use crate::event::ScoreEvent;
use crate::router::{ButtonRouter, Command};
use crate::team::Team;
use crate::{FinalScore, MatchConfig, Side, Sport};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule engine for one sport. Every transition writes its state changes
/// into the caller's event buffer and silently ignores illegal commands.
pub trait Game {
    fn sport(&self) -> Sport;
    fn apply(&mut self, command: Command, events: &mut Vec<ScoreEvent>);
    /// Once-per-second clock tick.
    fn tick(&mut self, events: &mut Vec<ScoreEvent>);
    fn rename_team(&mut self, side: Side, name: &str, events: &mut Vec<ScoreEvent>);
    fn team(&self, side: Side) -> &Team;
    fn final_score(&self) -> FinalScore;
    /// Events that redraw the whole board from scratch.
    fn scoreboard(&self) -> Vec<ScoreEvent>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveMatch {
    Bocce(BocceMatch),
    Curling(CurlingMatch),
}

impl ActiveMatch {
    pub fn new(sport: Sport, config: &MatchConfig) -> Self {
        match sport {
            Sport::Bocce => ActiveMatch::Bocce(BocceMatch::new(config)),
            Sport::Curling => ActiveMatch::Curling(CurlingMatch::new(config)),
        }
    }

    pub fn game(&self) -> &dyn Game {
        match self {
            ActiveMatch::Bocce(m) => m,
            ActiveMatch::Curling(m) => m,
        }
    }

    pub fn game_mut(&mut self) -> &mut dyn Game {
        match self {
            ActiveMatch::Bocce(m) => m,
            ActiveMatch::Curling(m) => m,
        }
    }
}

#[derive(Debug)]
pub enum SnapshotError {
    Serialize(serde_json::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Serialize(e) => write!(f, "Failed to serialize session: {}", e),
            SnapshotError::Parse(e) => write!(f, "Failed to parse session snapshot: {}", e),
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Router plus active match: the whole engine state behind the kiosk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    router: ButtonRouter,
    game: ActiveMatch,
}

impl Session {
    pub fn new(sport: Sport, config: &MatchConfig) -> Self {
        Self {
            router: ButtonRouter::new(sport),
            game: ActiveMatch::new(sport, config),
        }
    }

    pub fn sport(&self) -> Sport {
        self.game.game().sport()
    }

    pub fn router(&self) -> &ButtonRouter {
        &self.router
    }

    pub fn active(&self) -> &ActiveMatch {
        &self.game
    }

    pub fn game(&self) -> &dyn Game {
        self.game.game()
    }

    pub fn handle_button(&mut self, button: Button) -> Vec<ScoreEvent> {
        let mut events = Vec::new();
        if let Some(command) = self.router.route(button) {
            self.game.game_mut().apply(command, &mut events);
        }
        events
    }

    /// Driver entry point. Unknown tokens are ignored.
    pub fn handle_token(&mut self, token: &str) -> Vec<ScoreEvent> {
        match token.parse::<Button>() {
            Ok(button) => self.handle_button(button),
            Err(e) => {
                debug!("{e}");
                Vec::new()
            }
        }
    }

    pub fn tick(&mut self) -> Vec<ScoreEvent> {
        let mut events = Vec::new();
        self.game.game_mut().tick(&mut events);
        events
    }

    pub fn rename_team(&mut self, side: Side, name: &str) -> Vec<ScoreEvent> {
        let mut events = Vec::new();
        let name = name.trim();
        if !name.is_empty() {
            self.game.game_mut().rename_team(side, name, &mut events);
        }
        events
    }

    pub fn scoreboard(&self) -> Vec<ScoreEvent> {
        self.game.game().scoreboard()
    }

    pub fn snapshot(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(SnapshotError::Serialize)
    }

    pub fn restore(snapshot: &str) -> Result<Session, SnapshotError> {
        serde_json::from_str(snapshot).map_err(SnapshotError::Parse)
    }
}
