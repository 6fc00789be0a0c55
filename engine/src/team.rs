use crate::MAX_BALLS_PER_TEAM;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One side of a match. Only the owning match mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    name: String,
    ball_color: String,
    indicator_color: String,
    balls_thrown: u8,
    balls_in: u8,
    score: u32,
    temp_points: u8,
    recent_points_added: u32,
}

impl Team {
    pub fn new(
        name: impl Into<String>,
        ball_color: impl Into<String>,
        indicator_color: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ball_color: ball_color.into(),
            indicator_color: indicator_color.into(),
            balls_thrown: 0,
            balls_in: 0,
            score: 0,
            temp_points: 0,
            recent_points_added: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ball_color(&self) -> &str {
        &self.ball_color
    }

    pub fn indicator_color(&self) -> &str {
        &self.indicator_color
    }

    pub fn balls_thrown(&self) -> u8 {
        self.balls_thrown
    }

    pub fn balls_in(&self) -> u8 {
        self.balls_in
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn temp_points(&self) -> u8 {
        self.temp_points
    }

    pub fn recent_points_added(&self) -> u32 {
        self.recent_points_added
    }

    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns false when the team already threw every ball.
    pub(crate) fn throw_ball(&mut self) -> bool {
        if self.balls_thrown >= MAX_BALLS_PER_TEAM {
            return false;
        }
        self.balls_thrown += 1;
        true
    }

    /// Marks one more thrown ball as in. Never exceeds `balls_thrown`.
    pub(crate) fn land_ball(&mut self) -> bool {
        if self.balls_in >= self.balls_thrown {
            return false;
        }
        self.balls_in += 1;
        true
    }

    pub(crate) fn remove_in(&mut self) -> bool {
        if self.balls_in == 0 {
            return false;
        }
        self.balls_in -= 1;
        true
    }

    pub(crate) fn clear_in(&mut self) {
        self.balls_in = 0;
    }

    pub(crate) fn reset_balls(&mut self) {
        self.balls_thrown = 0;
        self.balls_in = 0;
    }

    /// Advances temp points through `0..=max`, wrapping back to 0.
    pub(crate) fn cycle_temp_points(&mut self, max: u8) {
        self.temp_points = if self.temp_points >= max {
            0
        } else {
            self.temp_points + 1
        };
    }

    pub(crate) fn clear_temp_points(&mut self) {
        self.temp_points = 0;
    }

    /// Moves temp points into the score and returns how many were added.
    pub(crate) fn commit_temp_points(&mut self) -> u32 {
        let points = u32::from(self.temp_points);
        self.add_points(points);
        self.temp_points = 0;
        points
    }

    pub(crate) fn add_points(&mut self, points: u32) {
        self.score += points;
        self.recent_points_added = points;
    }

    pub(crate) fn remove_points(&mut self, points: u32) {
        self.score = self.score.saturating_sub(points);
        self.recent_points_added = 0;
        self.temp_points = 0;
    }

    /// Undo moved the latest commit back to an earlier frame.
    pub(crate) fn restore_recent_points(&mut self, points: u32) {
        self.recent_points_added = points;
    }

    pub(crate) fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    #[cfg(test)]
    pub(crate) fn set_balls(&mut self, balls_thrown: u8, balls_in: u8) {
        assert!(balls_in <= balls_thrown && balls_thrown <= MAX_BALLS_PER_TEAM);
        self.balls_thrown = balls_thrown;
        self.balls_in = balls_in;
    }

    /// Clears everything but identity.
    pub(crate) fn reset_for_new_game(&mut self) {
        self.balls_thrown = 0;
        self.balls_in = 0;
        self.score = 0;
        self.temp_points = 0;
        self.recent_points_added = 0;
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
