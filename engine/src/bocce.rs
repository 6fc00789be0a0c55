use crate::clock::{ClockTransition, GameClock};
use crate::event::{Indicator, ScoreEvent};
use crate::router::Command;
use crate::session::Game;
use crate::team::Team;
use crate::{FinalScore, MAX_BALLS_PER_TEAM, MatchConfig, Side, Sport, TeamResult};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Display state of one ball slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    NotThrown,
    Thrown,
    Landed,
}

/// Slot `i` is landed below `balls_in`, thrown below `balls_thrown`, otherwise not thrown.
pub fn ball_states(balls_thrown: u8, balls_in: u8) -> [BallState; MAX_BALLS_PER_TEAM as usize] {
    std::array::from_fn(|slot| {
        let slot = slot as u8;
        if slot < balls_in {
            BallState::Landed
        } else if slot < balls_thrown {
            BallState::Thrown
        } else {
            BallState::NotThrown
        }
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoccePhase {
    /// No game clock has been started yet.
    #[default]
    Idle,
    Playing,
    /// Frame is being scored by measurement instead of in/out presses.
    Measuring { down_and_back: bool },
    /// Clock ran out; in/out presses are frozen.
    DownAndBack,
    Finished,
}

impl BoccePhase {
    pub fn in_game(&self) -> bool {
        matches!(
            self,
            BoccePhase::Playing | BoccePhase::Measuring { .. } | BoccePhase::DownAndBack
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct FrameRecord {
    winner: Side,
    points: u32,
    previous_winner: Option<Side>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BocceMatch {
    teams: [Team; 2],
    phase: BoccePhase,
    recent_frame_winner: Option<Side>,
    frame: u32,
    history: Vec<FrameRecord>,
    clock: GameClock,
}

impl BocceMatch {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            teams: [
                Team::new(
                    config.home_name.clone(),
                    config.home_ball_color.clone(),
                    config.home_indicator_color.clone(),
                ),
                Team::new(
                    config.away_name.clone(),
                    config.away_ball_color.clone(),
                    config.away_indicator_color.clone(),
                ),
            ],
            phase: BoccePhase::Idle,
            recent_frame_winner: None,
            frame: 0,
            history: Vec::new(),
            clock: GameClock::new(config.game_minutes, false),
        }
    }

    pub fn phase(&self) -> BoccePhase {
        self.phase
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn recent_frame_winner(&self) -> Option<Side> {
        self.recent_frame_winner
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn frames_scored(&self) -> usize {
        self.history.len()
    }

    pub fn ball_states(&self, side: Side) -> [BallState; MAX_BALLS_PER_TEAM as usize] {
        let team = self.team_ref(side);
        ball_states(team.balls_thrown(), team.balls_in())
    }

    /// The side that throws the first ball of the current frame.
    pub fn opening_side(&self) -> Side {
        self.recent_frame_winner.unwrap_or(Side::Home)
    }

    fn team_ref(&self, side: Side) -> &Team {
        &self.teams[side.index()]
    }

    fn team_mut(&mut self, side: Side) -> &mut Team {
        &mut self.teams[side.index()]
    }

    fn thrown(&self, side: Side) -> (u8, u8) {
        (
            self.team_ref(side).balls_thrown(),
            self.team_ref(side.other()).balls_thrown(),
        )
    }

    // -----------------------------------------------------------------------
    // In / out protocol
    // -----------------------------------------------------------------------

    pub fn increment_in(&mut self, side: Side, events: &mut Vec<ScoreEvent>) -> bool {
        if self.phase != BoccePhase::Playing {
            debug!("ignoring in for {side:?}: game is not in progress");
            return false;
        }
        let (mine, theirs) = self.thrown(side);
        if mine == 0 {
            debug!("ignoring in for {side:?}: a team's first ball of the frame is recorded as out");
            return false;
        }
        if theirs == 0 {
            debug!("ignoring in for {side:?}: the other team has not thrown yet");
            return false;
        }
        if self.team_ref(side).balls_in() >= MAX_BALLS_PER_TEAM {
            debug!("ignoring in for {side:?}: every ball is already in");
            return false;
        }

        self.team_mut(side).throw_ball();
        self.team_mut(side).land_ball();
        self.team_mut(side.other()).clear_in();

        events.push(self.balls_event(Side::Home));
        events.push(self.balls_event(Side::Away));
        events.push(ScoreEvent::Indicator(Indicator::TeamIn(side)));
        true
    }

    pub fn increment_out(
        &mut self,
        side: Side,
        override_checks: bool,
        events: &mut Vec<ScoreEvent>,
    ) -> bool {
        if !override_checks && !self.out_is_valid(side) {
            return false;
        }
        if !self.team_mut(side).throw_ball() {
            debug!("ignoring out for {side:?}: every ball is already thrown");
            return false;
        }
        events.push(self.balls_event(side));
        true
    }

    fn out_is_valid(&self, side: Side) -> bool {
        if self.phase != BoccePhase::Playing {
            debug!("ignoring out for {side:?}: game is not in progress");
            return false;
        }
        let (mine, theirs) = self.thrown(side);
        if mine == 0 && theirs == 0 && side != self.opening_side() {
            debug!("ignoring out for {side:?}: {:?} opens this frame", self.opening_side());
            return false;
        }
        if mine > 0 && theirs == 0 {
            debug!("ignoring out for {side:?}: the other team has not thrown yet");
            return false;
        }
        true
    }

    pub fn decrement_in(&mut self, side: Side, events: &mut Vec<ScoreEvent>) -> bool {
        if !self.team_mut(side).remove_in() {
            return false;
        }
        events.push(self.balls_event(side));
        true
    }

    pub fn lock_in_frame_score(&mut self, events: &mut Vec<ScoreEvent>) -> bool {
        if !matches!(self.phase, BoccePhase::Playing | BoccePhase::DownAndBack) {
            debug!("ignoring lock-in: not available in {:?}", self.phase);
            return false;
        }
        let home = self.team_ref(Side::Home);
        let away = self.team_ref(Side::Away);
        if home.balls_thrown() != MAX_BALLS_PER_TEAM || away.balls_thrown() != MAX_BALLS_PER_TEAM {
            debug!("ignoring lock-in: not every ball has been thrown");
            return false;
        }
        let winner = match home.balls_in().cmp(&away.balls_in()) {
            std::cmp::Ordering::Greater => Side::Home,
            std::cmp::Ordering::Less => Side::Away,
            std::cmp::Ordering::Equal => {
                info!("frame {} is tied at lock-in, measurement needed", self.frame);
                events.push(ScoreEvent::Indicator(Indicator::MeasurementNeeded));
                return false;
            }
        };
        let points = u32::from(self.team_ref(winner).balls_in());
        self.team_mut(winner).add_points(points);
        self.finish_frame(winner, points, events);
        true
    }

    fn finish_frame(&mut self, winner: Side, points: u32, events: &mut Vec<ScoreEvent>) {
        info!(
            "frame {}: {} in with {points}",
            self.frame,
            self.team_ref(winner).name()
        );
        self.history.push(FrameRecord {
            winner,
            points,
            previous_winner: self.recent_frame_winner,
        });
        self.recent_frame_winner = Some(winner);
        for side in Side::BOTH {
            self.team_mut(side).reset_balls();
        }
        self.frame += 1;

        events.push(self.score_event(winner));
        events.push(self.balls_event(Side::Home));
        events.push(self.balls_event(Side::Away));
        events.push(ScoreEvent::FrameChanged { frame: self.frame });
        if points == u32::from(MAX_BALLS_PER_TEAM) {
            events.push(ScoreEvent::Indicator(Indicator::Casino(winner)));
        }
        events.push(ScoreEvent::Indicator(Indicator::PallinoNeeded));
    }

    // -----------------------------------------------------------------------
    // Measurement mode
    // -----------------------------------------------------------------------

    pub fn toggle_measure(&mut self, events: &mut Vec<ScoreEvent>) -> bool {
        match self.phase {
            BoccePhase::Playing | BoccePhase::DownAndBack => {
                let down_and_back = self.phase == BoccePhase::DownAndBack;
                for side in Side::BOTH {
                    self.team_mut(side).clear_temp_points();
                }
                self.set_phase(BoccePhase::Measuring { down_and_back }, events);
                events.push(ScoreEvent::Indicator(Indicator::AddPointsMode(true)));
                true
            }
            BoccePhase::Measuring { down_and_back } => {
                if let Some(side) = Side::BOTH
                    .into_iter()
                    .find(|s| self.team_ref(*s).temp_points() > 0)
                {
                    self.add_points(side, events);
                }
                let resume = if down_and_back {
                    BoccePhase::DownAndBack
                } else {
                    BoccePhase::Playing
                };
                self.set_phase(resume, events);
                events.push(ScoreEvent::Indicator(Indicator::AddPointsMode(false)));
                true
            }
            BoccePhase::Idle | BoccePhase::Finished => false,
        }
    }

    pub fn cycle_score(&mut self, side: Side, events: &mut Vec<ScoreEvent>) -> bool {
        if !matches!(self.phase, BoccePhase::Measuring { .. }) {
            return false;
        }
        self.team_mut(side).cycle_temp_points(MAX_BALLS_PER_TEAM);
        self.team_mut(side.other()).clear_temp_points();
        events.push(self.score_event(side));
        events.push(self.score_event(side.other()));
        true
    }

    /// Commits the side's measured points as a frame win.
    pub fn add_points(&mut self, side: Side, events: &mut Vec<ScoreEvent>) -> bool {
        let points = self.team_mut(side).commit_temp_points();
        if points == 0 {
            return false;
        }
        self.finish_frame(side, points, events);
        true
    }

    /// Reverses the most recent committed frame. Repeated calls keep walking back.
    /// Only between frames: a frame with balls on the court has to be scored first.
    pub fn remove_points(&mut self, events: &mut Vec<ScoreEvent>) -> bool {
        if !self.phase.in_game() {
            return false;
        }
        if Side::BOTH
            .into_iter()
            .any(|side| self.team_ref(side).balls_thrown() > 0)
        {
            debug!("ignoring undo: frame {} is under way", self.frame);
            return false;
        }
        let Some(record) = self.history.pop() else {
            debug!("ignoring undo: no frame to cancel");
            return false;
        };
        info!("cancelling frame {} ({} points)", self.frame.saturating_sub(1), record.points);
        self.team_mut(record.winner).remove_points(record.points);
        self.team_mut(record.winner.other()).clear_temp_points();
        if let Some(earlier) = self.history.last().copied() {
            self.team_mut(earlier.winner).restore_recent_points(earlier.points);
        }
        self.recent_frame_winner = record.previous_winner;
        self.frame = self.frame.saturating_sub(1).max(1);

        events.push(self.score_event(Side::Home));
        events.push(self.score_event(Side::Away));
        events.push(ScoreEvent::FrameChanged { frame: self.frame });
        true
    }

    // -----------------------------------------------------------------------
    // Game lifecycle
    // -----------------------------------------------------------------------

    /// TIME+OK. Opens a fresh game from Idle or Finished. During down and back
    /// it restarts the clock and unfreezes play, keeping scores and frame count.
    /// A running game is left alone.
    pub fn start_game(&mut self, events: &mut Vec<ScoreEvent>) -> bool {
        match self.phase {
            BoccePhase::Idle | BoccePhase::Finished => {}
            BoccePhase::DownAndBack | BoccePhase::Measuring { down_and_back: true } => {
                self.clock.stop();
                self.clock.start();
                info!("bocce clock restarted at frame {}", self.frame);
                let resume = match self.phase {
                    BoccePhase::DownAndBack => BoccePhase::Playing,
                    _ => BoccePhase::Measuring {
                        down_and_back: false,
                    },
                };
                self.set_phase(resume, events);
                events.push(self.clock.event());
                return true;
            }
            BoccePhase::Playing | BoccePhase::Measuring { down_and_back: false } => {
                debug!("ignoring start: a game is already running");
                return false;
            }
        }

        for side in Side::BOTH {
            self.team_mut(side).reset_for_new_game();
        }
        self.history.clear();
        self.recent_frame_winner = None;
        self.frame = 1;
        self.clock.stop();
        self.clock.start();
        info!("bocce game started, {} minutes", self.clock.minutes_setting());

        self.set_phase(BoccePhase::Playing, events);
        for side in Side::BOTH {
            events.push(self.balls_event(side));
            events.push(self.score_event(side));
        }
        events.push(ScoreEvent::FrameChanged { frame: self.frame });
        events.push(self.clock.event());
        events.push(ScoreEvent::Indicator(Indicator::PallinoNeeded));
        true
    }

    pub fn stop_game(&mut self, events: &mut Vec<ScoreEvent>) -> bool {
        if !self.phase.in_game() {
            return false;
        }
        self.clock.stop();
        self.set_phase(BoccePhase::Finished, events);
        events.push(self.clock.event());
        let result = self.final_score();
        info!(
            "bocce game over: {} {} - {} {}",
            result.home.name, result.home.score, result.away.score, result.away.name
        );
        events.push(ScoreEvent::MatchFinished(result));
        true
    }

    fn on_tick(&mut self, events: &mut Vec<ScoreEvent>) {
        if !self.clock.is_running() {
            return;
        }
        let transition = self.clock.tick();
        events.push(self.clock.event());
        if transition != Some(ClockTransition::Expired) {
            return;
        }
        info!("game clock expired, down and back");
        let next = match self.phase {
            BoccePhase::Playing => BoccePhase::DownAndBack,
            BoccePhase::Measuring { .. } => BoccePhase::Measuring { down_and_back: true },
            other => other,
        };
        self.set_phase(next, events);
        events.push(ScoreEvent::Indicator(Indicator::DownAndBack));
    }

    fn set_phase(&mut self, phase: BoccePhase, events: &mut Vec<ScoreEvent>) {
        if self.phase != phase {
            self.phase = phase;
            events.push(ScoreEvent::BoccePhaseChanged { phase });
        }
    }

    fn balls_event(&self, side: Side) -> ScoreEvent {
        let team = self.team_ref(side);
        ScoreEvent::BallsChanged {
            side,
            balls_thrown: team.balls_thrown(),
            balls_in: team.balls_in(),
            slots: ball_states(team.balls_thrown(), team.balls_in()),
        }
    }

    fn score_event(&self, side: Side) -> ScoreEvent {
        let team = self.team_ref(side);
        ScoreEvent::ScoreChanged {
            side,
            score: team.score(),
            temp_points: team.temp_points(),
        }
    }
}

impl Game for BocceMatch {
    fn sport(&self) -> Sport {
        Sport::Bocce
    }

    fn apply(&mut self, command: Command, events: &mut Vec<ScoreEvent>) {
        match command {
            Command::MarkIn(side) if matches!(self.phase, BoccePhase::Measuring { .. }) => {
                self.cycle_score(side, events);
            }
            Command::MarkIn(side) => {
                self.increment_in(side, events);
            }
            Command::MarkOut(side) => {
                self.increment_out(side, false, events);
            }
            Command::RemoveIn(side) => {
                self.decrement_in(side, events);
            }
            Command::LockInFrame => {
                self.lock_in_frame_score(events);
            }
            Command::ToggleMeasure => {
                self.toggle_measure(events);
            }
            Command::CyclePoints(side) => {
                self.cycle_score(side, events);
            }
            Command::Undo => {
                self.remove_points(events);
            }
            Command::StartClock => {
                self.start_game(events);
            }
            Command::StopClock => {
                self.stop_game(events);
            }
            Command::RequestRename(side) => events.push(ScoreEvent::TeamNameRequested { side }),
            other => debug!("bocce ignores {other:?}"),
        }
    }

    fn tick(&mut self, events: &mut Vec<ScoreEvent>) {
        self.on_tick(events);
    }

    fn rename_team(&mut self, side: Side, name: &str, events: &mut Vec<ScoreEvent>) {
        self.team_mut(side).rename(name);
        events.push(ScoreEvent::TeamRenamed {
            side,
            name: name.to_string(),
        });
    }

    fn team(&self, side: Side) -> &Team {
        self.team_ref(side)
    }

    fn final_score(&self) -> FinalScore {
        let result = |side: Side| TeamResult {
            name: self.team_ref(side).name().to_string(),
            score: self.team_ref(side).score(),
        };
        FinalScore {
            sport: Sport::Bocce,
            home: result(Side::Home),
            away: result(Side::Away),
            rounds_played: self.history.len() as u32,
        }
    }

    fn scoreboard(&self) -> Vec<ScoreEvent> {
        let mut events = vec![ScoreEvent::BoccePhaseChanged { phase: self.phase }];
        for side in Side::BOTH {
            events.push(ScoreEvent::TeamRenamed {
                side,
                name: self.team_ref(side).name().to_string(),
            });
            events.push(self.balls_event(side));
            events.push(self.score_event(side));
        }
        events.push(ScoreEvent::FrameChanged { frame: self.frame });
        events.push(self.clock.event());
        if let BoccePhase::Measuring { .. } = self.phase {
            events.push(ScoreEvent::Indicator(Indicator::AddPointsMode(true)));
        }
        if self.phase == BoccePhase::DownAndBack {
            events.push(ScoreEvent::Indicator(Indicator::DownAndBack));
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashSet, VecDeque};

    fn started() -> BocceMatch {
        let mut m = BocceMatch::new(&MatchConfig::default());
        m.start_game(&mut Vec::new());
        m
    }

    fn counts(m: &BocceMatch, side: Side) -> (u8, u8) {
        let t = m.team(side);
        (t.balls_thrown(), t.balls_in())
    }

    fn press(m: &mut BocceMatch, command: Command) -> Vec<ScoreEvent> {
        let mut events = Vec::new();
        m.apply(command, &mut events);
        events
    }

    #[test]
    fn ball_table_matches_every_combination() {
        use BallState::*;
        assert_eq!(ball_states(0, 0), [NotThrown; 4]);
        assert_eq!(ball_states(1, 0), [Thrown, NotThrown, NotThrown, NotThrown]);
        assert_eq!(ball_states(1, 1), [Landed, NotThrown, NotThrown, NotThrown]);
        assert_eq!(ball_states(3, 2), [Landed, Landed, Thrown, NotThrown]);
        assert_eq!(ball_states(4, 1), [Landed, Thrown, Thrown, Thrown]);
        assert_eq!(ball_states(4, 4), [Landed; 4]);

        for thrown in 0..=MAX_BALLS_PER_TEAM {
            for landed in 0..=thrown {
                let slots = ball_states(thrown, landed);
                let count = |s: BallState| slots.iter().filter(|x| **x == s).count() as u8;
                assert_eq!(count(Landed), landed);
                assert_eq!(count(Thrown), thrown - landed);
                assert_eq!(count(NotThrown), MAX_BALLS_PER_TEAM - thrown);
                // Landed slots always come first, then thrown.
                let mut sorted = slots;
                sorted.sort_by_key(|s| match s {
                    Landed => 0,
                    Thrown => 1,
                    NotThrown => 2,
                });
                assert_eq!(sorted, slots);
            }
        }
    }

    #[test]
    fn presses_before_the_clock_starts_are_ignored() {
        let mut m = BocceMatch::new(&MatchConfig::default());
        assert!(press(&mut m, Command::MarkOut(Side::Home)).is_empty());
        assert!(press(&mut m, Command::MarkIn(Side::Away)).is_empty());
        assert_eq!(counts(&m, Side::Home), (0, 0));
    }

    #[test]
    fn opening_sequence_follows_throw_order() {
        let mut m = started();
        let mut ev = Vec::new();

        // Nothing thrown yet: "in" is never accepted, and away never opens frame 1.
        assert!(!m.increment_in(Side::Away, &mut ev));
        assert!(!m.increment_in(Side::Home, &mut ev));
        assert!(!m.increment_out(Side::Away, false, &mut ev));

        assert!(m.increment_out(Side::Home, false, &mut ev));
        assert_eq!(counts(&m, Side::Home), (1, 0));
        assert_eq!(counts(&m, Side::Away), (0, 0));

        // Away has not thrown: its first ball cannot be marked in.
        assert!(!m.increment_in(Side::Away, &mut ev));
        assert_eq!(counts(&m, Side::Away), (0, 0));

        assert!(m.increment_out(Side::Away, false, &mut ev));
        assert_eq!(counts(&m, Side::Away), (1, 0));

        assert!(m.increment_in(Side::Away, &mut ev));
        assert_eq!(counts(&m, Side::Away), (2, 1));

        // A new "in" displaces the previous leader.
        assert!(m.increment_in(Side::Home, &mut ev));
        assert_eq!(counts(&m, Side::Home), (2, 1));
        assert_eq!(counts(&m, Side::Away), (2, 0));
    }

    #[test]
    fn opener_cannot_mark_in_before_the_other_team_throws() {
        let mut m = started();
        let mut ev = Vec::new();
        m.increment_out(Side::Home, false, &mut ev);
        let before = m.clone();

        ev.clear();
        assert!(!m.increment_in(Side::Home, &mut ev));
        assert!(!m.increment_out(Side::Home, false, &mut ev));
        assert!(ev.is_empty());
        assert_eq!(m, before);
    }

    #[test]
    fn override_records_an_out_regardless_of_order() {
        let mut m = started();
        let mut ev = Vec::new();
        assert!(!m.increment_out(Side::Away, false, &mut ev));
        assert!(m.increment_out(Side::Away, true, &mut ev));
        assert_eq!(counts(&m, Side::Away), (1, 0));
    }

    #[test]
    fn decrement_in_at_zero_is_idempotent() {
        let mut m = started();
        let before = m.clone();
        let mut ev = Vec::new();
        assert!(!m.decrement_in(Side::Home, &mut ev));
        assert!(ev.is_empty());
        assert_eq!(m, before);
    }

    #[test]
    fn lock_in_awards_the_team_with_more_balls_in() {
        let mut m = started();
        m.team_mut(Side::Home).set_balls(4, 3);
        m.team_mut(Side::Away).set_balls(4, 1);
        let mut ev = Vec::new();
        assert!(m.lock_in_frame_score(&mut ev));
        assert_eq!(m.team(Side::Home).score(), 3);
        assert_eq!(m.team(Side::Away).score(), 0);
        assert_eq!(m.recent_frame_winner(), Some(Side::Home));
        assert_eq!(counts(&m, Side::Home), (0, 0));
        assert_eq!(counts(&m, Side::Away), (0, 0));
        assert_eq!(m.frame(), 2);
        assert!(ev.contains(&ScoreEvent::Indicator(Indicator::PallinoNeeded)));
    }

    #[test]
    fn lock_in_needs_every_ball_thrown() {
        let mut m = started();
        m.team_mut(Side::Home).set_balls(4, 2);
        m.team_mut(Side::Away).set_balls(3, 0);
        assert!(!m.lock_in_frame_score(&mut Vec::new()));
        assert_eq!(m.team(Side::Home).score(), 0);
    }

    #[test]
    fn tied_lock_in_asks_for_measurement() {
        let mut m = started();
        m.team_mut(Side::Home).set_balls(4, 0);
        m.team_mut(Side::Away).set_balls(4, 0);
        let before = m.clone();
        let mut ev = Vec::new();
        assert!(!m.lock_in_frame_score(&mut ev));
        assert_eq!(ev, vec![ScoreEvent::Indicator(Indicator::MeasurementNeeded)]);
        assert_eq!(m, before);
    }

    #[test]
    fn four_balls_in_is_a_casino() {
        let mut m = started();
        m.team_mut(Side::Home).set_balls(4, 0);
        m.team_mut(Side::Away).set_balls(4, 4);
        let mut ev = Vec::new();
        m.lock_in_frame_score(&mut ev);
        assert!(ev.contains(&ScoreEvent::Indicator(Indicator::Casino(Side::Away))));
    }

    #[test]
    fn frame_winner_opens_the_next_frame() {
        let mut m = started();
        m.team_mut(Side::Home).set_balls(4, 0);
        m.team_mut(Side::Away).set_balls(4, 2);
        m.lock_in_frame_score(&mut Vec::new());
        assert_eq!(m.opening_side(), Side::Away);

        let mut ev = Vec::new();
        assert!(!m.increment_out(Side::Home, false, &mut ev));
        assert!(!m.increment_in(Side::Home, &mut ev));
        assert!(m.increment_out(Side::Away, false, &mut ev));
        assert_eq!(counts(&m, Side::Away), (1, 0));
    }

    #[test]
    fn measurement_mode_commits_a_frame() {
        let mut m = started();
        press(&mut m, Command::ToggleMeasure);
        assert_eq!(m.phase(), BoccePhase::Measuring { down_and_back: false });

        // The in buttons cycle temp points while measuring.
        press(&mut m, Command::MarkIn(Side::Home));
        press(&mut m, Command::MarkIn(Side::Home));
        assert_eq!(m.team(Side::Home).temp_points(), 2);
        press(&mut m, Command::MarkIn(Side::Away));
        assert_eq!(m.team(Side::Home).temp_points(), 0);
        assert_eq!(m.team(Side::Away).temp_points(), 1);

        let ev = press(&mut m, Command::ToggleMeasure);
        assert_eq!(m.phase(), BoccePhase::Playing);
        assert_eq!(m.team(Side::Away).score(), 1);
        assert_eq!(m.team(Side::Away).recent_points_added(), 1);
        assert_eq!(m.team(Side::Away).temp_points(), 0);
        assert_eq!(m.recent_frame_winner(), Some(Side::Away));
        assert!(ev.contains(&ScoreEvent::FrameChanged { frame: 2 }));
    }

    #[test]
    fn temp_points_wrap_after_four() {
        let mut m = started();
        press(&mut m, Command::ToggleMeasure);
        for _ in 0..5 {
            press(&mut m, Command::CyclePoints(Side::Home));
        }
        assert_eq!(m.team(Side::Home).temp_points(), 0);
        press(&mut m, Command::ToggleMeasure);
        assert_eq!(m.team(Side::Home).score(), 0);
        assert_eq!(m.frame(), 1);
    }

    #[test]
    fn chained_undo_walks_back_frame_by_frame() {
        let mut m = started();
        let score_frame = |m: &mut BocceMatch, side: Side, clicks: usize| {
            press(m, Command::ToggleMeasure);
            for _ in 0..clicks {
                press(m, Command::CyclePoints(side));
            }
            press(m, Command::ToggleMeasure);
        };
        score_frame(&mut m, Side::Home, 2);
        score_frame(&mut m, Side::Away, 3);
        score_frame(&mut m, Side::Home, 1);
        assert_eq!((m.team(Side::Home).score(), m.team(Side::Away).score()), (3, 3));
        assert_eq!(m.frame(), 4);

        press(&mut m, Command::Undo);
        assert_eq!((m.team(Side::Home).score(), m.team(Side::Away).score()), (2, 3));
        assert_eq!(m.recent_frame_winner(), Some(Side::Away));

        press(&mut m, Command::Undo);
        assert_eq!((m.team(Side::Home).score(), m.team(Side::Away).score()), (2, 0));
        assert_eq!(m.recent_frame_winner(), Some(Side::Home));

        press(&mut m, Command::Undo);
        assert_eq!((m.team(Side::Home).score(), m.team(Side::Away).score()), (0, 0));
        assert_eq!(m.recent_frame_winner(), None);
        assert_eq!(m.frame(), 1);

        assert!(press(&mut m, Command::Undo).is_empty());
    }

    #[test]
    fn clock_expiry_freezes_in_and_out() {
        let config = MatchConfig {
            game_minutes: 1,
            ..MatchConfig::default()
        };
        let mut m = BocceMatch::new(&config);
        m.start_game(&mut Vec::new());
        let mut ev = Vec::new();
        for _ in 0..60 {
            m.tick(&mut ev);
        }
        assert_eq!(m.phase(), BoccePhase::DownAndBack);
        assert!(ev.contains(&ScoreEvent::Indicator(Indicator::DownAndBack)));
        assert!(!m.increment_out(Side::Home, false, &mut Vec::new()));

        // Measurement still scores the last frame.
        press(&mut m, Command::ToggleMeasure);
        press(&mut m, Command::CyclePoints(Side::Home));
        press(&mut m, Command::ToggleMeasure);
        assert_eq!(m.team(Side::Home).score(), 1);
        assert_eq!(m.phase(), BoccePhase::DownAndBack);
    }

    #[test]
    fn stop_reports_the_final_score_once() {
        let mut m = started();
        m.team_mut(Side::Home).set_balls(4, 2);
        m.team_mut(Side::Away).set_balls(4, 0);
        m.lock_in_frame_score(&mut Vec::new());
        m.rename_team(Side::Home, "Rollers", &mut Vec::new());

        let ev = press(&mut m, Command::StopClock);
        let finished: Vec<_> = ev
            .iter()
            .filter_map(|e| match e {
                ScoreEvent::MatchFinished(result) => Some(result.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].home.name, "Rollers");
        assert_eq!(finished[0].home.score, 2);
        assert_eq!(finished[0].rounds_played, 1);
        assert_eq!(m.phase(), BoccePhase::Finished);

        assert!(press(&mut m, Command::StopClock).is_empty());
    }

    #[test]
    fn start_is_ignored_while_a_game_runs() {
        let mut m = started();
        m.team_mut(Side::Home).set_balls(4, 2);
        m.team_mut(Side::Away).set_balls(4, 0);
        m.lock_in_frame_score(&mut Vec::new());
        assert!(press(&mut m, Command::StartClock).is_empty());
        assert_eq!(m.team(Side::Home).score(), 2);
        assert_eq!(m.frame(), 2);
        assert_eq!(m.frames_scored(), 1);
    }

    #[test]
    fn start_after_stop_clears_the_previous_game() {
        let mut m = started();
        m.team_mut(Side::Home).set_balls(4, 2);
        m.team_mut(Side::Away).set_balls(4, 0);
        m.lock_in_frame_score(&mut Vec::new());
        press(&mut m, Command::StopClock);
        press(&mut m, Command::StartClock);
        assert_eq!(m.phase(), BoccePhase::Playing);
        assert_eq!(m.team(Side::Home).score(), 0);
        assert_eq!(m.recent_frame_winner(), None);
        assert_eq!(m.frame(), 1);
        assert_eq!(m.frames_scored(), 0);
    }

    #[test]
    fn start_during_down_and_back_keeps_the_score() {
        let config = MatchConfig {
            game_minutes: 1,
            ..MatchConfig::default()
        };
        let mut m = BocceMatch::new(&config);
        m.start_game(&mut Vec::new());
        m.team_mut(Side::Home).set_balls(4, 3);
        m.team_mut(Side::Away).set_balls(4, 0);
        m.lock_in_frame_score(&mut Vec::new());
        for _ in 0..60 {
            m.tick(&mut Vec::new());
        }
        assert_eq!(m.phase(), BoccePhase::DownAndBack);

        press(&mut m, Command::StartClock);
        assert_eq!(m.phase(), BoccePhase::Playing);
        assert!(m.clock().is_running());
        assert_eq!(m.clock().display(), (1, 0));
        assert_eq!(m.team(Side::Home).score(), 3);
        assert_eq!(m.frame(), 2);
        assert!(m.increment_out(Side::Home, false, &mut Vec::new()));
    }

    #[test]
    fn lock_in_is_refused_while_measuring() {
        let mut m = started();
        m.team_mut(Side::Home).set_balls(4, 2);
        m.team_mut(Side::Away).set_balls(4, 0);
        press(&mut m, Command::ToggleMeasure);
        press(&mut m, Command::MarkIn(Side::Home));
        press(&mut m, Command::MarkIn(Side::Home));

        assert!(press(&mut m, Command::LockInFrame).is_empty());
        press(&mut m, Command::ToggleMeasure);

        // The frame is scored once, by measurement.
        assert_eq!(m.team(Side::Home).score(), 2);
        assert_eq!(m.frames_scored(), 1);
        assert_eq!(m.frame(), 2);
        assert_eq!(counts(&m, Side::Home), (0, 0));
    }

    #[test]
    fn undo_waits_until_the_frame_in_play_is_scored() {
        let mut m = started();
        m.team_mut(Side::Home).set_balls(4, 0);
        m.team_mut(Side::Away).set_balls(4, 2);
        m.lock_in_frame_score(&mut Vec::new());
        assert_eq!(m.opening_side(), Side::Away);

        m.increment_out(Side::Away, false, &mut Vec::new());
        let before = m.clone();
        assert!(press(&mut m, Command::Undo).is_empty());
        assert_eq!(m, before);
        assert_eq!(m.opening_side(), Side::Away);

        m.team_mut(Side::Away).set_balls(0, 0);
        assert!(!press(&mut m, Command::Undo).is_empty());
        assert_eq!(m.team(Side::Away).score(), 0);
        assert_eq!(m.opening_side(), Side::Home);
    }

    #[test]
    fn undo_restores_the_earlier_frames_recent_points() {
        let mut m = started();
        m.team_mut(Side::Home).set_balls(4, 3);
        m.team_mut(Side::Away).set_balls(4, 0);
        m.lock_in_frame_score(&mut Vec::new());
        m.team_mut(Side::Home).set_balls(4, 1);
        m.team_mut(Side::Away).set_balls(4, 0);
        m.lock_in_frame_score(&mut Vec::new());
        assert_eq!(m.team(Side::Home).recent_points_added(), 1);

        press(&mut m, Command::Undo);
        assert_eq!(m.team(Side::Home).score(), 3);
        assert_eq!(m.team(Side::Home).recent_points_added(), 3);
    }

    /// Breadth-first walk over every reachable state up to a bounded depth.
    #[test]
    fn ball_counts_stay_ordered_in_every_reachable_state() {
        let commands = [
            Command::MarkIn(Side::Home),
            Command::MarkIn(Side::Away),
            Command::MarkOut(Side::Home),
            Command::MarkOut(Side::Away),
            Command::RemoveIn(Side::Home),
            Command::RemoveIn(Side::Away),
            Command::LockInFrame,
            Command::ToggleMeasure,
            Command::Undo,
        ];
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([(started(), 0usize)]);
        while let Some((m, depth)) = queue.pop_front() {
            for side in Side::BOTH {
                let (thrown, landed) = counts(&m, side);
                assert!(landed <= thrown && thrown <= MAX_BALLS_PER_TEAM, "{m:?}");
            }
            assert!(
                m.team(Side::Home).balls_in() == 0 || m.team(Side::Away).balls_in() == 0,
                "both teams in: {m:?}"
            );
            if depth == 9 {
                continue;
            }
            for command in commands {
                let mut next = m.clone();
                next.apply(command, &mut Vec::new());
                let key = serde_json::to_string(&next).unwrap();
                if seen.insert(key) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
        assert!(seen.len() > 100);
    }
}
