use crate::clock::{ClockMode, ClockTransition, GameClock};
use crate::event::{Indicator, Reaction, ScoreEvent};
use crate::router::{Command, Direction};
use crate::session::Game;
use crate::team::Team;
use crate::{FinalScore, MAX_ENDS, MatchConfig, STONES_PER_END, Side, Sport, TeamResult};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// One team's entry for one end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct End {
    end_number: u8,
    hammer: bool,
    temp_points: u8,
    points: Option<u8>,
    locked: bool,
}

impl End {
    fn new(end_number: u8) -> Self {
        Self {
            end_number,
            hammer: false,
            temp_points: 0,
            points: None,
            locked: false,
        }
    }

    pub fn end_number(&self) -> u8 {
        self.end_number
    }

    pub fn hammer(&self) -> bool {
        self.hammer
    }

    pub fn temp_points(&self) -> u8 {
        self.temp_points
    }

    pub fn points(&self) -> Option<u8> {
        self.points
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    fn lock(&mut self, points: u8) {
        if self.locked {
            return;
        }
        self.points = Some(points);
        self.temp_points = 0;
        self.locked = true;
    }

    fn reopen(&mut self) {
        self.points = None;
        self.temp_points = 0;
        self.locked = false;
    }
}

/// A team's ends plus the running total of locked points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    ends: Vec<End>,
    current_end: u8,
    score: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self {
            ends: (1..=MAX_ENDS).map(End::new).collect(),
            current_end: 1,
            score: 0,
        }
    }
}

impl Score {
    pub fn ends(&self) -> &[End] {
        &self.ends
    }

    /// 1-based lookup; `None` outside `1..=MAX_ENDS`.
    pub fn end(&self, end_number: u8) -> Option<&End> {
        let index = usize::from(end_number).checked_sub(1)?;
        self.ends.get(index)
    }

    fn end_mut(&mut self, end_number: u8) -> Option<&mut End> {
        let index = usize::from(end_number).checked_sub(1)?;
        self.ends.get_mut(index)
    }

    pub fn current_end(&self) -> u8 {
        self.current_end
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Sum of every locked end.
    pub fn total(&self) -> u32 {
        self.ends
            .iter()
            .filter(|end| end.locked)
            .filter_map(|end| end.points)
            .map(u32::from)
            .sum()
    }

    fn recompute(&mut self) -> u32 {
        self.score = self.total();
        self.score
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurlingPhase {
    ChoosingEnds { cursor: u8 },
    NamingTeams,
    InProgress { adding_points: bool },
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurlingMatch {
    teams: [Team; 2],
    scores: [Score; 2],
    stones: [u8; 2],
    num_ends: u8,
    default_ends: u8,
    phase: CurlingPhase,
    clock: GameClock,
}

impl CurlingMatch {
    pub fn new(config: &MatchConfig) -> Self {
        let default_ends = config.default_ends.clamp(1, MAX_ENDS);
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
            scores: [Score::default(), Score::default()],
            stones: [STONES_PER_END; 2],
            num_ends: default_ends,
            default_ends,
            phase: CurlingPhase::ChoosingEnds {
                cursor: default_ends,
            },
            clock: GameClock::new(config.game_minutes, true),
        }
    }

    pub fn phase(&self) -> CurlingPhase {
        self.phase
    }

    pub fn num_ends(&self) -> u8 {
        self.num_ends
    }

    pub fn current_end(&self) -> u8 {
        self.scores[0].current_end
    }

    pub fn score(&self, side: Side) -> &Score {
        &self.scores[side.index()]
    }

    pub fn stones(&self, side: Side) -> u8 {
        self.stones[side.index()]
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// The side holding the hammer for the current end, once known.
    pub fn hammer(&self) -> Option<Side> {
        let end = self.current_end();
        Side::BOTH
            .into_iter()
            .find(|side| self.score(*side).end(end).is_some_and(End::hammer))
    }

    fn in_progress(&self) -> bool {
        matches!(self.phase, CurlingPhase::InProgress { .. })
    }

    // -----------------------------------------------------------------------
    // Setup
    // -----------------------------------------------------------------------

    pub fn choose_ends(&mut self, delta: i8, events: &mut Vec<ScoreEvent>) -> bool {
        let CurlingPhase::ChoosingEnds { cursor } = self.phase else {
            return false;
        };
        let span = i16::from(MAX_ENDS);
        let next = (i16::from(cursor) - 1 + i16::from(delta)).rem_euclid(span) + 1;
        let cursor = next as u8;
        self.phase = CurlingPhase::ChoosingEnds { cursor };
        events.push(ScoreEvent::EndsCursorMoved { ends: cursor });
        true
    }

    pub fn confirm_ends(&mut self, events: &mut Vec<ScoreEvent>) -> bool {
        let CurlingPhase::ChoosingEnds { cursor } = self.phase else {
            return false;
        };
        self.num_ends = cursor;
        info!("curling match set to {cursor} ends");
        self.set_phase(CurlingPhase::NamingTeams, events);
        true
    }

    pub fn start_match(&mut self, events: &mut Vec<ScoreEvent>) -> bool {
        if self.phase != CurlingPhase::NamingTeams {
            return false;
        }
        self.scores = [Score::default(), Score::default()];
        self.stones = [STONES_PER_END; 2];
        for side in Side::BOTH {
            self.teams[side.index()].reset_for_new_game();
        }
        info!(
            "curling match started: {} vs {}",
            self.teams[0].name(),
            self.teams[1].name()
        );
        self.set_phase(CurlingPhase::InProgress { adding_points: false }, events);
        events.push(ScoreEvent::EndChanged { end: 1 });
        for side in Side::BOTH {
            events.push(self.score_event(side));
            events.push(self.stones_event(side));
        }
        true
    }

    fn adjust_clock(&mut self, direction: Direction, events: &mut Vec<ScoreEvent>) {
        let changed = match direction {
            Direction::Up => self.clock.adjust_minutes(1),
            Direction::Down => self.clock.adjust_minutes(-1),
            Direction::Left => self.clock.set_mode(ClockMode::CountDown),
            Direction::Right => self.clock.set_mode(ClockMode::CountUp),
        };
        if changed {
            events.push(self.clock.event());
        }
    }

    // -----------------------------------------------------------------------
    // Ends
    // -----------------------------------------------------------------------

    pub fn cycle_end_points(&mut self, side: Side, events: &mut Vec<ScoreEvent>) -> bool {
        if self.phase != (CurlingPhase::InProgress { adding_points: true }) {
            return false;
        }
        let end = self.current_end();
        let Some(entry) = self.scores[side.index()].end_mut(end) else {
            return false;
        };
        entry.temp_points = if entry.temp_points >= STONES_PER_END {
            0
        } else {
            entry.temp_points + 1
        };
        if let Some(other) = self.scores[side.other().index()].end_mut(end) {
            other.temp_points = 0;
        }
        for s in Side::BOTH {
            events.push(self.end_points_event(s, end));
        }
        true
    }

    /// Locks the current end with `side`'s temp points; the other team scores 0.
    /// Zero points is a blank end and the hammer stays where it is.
    pub fn lock_in_end(&mut self, side: Side, events: &mut Vec<ScoreEvent>) -> bool {
        if !self.in_progress() {
            return false;
        }
        let end = self.current_end();
        let Some(points) = self.score(side).end(end).map(End::temp_points) else {
            return false;
        };
        let holder = self.hammer();

        for s in Side::BOTH {
            if let Some(entry) = self.scores[s.index()].end_mut(end) {
                entry.lock(if s == side { points } else { 0 });
            }
        }
        for s in Side::BOTH {
            let total = self.scores[s.index()].recompute();
            self.teams[s.index()].set_score(total);
        }
        let (home_points, away_points) = match side {
            Side::Home => (points, 0),
            Side::Away => (0, points),
        };
        info!("end {end} locked: {home_points}-{away_points}");
        events.push(ScoreEvent::EndLocked {
            end,
            home_points,
            away_points,
        });
        events.push(ScoreEvent::Indicator(Indicator::LockedIn));
        for s in Side::BOTH {
            events.push(self.score_event(s));
        }

        let next = end + 1;
        let next_hammer = if points > 0 { Some(side.other()) } else { holder };
        if let Some(hammer) = next_hammer {
            self.place_hammer(hammer, next);
        }

        for score in &mut self.scores {
            score.current_end = next;
        }
        self.stones = [STONES_PER_END; 2];
        for s in Side::BOTH {
            events.push(self.stones_event(s));
        }

        if next > self.num_ends {
            self.clock.stop();
            self.set_phase(CurlingPhase::Finished, events);
            events.push(self.clock.event());
            events.push(ScoreEvent::MatchFinished(self.final_score()));
        } else {
            self.set_phase(CurlingPhase::InProgress { adding_points: false }, events);
            events.push(ScoreEvent::EndChanged { end: next });
            if let Some(hammer) = next_hammer {
                events.push(ScoreEvent::HammerChanged { side: hammer, end: next });
            }
        }
        true
    }

    fn place_hammer(&mut self, side: Side, end: u8) {
        for s in Side::BOTH {
            if let Some(entry) = self.scores[s.index()].end_mut(end) {
                entry.hammer = s == side;
            }
        }
    }

    fn toggle_add_points(&mut self, events: &mut Vec<ScoreEvent>) {
        match self.phase {
            CurlingPhase::InProgress {
                adding_points: false,
            } => {
                self.set_phase(CurlingPhase::InProgress { adding_points: true }, events);
                events.push(ScoreEvent::Indicator(Indicator::AddPointsMode(true)));
            }
            CurlingPhase::InProgress {
                adding_points: true,
            } => {
                let end = self.current_end();
                let scorer = Side::BOTH
                    .into_iter()
                    .find(|s| self.score(*s).end(end).is_some_and(|e| e.temp_points > 0))
                    .unwrap_or(Side::Home);
                self.lock_in_end(scorer, events);
                events.push(ScoreEvent::Indicator(Indicator::AddPointsMode(false)));
            }
            _ => {}
        }
    }

    /// Reopens the previous end. Repeated calls keep walking back toward end 1.
    pub fn reopen_previous_end(&mut self, events: &mut Vec<ScoreEvent>) -> bool {
        if self.phase != (CurlingPhase::InProgress { adding_points: false }) {
            return false;
        }
        let current = self.current_end();
        if current <= 1 {
            debug!("ignoring undo: no end to reopen");
            return false;
        }
        let previous = current - 1;
        for score in &mut self.scores {
            if let Some(entry) = score.end_mut(previous) {
                entry.reopen();
            }
            if let Some(entry) = score.end_mut(current) {
                entry.hammer = false;
                entry.temp_points = 0;
            }
            score.current_end = previous;
        }
        for s in Side::BOTH {
            let total = self.scores[s.index()].recompute();
            self.teams[s.index()].set_score(total);
        }
        self.stones = [STONES_PER_END; 2];
        info!("end {previous} reopened");

        events.push(ScoreEvent::EndReopened { end: previous });
        events.push(ScoreEvent::EndChanged { end: previous });
        if let Some(side) = self.hammer() {
            events.push(ScoreEvent::HammerChanged { side, end: previous });
        }
        for s in Side::BOTH {
            events.push(self.score_event(s));
            events.push(self.end_points_event(s, previous));
            events.push(self.stones_event(s));
        }
        true
    }

    pub fn throw_stone(&mut self, side: Side, events: &mut Vec<ScoreEvent>) -> bool {
        if !self.in_progress() {
            return false;
        }
        let first_stone = self.stones == [STONES_PER_END; 2];
        let remaining = &mut self.stones[side.index()];
        if *remaining == 0 {
            return false;
        }
        *remaining -= 1;
        events.push(self.stones_event(side));

        // End 1 has no previous end to decide the hammer: whoever throws first cedes it.
        if first_stone && self.current_end() == 1 && self.hammer().is_none() {
            let hammer = side.other();
            self.place_hammer(hammer, 1);
            events.push(ScoreEvent::HammerChanged { side: hammer, end: 1 });
            events.push(ScoreEvent::Indicator(Indicator::Hammer(hammer)));
        }
        true
    }

    /// Back to end selection with the same team names.
    pub fn reset(&mut self, events: &mut Vec<ScoreEvent>) {
        self.scores = [Score::default(), Score::default()];
        self.stones = [STONES_PER_END; 2];
        for team in &mut self.teams {
            team.reset_for_new_game();
        }
        self.clock.stop();
        self.set_phase(
            CurlingPhase::ChoosingEnds {
                cursor: self.default_ends,
            },
            events,
        );
        events.push(ScoreEvent::EndsCursorMoved {
            ends: self.default_ends,
        });
        for side in Side::BOTH {
            events.push(self.score_event(side));
        }
        events.push(self.clock.event());
    }

    // -----------------------------------------------------------------------
    // Clock
    // -----------------------------------------------------------------------

    fn clock_allowed(&self) -> bool {
        matches!(
            self.phase,
            CurlingPhase::NamingTeams | CurlingPhase::InProgress { .. }
        )
    }

    fn on_tick(&mut self, events: &mut Vec<ScoreEvent>) {
        if !self.clock.is_running() {
            return;
        }
        let transition = self.clock.tick();
        events.push(self.clock.event());
        if transition == Some(ClockTransition::Expired) {
            info!("curling clock expired, counting overtime");
            events.push(ScoreEvent::Indicator(Indicator::ClockExpired));
        }
    }

    fn set_phase(&mut self, phase: CurlingPhase, events: &mut Vec<ScoreEvent>) {
        if self.phase != phase {
            self.phase = phase;
            events.push(ScoreEvent::CurlingPhaseChanged { phase });
        }
    }

    fn score_event(&self, side: Side) -> ScoreEvent {
        let end = self.current_end();
        ScoreEvent::ScoreChanged {
            side,
            score: self.teams[side.index()].score(),
            temp_points: self.score(side).end(end).map_or(0, End::temp_points),
        }
    }

    fn end_points_event(&self, side: Side, end: u8) -> ScoreEvent {
        ScoreEvent::EndPointsChanged {
            side,
            end,
            temp_points: self.score(side).end(end).map_or(0, End::temp_points),
        }
    }

    fn stones_event(&self, side: Side) -> ScoreEvent {
        ScoreEvent::StonesChanged {
            side,
            remaining: self.stones(side),
        }
    }
}

impl Game for CurlingMatch {
    fn sport(&self) -> Sport {
        Sport::Curling
    }

    fn apply(&mut self, command: Command, events: &mut Vec<ScoreEvent>) {
        match (self.phase, command) {
            (CurlingPhase::ChoosingEnds { .. }, Command::Nav(Direction::Left)) => {
                self.choose_ends(-1, events);
            }
            (CurlingPhase::ChoosingEnds { .. }, Command::Nav(Direction::Right)) => {
                self.choose_ends(1, events);
            }
            (CurlingPhase::ChoosingEnds { .. }, Command::Confirm) => {
                self.confirm_ends(events);
            }
            (CurlingPhase::NamingTeams, Command::Nav(direction)) => {
                self.adjust_clock(direction, events);
            }
            (CurlingPhase::NamingTeams, Command::Power) => {
                self.start_match(events);
            }
            (CurlingPhase::InProgress { .. }, Command::Power) => self.toggle_add_points(events),
            (CurlingPhase::InProgress { .. }, Command::CyclePoints(side)) => {
                self.cycle_end_points(side, events);
            }
            (CurlingPhase::InProgress { .. }, Command::ThrowStone(side)) => {
                self.throw_stone(side, events);
            }
            (CurlingPhase::InProgress { .. }, Command::Undo) => {
                self.reopen_previous_end(events);
            }
            (CurlingPhase::InProgress { .. }, Command::Nav(direction)) => {
                let reaction = match direction {
                    Direction::Up => Reaction::TooLong,
                    Direction::Down => Reaction::TooShort,
                    Direction::Left => Reaction::BadShot,
                    Direction::Right => Reaction::GoodShot,
                };
                events.push(ScoreEvent::Indicator(Indicator::Reaction(reaction)));
            }
            (CurlingPhase::InProgress { .. }, Command::Confirm) => {
                events.push(ScoreEvent::Indicator(Indicator::Reaction(
                    Reaction::ShotClockWarning,
                )));
            }
            (_, Command::React(reaction)) if self.in_progress() => {
                events.push(ScoreEvent::Indicator(Indicator::Reaction(reaction)));
            }
            (CurlingPhase::Finished, Command::Power) => self.reset(events),
            (
                CurlingPhase::ChoosingEnds { .. } | CurlingPhase::NamingTeams,
                Command::RequestRename(side),
            ) => events.push(ScoreEvent::TeamNameRequested { side }),
            (_, Command::StartClock) if self.clock_allowed() => {
                self.clock.start();
                events.push(self.clock.event());
            }
            (_, Command::StopClock) if self.clock_allowed() => {
                self.clock.stop();
                events.push(self.clock.event());
            }
            (phase, other) => debug!("curling ignores {other:?} while {phase:?}"),
        }
    }

    fn tick(&mut self, events: &mut Vec<ScoreEvent>) {
        self.on_tick(events);
    }

    fn rename_team(&mut self, side: Side, name: &str, events: &mut Vec<ScoreEvent>) {
        self.teams[side.index()].rename(name);
        events.push(ScoreEvent::TeamRenamed {
            side,
            name: name.to_string(),
        });
    }

    fn team(&self, side: Side) -> &Team {
        &self.teams[side.index()]
    }

    fn final_score(&self) -> FinalScore {
        let result = |side: Side| TeamResult {
            name: self.teams[side.index()].name().to_string(),
            score: self.teams[side.index()].score(),
        };
        let rounds_played = self.scores[0].ends.iter().filter(|e| e.locked).count() as u32;
        FinalScore {
            sport: Sport::Curling,
            home: result(Side::Home),
            away: result(Side::Away),
            rounds_played,
        }
    }

    fn scoreboard(&self) -> Vec<ScoreEvent> {
        let mut events = vec![ScoreEvent::CurlingPhaseChanged { phase: self.phase }];
        let ends = match self.phase {
            CurlingPhase::ChoosingEnds { cursor } => cursor,
            _ => self.num_ends,
        };
        events.push(ScoreEvent::EndsCursorMoved { ends });
        for side in Side::BOTH {
            events.push(ScoreEvent::TeamRenamed {
                side,
                name: self.teams[side.index()].name().to_string(),
            });
            events.push(self.score_event(side));
            events.push(self.stones_event(side));
        }
        for end in self.scores[0].ends.iter().filter(|e| e.locked) {
            let n = end.end_number;
            let points = |side: Side| self.score(side).end(n).and_then(End::points).unwrap_or(0);
            events.push(ScoreEvent::EndLocked {
                end: n,
                home_points: points(Side::Home),
                away_points: points(Side::Away),
            });
        }
        if self.in_progress() {
            let end = self.current_end();
            events.push(ScoreEvent::EndChanged { end });
            for side in Side::BOTH {
                events.push(self.end_points_event(side, end));
            }
            if let Some(side) = self.hammer() {
                events.push(ScoreEvent::HammerChanged { side, end });
            }
        }
        if self.phase == (CurlingPhase::InProgress { adding_points: true }) {
            events.push(ScoreEvent::Indicator(Indicator::AddPointsMode(true)));
        }
        events.push(self.clock.event());
        events
    }
}
