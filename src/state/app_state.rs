use scoreboard_engine::{
    BallState, BoccePhase, ClockMode, CurlingPhase, FinalScore, Indicator, MAX_BALLS_PER_TEAM,
    STONES_PER_END, ScoreEvent, Side, Sport,
};

// ---------------------------------------------------------------------------
// Scoreboard view model, rebuilt purely from engine events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TeamPanel {
    pub name: String,
    pub score: u32,
    pub temp_points: u8,
    pub balls: [BallState; MAX_BALLS_PER_TEAM as usize],
    pub stones: u8,
}

impl Default for TeamPanel {
    fn default() -> Self {
        Self {
            name: String::new(),
            score: 0,
            temp_points: 0,
            balls: [BallState::NotThrown; MAX_BALLS_PER_TEAM as usize],
            stones: STONES_PER_END,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndRow {
    pub end: u8,
    pub home_points: u8,
    pub away_points: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockView {
    pub mode: ClockMode,
    pub minutes: u32,
    pub seconds: u32,
    pub running: bool,
}

impl ClockView {
    pub fn label(&self) -> String {
        format!("{:02}:{:02}", self.minutes, self.seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseView {
    Bocce(BoccePhase),
    Curling(CurlingPhase),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scoreboard {
    pub sport: Sport,
    pub teams: [TeamPanel; 2],
    pub phase: PhaseView,
    pub frame: u32,
    pub end: u8,
    pub ends_cursor: Option<u8>,
    pub locked_ends: Vec<EndRow>,
    pub hammer: Option<Side>,
    pub clock: ClockView,
    pub adding_points: bool,
    pub indicator: Option<Indicator>,
    pub down_and_back: bool,
}

impl Scoreboard {
    pub fn new(sport: Sport) -> Self {
        let phase = match sport {
            Sport::Bocce => PhaseView::Bocce(BoccePhase::Idle),
            Sport::Curling => PhaseView::Curling(CurlingPhase::NamingTeams),
        };
        Self {
            sport,
            teams: [TeamPanel::default(), TeamPanel::default()],
            phase,
            frame: 0,
            end: 1,
            ends_cursor: None,
            locked_ends: Vec::new(),
            hammer: None,
            clock: ClockView::default(),
            adding_points: false,
            indicator: None,
            down_and_back: false,
        }
    }

    pub fn team(&self, side: Side) -> &TeamPanel {
        &self.teams[side.index()]
    }

    pub fn apply(&mut self, event: &ScoreEvent) {
        match event {
            ScoreEvent::BallsChanged { side, slots, .. } => {
                self.teams[side.index()].balls = *slots;
            }
            ScoreEvent::ScoreChanged {
                side,
                score,
                temp_points,
            } => {
                let team = &mut self.teams[side.index()];
                team.score = *score;
                team.temp_points = *temp_points;
            }
            ScoreEvent::FrameChanged { frame } => self.frame = *frame,
            ScoreEvent::BoccePhaseChanged { phase } => {
                self.phase = PhaseView::Bocce(*phase);
                self.adding_points = matches!(phase, BoccePhase::Measuring { .. });
                self.down_and_back = matches!(
                    phase,
                    BoccePhase::DownAndBack | BoccePhase::Measuring { down_and_back: true }
                );
            }
            ScoreEvent::CurlingPhaseChanged { phase } => {
                self.phase = PhaseView::Curling(*phase);
                self.adding_points = *phase == CurlingPhase::InProgress { adding_points: true };
                if let CurlingPhase::ChoosingEnds { cursor } = phase {
                    self.ends_cursor = Some(*cursor);
                    self.locked_ends.clear();
                    self.hammer = None;
                    self.end = 1;
                }
            }
            ScoreEvent::EndsCursorMoved { ends } => self.ends_cursor = Some(*ends),
            ScoreEvent::EndChanged { end } => {
                if *end == 1 {
                    self.locked_ends.clear();
                }
                self.end = *end;
                self.hammer = None;
            }
            ScoreEvent::EndPointsChanged {
                side,
                end,
                temp_points,
            } => {
                if *end == self.end {
                    self.teams[side.index()].temp_points = *temp_points;
                }
            }
            ScoreEvent::EndLocked {
                end,
                home_points,
                away_points,
            } => {
                self.locked_ends.retain(|row| row.end != *end);
                self.locked_ends.push(EndRow {
                    end: *end,
                    home_points: *home_points,
                    away_points: *away_points,
                });
                self.locked_ends.sort_by_key(|row| row.end);
            }
            ScoreEvent::EndReopened { end } => {
                self.locked_ends.retain(|row| row.end < *end);
            }
            ScoreEvent::StonesChanged { side, remaining } => {
                self.teams[side.index()].stones = *remaining;
            }
            ScoreEvent::HammerChanged { side, end } => {
                if *end == self.end {
                    self.hammer = Some(*side);
                }
            }
            ScoreEvent::TeamRenamed { side, name } => {
                self.teams[side.index()].name = name.clone();
            }
            ScoreEvent::ClockChanged {
                mode,
                minutes,
                seconds,
                running,
            } => {
                self.clock = ClockView {
                    mode: *mode,
                    minutes: *minutes,
                    seconds: *seconds,
                    running: *running,
                };
            }
            ScoreEvent::Indicator(Indicator::AddPointsMode(on)) => {
                self.adding_points = *on;
                self.indicator = Some(Indicator::AddPointsMode(*on));
            }
            ScoreEvent::Indicator(indicator) => self.indicator = Some(*indicator),
            ScoreEvent::TeamNameRequested { .. } | ScoreEvent::MatchFinished(_) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Team name entry
// ---------------------------------------------------------------------------

pub const MAX_NAME_LEN: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    pub side: Side,
    pub input: String,
}

impl NameEntry {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            input: String::new(),
        }
    }

    pub fn push(&mut self, c: char) {
        if !c.is_control() && self.input.chars().count() < MAX_NAME_LEN {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

pub struct AppState {
    pub board: Scoreboard,
    pub show_logs: bool,
    pub name_entry: Option<NameEntry>,
    pub status: Option<String>,
    pub last_error: Option<String>,
    pub last_result: Option<FinalScore>,
}

impl AppState {
    pub fn new(sport: Sport) -> Self {
        Self {
            board: Scoreboard::new(sport),
            show_logs: false,
            name_entry: None,
            status: None,
            last_error: None,
            last_result: None,
        }
    }
}
