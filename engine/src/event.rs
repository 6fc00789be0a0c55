use crate::bocce::{BallState, BoccePhase};
use crate::clock::ClockMode;
use crate::curling::CurlingPhase;
use crate::{FinalScore, MAX_BALLS_PER_TEAM, Side};
use serde::{Deserialize, Serialize};

/// State-changed notification for the renderer. A renderer that applies
/// every event in order never needs to read match internals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreEvent {
    BallsChanged {
        side: Side,
        balls_thrown: u8,
        balls_in: u8,
        slots: [BallState; MAX_BALLS_PER_TEAM as usize],
    },
    ScoreChanged {
        side: Side,
        score: u32,
        temp_points: u8,
    },
    FrameChanged {
        frame: u32,
    },
    BoccePhaseChanged {
        phase: BoccePhase,
    },
    CurlingPhaseChanged {
        phase: CurlingPhase,
    },
    EndsCursorMoved {
        ends: u8,
    },
    EndChanged {
        end: u8,
    },
    EndPointsChanged {
        side: Side,
        end: u8,
        temp_points: u8,
    },
    EndLocked {
        end: u8,
        home_points: u8,
        away_points: u8,
    },
    EndReopened {
        end: u8,
    },
    StonesChanged {
        side: Side,
        remaining: u8,
    },
    HammerChanged {
        side: Side,
        end: u8,
    },
    TeamRenamed {
        side: Side,
        name: String,
    },
    ClockChanged {
        mode: ClockMode,
        minutes: u32,
        seconds: u32,
        running: bool,
    },
    TeamNameRequested {
        side: Side,
    },
    Indicator(Indicator),
    MatchFinished(FinalScore),
}

/// Named graphics the kiosk shows in its indicator area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indicator {
    /// A new frame is starting and the pallino has to be thrown.
    PallinoNeeded,
    TeamIn(Side),
    /// Every ball of the frame winner scored.
    Casino(Side),
    /// Lock-in hit a tie; the frame has to be measured.
    MeasurementNeeded,
    DownAndBack,
    AddPointsMode(bool),
    /// Points locked in (the "lightning" graphic).
    LockedIn,
    Hammer(Side),
    ClockExpired,
    Reaction(Reaction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reaction {
    TooLong,
    TooShort,
    BadShot,
    GoodShot,
    ShotClockWarning,
}

impl Reaction {
    pub fn label(&self) -> &'static str {
        match self {
            Reaction::TooLong => "Too long!",
            Reaction::TooShort => "Too short!",
            Reaction::BadShot => "Bad shot",
            Reaction::GoodShot => "Good shot!",
            Reaction::ShotClockWarning => "Shot clock!",
        }
    }
}
