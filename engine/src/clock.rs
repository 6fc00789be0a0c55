use crate::event::ScoreEvent;
use serde::{Deserialize, Serialize};

const MAX_MINUTES: u32 = 99;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockMode {
    #[default]
    CountDown,
    CountUp,
}

/// What a tick changed beyond the displayed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTransition {
    /// Count-down reached zero. Reported once per run.
    Expired,
    /// Count-up hit the display limit and paused.
    Capped,
}

/// Game clock advanced by an external once-per-second tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    default_minutes: u8,
    minutes: u8,
    mode: ClockMode,
    seconds: u32,
    running: bool,
    expired: bool,
    /// After expiry, keep counting up instead of freezing at zero.
    overtime_counts_up: bool,
}

impl GameClock {
    pub fn new(default_minutes: u8, overtime_counts_up: bool) -> Self {
        let minutes = default_minutes.clamp(1, MAX_MINUTES as u8);
        Self {
            default_minutes: minutes,
            minutes,
            mode: ClockMode::CountDown,
            seconds: u32::from(minutes) * 60,
            running: false,
            expired: false,
            overtime_counts_up,
        }
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn minutes_setting(&self) -> u8 {
        self.minutes
    }

    /// Displayed (minutes, seconds).
    pub fn display(&self) -> (u32, u32) {
        (self.seconds / 60, self.seconds % 60)
    }

    pub fn start(&mut self) {
        self.seconds = match self.mode {
            ClockMode::CountDown => u32::from(self.minutes) * 60,
            ClockMode::CountUp => 0,
        };
        self.expired = false;
        self.running = true;
    }

    /// Stops the clock and restores the default count-down setting.
    pub fn stop(&mut self) {
        self.running = false;
        self.expired = false;
        self.mode = ClockMode::CountDown;
        self.minutes = self.default_minutes;
        self.seconds = u32::from(self.default_minutes) * 60;
    }

    pub fn tick(&mut self) -> Option<ClockTransition> {
        if !self.running {
            return None;
        }
        match self.mode {
            ClockMode::CountDown => {
                self.seconds = self.seconds.saturating_sub(1);
                if self.seconds > 0 {
                    return None;
                }
                self.expired = true;
                if self.overtime_counts_up {
                    self.mode = ClockMode::CountUp;
                } else {
                    self.running = false;
                }
                Some(ClockTransition::Expired)
            }
            ClockMode::CountUp => {
                self.seconds += 1;
                if self.seconds < MAX_MINUTES * 60 {
                    return None;
                }
                self.seconds = 0;
                self.running = false;
                Some(ClockTransition::Capped)
            }
        }
    }

    /// Only meaningful before the clock runs in count-down mode.
    pub fn adjust_minutes(&mut self, delta: i8) -> bool {
        if self.running || self.mode != ClockMode::CountDown {
            return false;
        }
        let next = (i16::from(self.minutes) + i16::from(delta)).clamp(1, MAX_MINUTES as i16) as u8;
        if next == self.minutes {
            return false;
        }
        self.minutes = next;
        self.seconds = u32::from(next) * 60;
        true
    }

    pub fn set_mode(&mut self, mode: ClockMode) -> bool {
        if self.running {
            return false;
        }
        self.mode = mode;
        match mode {
            ClockMode::CountDown => {
                self.minutes = self.default_minutes;
                self.seconds = u32::from(self.minutes) * 60;
            }
            ClockMode::CountUp => {
                self.minutes = 0;
                self.seconds = 0;
            }
        }
        true
    }

    pub fn event(&self) -> ScoreEvent {
        let (minutes, seconds) = self.display();
        ScoreEvent::ClockChanged {
            mode: self.mode,
            minutes,
            seconds,
            running: self.running,
        }
    }
}
