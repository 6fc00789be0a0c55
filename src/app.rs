use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, NameEntry, Scoreboard};
use crate::state::messages::RecordResponse;
use log::{info, warn};
use scoreboard_engine::{Button, FinalScore, ScoreEvent, Session};
use std::path::Path;

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    pub session: Session,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let session = if settings.resume {
            resume_session(&settings)
        } else {
            Session::new(settings.sport, &settings.match_config)
        };

        let mut app = Self {
            state: AppState::new(settings.sport),
            settings,
            session,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app.refresh_board();
        app
    }

    /// Rebuilds the whole board from the session, e.g. after a restore.
    pub fn refresh_board(&mut self) {
        let mut board = Scoreboard::new(self.session.sport());
        for event in self.session.scoreboard() {
            board.apply(&event);
        }
        self.state.board = board;
    }

    // -----------------------------------------------------------------------
    // Engine input, called from main_ui_loop and the key handler
    // -----------------------------------------------------------------------

    /// Feeds one remote button to the engine. Returns any results to record.
    pub fn press(&mut self, button: Button) -> Vec<FinalScore> {
        let events = self.session.handle_button(button);
        let finished = self.apply_events(events);
        self.persist();
        finished
    }

    pub fn on_clock_tick(&mut self) -> Vec<FinalScore> {
        let events = self.session.tick();
        self.apply_events(events)
    }

    fn apply_events(&mut self, events: Vec<ScoreEvent>) -> Vec<FinalScore> {
        let mut finished = Vec::new();
        for event in events {
            self.state.board.apply(&event);
            match event {
                ScoreEvent::TeamNameRequested { side } => {
                    self.state.name_entry = Some(NameEntry::new(side));
                }
                ScoreEvent::MatchFinished(result) => {
                    self.state.status = Some(format!(
                        "Final: {} {} - {} {}",
                        result.home.name, result.home.score, result.away.score, result.away.name
                    ));
                    self.state.last_result = Some(result.clone());
                    finished.push(result);
                }
                _ => {}
            }
        }
        finished
    }

    // -----------------------------------------------------------------------
    // Team name entry
    // -----------------------------------------------------------------------

    pub fn is_entering_name(&self) -> bool {
        self.state.name_entry.is_some()
    }

    pub fn name_entry_push(&mut self, c: char) {
        if let Some(entry) = self.state.name_entry.as_mut() {
            entry.push(c);
        }
    }

    pub fn name_entry_backspace(&mut self) {
        if let Some(entry) = self.state.name_entry.as_mut() {
            entry.backspace();
        }
    }

    pub fn name_entry_submit(&mut self) {
        let Some(entry) = self.state.name_entry.take() else {
            return;
        };
        let events = self.session.rename_team(entry.side, &entry.input);
        self.apply_events(events);
        self.persist();
    }

    pub fn name_entry_cancel(&mut self) {
        self.state.name_entry = None;
    }

    // -----------------------------------------------------------------------
    // View toggles and worker responses
    // -----------------------------------------------------------------------

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn on_record_response(&mut self, response: RecordResponse) {
        match response {
            RecordResponse::Saved { destination } => {
                self.state.last_error = None;
                self.state.status = Some(match self.state.status.take() {
                    Some(status) => format!("{status} (saved to {destination})"),
                    None => format!("Score saved to {destination}"),
                });
            }
            RecordResponse::Error { message } => self.state.last_error = Some(message),
        }
    }

    // -----------------------------------------------------------------------
    // Session snapshot for --resume
    // -----------------------------------------------------------------------

    fn persist(&mut self) {
        if let Err(e) = self.save_snapshot() {
            warn!("{e}");
            self.state.last_error = Some(e);
        }
    }

    pub fn save_snapshot(&self) -> Result<(), String> {
        let path = self.settings.snapshot_path(self.session.sport());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| format!("create dir failed: {e}"))?;
        }
        let payload = self
            .session
            .snapshot()
            .map_err(|e| format!("serialize session failed: {e}"))?;
        std::fs::write(&path, payload).map_err(|e| format!("write session failed: {e}"))?;
        Ok(())
    }
}

fn resume_session(settings: &AppSettings) -> Session {
    let path = settings.snapshot_path(settings.sport);
    match load_snapshot(&path) {
        Ok(session) if session.sport() == settings.sport => {
            info!("resumed {} session from {}", settings.sport, path.display());
            session
        }
        Ok(_) => {
            warn!("{} holds a different game, starting fresh", path.display());
            Session::new(settings.sport, &settings.match_config)
        }
        Err(e) => {
            warn!("{e}, starting fresh");
            Session::new(settings.sport, &settings.match_config)
        }
    }
}

pub fn load_snapshot(path: &Path) -> Result<Session, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("read session failed: {e}"))?;
    Session::restore(&content).map_err(|e| format!("parse session failed: {e}"))
}
