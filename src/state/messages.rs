use crossterm::event::KeyEvent;
use scoreboard_engine::FinalScore;

#[derive(Debug, Clone)]
pub enum RecordRequest {
    SaveFinalScore { result: FinalScore },
}

#[derive(Debug)]
pub enum RecordResponse {
    Saved { destination: String },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    ClockTick,
}
