use crate::app::App;
use crate::state::messages::RecordRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use scoreboard_engine::Button;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Keyboard stand-in for the remote control.
pub fn remote_button(code: KeyCode) -> Option<Button> {
    let button = match code {
        Char('s') => Button::Pwr,
        Char('a') => Button::A,
        Char('b') => Button::B,
        Char('c') => Button::C,
        KeyCode::Enter => Button::Ok,
        KeyCode::Up => Button::DUp,
        KeyCode::Down => Button::DDown,
        KeyCode::Left => Button::DLeft,
        KeyCode::Right => Button::DRight,
        Char('t') => Button::Time,
        Char('p') => Button::Stop,
        // Home in / remove / out
        Char('+') | Char('=') => Button::VolUp,
        Char('-') => Button::VolDown,
        Char('h') => Button::Check,
        // Away in / remove / out
        Char(']') => Button::ChUp,
        Char('[') => Button::ChDown,
        Char('j') => Button::X,
        Char('l') => Button::Ati,
        Char('m') => Button::Play,
        Char('u') => Button::Rewind,
        Char(c @ '0'..='9') => Button::digit(c.to_digit(10)? as u8)?,
        _ => return None,
    };
    Some(button)
}

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    record_requests: &mpsc::Sender<RecordRequest>,
) {
    let mut guard = app.lock().await;

    if guard.is_entering_name() {
        match (key_event.code, key_event.modifiers) {
            (Char('c'), KeyModifiers::CONTROL) => {
                crate::cleanup_terminal();
                std::process::exit(0);
            }
            (KeyCode::Enter, _) => guard.name_entry_submit(),
            (KeyCode::Esc, _) => guard.name_entry_cancel(),
            (KeyCode::Backspace, _) => guard.name_entry_backspace(),
            (Char(c), _) => guard.name_entry_push(c),
            _ => {}
        }
        return;
    }

    let finished = match (key_event.code, key_event.modifiers) {
        (Char('q'), _) | (Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }
        (Char('"'), _) => {
            guard.toggle_show_logs();
            return;
        }
        (Char('f'), _) => {
            guard.toggle_full_screen();
            return;
        }
        (code, _) => match remote_button(code) {
            Some(button) => guard.press(button),
            None => return,
        },
    };
    drop(guard);

    for result in finished {
        let _ = record_requests
            .send(RecordRequest::SaveFinalScore { result })
            .await;
    }
}
