mod app;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{RecordRequest, RecordResponse, UiEvent};
use crate::state::recorder::ScoreRecorder;
use crate::state::ticker::ClockTicker;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    let settings = match AppSettings::load() {
        Ok(settings) => settings,
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal();

    tui_logger::init_logger(log::LevelFilter::Info)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let sink = settings.sink.clone();
    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (record_req_tx, record_req_rx) = mpsc::channel::<RecordRequest>(100);
    let (record_resp_tx, record_resp_rx) = mpsc::channel::<RecordResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Score recorder thread
    let recorder = ScoreRecorder::new(sink, record_req_rx, record_resp_tx);
    let recorder_task = tokio::spawn(recorder.run());

    // Game clock thread (every 1s)
    let ticker = ClockTicker::new(ui_event_tx.clone());
    let ticker_task = tokio::spawn(ticker.run());

    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, record_req_tx, record_resp_rx).await;

    input_handler.abort();
    recorder_task.abort();
    ticker_task.abort();

    Ok(())
}

/// Handles the informational flags. Everything else goes to `AppSettings`.
fn handle_cli_args() -> bool {
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", usage_text());
                return true;
            }
            "-V" | "--version" => {
                println!("obie-scoreboard {}", env!("CARGO_PKG_VERSION"));
                return true;
            }
            _ => {}
        }
    }
    false
}

fn usage_text() -> &'static str {
    "obie-scoreboard - bocce and curling scoreboard kiosk

Usage:
  obie-scoreboard [--game bocce|curling] [--resume]
  obie-scoreboard --help
  obie-scoreboard --version

Options:
  -g, --game <GAME>    Sport to score (default bocce)
  -r, --resume         Restore the last saved session for that sport

Environment:
  OBIE_GAME            Same as --game
  OBIE_RESUME          Same as --resume when set to 1/true/yes
  OBIE_GAME_MINUTES    Game clock length in minutes (1-99, default 20)
  OBIE_DEFAULT_ENDS    Initial curling end count (1-10, default 8)
  OBIE_LOG             Log level (error, warn, info, debug, trace)
  OBIE_RECORD_URL      POST final scores to this URL
  OBIE_RECORD_FILE     Append final scores to this JSON Lines file

Keys:
  s power   a/b/c select   enter OK   arrows D-pad   t time   p stop
  + - h     home in/remove/out        ] [ j  away in/remove/out
  l lock in   m measure   u undo   \" logs   f full screen   q quit"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    record_requests: mpsc::Sender<RecordRequest>,
    mut record_responses: mpsc::Receiver<RecordResponse>,
) {
    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                if handle_ui_event(ui_event, &app, &record_requests).await {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard);
                }
            }

            Some(response) = record_responses.recv() => {
                let mut app_guard = app.lock().await;
                app_guard.on_record_response(response);
                draw::draw(&mut terminal, &mut app_guard);
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    record_requests: &mpsc::Sender<RecordRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted | UiEvent::Resize => true,
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, record_requests).await;
            true
        }
        UiEvent::ClockTick => {
            let mut guard = app.lock().await;
            let finished = guard.on_clock_tick();
            drop(guard);
            for result in finished {
                let _ = record_requests
                    .send(RecordRequest::SaveFinalScore { result })
                    .await;
            }
            true
        }
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::Hide);
    let _ = execute!(stdout, terminal::EnterAlternateScreen);
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = terminal::enable_raw_mode();
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
