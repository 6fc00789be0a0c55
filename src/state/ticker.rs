use crate::state::messages::UiEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Drives the game clock: one `ClockTick` per second.
pub struct ClockTicker {
    ui_events: mpsc::Sender<UiEvent>,
    period: Duration,
}

impl ClockTicker {
    pub fn new(ui_events: mpsc::Sender<UiEvent>) -> Self {
        Self {
            ui_events,
            period: Duration::from_secs(1),
        }
    }

    pub async fn run(self) {
        let mut ticks = interval(self.period);
        // First tick completes immediately.
        ticks.tick().await;

        loop {
            ticks.tick().await;
            if self.ui_events.send(UiEvent::ClockTick).await.is_err() {
                break;
            }
        }
    }
}
