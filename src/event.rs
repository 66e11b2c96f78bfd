//! Event stream for the TUI.
//!
//! Terminal input is read on a background thread; connect attempts report
//! through the same channel, so the main loop waits on a single receiver.

use std::thread;
use std::time::{Duration, Instant};

use color_eyre::eyre::{eyre, Result};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use tokio::sync::mpsc;

use crate::core::orchestrator::{ConnectOutcome, FatalBackendFault, Progress};

/// Events that drive the application.
#[derive(Debug)]
pub enum Event {
    /// Keyboard input event.
    Key(KeyEvent),
    /// Terminal window resize event.
    Resize(u16, u16),
    /// Periodic tick for UI updates.
    Tick,
    /// Report from a running connect attempt.
    Connect(ConnectUpdate),
}

#[derive(Debug)]
pub enum ConnectUpdate {
    Progress {
        profile: String,
        progress: Progress,
    },
    Finished {
        profile: String,
        result: Result<ConnectOutcome, FatalBackendFault>,
    },
}

pub type EventSender = mpsc::UnboundedSender<Event>;

/// Owns the event channel and the terminal reader thread.
pub struct EventHandler {
    sender: EventSender,
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Starts the reader thread, emitting a tick every `tick_rate_ms`.
    pub fn new(tick_rate_ms: u64) -> Self {
        let tick_rate = Duration::from_millis(tick_rate_ms);
        let (sender, receiver) = mpsc::unbounded_channel();

        let terminal = sender.clone();
        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::ZERO);

                if event::poll(timeout).unwrap_or(false) {
                    let forwarded = match event::read() {
                        Ok(CrosstermEvent::Key(key)) => Some(Event::Key(key)),
                        Ok(CrosstermEvent::Resize(w, h)) => Some(Event::Resize(w, h)),
                        _ => None,
                    };
                    if let Some(evt) = forwarded {
                        if terminal.send(evt).is_err() {
                            return;
                        }
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if terminal.send(Event::Tick).is_err() {
                        return;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { sender, receiver }
    }

    /// Handle for producers other than the terminal.
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Waits for the next event.
    pub async fn next(&mut self) -> Result<Event> {
        self.receiver
            .recv()
            .await
            .ok_or_else(|| eyre!("event channel closed"))
    }
}
