use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event;
use log::error;

use super::key::Key;
use super::InputEvent;

/// Pumps terminal key presses and ticks into a channel.
///
/// Polling crossterm blocks, so it runs on the blocking pool and never on the
/// task driving the UI.
pub struct Events {
    rx: tokio::sync::mpsc::Receiver<InputEvent>,
    stop_capture: Arc<AtomicBool>,
    tick_rate: Duration,
}

impl Events {
    pub fn new(tick_rate: Duration) -> Events {
        let (tx, rx) = tokio::sync::mpsc::channel(100);
        let stop_capture = Arc::new(AtomicBool::new(false));

        let event_stop_capture = stop_capture.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(event::Event::Key(key)) => {
                        if tx.blocking_send(InputEvent::Input(Key::from(key))).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("Error reading terminal event: {}", e);
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    error!("Error polling terminal events: {}", e);
                    break;
                }
            }
            if tx.blocking_send(InputEvent::Tick).is_err() {
                break;
            }
            if event_stop_capture.load(Ordering::Relaxed) {
                break;
            }
        });

        Events {
            rx,
            stop_capture,
            tick_rate,
        }
    }

    /// Attempts to read an event. Once the pump has stopped only ticks are
    /// produced, one per tick rate.
    pub async fn next(&mut self) -> InputEvent {
        match self.rx.recv().await {
            Some(event) => event,
            None => {
                tokio::time::sleep(self.tick_rate).await;
                InputEvent::Tick
            }
        }
    }

    /// Close
    pub fn close(&mut self) {
        self.stop_capture.store(true, Ordering::Relaxed)
    }
}
