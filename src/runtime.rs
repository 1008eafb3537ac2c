use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum StudyEvent {
    Key(KeyEvent),
    Resize,
    /// One clock second for the session identified by `generation`
    Tick {
        generation: u64,
    },
}

/// Source of terminal and clock events
pub trait StudyEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<StudyEvent, RecvTimeoutError>;
}

/// Production event source using crossterm.
///
/// The sender half is handed to the session clock so ticks and keys share one queue.
pub struct CrosstermEventSource {
    tx: Sender<StudyEvent>,
    rx: Receiver<StudyEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let key_tx = tx.clone();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if key_tx.send(StudyEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if key_tx.send(StudyEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<StudyEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StudyEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<StudyEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<StudyEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<StudyEvent>) -> Self {
        Self { rx }
    }
}

impl StudyEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<StudyEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: StudyEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: StudyEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to the poll interval; None means nothing arrived
    pub fn step(&self) -> Option<StudyEvent> {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
