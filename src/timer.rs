use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::runtime::StudyEvent;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Elapsed-seconds counter bound to one session at a time.
///
/// Each `start` opens a new generation; ticks stamped with any other
/// generation are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTimer {
    elapsed_secs: u64,
    generation: u64,
    running: bool,
}

impl SessionTimer {
    /// Zero the counter and start counting; returns the new generation
    pub fn start(&mut self) -> u64 {
        self.generation += 1;
        self.elapsed_secs = 0;
        self.running = true;
        self.generation
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Count one second. Returns false for stale or stopped ticks.
    pub fn tick(&mut self, generation: u64) -> bool {
        if !self.running || generation != self.generation {
            return false;
        }
        self.elapsed_secs += 1;
        true
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// A live periodic tick feed. Cancelling (or dropping) stops it for good.
pub trait TickSubscription {
    fn cancel(&mut self);
    fn is_active(&self) -> bool;
}

/// Periodic tick source the session timer subscribes to while a session runs
pub trait Clock {
    fn subscribe(&self, generation: u64) -> Box<dyn TickSubscription>;
}

/// Wall clock: one background thread per subscription pushing
/// `StudyEvent::Tick` into the app's event queue.
#[derive(Debug, Clone)]
pub struct IntervalClock {
    tx: Sender<StudyEvent>,
    interval: Duration,
}

impl IntervalClock {
    pub fn new(tx: Sender<StudyEvent>) -> Self {
        Self::with_interval(tx, TICK_INTERVAL)
    }

    pub fn with_interval(tx: Sender<StudyEvent>, interval: Duration) -> Self {
        Self { tx, interval }
    }
}

impl Clock for IntervalClock {
    fn subscribe(&self, generation: u64) -> Box<dyn TickSubscription> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let tx = self.tx.clone();
        let interval = self.interval;

        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if tx.send(StudyEvent::Tick { generation }).is_err() {
                        break;
                    }
                }
                // stop requested or handle dropped
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        Box::new(IntervalSubscription {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }
}

struct IntervalSubscription {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TickSubscription for IntervalSubscription {
    fn cancel(&mut self) {
        // disconnecting wakes the thread immediately
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("session clock thread panicked");
            }
        }
    }

    fn is_active(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for IntervalSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Clock with no thread; ticks are fed by hand. Counts open subscriptions
/// so tests can assert nothing is left running.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    active: Arc<AtomicUsize>,
    opened: Arc<AtomicUsize>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn total_subscriptions(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl Clock for ManualClock {
    fn subscribe(&self, _generation: u64) -> Box<dyn TickSubscription> {
        self.active.fetch_add(1, Ordering::SeqCst);
        self.opened.fetch_add(1, Ordering::SeqCst);
        Box::new(ManualSubscription {
            active: Some(Arc::clone(&self.active)),
        })
    }
}

struct ManualSubscription {
    active: Option<Arc<AtomicUsize>>,
}

impl TickSubscription for ManualSubscription {
    fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            active.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for ManualSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
