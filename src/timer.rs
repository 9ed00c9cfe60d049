use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const DEFAULT_SECONDS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running(u32),
    Expired,
}

/// Remaining time for one unanswered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    index: usize,
    remaining: u32,
}

impl Countdown {
    pub fn start(index: usize, limit: u32) -> Self {
        Self {
            index,
            remaining: limit,
        }
    }

    /// Picks up a persisted value, clamped to `limit`; starts fresh when none.
    pub fn resume(index: usize, persisted: Option<u32>, limit: u32) -> Self {
        Self {
            index,
            remaining: persisted.map(|s| s.min(limit)).unwrap_or(limit),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.remaining)
        }
    }
}

/// Running ticker for a single question. Dropping it stops the thread.
pub struct TimerHandle {
    index: usize,
    rx: mpsc::Receiver<TimerEvent>,
    stop: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn try_recv(&self) -> Option<TimerEvent> {
        self.rx.try_recv().ok()
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn spawn_ticker(index: usize) -> TimerHandle {
    spawn_ticker_every(index, Duration::from_secs(1))
}

pub fn spawn_ticker_every(index: usize, interval: Duration) -> TimerHandle {
    let (tx, rx) = mpsc::channel();
    let stop = Arc::new(AtomicBool::new(false));
    let thread_stop = Arc::clone(&stop);

    thread::spawn(move || loop {
        thread::sleep(interval);
        if thread_stop.load(Ordering::SeqCst) {
            break;
        }
        if tx.send(TimerEvent::Tick { index }).is_err() {
            break;
        }
    });

    TimerHandle { index, rx, stop }
}

pub fn format_seconds(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
