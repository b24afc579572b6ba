//! Trailing-edge debounce for live interval edits

use std::time::Duration;

use tokio::{task::JoinHandle, time::sleep};

/// Settle period after the last edit before the countdown is re-derived
pub const ADJUST_DEBOUNCE: Duration = Duration::from_millis(300);

/// Holds at most one pending action. Scheduling a new one aborts the
/// previous, so only the last request in a burst fires.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    /// Run `fire` after the delay unless superseded. `fire` receives the
    /// generation it was scheduled under.
    pub fn schedule<F>(&mut self, fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            fire(generation);
        }));
        generation
    }

    /// Mark `generation` as delivered. Returns false for a superseded one,
    /// which can still arrive if it fired just before being aborted.
    pub fn settle(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.pending = None;
        true
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
