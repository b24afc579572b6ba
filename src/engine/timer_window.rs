//! Deadline bookkeeping for the running phase.
//!
//! All times are seconds as `f64` so that overshoot past the deadline stays
//! representable as a negative remaining value. Every operation takes `now`
//! explicitly; the window never reads a clock itself.

use std::time::Duration;

use tokio::time::Instant;

/// Upper bound for remaining time after adding minutes
pub const MAX_REMAINING_SECS: f64 = 7200.0;

/// Edits leaving less than this much time are ignored, see [`TimerWindow::adjust_length`]
const MIN_ADJUSTED_SECS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    At(Instant),
    /// Sentinel used while paused so a zero-check can never fire
    Never,
}

/// Result of a live interval-length edit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdjustOutcome {
    Applied { remaining: f64 },
    /// The edit would have expired the phase; one second is left instead
    Clamped,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct TimerWindow {
    start_time: Instant,
    finish_time: Deadline,
    paused_elapsed: f64,
    paused_remaining: f64,
    paused: bool,
}

impl TimerWindow {
    pub fn new(now: Instant) -> Self {
        Self {
            start_time: now,
            finish_time: Deadline::Never,
            paused_elapsed: 0.0,
            paused_remaining: 0.0,
            paused: false,
        }
    }

    pub fn start(&mut self, now: Instant, duration_secs: f64) {
        self.start_time = now;
        self.finish_time = Deadline::At(shift(now, duration_secs));
        self.paused_elapsed = 0.0;
        self.paused_remaining = 0.0;
        self.paused = false;
    }

    /// Forget the countdown entirely
    pub fn clear(&mut self, now: Instant) {
        *self = Self::new(now);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn finish_time(&self) -> Deadline {
        self.finish_time
    }

    /// Seconds until the deadline; negative once it has passed
    pub fn remaining(&self, now: Instant) -> f64 {
        if self.paused {
            return self.paused_remaining;
        }
        match self.finish_time {
            Deadline::At(finish) => secs_between(finish, now),
            Deadline::Never => f64::INFINITY,
        }
    }

    pub fn elapsed(&self, now: Instant) -> f64 {
        if self.paused {
            self.paused_elapsed
        } else {
            secs_between(now, self.start_time)
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if self.paused {
            return;
        }
        self.paused_remaining = self.remaining(now);
        self.paused_elapsed = secs_between(now, self.start_time);
        self.finish_time = Deadline::Never;
        self.paused = true;
    }

    pub fn resume(&mut self, now: Instant) {
        if !self.paused {
            return;
        }
        self.start_time = shift(now, -self.paused_elapsed);
        self.finish_time = Deadline::At(shift(now, self.paused_remaining));
        self.paused = false;
    }

    /// Freeze at zero while waiting for the user to pick what comes next
    pub fn pin_at_zero(&mut self, now: Instant) {
        self.pause(now);
        self.paused_elapsed += self.paused_remaining.max(0.0);
        self.paused_remaining = 0.0;
    }

    /// Add time to the countdown, capped at [`MAX_REMAINING_SECS`]. Returns the new remaining time.
    pub fn add_seconds(&mut self, now: Instant, secs: f64) -> f64 {
        let left = if self.paused {
            self.paused_remaining.max(0.0)
        } else {
            self.remaining(now).max(0.0)
        };
        let new_left = (left + secs).min(MAX_REMAINING_SECS);
        let delta = new_left - left;

        if self.paused {
            self.paused_remaining = new_left;
            // Keeps elapsed + remaining constant so resume does not double count
            self.paused_elapsed -= delta;
        } else {
            self.start_time = shift(self.start_time, delta);
            self.finish_time = Deadline::At(shift(now, new_left));
        }
        new_left
    }

    /// Re-derive the remaining time after the phase length changed to `new_length_secs`
    pub fn adjust_length(&mut self, now: Instant, new_length_secs: f64) -> AdjustOutcome {
        let new_remaining = new_length_secs - self.elapsed(now);

        let (value, outcome) = if new_remaining >= MIN_ADJUSTED_SECS {
            (new_remaining, AdjustOutcome::Applied { remaining: new_remaining })
        } else if new_remaining < 0.0 {
            (MIN_ADJUSTED_SECS, AdjustOutcome::Clamped)
        } else {
            return AdjustOutcome::Unchanged;
        };

        if self.paused {
            self.paused_remaining = value;
        } else {
            self.finish_time = Deadline::At(shift(now, value));
        }
        outcome
    }
}

/// `later - earlier` in signed seconds
fn secs_between(later: Instant, earlier: Instant) -> f64 {
    match later.checked_duration_since(earlier) {
        Some(d) => d.as_secs_f64(),
        None => -earlier.duration_since(later).as_secs_f64(),
    }
}

fn shift(at: Instant, secs: f64) -> Instant {
    if secs >= 0.0 {
        at + Duration::from_secs_f64(secs)
    } else {
        at.checked_sub(Duration::from_secs_f64(-secs)).unwrap_or(at)
    }
}
