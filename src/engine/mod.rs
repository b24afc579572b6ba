//! Interval state machine and timer engine.
//!
//! The [`Engine`] owns the current phase, the countdown window and the
//! work-interval counter. It is not thread-safe: every call,
//! including [`Engine::on_tick`], must come from one coordination context
//! (see [`crate::tasks::coordinator`]). Collaborators are injected at
//! construction so the decision table can run without a screen, a speaker
//! or an OS focus API.

pub mod machine;
pub mod timer_window;

use std::{fmt, str::FromStr};

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::{
    error::PresetError,
    services::{FocusMode, SignalSink, TransitionPolicy},
    state::{Event, Phase, Preset, PresetStore, SessionStopAfter, Signal, TimerState},
    utils::format::{format_remaining, rounded_secs},
};
use machine::{Context, Effect, Transition};
use timer_window::{AdjustOutcome, TimerWindow};

/// Overrun tolerance used when none is configured
pub const DEFAULT_OVERRUN_LIMIT_SECS: f64 = -60.0;

/// Source of "now" for all deadline arithmetic
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

/// Reads tokio's clock, which tests can pause and advance
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Repeating one-second tick source.
///
/// Ticks must be delivered back to the engine's coordination context as
/// `on_tick(generation)`; the engine drops ticks from older generations.
pub trait Ticker: Send {
    /// Fire once immediately, then every second
    fn arm(&mut self, generation: u64);
    fn cancel(&mut self);
}

pub struct Collaborators {
    pub policy: Box<dyn TransitionPolicy>,
    pub focus: Box<dyn FocusMode>,
    pub sink: Box<dyn SignalSink>,
    pub ticker: Box<dyn Ticker>,
    pub clock: Box<dyn Clock>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    /// How far past the deadline (negative seconds) a tick may land before
    /// the phase is aborted instead of completed
    pub overrun_limit_secs: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            overrun_limit_secs: DEFAULT_OVERRUN_LIMIT_SECS,
        }
    }
}

/// Answers offered to the user when a phase ends without auto-advancing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserChoice {
    Next,
    /// Skip the phase that would come next
    Skip,
    AddMinute,
    AddTwoMinutes,
    AddFiveMinutes,
    Stop,
    Close,
    Restart,
}

impl UserChoice {
    fn extra_minutes(self) -> Option<u32> {
        match self {
            UserChoice::AddMinute => Some(1),
            UserChoice::AddTwoMinutes => Some(2),
            UserChoice::AddFiveMinutes => Some(5),
            _ => None,
        }
    }
}

impl FromStr for UserChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "next" => Ok(UserChoice::Next),
            "skip" => Ok(UserChoice::Skip),
            "addminute" => Ok(UserChoice::AddMinute),
            "addtwominutes" => Ok(UserChoice::AddTwoMinutes),
            "addfiveminutes" => Ok(UserChoice::AddFiveMinutes),
            "stop" => Ok(UserChoice::Stop),
            "close" => Ok(UserChoice::Close),
            "restart" => Ok(UserChoice::Restart),
            other => Err(format!("unknown choice: {}", other)),
        }
    }
}

pub struct Engine {
    phase: Phase,
    presets: PresetStore,
    current_work_interval: u32,
    window: TimerWindow,
    /// Generation of the armed ticker; `None` means no countdown is running
    live_ticker: Option<u64>,
    next_generation: u64,
    awaiting_choice: bool,
    options: EngineOptions,
    policy: Box<dyn TransitionPolicy>,
    focus: Box<dyn FocusMode>,
    sink: Box<dyn SignalSink>,
    ticker: Box<dyn Ticker>,
    clock: Box<dyn Clock>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("phase", &self.phase)
            .field("current_work_interval", &self.current_work_interval)
            .field("window", &self.window)
            .field("live_ticker", &self.live_ticker)
            .field("awaiting_choice", &self.awaiting_choice)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(presets: PresetStore, collaborators: Collaborators, options: EngineOptions) -> Self {
        let Collaborators { policy, focus, sink, ticker, clock } = collaborators;
        let window = TimerWindow::new(clock.now());
        Self {
            phase: Phase::Idle,
            presets,
            current_work_interval: 0,
            window,
            live_ticker: None,
            next_generation: 0,
            awaiting_choice: false,
            options,
            policy,
            focus,
            sink,
            ticker,
            clock,
        }
    }

    // Queries

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.window.is_paused()
    }

    /// Whether a phase countdown is armed
    pub fn is_active(&self) -> bool {
        self.live_ticker.is_some()
    }

    pub fn awaiting_choice(&self) -> bool {
        self.awaiting_choice
    }

    pub fn current_work_interval(&self) -> u32 {
        self.current_work_interval
    }

    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    pub fn preset(&self) -> &Preset {
        self.presets.current()
    }

    pub fn next_is_long_rest(&self) -> bool {
        machine::next_is_long_rest(self.preset(), self.current_work_interval)
    }

    /// Seconds left in the running phase, or the length of the phase a start
    /// would enter while idle
    pub fn remaining_secs(&self) -> f64 {
        if self.live_ticker.is_none() {
            let preset = self.preset();
            return preset.seconds_for(preset.first_phase()).unwrap_or(0.0);
        }
        self.window.remaining(self.clock.now())
    }

    pub fn snapshot(&self) -> TimerState {
        let remaining = self.remaining_secs();
        let preset = self.preset();
        let time_left = format_remaining(remaining);
        let show_progress = preset.work_intervals_per_set > 1
            && matches!(
                preset.session_stop_after,
                SessionStopAfter::Disabled | SessionStopAfter::LongRest
            );
        let display = if show_progress {
            format!(
                "{} ({}/{})",
                time_left, self.current_work_interval, preset.work_intervals_per_set
            )
        } else {
            time_left.clone()
        };

        TimerState {
            phase: self.phase,
            paused: self.window.is_paused(),
            awaiting_choice: self.awaiting_choice,
            active: self.live_ticker.is_some(),
            remaining_seconds: rounded_secs(remaining),
            time_left,
            display,
            current_preset: self.presets.current_index(),
            current_work_interval: self.current_work_interval,
            work_intervals_per_set: preset.work_intervals_per_set,
        }
    }

    // User operations

    pub fn start_stop(&mut self) {
        self.fire(Event::StartStop);
    }

    pub fn pause_resume(&mut self) {
        if self.live_ticker.is_none() {
            debug!("Pause/resume ignored, no interval running");
            return;
        }

        let now = self.clock.now();
        let paused = !self.window.is_paused();
        if paused {
            self.window.pause(now);
        } else {
            self.window.resume(now);
            self.awaiting_choice = false;
        }

        if self.phase == Phase::Work && self.preset().focus_mode_on_work {
            if let Err(e) = self.focus.set_focus(!paused) {
                warn!("Failed to follow pause with focus mode: {}", e);
            }
        }

        info!(
            "{} {} with {} left",
            if paused { "Paused" } else { "Resumed" },
            self.phase,
            format_remaining(self.window.remaining(now))
        );
        self.sink.emit(Signal::PauseToggled { phase: self.phase, paused });
    }

    pub fn skip_interval(&mut self) {
        if self.live_ticker.is_none() {
            debug!("Skip ignored, no interval running");
            return;
        }

        let from = self.phase;
        let ends_session =
            machine::is_session_completed(from, self.preset(), self.current_work_interval);
        self.fire(Event::Skip);

        // Skipping the last interval of a session still ends it
        if ends_session && !self.phase.is_idle() {
            self.fire(Event::SessionCompleted);
        }
    }

    /// Add minutes to the running (or paused) phase, capped at two hours left
    pub fn add_minutes(&mut self, minutes: u32) {
        if self.live_ticker.is_none() {
            debug!("Add minutes ignored, no interval running");
            return;
        }

        let now = self.clock.now();
        let left = self.window.add_seconds(now, f64::from(minutes) * 60.0);
        info!("Added {} min to {}, {} left", minutes, self.phase, format_remaining(left));
    }

    /// Re-derive the countdown after the length of `phase` was edited.
    /// Edits to a phase other than the running one wait for its next start.
    pub fn adjust_current_interval(&mut self, phase: Phase) {
        if self.live_ticker.is_none() || phase.is_idle() || phase != self.phase {
            debug!("Interval edit for {} does not touch the running countdown", phase);
            return;
        }
        let Some(length) = self.preset().seconds_for(phase) else {
            return;
        };

        let outcome = self.window.adjust_length(self.clock.now(), length);
        match outcome {
            AdjustOutcome::Applied { remaining } => {
                info!("Adjusted {} to {} left", phase, format_remaining(remaining))
            }
            AdjustOutcome::Clamped => info!("Adjusted {} past its elapsed time, 1s left", phase),
            AdjustOutcome::Unchanged => debug!("Interval edit left under a second, ignored"),
        }
    }

    pub fn confirm_next(&mut self) {
        self.handle_user_choice(UserChoice::Next);
    }

    pub fn handle_user_choice(&mut self, choice: UserChoice) {
        debug!("User choice: {:?}", choice);
        match choice {
            UserChoice::Next | UserChoice::Skip if !self.awaiting_choice => {
                debug!("{:?} ignored, nothing is awaiting a choice", choice);
            }
            UserChoice::Next => self.fire(Event::ConfirmedNext),
            UserChoice::Skip => {
                self.fire(Event::ConfirmedNext);
                self.skip_interval();
            }
            UserChoice::AddMinute | UserChoice::AddTwoMinutes | UserChoice::AddFiveMinutes => {
                let minutes = choice.extra_minutes().unwrap_or(1);
                self.add_minutes(minutes);
                if self.window.is_paused() {
                    self.pause_resume();
                }
            }
            UserChoice::Stop => {
                if !self.phase.is_idle() {
                    self.fire(Event::StartStop);
                }
            }
            UserChoice::Close => {}
            UserChoice::Restart => {
                if self.phase.is_idle() {
                    self.fire(Event::StartStop);
                }
            }
        }
    }

    // Preset edits

    pub fn select_preset(&mut self, index: usize) -> Result<(), PresetError> {
        self.presets.select(index)?;
        info!("Selected preset {}", index);
        self.clamp_counter_to_set();
        Ok(())
    }

    /// Replace the current preset. Returns the running phase if its length changed,
    /// so the caller can schedule a debounced adjustment.
    pub fn replace_current_preset(&mut self, preset: Preset) -> Result<Option<Phase>, PresetError> {
        let old = self.preset().clone();
        self.presets.replace_current(preset)?;

        if old.focus_mode_on_work != self.preset().focus_mode_on_work {
            self.focus_setting_changed();
        }
        if old.work_intervals_per_set != self.preset().work_intervals_per_set {
            self.clamp_counter_to_set();
        }

        let running = self.phase;
        let changed = !running.is_idle() && old.minutes_for(running) != self.preset().minutes_for(running);
        Ok(changed.then_some(running))
    }

    /// Single-field live edit, as emitted by an input control on every keystroke
    pub fn set_interval_minutes(&mut self, phase: Phase, minutes: f64) -> Result<(), PresetError> {
        self.presets.current_mut().set_minutes(phase, minutes)
    }

    /// Keep the counter within a set that shrank mid-session. Set sizes are
    /// at least 1, so a running work set never drops to 0.
    fn clamp_counter_to_set(&mut self) {
        let per_set = self.preset().work_intervals_per_set;
        if !self.phase.is_idle() && self.current_work_interval > per_set {
            debug!("Clamping work interval {} to set size {}", self.current_work_interval, per_set);
            self.current_work_interval = per_set;
        }
    }

    fn focus_setting_changed(&mut self) {
        if self.phase == Phase::Work && !self.window.is_paused() {
            let on = self.preset().focus_mode_on_work;
            if let Err(e) = self.focus.set_focus(on) {
                warn!("Failed to apply focus setting: {}", e);
            }
        }
    }

    // Ticker callbacks

    pub fn on_tick(&mut self, generation: u64) {
        if self.live_ticker != Some(generation) {
            debug!("Dropping stale tick from ticker {}", generation);
            return;
        }
        if self.window.is_paused() {
            return;
        }

        let remaining = self.window.remaining(self.clock.now());
        if remaining > 0.0 {
            return;
        }

        // Ticks are missed while the machine sleeps; a long-overdue phase is abandoned
        if remaining < self.options.overrun_limit_secs {
            warn!(
                "{} overran its deadline by {:.0}s, stopping session",
                self.phase, -remaining
            );
            self.fire(Event::StartStop);
            return;
        }

        let event = if machine::is_session_completed(self.phase, self.preset(), self.current_work_interval) {
            Event::SessionCompleted
        } else {
            Event::IntervalCompleted
        };
        self.fire(event);
    }

    pub fn on_ticker_cancelled(&mut self) {
        debug!("Ticker cancelled in {}", self.phase);
    }

    // State machine

    fn fire(&mut self, event: Event) {
        let transition = {
            let ctx = Context {
                preset: self.presets.current(),
                current_work_interval: self.current_work_interval,
                policy: &*self.policy,
            };
            match machine::transition(self.phase, event, &ctx) {
                Ok(transition) => transition,
                Err(err) => {
                    error!("State machine desynchronised: {}", err);
                    panic!("{}", err);
                }
            }
        };

        if transition.is_self_loop() {
            info!("Holding {} on {}", transition.from, event);
        } else {
            info!("Transition {} -> {} on {}", transition.from, transition.to, event);
        }
        self.phase = transition.to;

        for effect in transition.effects.iter().copied() {
            if self.phase != transition.to {
                // A handler re-issued an event; the rest of this transition is moot
                break;
            }
            self.apply(effect, &transition);
        }
    }

    fn apply(&mut self, effect: Effect, transition: &Transition) {
        match effect {
            Effect::ExitIdle => self.sink.emit(Signal::IdleExited),
            Effect::ExitWork => {
                // Best effort: turning focus off must never abort anything
                if let Err(e) = self.focus.set_focus(false) {
                    debug!("Focus off failed: {}", e);
                }
                self.sink.emit(Signal::WorkEnded);
            }
            Effect::ExitRest { was_skipped } => self.sink.emit(Signal::RestEnded { was_skipped }),
            Effect::EnterIdle => {
                self.cancel_ticker();
                self.current_work_interval = 0;
                self.awaiting_choice = false;
                self.window.clear(self.clock.now());
                self.sink.emit(Signal::IdleEntered);
            }
            Effect::EnterWork => self.enter_work(),
            Effect::EnterRest { is_long, is_auto_transition, via_skip } => {
                self.start_countdown(transition.to);
                self.sink.emit(Signal::RestStarted { is_long, is_auto_transition, via_skip });
            }
            Effect::IntervalElapsed { phase } => self.sink.emit(Signal::IntervalElapsed { phase }),
            Effect::AwaitUserChoice { phase, next_is_long_rest } => {
                self.window.pin_at_zero(self.clock.now());
                self.awaiting_choice = true;
                info!("{} finished, waiting for user choice", phase);
                self.sink.emit(Signal::UserChoiceRequired { phase, next_is_long_rest });
            }
            Effect::Skipped { from } => self.sink.emit(Signal::Skipped { from }),
            Effect::SessionCompleted => self.sink.emit(Signal::SessionCompleted),
        }
    }

    fn enter_work(&mut self) {
        let per_set = self.preset().work_intervals_per_set;
        if self.current_work_interval >= per_set {
            self.current_work_interval = 1;
        } else {
            self.current_work_interval += 1;
        }

        self.start_countdown(Phase::Work);
        self.sink.emit(Signal::WorkStarted { interval: self.current_work_interval });

        if self.preset().focus_mode_on_work {
            if let Err(e) = self.focus.set_focus(true) {
                warn!("Focus mode unavailable, aborting session: {}", e);
                self.fire(Event::StartStop);
            }
        }
    }

    fn start_countdown(&mut self, phase: Phase) {
        let Some(secs) = self.preset().seconds_for(phase) else {
            return;
        };
        self.window.start(self.clock.now(), secs);
        self.awaiting_choice = false;
        self.arm_ticker();
        debug!("Started {} countdown of {}", phase, format_remaining(secs));
    }

    fn arm_ticker(&mut self) {
        self.cancel_ticker();
        let generation = self.next_generation;
        self.next_generation += 1;
        self.live_ticker = Some(generation);
        self.ticker.arm(generation);
    }

    fn cancel_ticker(&mut self) {
        if self.live_ticker.take().is_some() {
            self.ticker.cancel();
        }
    }
}
