//! Phase transition table.
//!
//! ```text
//! Event              From                       To          Guard
//! startStop          work|shortRest|longRest    idle        -
//! startStop          idle                       work        startPhase == work
//! startStop          idle                       shortRest   startPhase == rest
//! sessionCompleted   work|shortRest|longRest    idle        -
//! intervalCompleted  work                       shortRest   nextIsShortRest && auto(work)
//! intervalCompleted  work                       longRest    nextIsLongRest && auto(work)
//! intervalCompleted  shortRest|longRest         work        auto(rest)
//! intervalCompleted  work|shortRest|longRest    (itself)    !auto(from)
//! confirmedNext      work                       short/long  nextIsShortRest / nextIsLongRest
//! confirmedNext      shortRest|longRest         work        -
//! skip               work                       short/long  nextIsShortRest / nextIsLongRest
//! skip               shortRest|longRest         work        -
//! ```
//!
//! Everything here is a pure function of the phase, the event and a
//! [`Context`]. Side effects are described by the returned [`Effect`]s and
//! applied by the engine.

use crate::{
    error::InvalidTransition,
    services::TransitionPolicy,
    state::{Event, Phase, Preset, SessionStopAfter, StartPhase},
};

/// Inputs the guards read. Built fresh for every decision.
pub struct Context<'a> {
    pub preset: &'a Preset,
    pub current_work_interval: u32,
    pub policy: &'a dyn TransitionPolicy,
}

impl Context<'_> {
    pub fn next_is_long_rest(&self) -> bool {
        next_is_long_rest(self.preset, self.current_work_interval)
    }

    fn auto_advance(&self, from: Phase) -> bool {
        self.policy.should_auto_advance(from)
    }
}

/// Phase-boundary effects, in the order they must be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ExitIdle,
    ExitWork,
    ExitRest { was_skipped: bool },
    EnterIdle,
    EnterWork,
    EnterRest { is_long: bool, is_auto_transition: bool, via_skip: bool },
    /// Countdown of `phase` reached zero
    IntervalElapsed { phase: Phase },
    /// Self-loop: freeze and ask which phase comes next
    AwaitUserChoice { phase: Phase, next_is_long_rest: bool },
    Skipped { from: Phase },
    SessionCompleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub event: Event,
    pub effects: Vec<Effect>,
}

impl Transition {
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

pub fn next_is_long_rest(preset: &Preset, current_work_interval: u32) -> bool {
    preset.work_intervals_per_set > 1 && current_work_interval >= preset.work_intervals_per_set
}

pub fn next_is_short_rest(preset: &Preset, current_work_interval: u32) -> bool {
    !next_is_long_rest(preset, current_work_interval)
}

/// Whether the countdown of `phase` reaching zero ends the whole session
pub fn is_session_completed(phase: Phase, preset: &Preset, current_work_interval: u32) -> bool {
    let stop_after = preset.session_stop_after;
    match phase {
        Phase::Idle => false,
        Phase::Work => stop_after == SessionStopAfter::Work,
        // The initial rest of a rest-first session never ends it
        Phase::ShortRest if current_work_interval == 0 => false,
        Phase::ShortRest => {
            (preset.work_intervals_per_set == 1 && stop_after == SessionStopAfter::LongRest)
                || stop_after == SessionStopAfter::ShortRest
        }
        Phase::LongRest => stop_after == SessionStopAfter::LongRest,
    }
}

fn rest_after_work(ctx: &Context<'_>) -> Phase {
    if ctx.next_is_long_rest() {
        Phase::LongRest
    } else {
        Phase::ShortRest
    }
}

/// Resolve the target phase for `event` in `from`
fn route(from: Phase, event: Event, ctx: &Context<'_>) -> Option<Phase> {
    use Event::*;
    use Phase::*;

    match (event, from) {
        (StartStop, Work | ShortRest | LongRest) => Some(Idle),
        (StartStop, Idle) => Some(match ctx.preset.start_phase {
            StartPhase::Work => Work,
            StartPhase::Rest => ShortRest,
        }),

        (SessionCompleted, Work | ShortRest | LongRest) => Some(Idle),

        (IntervalCompleted, Work | ShortRest | LongRest) if !ctx.auto_advance(from) => Some(from),
        (IntervalCompleted, Work) => Some(rest_after_work(ctx)),
        (IntervalCompleted, ShortRest | LongRest) => Some(Work),

        (ConfirmedNext | Skip, Work) => Some(rest_after_work(ctx)),
        (ConfirmedNext | Skip, ShortRest | LongRest) => Some(Work),

        (SessionCompleted | IntervalCompleted | ConfirmedNext | Skip, Idle) => None,
    }
}

/// Decide the transition for `event` and describe its effects
pub fn transition(
    from: Phase,
    event: Event,
    ctx: &Context<'_>,
) -> Result<Transition, InvalidTransition> {
    let to = route(from, event, ctx).ok_or(InvalidTransition { from, event })?;
    let mut effects = Vec::new();

    if from != to {
        match from {
            Phase::Idle => effects.push(Effect::ExitIdle),
            Phase::Work => effects.push(Effect::ExitWork),
            // Rest only "ends" when work follows; stopping from rest is silent
            Phase::ShortRest | Phase::LongRest if to == Phase::Work => effects.push(Effect::ExitRest {
                was_skipped: event == Event::Skip,
            }),
            Phase::ShortRest | Phase::LongRest => {}
        }
    }

    match event {
        Event::IntervalCompleted => effects.push(Effect::IntervalElapsed { phase: from }),
        Event::Skip => effects.push(Effect::Skipped { from }),
        _ => {}
    }

    if from != to {
        match to {
            Phase::Idle => effects.push(Effect::EnterIdle),
            Phase::Work => effects.push(Effect::EnterWork),
            Phase::ShortRest | Phase::LongRest => effects.push(Effect::EnterRest {
                is_long: to == Phase::LongRest,
                is_auto_transition: event == Event::IntervalCompleted,
                via_skip: event == Event::Skip && from == Phase::Work,
            }),
        }
    } else {
        effects.push(Effect::AwaitUserChoice {
            phase: from,
            next_is_long_rest: ctx.next_is_long_rest(),
        });
    }

    if event == Event::SessionCompleted {
        effects.push(Effect::SessionCompleted);
    }

    Ok(Transition { from, to, event, effects })
}
