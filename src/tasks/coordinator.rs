//! Coordination task owning the engine.
//!
//! The engine is not thread-safe, so one tokio task owns it and everything
//! else talks to it through [`EngineHandle`]. Ticker ticks and debounce
//! completions arrive through the same queue as user commands, which keeps
//! every engine call on a single context. A fresh [`TimerState`] is
//! published on a watch channel after each message.

use std::{fmt, str::FromStr};

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use super::{
    debounce::{Debouncer, ADJUST_DEBOUNCE},
    ticker::TokioTicker,
};
use crate::{
    engine::{Collaborators, Engine, EngineOptions, TokioClock, UserChoice},
    error::{HandleError, PresetError},
    services::{FocusMode, SignalSink, TransitionPolicy},
    state::{Phase, Preset, PresetStore, TimerState},
};

/// User-facing commands, as named by the `pomodoro://` style URL scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartStop,
    PauseResume,
    Skip,
    AddMinutes(u32),
    Choice(UserChoice),
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "startstop" => Ok(Command::StartStop),
            "pauseresume" => Ok(Command::PauseResume),
            "skip" => Ok(Command::Skip),
            "addminute" => Ok(Command::AddMinutes(1)),
            "addfiveminutes" => Ok(Command::AddMinutes(5)),
            other => Err(format!("unknown command: {}", other)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::StartStop => f.write_str("start-stop"),
            Command::PauseResume => f.write_str("pause-resume"),
            Command::Skip => f.write_str("skip"),
            Command::AddMinutes(n) => write!(f, "add-minutes({})", n),
            Command::Choice(choice) => write!(f, "choice({:?})", choice),
        }
    }
}

/// The presets as seen from outside the engine
#[derive(Debug, Clone, PartialEq)]
pub struct PresetsView {
    pub presets: Vec<Preset>,
    pub current: usize,
}

type Reply<T> = oneshot::Sender<Result<T, PresetError>>;

/// Everything the coordination task reacts to
#[derive(Debug)]
pub enum Message {
    Command(Command, oneshot::Sender<TimerState>),
    Snapshot(oneshot::Sender<TimerState>),
    Presets(oneshot::Sender<PresetsView>),
    SelectPreset(usize, Reply<TimerState>),
    ReplacePreset(Box<Preset>, Reply<TimerState>),
    SetIntervalMinutes { phase: Phase, minutes: f64, reply: Reply<TimerState> },
    /// Request a debounced re-derivation of the running countdown
    AdjustRequested(Phase),
    AdjustSettled { phase: Phase, generation: u64 },
    Tick { generation: u64 },
    TickerCancelled,
}

/// Cloneable front door to the engine task
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<Message>,
    state_rx: watch::Receiver<TimerState>,
}

impl EngineHandle {
    /// Latest published state, without a round trip
    pub fn state(&self) -> TimerState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.state_rx.clone()
    }

    pub async fn dispatch(&self, command: Command) -> Result<TimerState, HandleError> {
        self.request(|reply| Message::Command(command, reply)).await
    }

    pub async fn start_stop(&self) -> Result<TimerState, HandleError> {
        self.dispatch(Command::StartStop).await
    }

    pub async fn pause_resume(&self) -> Result<TimerState, HandleError> {
        self.dispatch(Command::PauseResume).await
    }

    pub async fn skip_interval(&self) -> Result<TimerState, HandleError> {
        self.dispatch(Command::Skip).await
    }

    pub async fn add_minutes(&self, minutes: u32) -> Result<TimerState, HandleError> {
        self.dispatch(Command::AddMinutes(minutes)).await
    }

    pub async fn user_choice(&self, choice: UserChoice) -> Result<TimerState, HandleError> {
        self.dispatch(Command::Choice(choice)).await
    }

    /// Fresh state computed by the engine task
    pub async fn snapshot(&self) -> Result<TimerState, HandleError> {
        self.request(Message::Snapshot).await
    }

    pub async fn presets(&self) -> Result<PresetsView, HandleError> {
        self.request(Message::Presets).await
    }

    pub async fn select_preset(&self, index: usize) -> Result<TimerState, HandleError> {
        self.request(|reply| Message::SelectPreset(index, reply)).await?.map_err(Into::into)
    }

    /// Replace the current preset. A changed length of the running phase is
    /// applied to the countdown once edits settle.
    pub async fn replace_current_preset(&self, preset: Preset) -> Result<TimerState, HandleError> {
        self.request(|reply| Message::ReplacePreset(Box::new(preset), reply))
            .await?
            .map_err(Into::into)
    }

    /// Edit one interval length and schedule a debounced countdown adjustment
    pub async fn set_interval_minutes(&self, phase: Phase, minutes: f64) -> Result<TimerState, HandleError> {
        self.request(|reply| Message::SetIntervalMinutes { phase, minutes, reply })
            .await?
            .map_err(Into::into)
    }

    /// Debounced: a burst of requests re-derives the countdown once
    pub fn adjust_current_interval(&self, phase: Phase) -> Result<(), HandleError> {
        self.tx
            .send(Message::AdjustRequested(phase))
            .map_err(|_| HandleError::EngineStopped)
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Message) -> Result<T, HandleError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(build(reply)).map_err(|_| HandleError::EngineStopped)?;
        rx.await.map_err(|_| HandleError::EngineStopped)
    }
}

/// Collaborators a caller chooses; the ticker and clock are supplied here
pub struct EngineParts {
    pub presets: PresetStore,
    pub policy: Box<dyn TransitionPolicy>,
    pub focus: Box<dyn FocusMode>,
    pub sink: Box<dyn SignalSink>,
    pub options: EngineOptions,
}

/// Build the engine and start its coordination task
pub fn spawn_engine(parts: EngineParts) -> EngineHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let weak = tx.downgrade();

    let engine = Engine::new(
        parts.presets,
        Collaborators {
            policy: parts.policy,
            focus: parts.focus,
            sink: parts.sink,
            ticker: Box::new(TokioTicker::new(weak.clone())),
            clock: Box::new(TokioClock),
        },
        parts.options,
    );
    let (state_tx, state_rx) = watch::channel(engine.snapshot());

    tokio::spawn(run_engine(engine, rx, weak, state_tx));
    EngineHandle { tx, state_rx }
}

/// Drain the queue until every handle is dropped
pub async fn run_engine(
    mut engine: Engine,
    mut rx: mpsc::UnboundedReceiver<Message>,
    weak: mpsc::WeakUnboundedSender<Message>,
    state_tx: watch::Sender<TimerState>,
) {
    info!("Starting timer engine task");
    let mut debouncer = Debouncer::new(ADJUST_DEBOUNCE);

    while let Some(message) = rx.recv().await {
        match message {
            Message::Command(command, reply) => {
                debug!("Command: {}", command);
                apply_command(&mut engine, command);
                let _ = reply.send(engine.snapshot());
            }
            Message::Snapshot(reply) => {
                let _ = reply.send(engine.snapshot());
            }
            Message::Presets(reply) => {
                let _ = reply.send(PresetsView {
                    presets: engine.presets().presets().to_vec(),
                    current: engine.presets().current_index(),
                });
            }
            Message::SelectPreset(index, reply) => {
                let result = engine.select_preset(index).map(|()| engine.snapshot());
                let _ = reply.send(result);
            }
            Message::ReplacePreset(preset, reply) => {
                let result = engine.replace_current_preset(*preset).map(|changed| {
                    if let Some(phase) = changed {
                        schedule_adjust(&mut debouncer, &weak, phase);
                    }
                    engine.snapshot()
                });
                let _ = reply.send(result);
            }
            Message::SetIntervalMinutes { phase, minutes, reply } => {
                let result = engine.set_interval_minutes(phase, minutes).map(|()| {
                    schedule_adjust(&mut debouncer, &weak, phase);
                    engine.snapshot()
                });
                let _ = reply.send(result);
            }
            Message::AdjustRequested(phase) => schedule_adjust(&mut debouncer, &weak, phase),
            Message::AdjustSettled { phase, generation } => {
                if debouncer.settle(generation) {
                    engine.adjust_current_interval(phase);
                } else {
                    debug!("Dropping superseded interval adjustment {}", generation);
                }
            }
            Message::Tick { generation } => engine.on_tick(generation),
            Message::TickerCancelled => engine.on_ticker_cancelled(),
        }

        state_tx.send_replace(engine.snapshot());
    }

    warn!("Timer engine task stopped, all handles dropped");
}

fn apply_command(engine: &mut Engine, command: Command) {
    match command {
        Command::StartStop => engine.start_stop(),
        Command::PauseResume => engine.pause_resume(),
        Command::Skip => engine.skip_interval(),
        Command::AddMinutes(minutes) => engine.add_minutes(minutes),
        Command::Choice(choice) => engine.handle_user_choice(choice),
    }
}

fn schedule_adjust(debouncer: &mut Debouncer, weak: &mpsc::WeakUnboundedSender<Message>, phase: Phase) {
    let weak = weak.clone();
    debouncer.schedule(move |generation| {
        if let Some(tx) = weak.upgrade() {
            let _ = tx.send(Message::AdjustSettled { phase, generation });
        }
    });
}
