//! One-second tick source backed by a tokio interval

use std::time::Duration;

use tokio::{
    sync::mpsc::WeakUnboundedSender,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::debug;

use super::coordinator::Message;
use crate::engine::Ticker;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Ticks are posted to the coordinator's queue rather than touching the
/// engine, so the engine is only ever driven from its own task.
#[derive(Debug)]
pub struct TokioTicker {
    tx: WeakUnboundedSender<Message>,
    task: Option<JoinHandle<()>>,
}

impl TokioTicker {
    pub fn new(tx: WeakUnboundedSender<Message>) -> Self {
        Self { tx, task: None }
    }

    fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Ticker for TokioTicker {
    fn arm(&mut self, generation: u64) {
        self.stop();
        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            let mut interval = time::interval(TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let Some(tx) = tx.upgrade() else { break };
                if tx.send(Message::Tick { generation }).is_err() {
                    break;
                }
            }
            debug!("Ticker {} stopped", generation);
        }));
    }

    fn cancel(&mut self) {
        if self.stop() {
            if let Some(tx) = self.tx.upgrade() {
                let _ = tx.send(Message::TickerCancelled);
            }
        }
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
