//! Outbound signal delivery to UI, audio and notification collaborators

use tokio::sync::broadcast;
use tracing::debug;

use crate::state::Signal;

/// Receives every signal the engine fires, in order
pub trait SignalSink: Send {
    fn emit(&mut self, signal: Signal);
}

/// Fans signals out over a broadcast channel
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<Signal>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.tx.subscribe()
    }
}

impl SignalSink for BroadcastSink {
    fn emit(&mut self, signal: Signal) {
        // No subscribers is fine: nobody is presenting anything
        if self.tx.send(signal).is_err() {
            debug!("Dropped signal with no subscribers: {:?}", signal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Phase;

    #[tokio::test]
    async fn subscribers_receive_signals_in_order() {
        let mut sink = BroadcastSink::new(8);
        let mut rx = sink.subscribe();

        sink.emit(Signal::IdleExited);
        sink.emit(Signal::WorkStarted { interval: 1 });
        sink.emit(Signal::PauseToggled { phase: Phase::Work, paused: true });

        assert_eq!(rx.recv().await.unwrap(), Signal::IdleExited);
        assert_eq!(rx.recv().await.unwrap(), Signal::WorkStarted { interval: 1 });
        assert_eq!(
            rx.recv().await.unwrap(),
            Signal::PauseToggled { phase: Phase::Work, paused: true }
        );
    }

    #[test]
    fn emit_without_subscribers_does_not_panic() {
        let mut sink = BroadcastSink::new(1);
        sink.emit(Signal::SessionCompleted);
    }
}
