//! Background task turning engine signals into log lines

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::state::Signal;

/// Log every signal until the sink is dropped
pub async fn signal_logger_task(mut rx: broadcast::Receiver<Signal>) {
    info!("Starting signal logger task");

    loop {
        match rx.recv().await {
            Ok(signal) => log_signal(&signal),
            Err(RecvError::Lagged(skipped)) => warn!("Signal logger lagged, skipped {} signals", skipped),
            Err(RecvError::Closed) => break,
        }
    }

    debug!("Signal logger stopped");
}

fn log_signal(signal: &Signal) {
    match signal {
        Signal::WorkStarted { interval } => info!("Work interval {} started", interval),
        Signal::RestStarted { is_long, .. } if signal.announces_rest() => {
            info!("Time for a {} rest", if *is_long { "long" } else { "short" })
        }
        Signal::RestEnded { .. } if signal.announces_rest_end() => info!("Rest finished, back to work"),
        Signal::SessionCompleted => info!("Session completed"),
        Signal::UserChoiceRequired { phase, next_is_long_rest } => info!(
            "{} finished, waiting for user (next long rest: {})",
            phase, next_is_long_rest
        ),
        other => debug!("Signal: {:?}", other),
    }
}
