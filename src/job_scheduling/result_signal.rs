//! Broadcast-once completion signal
//!
//! The completing half is consumed by `complete`, so a signal can never fire
//! twice. Observers that arrive after completion see it as already fired.
//! Dropping the completer without completing (a panicking worker) also
//! releases every waiter.

use tokio::sync::watch;

/// Create a linked completer/observer pair
pub fn result_signal() -> (SignalCompleter, ResultSignal) {
    let (tx, rx) = watch::channel(false);
    (SignalCompleter { tx }, ResultSignal { rx })
}

/// Completing half, owned by exactly one worker
#[derive(Debug)]
pub struct SignalCompleter {
    tx: watch::Sender<bool>,
}

impl SignalCompleter {
    /// Release all current and future waiters
    pub fn complete(self) {
        self.tx.send_replace(true);
    }
}

/// Observer half; clone freely
#[derive(Debug, Clone)]
pub struct ResultSignal {
    rx: watch::Receiver<bool>,
}

impl ResultSignal {
    /// Whether the owning job has finished (or its worker is gone)
    pub fn is_fired(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Wait until the job finishes; returns immediately if it already has
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        // Err means the completer was dropped, which also ends the job
        let _ = rx.wait_for(|done| *done).await;
    }
}
