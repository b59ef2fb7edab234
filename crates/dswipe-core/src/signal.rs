//! "Generation stopped" event source.
//!
//! The chat application emits on a [`StopSignal`] when the user presses
//! stop. Listeners hold a [`StopSubscription`]; dropping it unsubscribes, so
//! a listener cannot outlive the scope that took it.

use tokio::sync::broadcast;

const STOP_CHANNEL_CAPACITY: usize = 16;

/// Application-wide broadcast of stop requests.
#[derive(Debug, Clone)]
pub struct StopSignal {
    sender: broadcast::Sender<()>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(STOP_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Notifies every live subscription. Returns how many were reached.
    pub fn emit(&self) -> usize {
        self.sender.send(()).unwrap_or(0)
    }

    pub fn subscribe(&self) -> StopSubscription {
        StopSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of subscriptions currently alive.
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// A scoped listener on a [`StopSignal`].
#[derive(Debug)]
pub struct StopSubscription {
    receiver: broadcast::Receiver<()>,
}

impl StopSubscription {
    /// Resolves once a stop is emitted after this subscription was taken.
    ///
    /// If the signal itself is dropped, no stop can arrive any more and the
    /// future stays pending.
    pub async fn fired(&mut self) {
        match self.receiver.recv().await {
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
        }
    }
}
