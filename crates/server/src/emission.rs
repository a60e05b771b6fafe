//! Who hears what.
//!
//! State snapshots are unicast: each session owns an [`Outbox`] and only the
//! session that issued a command receives the resulting snapshot. Video
//! frames go through the [`FrameRelay`] to every connected session except the
//! one that produced them.

use axum::body::Bytes;
use shared::{domain::SessionId, protocol::ServerEvent};
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tracing::{debug, warn};

/// Sending half of one session's unicast queue. The socket writer drains the
/// receiving half.
pub struct Outbox {
    tx: mpsc::Sender<ServerEvent>,
}

impl Outbox {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Waits for queue space. Fails only once the writer is gone.
    pub async fn send(&self, event: ServerEvent) -> Result<(), ServerEvent> {
        self.tx.send(event).await.map_err(|e| e.0)
    }

    /// Never waits; the event is dropped if the queue is full or closed.
    pub fn send_best_effort(&self, event: ServerEvent) -> bool {
        self.tx.try_send(event).is_ok()
    }
}

#[derive(Debug, Clone)]
struct RelayedFrame {
    origin: SessionId,
    bytes: Bytes,
}

#[derive(Clone)]
pub struct FrameRelay {
    tx: broadcast::Sender<RelayedFrame>,
}

impl FrameRelay {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Fans `bytes` out to every subscriber other than `origin`. Returns the
    /// number of live subscriptions, the origin's own included.
    pub fn publish(&self, origin: SessionId, bytes: Bytes) -> usize {
        let len = bytes.len();
        match self.tx.send(RelayedFrame { origin, bytes }) {
            Ok(receivers) => {
                debug!(session_id = %origin, bytes = len, receivers, "video frame received");
                receivers
            }
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self, session: SessionId) -> FrameSubscription {
        FrameSubscription {
            session,
            rx: self.tx.subscribe(),
        }
    }
}

pub struct FrameSubscription {
    session: SessionId,
    rx: broadcast::Receiver<RelayedFrame>,
}

impl FrameSubscription {
    /// Next frame produced by some other session. Cancel safe.
    pub async fn recv(&mut self) -> Option<Bytes> {
        loop {
            match self.rx.recv().await {
                Ok(frame) if frame.origin == self.session => continue,
                Ok(frame) => return Some(frame.bytes),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(session_id = %self.session, skipped, "video receiver lagged; frames dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/emission_tests.rs"]
mod tests;
