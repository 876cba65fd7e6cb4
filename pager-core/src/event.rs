//! Session lifecycle notifications.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::auth::ActorId;

/// Notification emitted over a session's lifetime.
///
/// `Finished`, `Expired`, and fatal `Errored` notifications are each
/// delivered at most once per session; the rest may repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session rendered its first page and is accepting input.
    Started,
    /// A qualifying reaction was accepted for dispatch.
    Reacted { actor: ActorId, key: String },
    /// The session was explicitly terminated by `actor`.
    Finished { actor: ActorId },
    /// The deadline elapsed with no qualifying input.
    Expired,
    /// A recovered or fatal error occurred.
    Errored { message: String },
}

/// Dispatches session notifications to an optional subscriber.
///
/// Every emission is also logged. A missing or dropped subscriber never
/// blocks the session.
#[derive(Debug, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl EventSink {
    /// Create a sink delivering notifications to the returned receiver.
    pub fn subscribed() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Emit one notification.
    pub fn emit(&self, event: SessionEvent) {
        match &event {
            SessionEvent::Errored { message } => warn!(%message, "session error"),
            other => debug!(event = ?other, "session event"),
        }

        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
