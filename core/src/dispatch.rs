//! Explicit forwarding of guard events to a notification consumer
//!
//! The receiving half usually lives in the web layer, which pushes events to
//! the admin dashboard socket. Forwarding never blocks the request path.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::events::GuardEvent;

/// Sending half of the guard event channel
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    sender: mpsc::UnboundedSender<GuardEvent>,
}

impl EventDispatcher {
    /// Create a dispatcher and the receiver that consumes its events
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<GuardEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Forward one event
    ///
    /// Returns `false` when the receiver is gone; the event is dropped.
    pub fn forward(&self, event: impl Into<GuardEvent>) -> bool {
        let event = event.into();
        debug!(
            event = event.name(),
            invitation = %event.invitation(),
            "forwarding guard event"
        );
        match self.sender.send(event) {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                warn!(
                    event = event.name(),
                    "event receiver closed, dropping guard event"
                );
                false
            }
        }
    }
}
