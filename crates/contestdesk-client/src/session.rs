//! Session lifecycle signals.
//!
//! A 401 on an admin page ends the admin session. Hosts subscribe here and
//! decide how to return the user to the sign-in view (re-render, navigate,
//! prompt on the terminal).

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

const DEFAULT_CAPACITY: usize = 16;

/// Session lifecycle event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// The admin credential was rejected and has been cleared.
    Expired {
        /// Page path active when the rejection arrived.
        path: String,
    },
}

impl SessionEvent {
    /// Machine-friendly discriminator used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Expired { .. } => "session_expired",
        }
    }
}

/// Broadcast bus for session events.
#[derive(Clone, Debug)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    /// Bus with room for `capacity` undelivered events per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "session event capacity must be positive");
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Publish an event, returning how many subscribers received it.
    pub fn publish(&self, event: SessionEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> SessionStream {
        SessionStream {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of [`SessionEvents`].
#[derive(Debug)]
pub struct SessionStream {
    receiver: broadcast::Receiver<SessionEvent>,
}

impl SessionStream {
    /// Wait for the next event. Returns `None` once every sender is dropped.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next pending event without waiting.
    pub fn try_next(&mut self) -> Option<SessionEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
