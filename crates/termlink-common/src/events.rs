use tokio::sync::broadcast;

use crate::errors::BridgeError;
use crate::types::{Geometry, SessionState};

/// Observable happenings inside a bridged session.
///
/// Errors that used to be dropped silently (input writes, transient reads)
/// are published here so a frontend can surface them.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    StateChanged(SessionState),
    GeometryChanged(Geometry),
    Error(BridgeError),
}

pub struct EventBus {
    sender: broadcast::Sender<BridgeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: BridgeEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn error(&self, error: BridgeError) -> usize {
        self.publish(BridgeEvent::Error(error))
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
