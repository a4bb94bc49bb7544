//! "Scenario created" notifications between the form and the lists.
//!
//! A pure signal with no payload. Subscribers that are not listening when a
//! scenario is created simply miss it.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{trace, warn};

const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioCreated;

#[derive(Debug, Clone)]
pub struct ScenarioEvents {
    sender: broadcast::Sender<ScenarioCreated>,
}

impl ScenarioEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Fire and forget. Returns how many subscribers were reached.
    pub fn notify_created(&self) -> usize {
        match self.sender.send(ScenarioCreated) {
            Ok(reached) => reached,
            Err(_) => {
                trace!("scenario created with no listeners");
                0
            }
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ScenarioEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<ScenarioCreated>,
}

impl Subscription {
    /// Waits for the next notification; `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<ScenarioCreated> {
        match self.receiver.recv().await {
            Ok(event) => Some(event),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "listener fell behind scenario notifications");
                Some(ScenarioCreated)
            }
            Err(RecvError::Closed) => None,
        }
    }

    /// Next already-delivered notification, if any.
    pub fn try_recv(&mut self) -> Option<ScenarioCreated> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "listener fell behind scenario notifications");
                Some(ScenarioCreated)
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => None,
        }
    }
}
